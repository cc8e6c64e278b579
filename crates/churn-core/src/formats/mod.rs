//! # Formats Module
//!
//! Binary bundle format for the fitted artifacts.
//!
//! This module contains:
//! - Bundle header (magic + version)
//! - postcard encoding of [`ChurnAssets`](crate::ChurnAssets)
//!
//! Note: File I/O operations remain in the app layer (apps/churn).
//! This module only handles format conversion (pure transformations).

mod bundle;

pub use bundle::*;
