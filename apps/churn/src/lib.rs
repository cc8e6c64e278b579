//! # Churn Library
//!
//! This library exposes the churn application modules for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod assets;
pub mod cli;
pub mod config;
pub mod form;

// Re-export churn_core for convenience
pub use churn_core;
