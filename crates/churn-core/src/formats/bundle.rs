//! Packed artifact bundle.
//!
//! Layout: `postcard(BundleHeader) ++ postcard(ChurnAssets)`. The header is
//! decoded first so a foreign or newer file is rejected before the body is
//! touched. Decoded assets are validated before they are returned.

use crate::pipeline::ChurnAssets;
use crate::ChurnError;
use serde::{Deserialize, Serialize};

/// Magic bytes identifying a churn bundle.
pub const BUNDLE_MAGIC: [u8; 4] = *b"CHRN";

/// Current bundle format version.
pub const BUNDLE_VERSION: u16 = 1;

const ARTIFACT: &str = "bundle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleHeader {
    pub magic: [u8; 4],
    pub version: u16,
}

impl BundleHeader {
    #[must_use]
    pub fn current() -> Self {
        Self {
            magic: BUNDLE_MAGIC,
            version: BUNDLE_VERSION,
        }
    }

    fn check(&self) -> Result<(), ChurnError> {
        if self.magic != BUNDLE_MAGIC {
            return Err(ChurnError::asset(ARTIFACT, "bad magic bytes"));
        }
        if self.version != BUNDLE_VERSION {
            return Err(ChurnError::asset(
                ARTIFACT,
                format!(
                    "unsupported version {} (expected {})",
                    self.version, BUNDLE_VERSION
                ),
            ));
        }
        Ok(())
    }
}

/// Encode validated assets into a bundle.
pub fn assets_to_bytes(assets: &ChurnAssets) -> Result<Vec<u8>, ChurnError> {
    assets.validate()?;
    let mut bytes = postcard::to_allocvec(&BundleHeader::current())
        .map_err(|e| ChurnError::asset(ARTIFACT, e.to_string()))?;
    let body =
        postcard::to_allocvec(assets).map_err(|e| ChurnError::asset(ARTIFACT, e.to_string()))?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode and validate a bundle.
pub fn assets_from_bytes(bytes: &[u8]) -> Result<ChurnAssets, ChurnError> {
    let (header, rest): (BundleHeader, &[u8]) = postcard::take_from_bytes(bytes)
        .map_err(|e| ChurnError::asset(ARTIFACT, format!("unreadable header: {e}")))?;
    header.check()?;

    let (assets, trailing): (ChurnAssets, &[u8]) = postcard::take_from_bytes(rest)
        .map_err(|e| ChurnError::asset(ARTIFACT, format!("unreadable body: {e}")))?;
    if !trailing.is_empty() {
        return Err(ChurnError::asset(
            ARTIFACT,
            format!("{} trailing bytes", trailing.len()),
        ));
    }

    assets.validate()?;
    Ok(assets)
}

// =============================================================================
// TESTS
// =============================================================================
