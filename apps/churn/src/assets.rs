//! Artifact loading.
//!
//! Artifacts come either as a directory of JSON files written by the
//! training export, or as a packed binary bundle produced by `churn pack`:
//!
//! | File                          | Artifact            |
//! |-------------------------------|---------------------|
//! | `model.json`                  | feed-forward model  |
//! | `label_encoder_gender.json`   | gender encoder      |
//! | `onehot_encoder_geo.json`     | geography encoder   |
//! | `scaler.json`                 | feature scaler      |
//!
//! Any failure here is fatal: without all four artifacts nothing can be
//! scored.

use churn_core::{
    assets_from_bytes, assets_to_bytes, ChurnAssets, ChurnError, FeatureScaler, LabelEncoder,
    Network, OneHotEncoder,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MODEL_FILE: &str = "model.json";
pub const GENDER_ENCODER_FILE: &str = "label_encoder_gender.json";
pub const GEOGRAPHY_ENCODER_FILE: &str = "onehot_encoder_geo.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Where the artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Directory of JSON artifacts.
    Directory(PathBuf),
    /// Packed binary bundle.
    Bundle(PathBuf),
}

impl AssetSource {
    /// Files are bundles, everything else is treated as a directory.
    pub fn detect(path: &Path) -> Self {
        if path.is_file() {
            Self::Bundle(path.to_path_buf())
        } else {
            Self::Directory(path.to_path_buf())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::Bundle(p) => p,
        }
    }

    /// Load and validate all four artifacts.
    pub fn load(&self) -> Result<ChurnAssets, ChurnError> {
        let assets = match self {
            Self::Directory(dir) => load_directory(dir)?,
            Self::Bundle(path) => load_bundle(path)?,
        };
        info!(
            source = %self.path().display(),
            genders = assets.gender_encoder.classes().len(),
            countries = assets.geography_encoder.categories().len(),
            width = assets.scaler.width(),
            layers = assets.model.layers().len(),
            "Artifacts loaded"
        );
        Ok(assets)
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, ChurnError> {
    let path = dir.join(file);
    debug!(artifact = file, path = %path.display(), "Reading artifact");
    let content = std::fs::read_to_string(&path).map_err(|e| ChurnError::AssetLoad {
        artifact: file.to_string(),
        reason: format!("{}: {e}", path.display()),
    })?;
    serde_json::from_str(&content).map_err(|e| ChurnError::AssetLoad {
        artifact: file.to_string(),
        reason: e.to_string(),
    })
}

/// Load the four JSON artifacts from a directory.
pub fn load_directory(dir: &Path) -> Result<ChurnAssets, ChurnError> {
    let assets = ChurnAssets {
        model: read_json::<Network>(dir, MODEL_FILE)?,
        gender_encoder: read_json::<LabelEncoder>(dir, GENDER_ENCODER_FILE)?,
        geography_encoder: read_json::<OneHotEncoder>(dir, GEOGRAPHY_ENCODER_FILE)?,
        scaler: read_json::<FeatureScaler>(dir, SCALER_FILE)?,
    };
    assets.validate()?;
    Ok(assets)
}

/// Write the four JSON artifacts into a directory.
pub fn write_directory(assets: &ChurnAssets, dir: &Path) -> Result<(), ChurnError> {
    std::fs::create_dir_all(dir).map_err(|e| ChurnError::AssetLoad {
        artifact: "directory".into(),
        reason: format!("{}: {e}", dir.display()),
    })?;

    fn write<T: serde::Serialize>(dir: &Path, file: &str, value: &T) -> Result<(), ChurnError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| ChurnError::AssetLoad {
            artifact: file.to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(dir.join(file), json).map_err(|e| ChurnError::AssetLoad {
            artifact: file.to_string(),
            reason: e.to_string(),
        })
    }

    write(dir, MODEL_FILE, &assets.model)?;
    write(dir, GENDER_ENCODER_FILE, &assets.gender_encoder)?;
    write(dir, GEOGRAPHY_ENCODER_FILE, &assets.geography_encoder)?;
    write(dir, SCALER_FILE, &assets.scaler)
}

/// Load a packed bundle.
pub fn load_bundle(path: &Path) -> Result<ChurnAssets, ChurnError> {
    let bytes = std::fs::read(path).map_err(|e| ChurnError::AssetLoad {
        artifact: "bundle".into(),
        reason: format!("{}: {e}", path.display()),
    })?;
    assets_from_bytes(&bytes)
}

/// Pack validated assets into a bundle file. Returns the bundle size.
pub fn write_bundle(assets: &ChurnAssets, path: &Path) -> Result<usize, ChurnError> {
    let bytes = assets_to_bytes(assets)?;
    std::fs::write(path, &bytes).map_err(|e| ChurnError::AssetLoad {
        artifact: "bundle".into(),
        reason: format!("{}: {e}", path.display()),
    })?;
    Ok(bytes.len())
}

// =============================================================================
// TESTS
// =============================================================================
