//! CLI command implementations.
//!
//! Each `cmd_*` function prints its result and also returns it, so the
//! integration tests can check outcomes without scraping stdout.

use crate::assets::{self, AssetSource};
use crate::config::ChurnConfig;
use crate::form::CustomerForm;
use churn_core::{explain, Activation, Predictor, PredictionReport};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tracing::info;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Load artifacts and build a predictor with the given threshold.
pub fn load_predictor(assets_path: &Path, threshold: f64) -> CliResult<Predictor> {
    let assets = AssetSource::detect(assets_path).load()?;
    Ok(Predictor::new(assets)?.with_threshold(threshold)?)
}

/// Score one form, optionally attaching heuristic impacts.
pub fn score(predictor: &Predictor, form: CustomerForm, with_impacts: bool) -> CliResult<PredictionReport> {
    let record = form.into_record()?;
    let prediction = predictor.predict(&record)?;
    info!(
        probability = prediction.probability,
        churn = prediction.churn,
        risk = prediction.risk.as_str(),
        "Prediction complete"
    );

    let report = PredictionReport::new(&prediction);
    if with_impacts {
        Ok(report.with_explanation(explain(predictor, &record)?))
    } else {
        Ok(report)
    }
}

fn print_report(report: &PredictionReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

/// `churn predict`
pub fn cmd_predict(
    assets_path: &Path,
    form: CustomerForm,
    threshold: f64,
    json: bool,
) -> CliResult<PredictionReport> {
    let predictor = load_predictor(assets_path, threshold)?;
    let report = score(&predictor, form, false)?;
    print_report(&report, json)?;
    Ok(report)
}

/// `churn explain`
pub fn cmd_explain(
    assets_path: &Path,
    form: CustomerForm,
    threshold: f64,
    json: bool,
) -> CliResult<PredictionReport> {
    let predictor = load_predictor(assets_path, threshold)?;
    let report = score(&predictor, form, true)?;
    print_report(&report, json)?;
    Ok(report)
}

// =============================================================================
// INSPECT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerShape {
    pub inputs: usize,
    pub units: usize,
    pub activation: Activation,
}

/// Summary of loaded artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub source: String,
    pub gender_classes: Vec<String>,
    pub geography_categories: Vec<String>,
    pub columns: Vec<String>,
    pub scaler_method: String,
    pub scaler_width: usize,
    pub scaler_has_feature_names: bool,
    pub layers: Vec<LayerShape>,
}

/// `churn inspect`
pub fn cmd_inspect(assets_path: &Path, json: bool) -> CliResult<Inspection> {
    let source = AssetSource::detect(assets_path);
    let assets = source.load()?;

    let inspection = Inspection {
        source: source.path().display().to_string(),
        gender_classes: assets.gender_encoder.classes().to_vec(),
        geography_categories: assets.geography_encoder.categories().to_vec(),
        columns: assets.assembler().columns(),
        scaler_method: assets.scaler.method().name().to_string(),
        scaler_width: assets.scaler.width(),
        scaler_has_feature_names: assets.scaler.feature_names().is_some(),
        layers: assets
            .model
            .layers()
            .iter()
            .map(|l| LayerShape {
                inputs: l.inputs(),
                units: l.units(),
                activation: l.activation,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        println!("Artifacts: {}", inspection.source);
        println!("  Gender classes:  {}", inspection.gender_classes.join(", "));
        println!("  Geographies:     {}", inspection.geography_categories.join(", "));
        println!(
            "  Scaler:          {} ({} columns{})",
            inspection.scaler_method,
            inspection.scaler_width,
            if inspection.scaler_has_feature_names {
                ", names checked"
            } else {
                ""
            }
        );
        println!("  Columns:");
        for (i, c) in inspection.columns.iter().enumerate() {
            println!("    {i:>2}  {c}");
        }
        println!("  Model:");
        for (i, l) in inspection.layers.iter().enumerate() {
            println!(
                "    {i}: {} -> {} ({:?})",
                l.inputs, l.units, l.activation
            );
        }
    }

    Ok(inspection)
}

// =============================================================================
// PACK / INIT
// =============================================================================

/// `churn pack`: validate a JSON artifact directory and write a bundle.
pub fn cmd_pack(source_dir: &Path, out: &Path, force: bool) -> CliResult<usize> {
    if out.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", out.display()).into());
    }
    let assets = assets::load_directory(source_dir)?;
    let size = assets::write_bundle(&assets, out)?;
    info!(path = %out.display(), bytes = size, "Bundle written");
    println!("Packed {} -> {} ({size} bytes)", source_dir.display(), out.display());
    Ok(size)
}

/// `churn init`: write a default config file.
pub fn cmd_init(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    std::fs::write(path, ChurnConfig::default_toml())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
