//! Shared fixtures for unit tests.

use crate::encoding::{LabelEncoder, OneHotEncoder};
use crate::network::{Activation, DenseLayer, Network};
use crate::pipeline::ChurnAssets;
use crate::scaler::{FeatureScaler, ScalingMethod};
use crate::types::CustomerRecord;

pub fn gender_encoder() -> LabelEncoder {
    LabelEncoder::new(vec!["Female".into(), "Male".into()]).expect("fixture classes")
}

pub fn geography_encoder() -> OneHotEncoder {
    OneHotEncoder::new(
        "Geography",
        vec!["France".into(), "Germany".into(), "Spain".into()],
    )
    .expect("fixture categories")
}

/// Standard scaler roughly fit on the bank churn dataset. Age uses
/// mean 40 / scale 8 so the age-only model is exact at age 40.
pub fn scaler() -> FeatureScaler {
    let columns = crate::features::FeatureAssembler::new(&gender_encoder(), &geography_encoder())
        .columns();
    FeatureScaler::new(
        ScalingMethod::Standard {
            mean: vec![
                650.5, 0.55, 40.0, 5.0, 76485.9, 1.53, 0.71, 0.52, 100090.2, 0.50, 0.25, 0.25,
            ],
            scale: vec![
                96.6, 0.50, 8.0, 2.9, 62397.4, 0.58, 0.46, 0.50, 57510.5, 0.50, 0.43, 0.43,
            ],
        },
        Some(columns),
    )
    .expect("fixture scaler")
}

/// 12 -> 4 (relu) -> 1 (sigmoid) network with fixed weights.
pub fn mlp() -> Network {
    Network::new(vec![
        DenseLayer::new(
            vec![
                vec![-0.2, 0.1, 0.9, -0.1, 0.4, -0.6, 0.0, -0.7, 0.05, -0.2, 0.6, -0.1],
                vec![0.3, -0.2, 0.5, 0.2, -0.1, 0.8, -0.1, 0.3, 0.0, 0.1, -0.3, 0.2],
                vec![-0.1, 0.0, -0.4, 0.1, 0.2, -0.2, 0.1, 0.6, -0.05, 0.3, 0.1, -0.2],
                vec![0.05, 0.2, 0.3, 0.0, 0.3, 0.4, 0.0, -0.5, 0.1, -0.1, 0.5, 0.0],
            ],
            vec![0.1, -0.1, 0.05, 0.0],
            Activation::Relu,
        ),
        DenseLayer::new(
            vec![vec![1.2, 0.7, -0.9, 0.8]],
            vec![-0.6],
            Activation::Sigmoid,
        ),
    ])
    .expect("fixture network")
}

/// Single sigmoid unit reading only the Age column.
pub fn age_only() -> Network {
    let mut weights = vec![0.0; 12];
    weights[2] = 1.0;
    Network::new(vec![DenseLayer::new(
        vec![weights],
        vec![0.0],
        Activation::Sigmoid,
    )])
    .expect("fixture network")
}

pub fn assets() -> ChurnAssets {
    ChurnAssets {
        model: mlp(),
        gender_encoder: gender_encoder(),
        geography_encoder: geography_encoder(),
        scaler: scaler(),
    }
}

pub fn age_only_assets() -> ChurnAssets {
    ChurnAssets {
        model: age_only(),
        ..assets()
    }
}

/// The end-to-end reference record.
pub fn reference_record() -> CustomerRecord {
    CustomerRecord {
        credit_score: 650,
        gender: "Female".into(),
        age: 35,
        tenure: 5,
        balance: 50000.0,
        num_of_products: 2,
        has_credit_card: true,
        is_active_member: true,
        estimated_salary: 50000.0,
        geography: "France".into(),
    }
}
