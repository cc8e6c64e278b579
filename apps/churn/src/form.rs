//! Input layer: widget ranges, defaults, and the submitted form.
//!
//! The core passes numeric fields through untouched, so every range check
//! lives here. Categorical choices are offered straight from the fitted
//! encoders, which keeps `UnknownCategory` out of normal operation.

use churn_core::{ChurnAssets, CustomerRecord};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const CREDIT_SCORE_RANGE: RangeInclusive<u16> = 300..=850;
pub const AGE_RANGE: RangeInclusive<u8> = 18..=92;
pub const TENURE_RANGE: RangeInclusive<u8> = 0..=10;
pub const PRODUCTS_RANGE: RangeInclusive<u8> = 1..=4;
pub const BALANCE_RANGE: RangeInclusive<f64> = 0.0..=250_000.0;
pub const SALARY_RANGE: RangeInclusive<f64> = 0.0..=200_000.0;

/// A submitted customer profile.
///
/// Omitted numeric fields take the form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerForm {
    pub geography: String,
    pub gender: String,
    #[serde(default = "defaults::age")]
    pub age: u8,
    #[serde(default = "defaults::tenure")]
    pub tenure: u8,
    #[serde(default = "defaults::credit_score")]
    pub credit_score: u16,
    #[serde(default = "defaults::balance")]
    pub balance: f64,
    #[serde(default = "defaults::estimated_salary")]
    pub estimated_salary: f64,
    #[serde(default = "defaults::num_of_products")]
    pub num_of_products: u8,
    #[serde(default = "defaults::yes")]
    pub has_credit_card: bool,
    #[serde(default = "defaults::yes")]
    pub is_active_member: bool,
}

mod defaults {
    pub fn age() -> u8 {
        35
    }
    pub fn tenure() -> u8 {
        5
    }
    pub fn credit_score() -> u16 {
        650
    }
    pub fn balance() -> f64 {
        50_000.0
    }
    pub fn estimated_salary() -> f64 {
        75_000.0
    }
    pub fn num_of_products() -> u8 {
        1
    }
    pub fn yes() -> bool {
        true
    }
}

/// A field outside its widget range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be within {range}, got {value}")]
pub struct FormError {
    pub field: &'static str,
    pub range: String,
    pub value: String,
}

fn check<T>(field: &'static str, range: &RangeInclusive<T>, value: T) -> Result<(), FormError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(FormError {
            field,
            range: format!("{}..={}", range.start(), range.end()),
            value: value.to_string(),
        })
    }
}

impl CustomerForm {
    /// Check widget ranges and convert into a core record.
    pub fn into_record(self) -> Result<CustomerRecord, FormError> {
        check("credit_score", &CREDIT_SCORE_RANGE, self.credit_score)?;
        check("age", &AGE_RANGE, self.age)?;
        check("tenure", &TENURE_RANGE, self.tenure)?;
        check("num_of_products", &PRODUCTS_RANGE, self.num_of_products)?;
        // NaN fails `contains`, so non-finite money never reaches the core.
        check("balance", &BALANCE_RANGE, self.balance)?;
        check("estimated_salary", &SALARY_RANGE, self.estimated_salary)?;

        Ok(CustomerRecord {
            credit_score: self.credit_score,
            gender: self.gender,
            age: self.age,
            tenure: self.tenure,
            balance: self.balance,
            num_of_products: self.num_of_products,
            has_credit_card: self.has_credit_card,
            is_active_member: self.is_active_member,
            estimated_salary: self.estimated_salary,
            geography: self.geography,
        })
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// Everything a client needs to render the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub geography: Vec<String>,
    pub gender: Vec<String>,
    pub numeric: Vec<NumericField>,
    pub flags: Vec<String>,
    pub columns: Vec<String>,
}

impl FormSchema {
    pub fn from_assets(assets: &ChurnAssets) -> Self {
        let field = |name: &str, min: f64, max: f64, default: f64| NumericField {
            name: name.to_string(),
            min,
            max,
            default,
        };
        Self {
            geography: assets.geography_encoder.categories().to_vec(),
            gender: assets.gender_encoder.classes().to_vec(),
            numeric: vec![
                field(
                    "credit_score",
                    f64::from(*CREDIT_SCORE_RANGE.start()),
                    f64::from(*CREDIT_SCORE_RANGE.end()),
                    f64::from(defaults::credit_score()),
                ),
                field(
                    "age",
                    f64::from(*AGE_RANGE.start()),
                    f64::from(*AGE_RANGE.end()),
                    f64::from(defaults::age()),
                ),
                field(
                    "tenure",
                    f64::from(*TENURE_RANGE.start()),
                    f64::from(*TENURE_RANGE.end()),
                    f64::from(defaults::tenure()),
                ),
                field(
                    "balance",
                    *BALANCE_RANGE.start(),
                    *BALANCE_RANGE.end(),
                    defaults::balance(),
                ),
                field(
                    "estimated_salary",
                    *SALARY_RANGE.start(),
                    *SALARY_RANGE.end(),
                    defaults::estimated_salary(),
                ),
                field(
                    "num_of_products",
                    f64::from(*PRODUCTS_RANGE.start()),
                    f64::from(*PRODUCTS_RANGE.end()),
                    f64::from(defaults::num_of_products()),
                ),
            ],
            flags: vec!["has_credit_card".into(), "is_active_member".into()],
            columns: assets.assembler().columns(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
