//! Measurement normalization
//!
//! Converts raw weight/height input in any supported unit to a canonical
//! [`Measurement`] in kilograms and centimeters.

use serde::{Deserialize, Serialize};

use super::units::{split_unit_suffix, HeightUnit, WeightUnit, CM_PER_INCH, INCHES_PER_FOOT};
use crate::error::{ValidationError, ValidationResult};

/// A numeric input field that may arrive as a number or as text.
///
/// Text may carry a trailing unit marker ("150 lb"); it is parsed only here,
/// at the input boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// Canonical body measurements.
///
/// Fields are private: a `Measurement` only comes out of [`normalize`] or
/// [`Measurement::canonical`], so it is always in kilograms and centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    weight_kg: f64,
    height_cm: f64,
}

impl Measurement {
    /// Build a measurement from values already in kilograms and centimeters
    pub fn canonical(weight_kg: f64, height_cm: f64) -> ValidationResult<Self> {
        Ok(Self {
            weight_kg: require_positive(weight_kg, "weight")?,
            height_cm: require_positive(height_cm, "height")?,
        })
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn weight_unit(&self) -> WeightUnit {
        WeightUnit::CANONICAL
    }

    pub fn height_unit(&self) -> HeightUnit {
        HeightUnit::CANONICAL
    }
}

/// Normalize a raw weight/height pair to canonical units.
///
/// `height` is used for `cm` and `in`; `height_feet` and `height_inches` are
/// used for (and only allowed with) `ft`.
pub fn normalize(
    weight: &RawNumber,
    weight_unit: WeightUnit,
    height: Option<&RawNumber>,
    height_unit: HeightUnit,
    height_feet: Option<f64>,
    height_inches: Option<f64>,
) -> ValidationResult<Measurement> {
    let weight_kg = normalize_weight(weight, weight_unit)?;
    let height_cm = normalize_height(height, height_unit, height_feet, height_inches)?;

    tracing::debug!(
        weight_unit = weight_unit.as_str(),
        height_unit = height_unit.as_str(),
        weight_kg,
        height_cm,
        "normalized measurement"
    );

    Measurement::canonical(weight_kg, height_cm)
}

/// Convert a raw weight to kilograms
pub fn normalize_weight(weight: &RawNumber, unit: WeightUnit) -> ValidationResult<f64> {
    let value = parse_raw(weight, "weight", |suffix| {
        match WeightUnit::from_str(suffix) {
            Some(marked) if marked == unit => Ok(()),
            Some(marked) => Err(ValidationError::new(format!(
                "weight is marked '{}' but weight_unit is '{}'",
                marked.as_str(),
                unit.as_str()
            ))),
            None => Err(ValidationError::new("weight must be numeric")),
        }
    })?;

    require_positive(value * unit.kg_per_unit(), "weight")
}

/// Convert a raw height to centimeters
pub fn normalize_height(
    height: Option<&RawNumber>,
    unit: HeightUnit,
    height_feet: Option<f64>,
    height_inches: Option<f64>,
) -> ValidationResult<f64> {
    match unit {
        HeightUnit::Ft => {
            if height.is_some() {
                return Err(ValidationError::new(
                    "height must be given as height_feet and height_inches when height_unit is 'ft'",
                ));
            }
            let (feet, inches) = match (height_feet, height_inches) {
                (Some(feet), Some(inches)) => (feet, inches),
                _ => {
                    return Err(ValidationError::new(
                        "height_feet and height_inches are both required when height_unit is 'ft'",
                    ))
                }
            };
            if !feet.is_finite() || feet < 0.0 {
                return Err(ValidationError::new("height_feet must be a non-negative number"));
            }
            if !inches.is_finite() || !(0.0..INCHES_PER_FOOT).contains(&inches) {
                return Err(ValidationError::new(
                    "height_inches must be at least 0 and less than 12",
                ));
            }
            let total_inches = feet * INCHES_PER_FOOT + inches;
            require_positive(total_inches * CM_PER_INCH, "height")
        }
        HeightUnit::Cm | HeightUnit::In => {
            if height_feet.is_some() || height_inches.is_some() {
                return Err(ValidationError::new(
                    "height_feet and height_inches are only allowed when height_unit is 'ft'",
                ));
            }
            let raw = height.ok_or_else(|| ValidationError::new("height is required"))?;
            let value = parse_raw(raw, "height", |suffix| {
                match HeightUnit::from_str(suffix) {
                    Some(marked) if marked == unit => Ok(()),
                    Some(marked) => Err(ValidationError::new(format!(
                        "height is marked '{}' but height_unit is '{}'",
                        marked.as_str(),
                        unit.as_str()
                    ))),
                    None => Err(ValidationError::new("height must be numeric")),
                }
            })?;
            let cm = match unit {
                HeightUnit::In => value * CM_PER_INCH,
                _ => value,
            };
            require_positive(cm, "height")
        }
    }
}

/// Parse a raw number, checking any trailing unit marker with `check_suffix`
fn parse_raw<F>(raw: &RawNumber, field: &str, check_suffix: F) -> ValidationResult<f64>
where
    F: FnOnce(&str) -> ValidationResult<()>,
{
    match raw {
        RawNumber::Number(value) => Ok(*value),
        RawNumber::Text(text) => {
            let (number, suffix) = split_unit_suffix(text);
            if !suffix.is_empty() {
                check_suffix(&suffix)?;
            }
            number
                .parse::<f64>()
                .map_err(|_| ValidationError::new(format!("{} must be numeric", field)))
        }
    }
}

fn require_positive(value: f64, field: &str) -> ValidationResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::new(format!(
            "{} must be a positive number",
            field
        )))
    }
}
