//! Body fat resolution
//!
//! A profile's body fat comes from exactly one source: a percentage the user
//! entered, or an estimate from waist and hip circumferences.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// How a profile's body fat percentage was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFatMethod {
    Direct,
    Circumference,
}

impl BodyFatMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFatMethod::Direct => "direct",
            BodyFatMethod::Circumference => "circumference",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Some(BodyFatMethod::Direct),
            "circumference" => Some(BodyFatMethod::Circumference),
            _ => None,
        }
    }
}

/// Source of a profile's body fat percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BodyFatSource {
    /// Percentage entered by the user
    Direct { percent: f64 },
    /// Waist and hip circumferences, in any one consistent unit
    FromCircumference { waist: f64, hip: f64 },
}

impl BodyFatSource {
    /// Build the source from the three optional input fields.
    ///
    /// A percentage together with any circumference is rejected rather than
    /// picking one of them.
    pub fn from_inputs(
        body_fat: Option<f64>,
        waist: Option<f64>,
        hip: Option<f64>,
    ) -> ValidationResult<Self> {
        match (body_fat, waist, hip) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ValidationError::new(
                "provide either body fat percentage or waist and hip measurements, not both",
            )),
            (Some(percent), None, None) => Ok(BodyFatSource::Direct { percent }),
            (None, Some(waist), Some(hip)) => Ok(BodyFatSource::FromCircumference { waist, hip }),
            _ => Err(ValidationError::new(
                "body fat percentage or waist/hip measurements required",
            )),
        }
    }

    pub fn method(&self) -> BodyFatMethod {
        match self {
            BodyFatSource::Direct { .. } => BodyFatMethod::Direct,
            BodyFatSource::FromCircumference { .. } => BodyFatMethod::Circumference,
        }
    }

    /// Resolve to a body fat percentage
    pub fn resolve(&self) -> ValidationResult<f64> {
        match *self {
            BodyFatSource::Direct { percent } => {
                if percent.is_finite() && (0.0..=100.0).contains(&percent) {
                    Ok(percent)
                } else {
                    Err(ValidationError::new(
                        "body fat percentage must be between 0 and 100",
                    ))
                }
            }
            BodyFatSource::FromCircumference { waist, hip } => {
                circumference_ratio_body_fat(waist, hip)
            }
        }
    }
}

/// Estimate body fat from waist and hip circumferences.
///
/// `(waist - hip) / waist * 100`. This is a rough waist/hip proxy, not the
/// Navy or Deurenberg method. It is unclamped: a hip larger than the waist
/// gives a negative percentage.
pub fn circumference_ratio_body_fat(waist: f64, hip: f64) -> ValidationResult<f64> {
    if !waist.is_finite() || waist <= 0.0 {
        return Err(ValidationError::new("waist measurement must be a positive number"));
    }
    if !hip.is_finite() || hip <= 0.0 {
        return Err(ValidationError::new("hip measurement must be a positive number"));
    }
    Ok((waist - hip) / waist * 100.0)
}
