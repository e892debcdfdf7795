//! Measurement normalization module
//!
//! Handles weight/height units and conversion to canonical kilograms and centimeters.

pub mod normalizer;
pub mod units;

pub use normalizer::{normalize, normalize_height, normalize_weight, Measurement, RawNumber};
pub use units::{HeightUnit, WeightUnit, CM_PER_INCH, INCHES_PER_FOOT, KG_PER_LB};
