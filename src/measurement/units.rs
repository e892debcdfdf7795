//! Unit types and conversion constants
//!
//! Weight and height units accepted at the input boundary, plus the factors
//! used to bring them to kilograms and centimeters.

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Kilograms per pound (exact, international avoirdupois pound)
pub const KG_PER_LB: f64 = 0.45359237;
/// Centimeters per inch (exact)
pub const CM_PER_INCH: f64 = 2.54;
/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Weight unit of an incoming value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    /// Canonical unit every stored weight is expressed in
    pub const CANONICAL: WeightUnit = WeightUnit::Kg;

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Some(WeightUnit::Lb),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "Kilograms",
            WeightUnit::Lb => "Pounds",
        }
    }

    /// Factor to convert a value in this unit to kilograms
    pub fn kg_per_unit(&self) -> f64 {
        match self {
            WeightUnit::Kg => 1.0,
            WeightUnit::Lb => KG_PER_LB,
        }
    }
}

/// Height unit of an incoming value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    /// Feet plus inches, carried in separate fields
    Ft,
    /// Total inches in a single value
    In,
}

impl HeightUnit {
    /// Canonical unit every stored height is expressed in
    pub const CANONICAL: HeightUnit = HeightUnit::Cm;

    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Ft => "ft",
            HeightUnit::In => "in",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(HeightUnit::Cm)
            }
            "ft" | "foot" | "feet" => Some(HeightUnit::Ft),
            "in" | "inch" | "inches" => Some(HeightUnit::In),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "Centimeters",
            HeightUnit::Ft => "Feet and inches",
            HeightUnit::In => "Inches",
        }
    }
}

/// Split a trimmed value like "150 lb" or "175cm" into its numeric part and
/// its trailing alphabetic unit marker (lowercased, possibly empty).
///
/// Only a trailing run of ASCII letters counts as a marker, so "5'7\"" comes
/// back whole with an empty marker and fails numeric parsing downstream.
pub fn split_unit_suffix(value: &str) -> (&str, String) {
    let trimmed = value.trim();
    let split_at = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let number = trimmed[..split_at].trim();
    let suffix = trimmed[split_at..].to_lowercase();
    (number, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_unit_aliases() {
        assert_eq!(WeightUnit::from_str("kg"), Some(WeightUnit::Kg));
        assert_eq!(WeightUnit::from_str("Kilograms"), Some(WeightUnit::Kg));
        assert_eq!(WeightUnit::from_str("lbs"), Some(WeightUnit::Lb));
        assert_eq!(WeightUnit::from_str(" pound "), Some(WeightUnit::Lb));
        assert_eq!(WeightUnit::from_str("stone"), None);
    }

    #[test]
    fn test_height_unit_aliases() {
        assert_eq!(HeightUnit::from_str("cm"), Some(HeightUnit::Cm));
        assert_eq!(HeightUnit::from_str("feet"), Some(HeightUnit::Ft));
        assert_eq!(HeightUnit::from_str("inches"), Some(HeightUnit::In));
        assert_eq!(HeightUnit::from_str("m"), None);
    }

    #[test]
    fn test_kg_per_unit() {
        assert_eq!(WeightUnit::Kg.kg_per_unit(), 1.0);
        assert_eq!(WeightUnit::Lb.kg_per_unit(), KG_PER_LB);
    }

    #[test]
    fn test_split_unit_suffix() {
        assert_eq!(split_unit_suffix("150 lb"), ("150", "lb".to_string()));
        assert_eq!(split_unit_suffix("175cm"), ("175", "cm".to_string()));
        assert_eq!(split_unit_suffix(" 70.5 "), ("70.5", String::new()));
        assert_eq!(split_unit_suffix("82KG"), ("82", "kg".to_string()));
    }

    #[test]
    fn test_split_unit_suffix_compound_height() {
        let (number, suffix) = split_unit_suffix("5'7\"");
        assert_eq!(number, "5'7\"");
        assert!(suffix.is_empty());

        let (number, suffix) = split_unit_suffix("5ft 7in");
        assert_eq!(number, "5ft 7");
        assert_eq!(suffix, "in");
    }

    #[test]
    fn test_split_unit_suffix_all_letters() {
        let (number, suffix) = split_unit_suffix("nan");
        assert_eq!(number, "");
        assert_eq!(suffix, "nan");
    }
}
