//! Energy expenditure
//!
//! Mifflin-St Jeor basal metabolic rate scaled by an activity multiplier.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::measurement::Measurement;

/// Gender as recorded on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Some(Gender::Male),
            "f" | "female" => Some(Gender::Female),
            "o" | "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Constant term of the Mifflin-St Jeor equation.
    ///
    /// `Other` uses the female constant until a dedicated formula is agreed on.
    pub fn bmr_constant(&self) -> f64 {
        match self {
            Gender::Male => MALE_CONSTANT,
            Gender::Female | Gender::Other => FEMALE_CONSTANT,
        }
    }
}

/// Activity level used to scale BMR into TDEE
///
/// Serializes as snake_case; deserializes any spelling `from_str` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise or a physical job
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }

    /// Accepts "Lightly Active", "lightly_active", "LightlyActive" and friends
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "lightlyactive" | "light" => Some(ActivityLevel::LightlyActive),
            "moderatelyactive" | "moderate" => Some(ActivityLevel::ModeratelyActive),
            "veryactive" => Some(ActivityLevel::VeryActive),
            "extraactive" | "extra" => Some(ActivityLevel::ExtraActive),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

impl<'de> Deserialize<'de> for ActivityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ActivityLevel::from_str(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown activity level '{}', expected one of sedentary, lightly_active, moderately_active, very_active, extra_active",
                raw
            ))
        })
    }
}

// ============================================================================
// Mifflin-St Jeor Coefficients
// ============================================================================

pub const WEIGHT_COEF: f64 = 10.0;
pub const HEIGHT_COEF: f64 = 6.25;
pub const AGE_COEF: f64 = 5.0;
pub const MALE_CONSTANT: f64 = 5.0;
pub const FEMALE_CONSTANT: f64 = -161.0;

/// Basal metabolic rate in kcal/day (Mifflin-St Jeor, 1990)
///
/// BMR = 10 × weight_kg + 6.25 × height_cm − 5 × age + constant,
/// where the constant is +5 for men and −161 otherwise.
pub fn basal_metabolic_rate(
    measurement: &Measurement,
    gender: Gender,
    age: u32,
) -> ValidationResult<f64> {
    if age == 0 {
        return Err(ValidationError::new("age must be greater than 0"));
    }

    Ok(WEIGHT_COEF * measurement.weight_kg() + HEIGHT_COEF * measurement.height_cm()
        - AGE_COEF * f64::from(age)
        + gender.bmr_constant())
}

/// Total daily energy expenditure in kcal/day
pub fn total_daily_energy_expenditure(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(weight_kg: f64, height_cm: f64) -> Measurement {
        Measurement::canonical(weight_kg, height_cm).unwrap()
    }

    #[test]
    fn test_bmr_male() {
        let bmr = basal_metabolic_rate(&measurement(70.0, 175.0), Gender::Male, 30).unwrap();
        assert!((bmr - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_female() {
        let bmr = basal_metabolic_rate(&measurement(60.0, 165.0), Gender::Female, 25).unwrap();
        assert!((bmr - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_other_uses_female_constant() {
        let m = measurement(65.0, 170.0);
        let other = basal_metabolic_rate(&m, Gender::Other, 40).unwrap();
        let female = basal_metabolic_rate(&m, Gender::Female, 40).unwrap();
        assert_eq!(other, female);
    }

    #[test]
    fn test_bmr_rejects_zero_age() {
        assert!(basal_metabolic_rate(&measurement(70.0, 175.0), Gender::Male, 0).is_err());
    }

    #[test]
    fn test_multipliers() {
        let expected = [1.2, 1.375, 1.55, 1.725, 1.9];
        for (level, m) in ActivityLevel::ALL.iter().zip(expected) {
            assert_eq!(level.multiplier(), m);
            assert!((total_daily_energy_expenditure(1000.0, *level) - 1000.0 * m).abs() < 1e-9);
        }
    }

    #[test]
    fn test_activity_level_spellings() {
        assert_eq!(ActivityLevel::from_str("Lightly Active"), Some(ActivityLevel::LightlyActive));
        assert_eq!(ActivityLevel::from_str("moderately_active"), Some(ActivityLevel::ModeratelyActive));
        assert_eq!(ActivityLevel::from_str("VeryActive"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_str("extra-active"), Some(ActivityLevel::ExtraActive));
        assert_eq!(ActivityLevel::from_str("couch"), None);
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_str(level.as_str()), Some(level));
            assert_eq!(ActivityLevel::from_str(level.display_name()), Some(level));
        }
    }

    #[test]
    fn test_activity_level_serde_spellings() {
        for raw in ["\"ModeratelyActive\"", "\"Moderately Active\"", "\"moderately_active\""] {
            let level: ActivityLevel = serde_json::from_str(raw).unwrap();
            assert_eq!(level, ActivityLevel::ModeratelyActive);
        }
        assert!(serde_json::from_str::<ActivityLevel>("\"couch\"").is_err());
        let json = serde_json::to_string(&ActivityLevel::LightlyActive).unwrap();
        assert_eq!(json, "\"lightly_active\"");
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_str("M"), Some(Gender::Male));
        assert_eq!(Gender::from_str("female"), Some(Gender::Female));
        assert_eq!(Gender::from_str("o"), Some(Gender::Other));
        assert_eq!(Gender::from_str("x"), None);
        let json = serde_json::to_string(&Gender::Other).unwrap();
        assert_eq!(json, "\"O\"");
    }
}
