//! Body composition and energy estimation
//!
//! Resolves body fat and computes BMR/TDEE from a canonical [`Measurement`].

pub mod body_fat;
pub mod energy;

use serde::Serialize;

pub use body_fat::{circumference_ratio_body_fat, BodyFatMethod, BodyFatSource};
pub use energy::{
    basal_metabolic_rate, total_daily_energy_expenditure, ActivityLevel, Gender,
};

use crate::error::ValidationResult;
use crate::measurement::Measurement;

/// Derived values for a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub body_fat: f64,
    pub body_fat_method: BodyFatMethod,
    pub bmr: f64,
    pub tdee: f64,
}

/// Resolve body fat and estimate energy expenditure.
///
/// Taking a [`Measurement`] rather than bare numbers means the weight and
/// height are already in kilograms and centimeters.
pub fn estimate(
    measurement: &Measurement,
    gender: Gender,
    age: u32,
    activity_level: ActivityLevel,
    body_fat_source: &BodyFatSource,
) -> ValidationResult<Estimate> {
    let body_fat = body_fat_source.resolve()?;
    let bmr = basal_metabolic_rate(measurement, gender, age)?;
    let tdee = total_daily_energy_expenditure(bmr, activity_level);

    tracing::debug!(
        gender = gender.as_str(),
        age,
        activity_level = activity_level.as_str(),
        body_fat_method = body_fat_source.method().as_str(),
        body_fat,
        bmr,
        tdee,
        "estimated energy expenditure"
    );

    Ok(Estimate {
        body_fat,
        body_fat_method: body_fat_source.method(),
        bmr,
        tdee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(weight_kg: f64, height_cm: f64) -> Measurement {
        Measurement::canonical(weight_kg, height_cm).unwrap()
    }

    #[test]
    fn test_estimate_moderately_active_male() {
        let est = estimate(
            &measurement(70.0, 175.0),
            Gender::Male,
            30,
            ActivityLevel::ModeratelyActive,
            &BodyFatSource::Direct { percent: 15.0 },
        )
        .unwrap();

        let expected = (10.0 * 70.0 + 6.25 * 175.0 - 5.0 * 30.0 + 5.0) * 1.55;
        assert!((est.tdee - expected).abs() < 1e-9);
        assert!((est.tdee - 2555.5625).abs() < 1e-6);
        assert_eq!(est.body_fat, 15.0);
        assert_eq!(est.body_fat_method, BodyFatMethod::Direct);
    }

    #[test]
    fn test_estimate_sedentary_male() {
        let est = estimate(
            &measurement(70.0, 170.0),
            Gender::Male,
            25,
            ActivityLevel::Sedentary,
            &BodyFatSource::Direct { percent: 15.0 },
        )
        .unwrap();

        let expected = (700.0 + 1062.5 - 125.0 + 5.0) * 1.2;
        assert!((est.tdee - expected).abs() < 1e-9);
        assert!((est.bmr - 1642.5).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_from_circumference() {
        let est = estimate(
            &measurement(70.0, 175.0),
            Gender::Male,
            30,
            ActivityLevel::ModeratelyActive,
            &BodyFatSource::FromCircumference { waist: 80.0, hip: 100.0 },
        )
        .unwrap();

        assert!((est.body_fat - (-25.0)).abs() < 1e-9);
        assert_eq!(est.body_fat_method, BodyFatMethod::Circumference);
    }

    #[test]
    fn test_estimate_rejects_out_of_range_body_fat() {
        let result = estimate(
            &measurement(70.0, 175.0),
            Gender::Female,
            30,
            ActivityLevel::Sedentary,
            &BodyFatSource::Direct { percent: 120.0 },
        );
        assert!(result.is_err());
    }
}
