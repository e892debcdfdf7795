//! Profile write pipeline
//!
//! Raw profile input → normalized measurement → estimate → enriched record.
//! Run by the caller before every create and update; nothing here touches
//! storage.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::estimation::{estimate, ActivityLevel, BodyFatMethod, BodyFatSource, Gender};
use crate::measurement::{normalize, HeightUnit, RawNumber, WeightUnit};

/// Raw profile input as supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub gender: Gender,
    /// Years; signed so a negative value is reported as a validation error
    pub age: i64,
    pub activity_level: ActivityLevel,
    pub weight: RawNumber,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub height: Option<RawNumber>,
    #[serde(default)]
    pub height_unit: HeightUnit,
    #[serde(default)]
    pub height_feet: Option<f64>,
    #[serde(default)]
    pub height_inches: Option<f64>,
    #[serde(default)]
    pub body_fat: Option<f64>,
    #[serde(default)]
    pub waist_measurement: Option<f64>,
    #[serde(default)]
    pub hip_measurement: Option<f64>,
}

/// Partial update of a stored profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub gender: Option<Gender>,
    pub age: Option<i64>,
    pub activity_level: Option<ActivityLevel>,
    pub weight: Option<RawNumber>,
    pub weight_unit: Option<WeightUnit>,
    pub height: Option<RawNumber>,
    pub height_unit: Option<HeightUnit>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
    pub body_fat: Option<f64>,
    pub waist_measurement: Option<f64>,
    pub hip_measurement: Option<f64>,
}

impl ProfileUpdate {
    fn touches_height(&self) -> bool {
        self.height.is_some()
            || self.height_unit.is_some()
            || self.height_feet.is_some()
            || self.height_inches.is_some()
    }

    fn touches_body_fat(&self) -> bool {
        self.body_fat.is_some() || self.waist_measurement.is_some() || self.hip_measurement.is_some()
    }
}

impl ProfileInput {
    /// Merge a partial update onto this input.
    ///
    /// Height fields are replaced as a group, as are the body fat fields, so
    /// stale feet/inches or a stale body fat source never mix with new values.
    pub fn apply_update(mut self, update: ProfileUpdate) -> ValidationResult<Self> {
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }

        match (update.weight.clone(), update.weight_unit) {
            (Some(weight), unit) => {
                self.weight = weight;
                self.weight_unit = unit.unwrap_or_default();
            }
            (None, Some(_)) => {
                return Err(ValidationError::new("weight_unit can only be changed together with weight"));
            }
            (None, None) => {}
        }

        if update.touches_height() {
            let composite = update.height_feet.is_some() || update.height_inches.is_some();
            self.height_unit = update.height_unit.unwrap_or(if composite {
                HeightUnit::Ft
            } else {
                HeightUnit::Cm
            });
            self.height = update.height.clone();
            self.height_feet = update.height_feet;
            self.height_inches = update.height_inches;
        }

        if update.touches_body_fat() {
            self.body_fat = update.body_fat;
            self.waist_measurement = update.waist_measurement;
            self.hip_measurement = update.hip_measurement;
        }

        Ok(self)
    }
}

/// Canonical, enriched profile fields ready to persist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileFields {
    pub gender: Gender,
    pub age: u32,
    pub activity_level: ActivityLevel,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub weight_unit: WeightUnit,
    pub height_unit: HeightUnit,
    pub body_fat: f64,
    pub body_fat_method: BodyFatMethod,
    pub waist_measurement: Option<f64>,
    pub hip_measurement: Option<f64>,
    pub bmr: f64,
    pub tdee: f64,
}

/// Run the full normalize → estimate pipeline for a profile write.
///
/// Any validation failure aborts the whole write; no partial record is
/// produced.
pub fn process_profile_write(input: &ProfileInput) -> ValidationResult<ProfileFields> {
    let age = validate_age(input.age)?;

    let body_fat_source = BodyFatSource::from_inputs(
        input.body_fat,
        input.waist_measurement,
        input.hip_measurement,
    )?;

    let measurement = normalize(
        &input.weight,
        input.weight_unit,
        input.height.as_ref(),
        input.height_unit,
        input.height_feet,
        input.height_inches,
    )?;

    let est = estimate(
        &measurement,
        input.gender,
        age,
        input.activity_level,
        &body_fat_source,
    )?;

    let (waist_measurement, hip_measurement) = match body_fat_source {
        BodyFatSource::FromCircumference { waist, hip } => (Some(waist), Some(hip)),
        BodyFatSource::Direct { .. } => (None, None),
    };

    Ok(ProfileFields {
        gender: input.gender,
        age,
        activity_level: input.activity_level,
        weight_kg: measurement.weight_kg(),
        height_cm: measurement.height_cm(),
        weight_unit: measurement.weight_unit(),
        height_unit: measurement.height_unit(),
        body_fat: est.body_fat,
        body_fat_method: est.body_fat_method,
        waist_measurement,
        hip_measurement,
        bmr: est.bmr,
        tdee: est.tdee,
    })
}

fn validate_age(age: i64) -> ValidationResult<u32> {
    if age <= 0 {
        return Err(ValidationError::new("age must be greater than 0"));
    }
    u32::try_from(age).map_err(|_| ValidationError::new("age is out of range"))
}
