//! Profile MCP Tools
//!
//! Create, update, read and recompute fitness profiles. Every write runs the
//! normalize → estimate pipeline before anything reaches the database.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::error::ValidationError;
use crate::models::Profile;
use crate::pipeline::{process_profile_write, ProfileFields, ProfileInput, ProfileUpdate};

/// Errors from profile tool operations
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Shown to the caller as the bare validation reason
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("No profile found for user {0}")]
    NotFound(i64),
}

/// Full profile detail
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub id: i64,
    pub user_id: i64,
    pub gender: String,
    pub gender_display: String,
    pub age: u32,
    pub activity_level: String,
    pub activity_level_display: String,
    pub weight: f64,
    pub weight_unit: String,
    pub height: f64,
    pub height_unit: String,
    pub measurements: String,
    pub body_fat: f64,
    pub body_fat_method: String,
    pub waist_measurement: Option<f64>,
    pub hip_measurement: Option<f64>,
    pub bmr: f64,
    pub tdee: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileError {
    /// Whether the caller can fix the request and retry
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProfileError::Validation(_) | ProfileError::NotFound(_))
    }
}

impl From<Profile> for ProfileDetail {
    fn from(profile: Profile) -> Self {
        let measurements = profile.format_measurements();
        Self {
            id: profile.id,
            user_id: profile.user_id,
            gender: profile.gender.as_str().to_string(),
            gender_display: profile.gender.display_name().to_string(),
            age: profile.age,
            activity_level: profile.activity_level.as_str().to_string(),
            activity_level_display: profile.activity_level.display_name().to_string(),
            weight: profile.weight_kg,
            weight_unit: profile.weight_unit.as_str().to_string(),
            height: profile.height_cm,
            height_unit: profile.height_unit.as_str().to_string(),
            measurements,
            body_fat: profile.body_fat,
            body_fat_method: profile.body_fat_method.as_str().to_string(),
            waist_measurement: profile.waist_measurement,
            hip_measurement: profile.hip_measurement,
            bmr: profile.bmr,
            tdee: profile.tdee,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Response for set_profile / update_profile
#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub success: bool,
    pub created: bool,
    pub profile: ProfileDetail,
}

/// Response for preview_profile
#[derive(Debug, Serialize)]
pub struct PreviewProfileResponse {
    pub fields: ProfileFields,
    pub persisted: bool,
}

/// Response for delete_profile
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub user_id: i64,
}

/// Per-profile result of a recalculation pass
#[derive(Debug, Serialize)]
pub struct RecalculatedProfile {
    pub user_id: i64,
    pub old_tdee: f64,
    pub new_tdee: Option<f64>,
    pub error: Option<String>,
}

/// Response for recalculate_profiles
#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub profiles: Vec<RecalculatedProfile>,
}

// ============================================================================
// Tool Functions
// ============================================================================

/// Create or replace a user's profile
pub fn set_profile(
    db: &Database,
    user_id: i64,
    input: &ProfileInput,
) -> Result<SaveProfileResponse, ProfileError> {
    let fields = process_profile_write(input).map_err(|e| {
        tracing::warn!(user_id, reason = e.reason(), "Rejected profile write");
        e
    })?;

    let (created, profile) = db.with_immediate_transaction(|tx| -> Result<_, ProfileError> {
        let created = Profile::get_by_user(tx, user_id)?.is_none();
        let profile = Profile::upsert(tx, user_id, &fields)?;
        Ok((created, profile))
    })?;

    tracing::info!(user_id, created, tdee = profile.tdee, "Saved profile");

    Ok(SaveProfileResponse {
        success: true,
        created,
        profile: profile.into(),
    })
}

/// Apply a partial update to an existing profile and recompute derived fields
pub fn update_profile(
    db: &Database,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<SaveProfileResponse, ProfileError> {
    let profile = db
        .with_immediate_transaction(|tx| -> Result<_, ProfileError> {
            let existing = Profile::get_by_user(tx, user_id)?.ok_or(ProfileError::NotFound(user_id))?;
            let input = existing.to_input().apply_update(update)?;
            let fields = process_profile_write(&input)?;
            Ok(Profile::upsert(tx, user_id, &fields)?)
        })
        .map_err(|e| {
            if let ProfileError::Validation(ref v) = e {
                tracing::warn!(user_id, reason = v.reason(), "Rejected profile update");
            }
            e
        })?;

    tracing::info!(user_id, tdee = profile.tdee, "Updated profile");

    Ok(SaveProfileResponse {
        success: true,
        created: false,
        profile: profile.into(),
    })
}

/// Get a user's profile
pub fn get_profile(db: &Database, user_id: i64) -> Result<Option<ProfileDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_by_user(&conn, user_id)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    Ok(profile.map(ProfileDetail::from))
}

/// Run the pipeline without saving anything
pub fn preview_profile(input: &ProfileInput) -> Result<PreviewProfileResponse, ProfileError> {
    let fields = process_profile_write(input)?;
    Ok(PreviewProfileResponse {
        fields,
        persisted: false,
    })
}

/// Delete a user's profile
pub fn delete_profile(db: &Database, user_id: i64) -> Result<DeleteResponse, ProfileError> {
    let deleted = db.with_conn(|conn| Profile::delete_by_user(conn, user_id))?;

    if !deleted {
        return Err(ProfileError::NotFound(user_id));
    }

    tracing::info!(user_id, "Deleted profile");
    Ok(DeleteResponse {
        success: true,
        user_id,
    })
}

/// Re-run the pipeline over every stored profile.
///
/// Each profile is read again and recomputed in its own transaction; a profile
/// that no longer validates is reported and left as it was, and one deleted
/// since the listing is skipped.
pub fn recalculate_all(db: &Database) -> Result<RecalculateResponse, String> {
    let profiles = db
        .with_conn(|conn| Profile::list(conn))
        .map_err(|e| format!("Failed to list profiles: {}", e))?;

    let mut results = Vec::with_capacity(profiles.len());
    for listed in &profiles {
        let user_id = listed.user_id;
        let entry = match recalculate_profile(db, user_id) {
            Ok(Some((old_tdee, updated))) => RecalculatedProfile {
                user_id,
                old_tdee,
                new_tdee: Some(updated.tdee),
                error: None,
            },
            Ok(None) => {
                tracing::info!(user_id, "Profile deleted before recalculation, skipping");
                RecalculatedProfile {
                    user_id,
                    old_tdee: listed.tdee,
                    new_tdee: None,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Profile recalculation failed");
                RecalculatedProfile {
                    user_id,
                    old_tdee: listed.tdee,
                    new_tdee: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(entry);
    }

    let updated = results.iter().filter(|r| r.new_tdee.is_some()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    Ok(RecalculateResponse {
        total: results.len(),
        updated,
        failed,
        skipped: results.len() - updated - failed,
        profiles: results,
    })
}

/// Recompute one user's profile from the row stored now.
///
/// Returns the previous TDEE with the saved profile, or `None` when the user
/// has no profile.
fn recalculate_profile(db: &Database, user_id: i64) -> Result<Option<(f64, Profile)>, ProfileError> {
    db.with_immediate_transaction(|tx| -> Result<_, ProfileError> {
        let Some(current) = Profile::get_by_user(tx, user_id)? else {
            return Ok(None);
        };
        let fields = process_profile_write(&current.to_input())?;
        let updated = Profile::upsert(tx, user_id, &fields)?;
        Ok(Some((current.tdee, updated)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::estimation::{ActivityLevel, Gender};
    use crate::measurement::{HeightUnit, RawNumber, WeightUnit};

    fn test_db(name: &str) -> Database {
        let db = Database::new(format!("file:{}?mode=memory&cache=shared", name)).unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    fn input() -> ProfileInput {
        ProfileInput {
            gender: Gender::Male,
            age: 30,
            activity_level: ActivityLevel::ModeratelyActive,
            weight: RawNumber::Number(70.0),
            weight_unit: WeightUnit::Kg,
            height: Some(RawNumber::Number(175.0)),
            height_unit: HeightUnit::Cm,
            height_feet: None,
            height_inches: None,
            body_fat: Some(15.0),
            waist_measurement: None,
            hip_measurement: None,
        }
    }

    #[test]
    fn test_set_profile_creates_then_replaces() {
        let db = test_db("tools_set_profile");

        let first = set_profile(&db, 1, &input()).unwrap();
        assert!(first.created);
        assert!((first.profile.tdee - 1648.75 * 1.55).abs() < 1e-9);

        let second = set_profile(&db, 1, &ProfileInput { age: 31, ..input() }).unwrap();
        assert!(!second.created);
        assert_eq!(second.profile.id, first.profile.id);
        assert_eq!(second.profile.age, 31);
    }

    #[test]
    fn test_set_profile_validation_error_is_unmodified() {
        let db = test_db("tools_set_profile_invalid");

        let bad = ProfileInput {
            weight: RawNumber::Text("abc".to_string()),
            ..input()
        };
        let err = set_profile(&db, 1, &bad).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "weight must be numeric");
        assert!(get_profile(&db, 1).unwrap().is_none());
    }

    #[test]
    fn test_update_profile_recomputes_tdee() {
        let db = test_db("tools_update_profile");
        set_profile(&db, 5, &input()).unwrap();

        let update = ProfileUpdate {
            activity_level: Some(ActivityLevel::Sedentary),
            ..Default::default()
        };
        let updated = update_profile(&db, 5, update).unwrap();
        assert_eq!(updated.profile.activity_level, "sedentary");
        assert!((updated.profile.tdee - 1648.75 * 1.2).abs() < 1e-9);
        assert_eq!(updated.profile.body_fat, 15.0);
    }

    #[test]
    fn test_failed_update_leaves_profile_untouched() {
        let db = test_db("tools_update_invalid");
        let original = set_profile(&db, 9, &input()).unwrap().profile;

        let update = ProfileUpdate {
            body_fat: Some(12.0),
            waist_measurement: Some(80.0),
            hip_measurement: Some(95.0),
            ..Default::default()
        };
        assert!(update_profile(&db, 9, update).is_err());

        let stored = get_profile(&db, 9).unwrap().unwrap();
        assert_eq!(stored.tdee, original.tdee);
        assert_eq!(stored.body_fat, original.body_fat);
        assert_eq!(stored.updated_at, original.updated_at);
    }

    #[test]
    fn test_update_missing_profile() {
        let db = test_db("tools_update_missing");
        let err = update_profile(&db, 42, ProfileUpdate::default()).unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(42)));
        assert_eq!(err.to_string(), "No profile found for user 42");
    }

    #[test]
    fn test_preview_does_not_persist() {
        let preview = preview_profile(&input()).unwrap();
        assert!(!preview.persisted);
        assert!((preview.fields.bmr - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_delete_profile() {
        let db = test_db("tools_delete_profile");
        set_profile(&db, 3, &input()).unwrap();
        assert!(delete_profile(&db, 3).unwrap().success);
        assert!(delete_profile(&db, 3).is_err());
    }

    #[test]
    fn test_recalculate_all() {
        let db = test_db("tools_recalculate_all");
        set_profile(&db, 1, &input()).unwrap();
        set_profile(&db, 2, &ProfileInput { gender: Gender::Other, ..input() }).unwrap();

        let result = recalculate_all(&db).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.updated, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        for entry in &result.profiles {
            let new_tdee = entry.new_tdee.unwrap();
            assert!((new_tdee - entry.old_tdee).abs() < 1e-9);
        }
    }

    #[test]
    fn test_recalculate_does_not_recreate_deleted_profile() {
        let db = test_db("tools_recalculate_deleted");
        set_profile(&db, 4, &input()).unwrap();

        let listed = db.with_conn(|conn| Profile::list(conn)).unwrap();
        assert_eq!(listed.len(), 1);
        delete_profile(&db, 4).unwrap();

        assert!(recalculate_profile(&db, 4).unwrap().is_none());
        assert!(get_profile(&db, 4).unwrap().is_none());
    }

    #[test]
    fn test_recalculate_uses_current_row() {
        let db = test_db("tools_recalculate_current");
        set_profile(&db, 6, &input()).unwrap();

        let listed = db.with_conn(|conn| Profile::list(conn)).unwrap();
        let update = ProfileUpdate {
            activity_level: Some(ActivityLevel::Sedentary),
            ..Default::default()
        };
        update_profile(&db, 6, update).unwrap();

        let (old_tdee, updated) = recalculate_profile(&db, listed[0].user_id).unwrap().unwrap();
        assert!((old_tdee - 1648.75 * 1.2).abs() < 1e-9);
        assert_eq!(updated.activity_level, ActivityLevel::Sedentary);
        assert!((updated.tdee - 1648.75 * 1.2).abs() < 1e-9);
    }
}
