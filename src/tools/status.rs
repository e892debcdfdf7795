//! Status Tool
//!
//! Runtime status of the service and usage instructions for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::Profile;

/// Profile tool instructions for AI assistants
pub const PROFILE_INSTRUCTIONS: &str = r#"
# Fitness Profile Instructions

Each user has exactly one profile. Every save converts measurements to
kilograms and centimeters and recomputes BMR and TDEE.

## Creating or Replacing a Profile (`set_profile`)

Required: `user_id`, `gender` (M, F or O), `age`, `activity_level`, `weight`,
and a height.

- Weight: `weight` plus `weight_unit` of `kg` (default) or `lb`.
  Text such as "150 lb" is accepted if the marker matches `weight_unit`.
- Height in centimeters: `height` with `height_unit: "cm"` (default).
- Height in inches: `height` with `height_unit: "in"`.
- Height in feet and inches: `height_unit: "ft"` with BOTH `height_feet` and
  `height_inches`. Do not put "5'7\"" in `height`; it is rejected.

Body fat, exactly one of:
- `body_fat` (0-100), or
- `waist_measurement` AND `hip_measurement` (same unit for both).

Sending both, or neither, is an error.

## Activity Levels

| Value | Multiplier |
|-------|------------|
| sedentary | 1.2 |
| lightly_active | 1.375 |
| moderately_active | 1.55 |
| very_active | 1.725 |
| extra_active | 1.9 |

## Updating (`update_profile`)

Send only the fields that changed. Height fields are replaced together, as are
body fat fields. A new weight without `weight_unit` is taken as kilograms.

## Notes

- `preview_profile` computes the result without saving it.
- Waist/hip body fat is a rough ratio, (waist - hip) / waist × 100. It can be
  negative when the hip measurement exceeds the waist; report it as-is.
- Gender O uses the female BMR constant (-161).
- Validation errors are user-correctable: relay the message and ask the user
  to fix the input.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub profile_count: Option<i64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status; database figures are `None` if unavailable
    pub fn get_status(&self, db: &Database) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let db_figures = db.with_conn(|conn| {
            let version = migrations::get_schema_version(conn)?;
            let count = Profile::count(conn)?;
            Ok((version, count))
        });
        let (schema_version, profile_count) = match db_figures {
            Ok((version, count)) => (Some(version), Some(count)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read database status");
                (None, None)
            }
        };

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            profile_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: std::process::id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_database_figures() {
        let db = Database::new("file:status_tool?mode=memory&cache=shared").unwrap();
        db.with_conn(migrations::run_migrations).unwrap();

        let tracker = StatusTracker::new(PathBuf::from("status_tool"));
        let status = tracker.get_status(&db);
        assert_eq!(status.schema_version, Some(1));
        assert_eq!(status.profile_count, Some(0));
        assert_eq!(status.database_size_bytes, None);
    }
}
