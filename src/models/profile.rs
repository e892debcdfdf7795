//! Profile model
//!
//! One fitness profile per user. Stores canonical measurements and the body
//! fat/BMR/TDEE values produced by the write pipeline.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::estimation::{ActivityLevel, BodyFatMethod, Gender};
use crate::measurement::{HeightUnit, RawNumber, WeightUnit};
use crate::pipeline::{ProfileFields, ProfileInput};

/// A stored fitness profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub gender: Gender,
    pub age: u32,
    pub activity_level: ActivityLevel,
    pub weight_kg: f64,
    pub weight_unit: WeightUnit,
    pub height_cm: f64,
    pub height_unit: HeightUnit,
    pub body_fat: f64,
    pub body_fat_method: BodyFatMethod,
    pub waist_measurement: Option<f64>,
    pub hip_measurement: Option<f64>,
    pub bmr: f64,
    pub tdee: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender_str: String = row.get("gender")?;
        let gender = Gender::from_str(&gender_str).ok_or_else(|| invalid_text("gender", &gender_str))?;

        let activity_str: String = row.get("activity_level")?;
        let activity_level = ActivityLevel::from_str(&activity_str)
            .ok_or_else(|| invalid_text("activity_level", &activity_str))?;

        let method_str: String = row.get("body_fat_method")?;
        let body_fat_method = BodyFatMethod::from_str(&method_str)
            .ok_or_else(|| invalid_text("body_fat_method", &method_str))?;

        let weight_unit_str: String = row.get("weight_unit")?;
        let weight_unit = WeightUnit::from_str(&weight_unit_str)
            .ok_or_else(|| invalid_text("weight_unit", &weight_unit_str))?;

        let height_unit_str: String = row.get("height_unit")?;
        let height_unit = HeightUnit::from_str(&height_unit_str)
            .ok_or_else(|| invalid_text("height_unit", &height_unit_str))?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            gender,
            age: row.get("age")?,
            activity_level,
            weight_kg: row.get("weight")?,
            weight_unit,
            height_cm: row.get("height")?,
            height_unit,
            body_fat: row.get("body_fat")?,
            body_fat_method,
            waist_measurement: row.get("waist_measurement")?,
            hip_measurement: row.get("hip_measurement")?,
            bmr: row.get("bmr")?,
            tdee: row.get("tdee")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile belonging to a user
    pub fn get_by_user(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all profiles, ordered by user
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles ORDER BY user_id")?;
        let profiles = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    /// Count stored profiles
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert or replace a user's profile in one statement.
    ///
    /// `fields` must come from the write pipeline; this never computes
    /// anything itself.
    pub fn upsert(conn: &Connection, user_id: i64, fields: &ProfileFields) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (
                user_id, gender, age, activity_level,
                weight, weight_unit, height, height_unit,
                body_fat, body_fat_method, waist_measurement, hip_measurement,
                bmr, tdee
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(user_id) DO UPDATE SET
                gender = excluded.gender,
                age = excluded.age,
                activity_level = excluded.activity_level,
                weight = excluded.weight,
                weight_unit = excluded.weight_unit,
                height = excluded.height,
                height_unit = excluded.height_unit,
                body_fat = excluded.body_fat,
                body_fat_method = excluded.body_fat_method,
                waist_measurement = excluded.waist_measurement,
                hip_measurement = excluded.hip_measurement,
                bmr = excluded.bmr,
                tdee = excluded.tdee,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                fields.gender.as_str(),
                fields.age,
                fields.activity_level.as_str(),
                fields.weight_kg,
                fields.weight_unit.as_str(),
                fields.height_cm,
                fields.height_unit.as_str(),
                fields.body_fat,
                fields.body_fat_method.as_str(),
                fields.waist_measurement,
                fields.hip_measurement,
                fields.bmr,
                fields.tdee,
            ],
        )?;

        Self::get_by_user(conn, user_id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Delete a user's profile
    pub fn delete_by_user(conn: &Connection, user_id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM profiles WHERE user_id = ?1", [user_id])?;
        Ok(rows > 0)
    }

    /// Rebuild pipeline input from the stored canonical values.
    ///
    /// The body fat source is reconstructed from the stored method, so a
    /// circumference-based profile is re-estimated rather than frozen.
    pub fn to_input(&self) -> ProfileInput {
        let (body_fat, waist_measurement, hip_measurement) = match self.body_fat_method {
            BodyFatMethod::Direct => (Some(self.body_fat), None, None),
            BodyFatMethod::Circumference => (None, self.waist_measurement, self.hip_measurement),
        };

        ProfileInput {
            gender: self.gender,
            age: i64::from(self.age),
            activity_level: self.activity_level,
            weight: RawNumber::Number(self.weight_kg),
            weight_unit: WeightUnit::CANONICAL,
            height: Some(RawNumber::Number(self.height_cm)),
            height_unit: HeightUnit::CANONICAL,
            height_feet: None,
            height_inches: None,
            body_fat,
            waist_measurement,
            hip_measurement,
        }
    }

    /// Format height/weight for display
    pub fn format_measurements(&self) -> String {
        format!(
            "{:.1} {} / {:.1} {}",
            self.weight_kg,
            self.weight_unit.as_str(),
            self.height_cm,
            self.height_unit.as_str()
        )
    }
}

fn invalid_text(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(
        0,
        format!("{} = '{}'", column, value),
        rusqlite::types::Type::Text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::pipeline::process_profile_write;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn input() -> ProfileInput {
        ProfileInput {
            gender: Gender::Female,
            age: 35,
            activity_level: ActivityLevel::LightlyActive,
            weight: RawNumber::Text("140 lb".to_string()),
            weight_unit: WeightUnit::Lb,
            height: None,
            height_unit: HeightUnit::Ft,
            height_feet: Some(5.0),
            height_inches: Some(5.0),
            body_fat: None,
            waist_measurement: Some(76.0),
            hip_measurement: Some(98.0),
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = setup();
        let fields = process_profile_write(&input()).unwrap();
        let profile = Profile::upsert(&conn, 7, &fields).unwrap();

        assert_eq!(profile.user_id, 7);
        assert_eq!(profile.weight_unit, WeightUnit::Kg);
        assert_eq!(profile.height_unit, HeightUnit::Cm);
        assert_eq!(profile.body_fat_method, BodyFatMethod::Circumference);
        assert_eq!(profile.tdee, fields.tdee);

        let fetched = Profile::get_by_user(&conn, 7).unwrap().unwrap();
        assert_eq!(fetched, profile);
        assert!(Profile::get_by_user(&conn, 8).unwrap().is_none());
    }

    #[test]
    fn test_upsert_keeps_one_row_per_user() {
        let conn = setup();
        let first = Profile::upsert(&conn, 1, &process_profile_write(&input()).unwrap()).unwrap();

        let mut second_input = input();
        second_input.age = 36;
        let second = Profile::upsert(&conn, 1, &process_profile_write(&second_input).unwrap()).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.age, 36);
        assert_eq!(Profile::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_to_input_round_trips_fields() {
        let conn = setup();
        let fields = process_profile_write(&input()).unwrap();
        let profile = Profile::upsert(&conn, 3, &fields).unwrap();

        let recomputed = process_profile_write(&profile.to_input()).unwrap();
        assert!((recomputed.weight_kg - fields.weight_kg).abs() < 1e-9);
        assert!((recomputed.height_cm - fields.height_cm).abs() < 1e-9);
        assert!((recomputed.tdee - fields.tdee).abs() < 1e-9);
        assert_eq!(recomputed.body_fat_method, BodyFatMethod::Circumference);
        assert_eq!(recomputed.waist_measurement, Some(76.0));
    }

    #[test]
    fn test_delete_and_list() {
        let conn = setup();
        let fields = process_profile_write(&input()).unwrap();
        Profile::upsert(&conn, 2, &fields).unwrap();
        Profile::upsert(&conn, 1, &fields).unwrap();

        let users: Vec<i64> = Profile::list(&conn).unwrap().iter().map(|p| p.user_id).collect();
        assert_eq!(users, vec![1, 2]);

        assert!(Profile::delete_by_user(&conn, 2).unwrap());
        assert!(!Profile::delete_by_user(&conn, 2).unwrap());
        assert_eq!(Profile::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_from_row_rejects_unknown_units() {
        let conn = setup();
        Profile::upsert(&conn, 5, &process_profile_write(&input()).unwrap()).unwrap();

        let select = |weight_unit: &str, height_unit: &str| {
            let sql = format!(
                "SELECT id, user_id, gender, age, activity_level, weight, '{}' AS weight_unit,
                        height, '{}' AS height_unit, body_fat, body_fat_method,
                        waist_measurement, hip_measurement, bmr, tdee, created_at, updated_at
                 FROM profiles WHERE user_id = 5",
                weight_unit, height_unit
            );
            conn.query_row(&sql, [], Profile::from_row)
        };

        assert!(select("kg", "cm").is_ok());
        assert!(matches!(select("stone", "cm"), Err(rusqlite::Error::InvalidColumnType(..))));
        assert!(matches!(select("kg", "cubit"), Err(rusqlite::Error::InvalidColumnType(..))));
    }
}
