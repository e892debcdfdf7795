//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: profiles
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PROFILES
        -- One row per user; measurements stored in canonical units only
        -- ============================================
        CREATE TABLE profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,

            gender TEXT NOT NULL CHECK(gender IN ('M', 'F', 'O')),
            age INTEGER NOT NULL CHECK(age > 0),
            activity_level TEXT NOT NULL CHECK(activity_level IN (
                'sedentary', 'lightly_active', 'moderately_active', 'very_active', 'extra_active'
            )),

            weight REAL NOT NULL CHECK(weight > 0),
            weight_unit TEXT NOT NULL DEFAULT 'kg' CHECK(weight_unit = 'kg'),
            height REAL NOT NULL CHECK(height > 0),
            height_unit TEXT NOT NULL DEFAULT 'cm' CHECK(height_unit = 'cm'),

            -- Body fat: user-entered or estimated from waist/hip, never both
            body_fat REAL NOT NULL,
            body_fat_method TEXT NOT NULL CHECK(body_fat_method IN ('direct', 'circumference')),
            waist_measurement REAL,
            hip_measurement REAL,

            -- Derived on every write
            bmr REAL NOT NULL,
            tdee REAL NOT NULL,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            CHECK ((body_fat_method = 'direct' AND waist_measurement IS NULL AND hip_measurement IS NULL) OR
                   (body_fat_method = 'circumference' AND waist_measurement IS NOT NULL AND hip_measurement IS NOT NULL))
        );

        CREATE UNIQUE INDEX idx_profiles_user ON profiles(user_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_profiles_reject_non_canonical_units() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO profiles (user_id, gender, age, activity_level, weight, weight_unit, height,
                                   height_unit, body_fat, body_fat_method, bmr, tdee)
             VALUES (1, 'M', 30, 'sedentary', 154, 'lb', 175, 'cm', 15, 'direct', 1, 1)",
            [],
        );
        assert!(result.is_err());
    }
}
