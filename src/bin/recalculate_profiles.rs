//! Recompute body fat, BMR and TDEE for every stored profile
//! Usage: cargo run --bin recalculate_profiles

use fitprofile::{config, db, tools};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config::DEFAULT_LOG_DIRECTIVE.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_path = config::database_path();
    println!("Database: {}", db_path.display());

    let database = db::Database::new(&db_path)?;
    database.with_conn(db::migrations::run_migrations)?;

    let result = tools::profiles::recalculate_all(&database)?;
    println!("Found {} profiles", result.total);

    for entry in &result.profiles {
        match (entry.new_tdee, &entry.error) {
            (Some(new_tdee), _) => println!(
                "  User {}: {:.1} -> {:.1} kcal/day (difference {:.1})",
                entry.user_id,
                entry.old_tdee,
                new_tdee,
                new_tdee - entry.old_tdee
            ),
            (None, Some(error)) => println!("  User {}: FAILED - {}", entry.user_id, error),
            (None, None) => println!("  User {}: skipped", entry.user_id),
        }
    }

    println!(
        "Updated {}, failed {}, skipped {}",
        result.updated, result.failed, result.skipped
    );
    Ok(())
}
