//! Cars Service Library
//!
//! Persistence layer for the car listings board: users, sale posts and
//! their price history, stored in PostgreSQL through SeaORM.

pub mod config;
pub mod infra;
pub mod repository;

use tracing::info;

use crate::config::CarsServiceConfig;
use crate::infra::Database;
use crate::repository::Persistence;

/// Connect, apply pending migrations and build the repositories.
pub async fn connect(
    config: &CarsServiceConfig,
) -> Result<Persistence, Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    Ok(Persistence::new(db.get_connection()))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = CarsServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Check that the database answers.
pub async fn check_database() -> Result<(), Box<dyn std::error::Error>> {
    let config = CarsServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;
    db.ping().await?;
    info!("Database is reachable");
    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
