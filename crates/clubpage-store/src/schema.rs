//! Schema definitions and migration utilities.
//!
//! The SQL lives in the workspace `migrations/` directory and is copied into
//! `OUT_DIR` by the build script, then embedded here.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the core schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str =
    include_str!(concat!(env!("OUT_DIR"), "/migrations/001_schema.sql"));

/// Tables every deployment must have.
const REQUIRED_TABLES: &[&str] = &["users", "links", "series", "events", "notices", "documents"];

/// Run all pending migrations against the database.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    tracing::debug!("Running schema migration (001_schema.sql)...");
    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if every required table exists.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let tables: Vec<String> = REQUIRED_TABLES.iter().map(|t| (*t).to_string()).collect();

    let result: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)::bigint
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_name = ANY($1)
        "#,
    )
    .bind(&tables)
    .fetch_one(pool)
    .await?;

    Ok(result.0 == REQUIRED_TABLES.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migration_embedded() {
        for table in REQUIRED_TABLES {
            assert!(
                SCHEMA_MIGRATION.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_position_constraints_are_deferred() {
        assert!(SCHEMA_MIGRATION.contains("links_user_order_unique"));
        assert!(SCHEMA_MIGRATION.contains("notices_event_sequence_unique"));
        assert!(SCHEMA_MIGRATION.contains("documents_event_order_unique"));
        assert!(SCHEMA_MIGRATION.contains("documents_series_order_unique"));
        assert_eq!(
            SCHEMA_MIGRATION.matches("DEFERRABLE INITIALLY DEFERRED").count(),
            4
        );
    }
}
