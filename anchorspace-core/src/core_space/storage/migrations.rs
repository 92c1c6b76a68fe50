//! Database migrations for the space store
//!
//! Versioned migrations applied atomically and tracked in the
//! space_schema_version table.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current schema version for the space store
pub const CURRENT_SPACE_SCHEMA_VERSION: i32 = 1;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial user-space mapping schema",
        up_sql: r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS space_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            );

            -- One space record per (owner identity, space type)
            CREATE TABLE IF NOT EXISTS user_spaces (
                owner_aid TEXT NOT NULL,                -- Aid
                space_id TEXT NOT NULL UNIQUE,          -- network-derived SpaceId
                space_type TEXT NOT NULL CHECK(space_type IN ('personal', 'community')),
                created_at INTEGER NOT NULL,
                PRIMARY KEY (owner_aid, space_type)
            );

            CREATE INDEX IF NOT EXISTS idx_user_spaces_type ON user_spaces(space_type);
        "#,
    }]
}

/// Get current schema version from the database
fn get_current_version(pool: &Pool<SqliteConnectionManager>) -> Result<i32, rusqlite::Error> {
    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to get connection: {}", e),
        )))
    })?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS space_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Result<i32, _> = conn.query_row(
        "SELECT version FROM space_schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> Result<(), rusqlite::Error> {
    let current_version = get_current_version(pool)?;

    let migrations = get_migrations();
    debug_assert_eq!(
        migrations.last().map(|m| m.version),
        Some(CURRENT_SPACE_SCHEMA_VERSION),
        "migration list out of step with the declared schema version"
    );

    let pending: Vec<_> = migrations
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to get connection: {}", e),
        )))
    })?;

    for migration in pending {
        let tx = conn.unchecked_transaction()?;

        tx.execute_batch(migration.up_sql)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        tx.execute(
            "INSERT INTO space_schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, now],
        )?;

        tx.commit()?;

        tracing::info!(
            version = migration.version,
            description = migration.description,
            "applied space store migration"
        );
    }

    Ok(())
}
