//! SQL-based storage implementation for the identity-to-space mapping

use super::super::space::Space;
use super::super::store::{SpaceStore, StoreError, StoreResult};
use super::super::types::{SpaceId, SpaceType, Timestamp};
use crate::core_identity::Aid;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;

/// SQL-backed space store
pub struct SpaceSqlStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SpaceSqlStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: Pool<SqliteConnectionManager>) -> StoreResult<Self> {
        super::migrations::migrate(&pool)
            .map_err(|e| StoreError::Storage(format!("migration failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open (or create) a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::new(manager)
            .map_err(|e| StoreError::Storage(format!("failed to create pool: {}", e)))?;
        Self::new(pool)
    }

    /// Create a new in-memory store (for testing and tooling)
    pub fn memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1) // a :memory: database exists per connection
            .build(manager)
            .map_err(|e| StoreError::Storage(format!("failed to create pool: {}", e)))?;
        Self::new(pool)
    }

    fn conn(&self) -> StoreResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| StoreError::Storage(format!("failed to get connection: {}", e)))
    }

    fn row_to_space(row: &Row<'_>) -> rusqlite::Result<Space> {
        let type_str: String = row.get(2)?;
        let space_type = SpaceType::from_str(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown space type {:?}", type_str).into(),
            )
        })?;

        Ok(Space {
            owner_aid: Aid::new(row.get::<_, String>(0)?),
            space_id: SpaceId::new(row.get::<_, String>(1)?),
            space_type,
            created_at: Timestamp::from_millis(row.get::<_, i64>(3)?.max(0) as u64),
        })
    }
}

impl SpaceStore for SpaceSqlStore {
    fn get_user_space(&self, owner_aid: &Aid, space_type: SpaceType) -> StoreResult<Space> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT owner_aid, space_id, space_type, created_at
             FROM user_spaces WHERE owner_aid = ? AND space_type = ?",
            params![owner_aid.as_str(), space_type.as_str()],
            Self::row_to_space,
        )
        .optional()
        .map_err(|e| StoreError::Storage(e.to_string()))?
        .ok_or_else(|| {
            StoreError::NotFound(format!("{} ({})", owner_aid, space_type.as_str()))
        })
    }

    fn save_space(&self, space: &Space) -> StoreResult<()> {
        let conn = self.conn()?;

        // Single-statement upsert keyed by (owner, type): either the whole
        // record lands or nothing does.
        conn.execute(
            "INSERT INTO user_spaces (owner_aid, space_id, space_type, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(owner_aid, space_type) DO UPDATE SET
                 space_id = excluded.space_id,
                 created_at = excluded.created_at",
            params![
                space.owner_aid.as_str(),
                space.space_id.as_str(),
                space.space_type.as_str(),
                space.created_at.as_millis() as i64,
            ],
        )
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    fn list_all_spaces(&self) -> StoreResult<Vec<Space>> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT owner_aid, space_id, space_type, created_at FROM user_spaces")
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let spaces = stmt
            .query_map([], Self::row_to_space)
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(spaces)
    }
}
