//! Named plan-input persistence.
//!
//! Stores the *inputs* of a plan (target time plus configuration) under a
//! user-chosen name, never computed results; a saved plan is recomputed on
//! load. Backed by SQLite with the parameters serialized as a JSON text
//! column.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{PacingError, Result};
use crate::PlanConfig;

/// A named set of plan inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlan {
    pub name: String,
    pub target_time: String,
    pub config: PlanConfig,
}

/// SQLite-backed store for saved plan inputs.
pub struct PlanStore {
    db: Connection,
}

impl PlanStore {
    /// Open (or create) a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Connection::open(path).map_err(store_error)?;
        Self::init_schema(&db).map_err(store_error)?;
        Ok(Self { db })
    }

    /// Open an in-memory store, useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().map_err(store_error)?;
        Self::init_schema(&db).map_err(store_error)?;
        Ok(Self { db })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS saved_plans (
                name        TEXT PRIMARY KEY,
                target_time TEXT NOT NULL,
                config      TEXT NOT NULL,
                saved_at    INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    /// Save a plan under its name, replacing any previous version.
    pub fn save(&self, plan: &SavedPlan) -> Result<()> {
        let config = serde_json::to_string(&plan.config).map_err(|e| PacingError::Store {
            message: format!("failed to encode config: {}", e),
        })?;
        self.db
            .execute(
                "INSERT INTO saved_plans (name, target_time, config)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                     target_time = excluded.target_time,
                     config = excluded.config,
                     saved_at = strftime('%s', 'now')",
                params![plan.name, plan.target_time, config],
            )
            .map_err(store_error)?;
        Ok(())
    }

    /// Load a saved plan by name.
    pub fn load(&self, name: &str) -> Result<Option<SavedPlan>> {
        let row = self
            .db
            .query_row(
                "SELECT target_time, config FROM saved_plans WHERE name = ?1",
                params![name],
                |row| {
                    let target_time: String = row.get(0)?;
                    let config: String = row.get(1)?;
                    Ok((target_time, config))
                },
            )
            .optional()
            .map_err(store_error)?;

        match row {
            Some((target_time, config)) => {
                let config: PlanConfig =
                    serde_json::from_str(&config).map_err(|e| PacingError::Store {
                        message: format!("corrupt config for '{}': {}", name, e),
                    })?;
                Ok(Some(SavedPlan {
                    name: name.to_string(),
                    target_time,
                    config,
                }))
            }
            None => Ok(None),
        }
    }

    /// Names of all saved plans, alphabetically.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .db
            .prepare("SELECT name FROM saved_plans ORDER BY name")
            .map_err(store_error)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(store_error)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(store_error)?;
        Ok(names)
    }

    /// Delete a saved plan; returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM saved_plans WHERE name = ?1", params![name])
            .map_err(store_error)?;
        Ok(affected > 0)
    }
}

fn store_error(e: rusqlite::Error) -> PacingError {
    PacingError::Store {
        message: e.to_string(),
    }
}
