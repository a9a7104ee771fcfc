//! SQLite-backed Store
//!
//! `TrainingStore` implementation over a local libsql database. The database
//! opens lazily on first use; the schema is created idempotently and an empty
//! database is seeded with the default dataset. Reads that hit unreadable
//! rows degrade to the seed data instead of failing, so callers always get a
//! renderable hierarchy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Builder, Connection, Database};
use tokio::sync::OnceCell;
use tracing::warn;

use crate::db::error::DatabaseError;
use crate::db::store::{rows_to_tree, tree_to_rows, NodeRow, TrainingStore};
use crate::models::{seed, TrainingNode, WorkoutLog};

/// Local SQLite store for the hierarchy and workout journal.
#[derive(Debug)]
pub struct SqliteStore {
    db_path: PathBuf,
    db: OnceCell<Arc<Database>>,
}

impl SqliteStore {
    /// Create a store for the database at `db_path`. The file is not opened
    /// until the first operation.
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            db: OnceCell::new(),
        }
    }

    async fn database(&self) -> Result<&Arc<Database>, DatabaseError> {
        self.db
            .get_or_try_init(|| async {
                let db = self.open_and_initialize().await?;
                Ok(Arc::new(db))
            })
            .await
    }

    /// Connection with a 5s busy timeout so concurrent operations wait on
    /// locks instead of failing with SQLITE_BUSY.
    async fn connect(&self) -> Result<Connection, DatabaseError> {
        let conn = self.database().await?.connect()?;
        execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Ok(conn)
    }

    async fn open_and_initialize(&self) -> Result<Database, DatabaseError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&self.db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(self.db_path.clone(), e))?;

        let conn = db.connect()?;
        execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;
        execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        execute_pragma(&conn, "PRAGMA foreign_keys = ON").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS training_nodes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                value REAL,
                level INTEGER NOT NULL,
                parent_id TEXT,
                children_json TEXT,
                description TEXT
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create training_nodes table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                node_id TEXT NOT NULL,
                node_name TEXT NOT NULL,
                date TEXT NOT NULL,
                value REAL NOT NULL,
                unit TEXT NOT NULL,
                notes TEXT
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create workout_logs table: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_training_nodes_parent ON training_nodes(parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create parent index: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workout_logs_date ON workout_logs(date)",
            (),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to create date index: {}", e)))?;

        seed_if_empty(&conn).await?;
        Ok(db)
    }

    async fn read_node_rows(&self) -> Result<Vec<NodeRow>, DatabaseError> {
        let conn = self.connect().await?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, color, value, level, parent_id, children_json, description
                 FROM training_nodes",
            )
            .await?;
        let mut rows = stmt.query(()).await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(NodeRow {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                value: row.get(3)?,
                level: row.get::<i64>(4)? as u32,
                parent_id: row.get(5)?,
                children_json: row.get(6)?,
                description: row.get(7)?,
            });
        }
        Ok(out)
    }
}

async fn write_tree(conn: &Connection, tree: &TrainingNode) -> Result<(), DatabaseError> {
    let rows = tree_to_rows(tree)?;
    conn.execute("DELETE FROM training_nodes", ())
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to clear training_nodes: {}", e))
        })?;
    for row in rows {
        insert_node_row(conn, &row).await?;
    }
    Ok(())
}

async fn insert_node_row(conn: &Connection, row: &NodeRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO training_nodes
         (id, name, color, value, level, parent_id, children_json, description)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            row.id.clone(),
            row.name.clone(),
            row.color.clone(),
            row.value,
            row.level as i64,
            row.parent_id.clone(),
            row.children_json.clone(),
            row.description.clone()
        ],
    )
    .await
    .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node row: {}", e)))?;
    Ok(())
}

async fn execute_pragma(conn: &Connection, pragma: &str) -> Result<(), DatabaseError> {
    // PRAGMA statements return rows, so query() is required over execute().
    let mut stmt = conn.prepare(pragma).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
    })?;
    let _ = stmt.query(()).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
    })?;
    Ok(())
}

async fn insert_log(conn: &Connection, log: &WorkoutLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO workout_logs
         (id, node_id, node_name, date, value, unit, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            log.id.clone(),
            log.node_id.clone(),
            log.node_name.clone(),
            log.logged_at.to_rfc3339(),
            log.value,
            log.unit.clone(),
            log.notes.clone()
        ],
    )
    .await
    .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert workout log: {}", e)))?;
    Ok(())
}

async fn seed_if_empty(conn: &Connection) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM training_nodes").await?;
    let mut rows = stmt.query(()).await?;
    let count: i64 = match rows.next().await? {
        Some(row) => row.get(0)?,
        None => 0,
    };
    if count > 0 {
        return Ok(());
    }

    let tree = seed::default_tree();
    for row in tree_to_rows(&tree)? {
        insert_node_row(conn, &row).await?;
    }
    for log in seed::default_logs() {
        insert_log(conn, &log).await?;
    }
    Ok(())
}

#[async_trait]
impl TrainingStore for SqliteStore {
    async fn load_tree(&self) -> Result<TrainingNode> {
        let rows = self
            .read_node_rows()
            .await
            .context("failed to read training nodes")?;
        match rows_to_tree(&rows) {
            Ok(tree) => Ok(tree),
            Err(e) => {
                warn!("Stored hierarchy unreadable, falling back to defaults: {e}");
                Ok(seed::default_tree())
            }
        }
    }

    async fn load_logs(&self) -> Result<Vec<WorkoutLog>> {
        let conn = self.connect().await.context("failed to open database")?;
        let mut stmt = conn
            .prepare(
                "SELECT id, node_id, node_name, date, value, unit, notes
                 FROM workout_logs ORDER BY date DESC",
            )
            .await
            .context("failed to prepare log query")?;
        let mut rows = stmt.query(()).await.context("failed to query logs")?;

        let mut logs = Vec::new();
        while let Some(row) = rows.next().await.context("failed to read log row")? {
            let id: String = row.get(0)?;
            let date_text: String = row.get(3)?;
            let logged_at = match DateTime::parse_from_rfc3339(&date_text) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    warn!("Skipping workout log '{id}' with unparsable date: {e}");
                    continue;
                }
            };
            logs.push(WorkoutLog {
                id,
                node_id: row.get(1)?,
                node_name: row.get(2)?,
                logged_at,
                value: row.get(4)?,
                unit: row.get(5)?,
                notes: row.get(6)?,
            });
        }
        Ok(logs)
    }

    async fn save_tree(&self, tree: &TrainingNode) -> Result<()> {
        let conn = self.connect().await.context("failed to open database")?;
        write_tree(&conn, tree)
            .await
            .context("failed to save hierarchy")?;
        Ok(())
    }

    async fn save_log(&self, log: &WorkoutLog) -> Result<()> {
        let conn = self.connect().await.context("failed to open database")?;
        insert_log(&conn, log)
            .await
            .context("failed to save workout log")?;
        Ok(())
    }

    async fn delete_log(&self, log_id: &str) -> Result<()> {
        let conn = self.connect().await.context("failed to open database")?;
        conn.execute("DELETE FROM workout_logs WHERE id = ?", [log_id])
            .await
            .context("failed to delete workout log")?;
        Ok(())
    }

    async fn adjust_node_value(&self, node_id: &str, delta: f64) -> Result<()> {
        let conn = self.connect().await.context("failed to open database")?;
        conn.execute(
            "UPDATE training_nodes
             SET value = MAX(0, COALESCE(value, 0) + ?)
             WHERE id = ?",
            params![delta, node_id],
        )
        .await
        .context("failed to adjust node value")?;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let conn = self.connect().await.context("failed to open database")?;
        conn.execute("DELETE FROM training_nodes", ())
            .await
            .context("failed to clear hierarchy")?;
        conn.execute("DELETE FROM workout_logs", ())
            .await
            .context("failed to clear logs")?;
        seed_if_empty(&conn)
            .await
            .context("failed to reseed defaults")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SqliteStore {
        SqliteStore::new(dir.path().join("training.db"))
    }

    #[tokio::test]
    async fn empty_database_seeds_the_default_dataset() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let tree = store.load_tree().await.unwrap();
        assert_eq!(tree, seed::default_tree());

        let logs = store.load_logs().await.unwrap();
        assert_eq!(logs.len(), seed::default_logs().len());
        // Newest first.
        assert!(logs.windows(2).all(|w| w[0].logged_at >= w[1].logged_at));
    }

    #[tokio::test]
    async fn saved_tree_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let edited = seed::default_tree().with_child_added("how-push");
        store.save_tree(&edited).await.unwrap();

        let loaded = store.load_tree().await.unwrap();
        assert_eq!(loaded, edited);
    }

    #[tokio::test]
    async fn logs_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let baseline = store.load_logs().await.unwrap().len();

        let log = WorkoutLog::new(
            "what-hspu",
            "HSPU",
            12.0,
            Some("note".to_string()),
            Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap(),
        );
        store.save_log(&log).await.unwrap();

        let logs = store.load_logs().await.unwrap();
        assert_eq!(logs.len(), baseline + 1);
        let stored = logs.iter().find(|l| l.id == log.id).unwrap();
        assert_eq!(stored, &log);

        store.delete_log(&log.id).await.unwrap();
        assert_eq!(store.load_logs().await.unwrap().len(), baseline);

        // Unknown ids succeed.
        store.delete_log("nope").await.unwrap();
    }

    #[tokio::test]
    async fn value_adjustments_floor_at_zero() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load_tree().await.unwrap();

        store.adjust_node_value("what-hspu", 5.0).await.unwrap();
        let tree = store.load_tree().await.unwrap();
        assert_eq!(tree.find("what-hspu").unwrap().value, Some(15.0));

        store.adjust_node_value("what-hspu", -100.0).await.unwrap();
        let tree = store.load_tree().await.unwrap();
        assert_eq!(tree.find("what-hspu").unwrap().value, Some(0.0));
    }

    #[tokio::test]
    async fn reset_restores_the_seed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let edited = seed::default_tree()
            .with_subtree_removed("why-strong")
            .unwrap();
        store.save_tree(&edited).await.unwrap();
        store.delete_log("log-23-1").await.unwrap();

        store.reset().await.unwrap();
        assert_eq!(store.load_tree().await.unwrap(), seed::default_tree());
        assert_eq!(
            store.load_logs().await.unwrap().len(),
            seed::default_logs().len()
        );
    }
}
