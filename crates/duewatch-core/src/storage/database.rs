//! SQLite-based task storage.
//!
//! Provides persistent storage for:
//! - Tasks with deadlines
//! - Key-value store for application state (persisted monitor flags)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::DatabaseError;
use crate::task::{Task, TaskStatus};

use super::data_dir;

/// SQLite database for task storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/duewatch/duewatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("duewatch.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path (used by tests).
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id          TEXT PRIMARY KEY,
                    title       TEXT NOT NULL,
                    description TEXT,
                    deadline    TEXT NOT NULL,
                    status      TEXT NOT NULL DEFAULT 'Pending',
                    assigned_to TEXT,
                    priority    INTEGER,
                    created_at  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline);
                CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Insert a new task.
    ///
    /// # Errors
    /// Returns an error if the insert fails (duplicate id included).
    pub fn insert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, description, deadline, status, assigned_to, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.title,
                task.description,
                task.deadline,
                task.status.to_string(),
                task.assigned_to,
                task.priority,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update an existing task. `updated_at` should already be refreshed by
    /// the caller.
    pub fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET title = ?2, description = ?3, deadline = ?4, status = ?5,
                 assigned_to = ?6, priority = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.deadline,
                task.status.to_string(),
                task.assigned_to,
                task.priority,
                task.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::TaskNotFound(task.id.clone()));
        }
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, deadline, status, assigned_to, priority, created_at, updated_at
             FROM tasks WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_task)?;
        match rows.next() {
            Some(task) => Ok(Some(task?)),
            None => Ok(None),
        }
    }

    /// All tasks, soonest deadline first.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, deadline, status, assigned_to, priority, created_at, updated_at
             FROM tasks ORDER BY deadline ASC",
        )?;
        let rows = stmt.query_map([], row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Delete a task and its persisted monitor state. Returns whether a
    /// task row existed.
    pub fn delete_task(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        self.kv_delete(&format!("monitor:{id}"))?;
        Ok(changed > 0)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(value) => Ok(Some(value?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_str: String = row.get(4)?;
    let status: TaskStatus = status_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        deadline: row.get(3)?,
        status,
        assigned_to: row.get(5)?,
        priority: row.get(6)?,
        created_at: parse_ts(row, 7)?,
        updated_at: parse_ts(row, 8)?,
    })
}

fn parse_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(title: &str) -> Task {
        let mut task = Task::new(title, "2026-09-01T12:00:00Z");
        task.priority = Some(2);
        task
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let db = Database::open_memory().unwrap();
        let task = sample_task("Ship release");
        db.insert_task(&task).unwrap();

        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Ship release");
        assert_eq!(loaded.status, TaskStatus::Pending);
        assert_eq!(loaded.priority, Some(2));
        assert_eq!(loaded.deadline, "2026-09-01T12:00:00Z");
    }

    #[test]
    fn list_orders_by_deadline() {
        let db = Database::open_memory().unwrap();
        let later = Task::new("later", "2026-10-01T00:00:00Z");
        let sooner = Task::new("sooner", "2026-09-01T00:00:00Z");
        db.insert_task(&later).unwrap();
        db.insert_task(&sooner).unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "sooner");
    }

    #[test]
    fn update_changes_fields() {
        let db = Database::open_memory().unwrap();
        let mut task = sample_task("Draft");
        db.insert_task(&task).unwrap();

        task.status = TaskStatus::InProgress;
        task.deadline = "2026-12-01T00:00:00Z".to_string();
        task.updated_at = Utc::now();
        db.update_task(&task).unwrap();

        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::InProgress);
        assert_eq!(loaded.deadline, "2026-12-01T00:00:00Z");
    }

    #[test]
    fn update_missing_task_errors() {
        let db = Database::open_memory().unwrap();
        let task = sample_task("Ghost");
        assert!(matches!(
            db.update_task(&task),
            Err(DatabaseError::TaskNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_task_and_monitor_state() {
        let db = Database::open_memory().unwrap();
        let task = sample_task("Temp");
        db.insert_task(&task).unwrap();
        db.kv_set(&format!("monitor:{}", task.id), "{}").unwrap();

        assert!(db.delete_task(&task.id).unwrap());
        assert!(db.get_task(&task.id).unwrap().is_none());
        assert!(db.kv_get(&format!("monitor:{}", task.id)).unwrap().is_none());
        assert!(!db.delete_task(&task.id).unwrap());
    }

    #[test]
    fn kv_set_overwrites() {
        let db = Database::open_memory().unwrap();
        db.kv_set("k", "v1").unwrap();
        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
        db.kv_delete("k").unwrap();
        assert!(db.kv_get("k").unwrap().is_none());
    }

    #[test]
    fn open_at_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duewatch.db");
        let task = sample_task("Persisted");
        {
            let db = Database::open_at(&path).unwrap();
            db.insert_task(&task).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert!(db.get_task(&task.id).unwrap().is_some());
    }
}
