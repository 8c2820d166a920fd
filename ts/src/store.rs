//! Core TaskStore implementation

use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, Serializer};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::schema;

/// Row id of a task or subtask
pub type TaskId = i64;

/// A stored task with its subtasks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(skip)]
    pub session_id: String,
    pub title: String,
    /// Serialized as 0/1, the shape browser clients compare against
    #[serde(serialize_with = "as_flag")]
    pub completed: bool,
    pub priority: u8,
    pub category: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS.mmm`
    pub created_at: String,
    pub subtasks: Vec<SubtaskRecord>,
}

/// A stored subtask
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(serialize_with = "as_flag")]
    pub completed: bool,
}

/// Fields for a task about to be inserted
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub priority: u8,
    pub category: String,
    /// Subtask titles, inserted in order
    pub subtasks: Vec<String>,
}

impl NewTask {
    /// A task with default priority and category and no subtasks
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: crate::DEFAULT_PRIORITY,
            category: crate::DEFAULT_CATEGORY.to_string(),
            subtasks: Vec::new(),
        }
    }
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// SQLite-backed store shared across request handlers
#[derive(Clone)]
pub struct TaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl TaskStore {
    /// Open or create the store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create store directory")?;
        }

        let conn = Connection::open(path).context(format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch(schema::PRAGMAS)?;
        conn.execute_batch(schema::TABLES).context("Failed to create tables")?;

        info!(path = %path.display(), "Opened task store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(schema::TABLES)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| eyre!("Task store lock poisoned"))
    }

    /// All tasks of a session, open ones first, oldest first, with subtasks
    pub fn list_tasks(&self, session_id: &str) -> Result<Vec<TaskRecord>> {
        debug!(%session_id, "list_tasks: called");
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, session_id, title, completed, priority, category, created_at
             FROM tasks WHERE session_id = ?1
             ORDER BY completed ASC, created_at ASC, id ASC",
        )?;
        let mut tasks = stmt
            .query_map(params![session_id], |row| {
                Ok(TaskRecord {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    title: row.get(2)?,
                    completed: row.get::<_, i64>(3)? != 0,
                    priority: row.get(4)?,
                    category: row.get(5)?,
                    created_at: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    subtasks: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut sub_stmt = conn.prepare("SELECT id, title, completed FROM subtasks WHERE task_id = ?1 ORDER BY id")?;
        for task in &mut tasks {
            task.subtasks = sub_stmt
                .query_map(params![task.id], |row| {
                    Ok(SubtaskRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        completed: row.get::<_, i64>(2)? != 0,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }

        debug!(count = tasks.len(), "list_tasks: loaded");
        Ok(tasks)
    }

    /// Number of tasks a session owns
    pub fn count_tasks(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Insert a task and its subtasks in one transaction
    ///
    /// Subtask titles are trimmed; blank ones are skipped.
    pub fn create_task(&self, session_id: &str, task: &NewTask) -> Result<TaskId> {
        debug!(%session_id, title = %task.title, subtask_count = task.subtasks.len(), "create_task: called");
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO tasks (session_id, title, priority, category, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, task.title, task.priority, task.category, timestamp()],
        )?;
        let task_id = tx.last_insert_rowid();

        for title in task.subtasks.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            tx.execute(
                "INSERT INTO subtasks (task_id, title) VALUES (?1, ?2)",
                params![task_id, title],
            )?;
        }

        tx.commit().context("Failed to commit task")?;
        info!(task_id, "Created task");
        Ok(task_id)
    }

    /// Add one subtask to a task the session owns
    ///
    /// Returns `None` when the task does not exist in this session.
    pub fn create_subtask(&self, session_id: &str, task_id: TaskId, title: &str) -> Result<Option<TaskId>> {
        debug!(%session_id, task_id, "create_subtask: called");
        let conn = self.conn()?;

        let owned = conn
            .query_row(
                "SELECT 1 FROM tasks WHERE id = ?1 AND session_id = ?2",
                params![task_id, session_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !owned {
            debug!(task_id, "create_subtask: task not found in session");
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO subtasks (task_id, title) VALUES (?1, ?2)",
            params![task_id, title],
        )?;
        Ok(Some(conn.last_insert_rowid()))
    }

    pub fn update_task_status(&self, session_id: &str, task_id: TaskId, completed: bool) -> Result<bool> {
        self.update_task_column(session_id, task_id, "completed", &i64::from(completed))
    }

    pub fn update_task_title(&self, session_id: &str, task_id: TaskId, title: &str) -> Result<bool> {
        self.update_task_column(session_id, task_id, "title", &title)
    }

    pub fn update_task_priority(&self, session_id: &str, task_id: TaskId, priority: u8) -> Result<bool> {
        self.update_task_column(session_id, task_id, "priority", &priority)
    }

    pub fn update_task_category(&self, session_id: &str, task_id: TaskId, category: &str) -> Result<bool> {
        self.update_task_column(session_id, task_id, "category", &category)
    }

    /// Returns whether a row was touched
    fn update_task_column(
        &self,
        session_id: &str,
        task_id: TaskId,
        column: &'static str,
        value: &dyn rusqlite::ToSql,
    ) -> Result<bool> {
        debug!(%session_id, task_id, column, "update_task_column: called");
        let conn = self.conn()?;
        let sql = format!("UPDATE tasks SET {} = ?1 WHERE id = ?2 AND session_id = ?3", column);
        let changed = conn.execute(&sql, params![value, task_id, session_id])?;
        Ok(changed > 0)
    }

    /// Delete a task; its subtasks go with it
    pub fn delete_task(&self, session_id: &str, task_id: TaskId) -> Result<bool> {
        debug!(%session_id, task_id, "delete_task: called");
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND session_id = ?2",
            params![task_id, session_id],
        )?;
        if changed > 0 {
            info!(task_id, "Deleted task");
        }
        Ok(changed > 0)
    }

    pub fn update_subtask_status(&self, session_id: &str, subtask_id: TaskId, completed: bool) -> Result<bool> {
        self.update_subtask_column(session_id, subtask_id, "completed", &i64::from(completed))
    }

    pub fn update_subtask_title(&self, session_id: &str, subtask_id: TaskId, title: &str) -> Result<bool> {
        self.update_subtask_column(session_id, subtask_id, "title", &title)
    }

    fn update_subtask_column(
        &self,
        session_id: &str,
        subtask_id: TaskId,
        column: &'static str,
        value: &dyn rusqlite::ToSql,
    ) -> Result<bool> {
        debug!(%session_id, subtask_id, column, "update_subtask_column: called");
        let conn = self.conn()?;
        let sql = format!(
            "UPDATE subtasks SET {} = ?1 WHERE id = ?2
             AND task_id IN (SELECT id FROM tasks WHERE session_id = ?3)",
            column
        );
        let changed = conn.execute(&sql, params![value, subtask_id, session_id])?;
        Ok(changed > 0)
    }

    pub fn delete_subtask(&self, session_id: &str, subtask_id: TaskId) -> Result<bool> {
        debug!(%session_id, subtask_id, "delete_subtask: called");
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM subtasks WHERE id = ?1
             AND task_id IN (SELECT id FROM tasks WHERE session_id = ?2)",
            params![subtask_id, session_id],
        )?;
        Ok(changed > 0)
    }
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALICE: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn task_with_subtasks(title: &str, subtasks: &[&str]) -> NewTask {
        NewTask {
            subtasks: subtasks.iter().map(|s| s.to_string()).collect(),
            ..NewTask::new(title)
        }
    }

    #[test]
    fn test_create_and_list() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store
            .create_task(ALICE, &task_with_subtasks("Final project", &["Outline", "  ", " Draft "]))
            .unwrap();

        let tasks = store.list_tasks(ALICE).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].priority, 2);
        assert_eq!(tasks[0].category, "Other");
        assert!(!tasks[0].completed);

        let titles: Vec<_> = tasks[0].subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Outline", "Draft"]);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.create_task(ALICE, &NewTask::new("Alice's task")).unwrap();

        assert!(store.list_tasks(BOB).unwrap().is_empty());
        assert_eq!(store.count_tasks(BOB).unwrap(), 0);

        assert!(!store.update_task_title(BOB, id, "hijacked").unwrap());
        assert!(!store.delete_task(BOB, id).unwrap());
        assert_eq!(store.create_subtask(BOB, id, "sneaky").unwrap(), None);

        let tasks = store.list_tasks(ALICE).unwrap();
        assert_eq!(tasks[0].title, "Alice's task");
        assert!(tasks[0].subtasks.is_empty());
    }

    #[test]
    fn test_completed_tasks_sort_last() {
        let store = TaskStore::open_in_memory().unwrap();
        let first = store.create_task(ALICE, &NewTask::new("first")).unwrap();
        let second = store.create_task(ALICE, &NewTask::new("second")).unwrap();

        store.update_task_status(ALICE, first, true).unwrap();

        let ids: Vec<_> = store.list_tasks(ALICE).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_update_fields() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.create_task(ALICE, &NewTask::new("draft")).unwrap();

        assert!(store.update_task_title(ALICE, id, "final").unwrap());
        assert!(store.update_task_priority(ALICE, id, 1).unwrap());
        assert!(store.update_task_category(ALICE, id, "Work").unwrap());

        let task = &store.list_tasks(ALICE).unwrap()[0];
        assert_eq!(task.title, "final");
        assert_eq!(task.priority, 1);
        assert_eq!(task.category, "Work");
    }

    #[test]
    fn test_subtask_lifecycle() {
        let store = TaskStore::open_in_memory().unwrap();
        let task_id = store.create_task(ALICE, &NewTask::new("parent")).unwrap();
        let sub_id = store.create_subtask(ALICE, task_id, "child").unwrap().unwrap();

        assert!(store.update_subtask_status(ALICE, sub_id, true).unwrap());
        assert!(store.update_subtask_title(ALICE, sub_id, "renamed").unwrap());
        assert!(!store.update_subtask_title(BOB, sub_id, "nope").unwrap());

        let sub = &store.list_tasks(ALICE).unwrap()[0].subtasks[0];
        assert_eq!(sub.title, "renamed");
        assert!(sub.completed);

        assert!(!store.delete_subtask(BOB, sub_id).unwrap());
        assert!(store.delete_subtask(ALICE, sub_id).unwrap());
        assert!(store.list_tasks(ALICE).unwrap()[0].subtasks.is_empty());
    }

    #[test]
    fn test_delete_task_cascades() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.create_task(ALICE, &task_with_subtasks("parent", &["a", "b"])).unwrap();
        assert!(store.delete_task(ALICE, id).unwrap());

        let conn = store.conn().unwrap();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM subtasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_serialized_shape() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.create_task(ALICE, &task_with_subtasks("t", &["s"])).unwrap();
        store.update_task_status(ALICE, id, true).unwrap();

        let json = serde_json::to_value(&store.list_tasks(ALICE).unwrap()[0]).unwrap();
        assert_eq!(json["completed"], 1);
        assert_eq!(json["subtasks"][0]["completed"], 0);
        assert!(json.get("session_id").is_none());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("tododata.db");

        {
            let store = TaskStore::open(&path).unwrap();
            store.create_task(ALICE, &NewTask::new("survives reopen")).unwrap();
        }

        let store = TaskStore::open(&path).unwrap();
        assert_eq!(store.list_tasks(ALICE).unwrap()[0].title, "survives reopen");
    }
}
