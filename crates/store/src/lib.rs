//! SQLite persistence for sidekick.
//!
//! One database file, four tables:
//! - `profile` — key/value user attributes, last write wins
//! - `interactions` — one row per completed pipeline turn
//! - `memory` — promoted (key, value) pairs with a valid/invalid status
//! - `feedback` — scored explicit feedback, one row per command
//! - `todo` — the task list the `add_todo`/`list_todos` tools use
//!
//! All operations are single statements against a shared connection pool,
//! so the pipeline, observer, and scheduler can hold the store
//! concurrently without cross-statement coordination. `insert_interaction`
//! returns the new row id from the same statement execution, which is the
//! atomic pairing the feedback loop relies on.

use chrono::Utc;
use sidekick_core::error::StoreError;
use sidekick_core::memory::{MemoryEntry, MemoryStatus, normalize_key};
use sidekick_core::turn::Interaction;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// The shared persistence handle.
///
/// Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// This is the one store failure that is fatal to the process: nothing
    /// can function without persistence, so callers should propagate it.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Open(format!("create {}: {e}", parent.display())))?;
            }
        }
        let url = format!("sqlite://{}", path.display());
        Self::open_url(&url).await
    }

    /// In-process ephemeral database, used by tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open_url("sqlite::memory:").await
    }

    async fn open_url(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Open(format!("invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("Store ready at {url}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS profile (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS interactions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                user_input    TEXT NOT NULL,
                response_text TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS memory (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                status     TEXT NOT NULL DEFAULT 'valid',
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                interaction_id INTEGER NOT NULL REFERENCES interactions(id),
                kind           TEXT NOT NULL,
                score          INTEGER NOT NULL,
                created_at     TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS todo (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                task       TEXT NOT NULL,
                status     TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_memory_key ON memory(key, id DESC)",
            "CREATE INDEX IF NOT EXISTS idx_memory_created ON memory(created_at DESC)",
        ];
        for sql in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Migration(e.to_string()))?;
        }
        debug!("Store migrations complete");
        Ok(())
    }

    // ── Profile ──────────────────────────────────────────────────────────

    /// Set a profile attribute. Last write wins.
    pub async fn upsert_profile(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profile (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("profile upsert: {e}")))?;
        debug!("Profile updated: {key}");
        Ok(())
    }

    /// Read one profile attribute.
    pub async fn profile(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM profile WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("profile read: {e}")))?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// All profile attributes.
    pub async fn profile_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let rows = sqlx::query("SELECT key, value FROM profile")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("profile scan: {e}")))?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("key"), r.get::<String, _>("value")))
            .collect())
    }

    /// Remove a profile attribute. Returns whether a row existed.
    pub async fn remove_profile_key(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM profile WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(format!("profile delete: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ── Interactions ─────────────────────────────────────────────────────

    /// Persist one completed turn and return its row id.
    pub async fn insert_interaction(
        &self,
        user_input: &str,
        response_text: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO interactions (user_input, response_text, created_at)
             VALUES (?1, ?2, ?3)",
        )
        .bind(user_input)
        .bind(response_text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("interaction insert: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    /// The most recent interaction, if any.
    pub async fn last_interaction(&self) -> Result<Option<Interaction>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_input, response_text, created_at
             FROM interactions ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("last interaction: {e}")))?;
        Ok(row.map(|r| Interaction {
            id: r.get("id"),
            user_input: r.get("user_input"),
            response_text: r.get("response_text"),
            created_at: parse_timestamp(&r.get::<String, _>("created_at")),
        }))
    }

    // ── Long-term memory ─────────────────────────────────────────────────

    /// Promote a (query, response) pair. The key is normalized here, so
    /// callers pass raw user input. Always appends a new `valid` row.
    pub async fn promote(&self, raw_key: &str, value: &str) -> Result<(), StoreError> {
        let key = normalize_key(raw_key);
        sqlx::query(
            "INSERT INTO memory (key, value, status, created_at)
             VALUES (?1, ?2, 'valid', ?3)",
        )
        .bind(&key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("memory promote: {e}")))?;
        debug!("Promoted memory for key '{key}'");
        Ok(())
    }

    /// Invalidate the newest `valid` row for the normalized form of
    /// `raw_key`. Returns false when no such row exists — never an error.
    pub async fn invalidate(&self, raw_key: &str) -> Result<bool, StoreError> {
        let key = normalize_key(raw_key);
        let result = sqlx::query(
            "UPDATE memory SET status = 'invalid'
             WHERE id = (
                 SELECT id FROM memory
                 WHERE key = ?1 AND status = 'valid'
                 ORDER BY id DESC LIMIT 1
             )",
        )
        .bind(&key)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("memory invalidate: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Look up the newest `valid` value for the normalized form of
    /// `raw_key`. Invalid rows are never returned.
    pub async fn recall(&self, raw_key: &str) -> Result<Option<String>, StoreError> {
        let key = normalize_key(raw_key);
        let row = sqlx::query(
            "SELECT value FROM memory
             WHERE key = ?1 AND status = 'valid'
             ORDER BY id DESC LIMIT 1",
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("memory recall: {e}")))?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// The last `n` valid entries, newest first. This is the bounded
    /// recency query the context assembler uses — not similarity search.
    pub async fn recent_valid(&self, n: usize) -> Result<Vec<MemoryEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT key, value, status, created_at FROM memory
             WHERE status = 'valid'
             ORDER BY id DESC LIMIT ?1",
        )
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("recent memories: {e}")))?;
        Ok(rows
            .into_iter()
            .map(|r| MemoryEntry {
                key: r.get("key"),
                value: r.get("value"),
                status: MemoryStatus::Valid,
                created_at: parse_timestamp(&r.get::<String, _>("created_at")),
            })
            .collect())
    }

    // ── Feedback ─────────────────────────────────────────────────────────

    /// Record one scored explicit-feedback command.
    pub async fn record_feedback(
        &self,
        interaction_id: i64,
        kind: &str,
        score: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO feedback (interaction_id, kind, score, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(interaction_id)
        .bind(kind)
        .bind(score)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("feedback insert: {e}")))?;
        Ok(())
    }

    // ── Todo list ────────────────────────────────────────────────────────

    /// Append a pending task; returns its id.
    pub async fn add_task(&self, task: &str) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO todo (task, status, created_at) VALUES (?1, 'pending', ?2)",
        )
        .bind(task)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(format!("todo insert: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    /// All pending tasks, oldest first.
    pub async fn pending_tasks(&self) -> Result<Vec<(i64, String)>, StoreError> {
        let rows = sqlx::query("SELECT id, task FROM todo WHERE status = 'pending' ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("todo scan: {e}")))?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<i64, _>("id"), r.get::<String, _>("task")))
            .collect())
    }
}

fn parse_timestamp(text: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        Store::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn profile_last_write_wins() {
        let s = store().await;
        s.upsert_profile("tone", "formal").await.unwrap();
        s.upsert_profile("tone", "casual").await.unwrap();
        assert_eq!(s.profile("tone").await.unwrap().as_deref(), Some("casual"));
        assert_eq!(s.profile_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_key_removal() {
        let s = store().await;
        s.upsert_profile("user_name", "Ada").await.unwrap();
        assert!(s.remove_profile_key("user_name").await.unwrap());
        assert!(!s.remove_profile_key("user_name").await.unwrap());
        assert!(s.profile("user_name").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn interaction_ids_are_monotonic() {
        let s = store().await;
        let a = s.insert_interaction("first", "one").await.unwrap();
        let b = s.insert_interaction("second", "two").await.unwrap();
        assert!(b > a);

        let last = s.last_interaction().await.unwrap().unwrap();
        assert_eq!(last.id, b);
        assert_eq!(last.user_input, "second");
    }

    #[tokio::test]
    async fn last_interaction_on_empty_store() {
        let s = store().await;
        assert!(s.last_interaction().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn promote_then_recall_round_trip() {
        let s = store().await;
        s.promote("What is Rust?", "A systems language.").await.unwrap();

        // Differently punctuated lookup hits the same key
        assert_eq!(
            s.recall("what is rust").await.unwrap().as_deref(),
            Some("A systems language.")
        );

        assert!(s.invalidate("What is Rust?!").await.unwrap());
        assert!(s.recall("what is rust").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalidate_without_entries_returns_false() {
        let s = store().await;
        assert!(!s.invalidate("never asked").await.unwrap());
    }

    #[tokio::test]
    async fn recall_prefers_newest_valid_row() {
        let s = store().await;
        s.promote("favorite color", "blue").await.unwrap();
        s.promote("favorite color", "green").await.unwrap();
        assert_eq!(
            s.recall("favorite color").await.unwrap().as_deref(),
            Some("green")
        );

        // Invalidating peels back to the older promotion
        assert!(s.invalidate("favorite color").await.unwrap());
        assert_eq!(
            s.recall("favorite color").await.unwrap().as_deref(),
            Some("blue")
        );
    }

    #[tokio::test]
    async fn keyed_invalidation_leaves_other_keys_alone() {
        let s = store().await;
        s.promote("capital of france", "Paris").await.unwrap();
        s.promote("tallest mountain", "Everest").await.unwrap();

        // Rejecting the france answer must not touch the newer everest row
        assert!(s.invalidate("capital of france").await.unwrap());
        assert_eq!(
            s.recall("tallest mountain").await.unwrap().as_deref(),
            Some("Everest")
        );
        assert!(s.recall("capital of france").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recent_valid_is_newest_first_and_skips_invalid() {
        let s = store().await;
        s.promote("q1", "a1").await.unwrap();
        s.promote("q2", "a2").await.unwrap();
        s.promote("q3", "a3").await.unwrap();
        s.invalidate("q2").await.unwrap();

        let recent = s.recent_valid(5).await.unwrap();
        let values: Vec<&str> = recent.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["a3", "a1"]);
    }

    #[tokio::test]
    async fn feedback_rows_reference_interactions() {
        let s = store().await;
        let id = s.insert_interaction("q", "a").await.unwrap();
        s.record_feedback(id, "approve", 1).await.unwrap();
        s.record_feedback(id, "save", 2).await.unwrap();
    }

    #[tokio::test]
    async fn todo_round_trip() {
        let s = store().await;
        s.add_task("water the plants").await.unwrap();
        s.add_task("file taxes").await.unwrap();
        let tasks = s.pending_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].1, "water the plants");
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agent.db");
        let s = Store::open(&path).await.unwrap();
        s.upsert_profile("k", "v").await.unwrap();
        assert!(path.exists());
    }
}
