use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use super::store::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed content store.
///
/// One table per category (`problems`, `keywords`, `metaphors`) with a
/// `UNIQUE(content)` constraint, plus `daily_inspirations` keyed by date.
/// `content` uses the default BINARY collation, so duplicate detection is
/// case-sensitive.
pub struct SqliteContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContentStore {
    /// Open (or create) the database file and run migrations.
    pub fn new(db_path: &Path) -> Result<Self, String> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create database directory: {}", e))?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| format!("Failed to open database {}: {}", db_path.display(), e))?;

        eprintln!("Store/SQLite: Opened {}", db_path.display());
        Self::with_connection(Arc::new(Mutex::new(conn)))
    }

    /// In-memory store, used by tests and by the binary when no
    /// database path can be resolved.
    pub fn new_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory()
            .map_err(|e| format!("Failed to open in-memory database: {}", e))?;
        Self::with_connection(Arc::new(Mutex::new(conn)))
    }

    /// Wrap an existing connection and run migrations on it.
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), String> {
        let conn = self.conn.lock()
            .map_err(|e| format!("Failed to acquire lock: {}", e))?;

        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| format!("Failed to enable foreign keys: {}", e))?;

        for category in Category::ALL {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT PRIMARY KEY,
                        content TEXT NOT NULL UNIQUE,
                        created_at TEXT NOT NULL
                    )",
                    category.table()
                ),
                [],
            ).map_err(|e| format!("Failed to create {} table: {}", category.table(), e))?;
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_inspirations (
                date TEXT PRIMARY KEY,
                problem_id TEXT NOT NULL,
                keyword_id TEXT NOT NULL,
                metaphor_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (problem_id) REFERENCES problems(id),
                FOREIGN KEY (keyword_id) REFERENCES keywords(id),
                FOREIGN KEY (metaphor_id) REFERENCES metaphors(id)
            )",
            [],
        ).map_err(|e| format!("Failed to create daily_inspirations table: {}", e))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire lock: {}", e)))
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn entry_from_row(row: &rusqlite::Row<'_>, category: Category) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        content: row.get(1)?,
        category,
        created_at: row.get(2)?,
    })
}

#[async_trait::async_trait]
impl ContentStore for SqliteContentStore {
    async fn list_entries(&self, category: Category) -> Result<Vec<Entry>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, content, created_at FROM {} ORDER BY created_at ASC, rowid ASC",
            category.table()
        )).map_err(|e| StoreError::Unavailable(format!("Failed to prepare list query: {}", e)))?;

        let entries = stmt.query_map([], |row| entry_from_row(row, category))
            .map_err(|e| StoreError::Unavailable(format!("Failed to query {}: {}", category.table(), e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Unavailable(format!("Failed to collect {}: {}", category.table(), e)))?;

        Ok(entries)
    }

    async fn find_entry(
        &self,
        category: Category,
        content: &str,
    ) -> Result<Option<Entry>, StoreError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!(
                "SELECT id, content, created_at FROM {} WHERE content = ?1",
                category.table()
            ),
            rusqlite::params![content],
            |row| entry_from_row(row, category),
        )
        .optional()
        .map_err(|e| StoreError::Unavailable(format!("Failed to look up {}: {}", category, e)))
    }

    async fn insert_entry(&self, category: Category, content: &str) -> Result<Entry, StoreError> {
        let conn = self.lock()?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        conn.execute(
            &format!(
                "INSERT INTO {} (id, content, created_at) VALUES (?1, ?2, ?3)",
                category.table()
            ),
            rusqlite::params![id, content, now],
        ).map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Duplicate { category, content: content.to_string() }
            } else {
                StoreError::Unavailable(format!("Failed to insert {}: {}", category, e))
            }
        })?;

        Ok(Entry {
            id,
            content: content.to_string(),
            category,
            created_at: now,
        })
    }

    async fn get_daily_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>, StoreError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT p.id, p.content, p.created_at,
                    k.id, k.content, k.created_at,
                    m.id, m.content, m.created_at
             FROM daily_inspirations d
             INNER JOIN problems p ON p.id = d.problem_id
             INNER JOIN keywords k ON k.id = d.keyword_id
             INNER JOIN metaphors m ON m.id = d.metaphor_id
             WHERE d.date = ?1",
            rusqlite::params![date.format(DATE_FORMAT).to_string()],
            |row| {
                Ok(DailyRecord {
                    date,
                    problem: Entry {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        category: Category::Problem,
                        created_at: row.get(2)?,
                    },
                    keyword: Entry {
                        id: row.get(3)?,
                        content: row.get(4)?,
                        category: Category::Keyword,
                        created_at: row.get(5)?,
                    },
                    metaphor: Entry {
                        id: row.get(6)?,
                        content: row.get(7)?,
                        category: Category::Metaphor,
                        created_at: row.get(8)?,
                    },
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::Unavailable(format!("Failed to get daily record: {}", e)))
    }

    async fn insert_daily_record(&self, record: &DailyRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO daily_inspirations (date, problem_id, keyword_id, metaphor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                record.date.format(DATE_FORMAT).to_string(),
                record.problem.id,
                record.keyword.id,
                record.metaphor.id,
                chrono::Utc::now().to_rfc3339(),
            ],
        ).map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Conflict(record.date)
            } else {
                StoreError::Unavailable(format!("Failed to insert daily record: {}", e))
            }
        })?;

        Ok(())
    }
}
