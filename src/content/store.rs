use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The three independent entry sets a combination draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Problem,
    Keyword,
    Metaphor,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Problem, Category::Keyword, Category::Metaphor];

    /// Backing table name in the content database
    pub fn table(&self) -> &'static str {
        match self {
            Category::Problem => "problems",
            Category::Keyword => "keywords",
            Category::Metaphor => "metaphors",
        }
    }

    /// Label used in prompts and user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Category::Problem => "문제",
            Category::Keyword => "키워드",
            Category::Metaphor => "메타포",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Category::Problem => write!(f, "problem"),
            Category::Keyword => write!(f, "keyword"),
            Category::Metaphor => write!(f, "metaphor"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "problem" => Ok(Category::Problem),
            "keyword" => Ok(Category::Keyword),
            "metaphor" => Ok(Category::Metaphor),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// A single user-contributed text item. Never updated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Trimmed content, unique within its category
    pub content: String,

    pub category: Category,

    /// ISO 8601 timestamp of submission
    pub created_at: String,
}

/// The persisted daily selection, with its entries resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub problem: Entry,
    pub keyword: Entry,
    pub metaphor: Entry,
}

/// Store-level failure classes.
///
/// `Duplicate` and `Conflict` come from the store's uniqueness constraints;
/// everything else (I/O, lock poisoning, SQL errors) is `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An entry with the same trimmed content already exists in the category
    Duplicate { category: Category, content: String },

    /// A daily record for the date already exists
    Conflict(NaiveDate),

    /// The store could not be read or written
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            StoreError::Duplicate { category, content } => {
                write!(f, "Duplicate {} entry: {}", category, content)
            }
            StoreError::Conflict(date) => {
                write!(f, "Daily record for {} already exists", date)
            }
            StoreError::Unavailable(msg) => write!(f, "Content store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Backend-agnostic content store.
///
/// The combination engine only ever talks to this trait. Implementations must
/// enforce per-category uniqueness of `content` and per-date uniqueness of the
/// daily record; the engine relies on those constraints and adds no locking of
/// its own.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List every entry in a category, oldest first
    async fn list_entries(&self, category: Category) -> Result<Vec<Entry>, StoreError>;

    /// Exact (case-sensitive) lookup of already-trimmed content
    async fn find_entry(
        &self,
        category: Category,
        content: &str,
    ) -> Result<Option<Entry>, StoreError>;

    /// Insert already-trimmed content. Returns `StoreError::Duplicate` on a
    /// uniqueness violation.
    async fn insert_entry(&self, category: Category, content: &str) -> Result<Entry, StoreError>;

    /// Get the daily record for a date, if one has been persisted
    async fn get_daily_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>, StoreError>;

    /// Persist the entry ids of a daily record. Returns `StoreError::Conflict`
    /// if a record for the date already exists.
    async fn insert_daily_record(&self, record: &DailyRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_display_form() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
        assert_eq!(" Keyword ".parse::<Category>(), Ok(Category::Keyword));
        assert!("emotion".parse::<Category>().is_err());
    }
}
