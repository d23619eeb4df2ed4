// Debounced live duplicate checking for the add-content form

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::combination::CombinationEngine;
use crate::content::Category;
use crate::error::DUPLICATE_MESSAGE;

/// Result of one live validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Not a duplicate (or blank)
    Clear,
    Duplicate { message: String },
    /// A newer keystroke for the same field arrived; ignore this result
    Superseded,
    /// The store could not be queried; the field is left unflagged
    Unavailable,
}

/// Rate-limits duplicate lookups to one per field per quiet period.
///
/// Each call for a field takes a sequence number, waits out the debounce
/// window, and only queries the store if no newer call for that field
/// arrived. A result that lands after a newer call started is reported as
/// `Superseded` too.
pub struct DuplicateValidator {
    engine: Arc<CombinationEngine>,
    debounce: Duration,
    latest: [AtomicU64; 3],
}

fn slot(category: Category) -> usize {
    match category {
        Category::Problem => 0,
        Category::Keyword => 1,
        Category::Metaphor => 2,
    }
}

impl DuplicateValidator {
    pub fn new(engine: Arc<CombinationEngine>, debounce: Duration) -> Self {
        Self {
            engine,
            debounce,
            latest: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    fn is_latest(&self, category: Category, seq: u64) -> bool {
        self.latest[slot(category)].load(Ordering::SeqCst) == seq
    }

    pub async fn validate(&self, category: Category, content: &str) -> ValidationOutcome {
        let seq = self.latest[slot(category)].fetch_add(1, Ordering::SeqCst) + 1;

        if content.trim().is_empty() {
            return ValidationOutcome::Clear;
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_latest(category, seq) {
            return ValidationOutcome::Superseded;
        }

        let result = self.engine.check_duplicate(category, content).await;
        if !self.is_latest(category, seq) {
            return ValidationOutcome::Superseded;
        }

        match result {
            Ok(true) => ValidationOutcome::Duplicate {
                message: DUPLICATE_MESSAGE.to_string(),
            },
            Ok(false) => ValidationOutcome::Clear,
            Err(e) => {
                eprintln!("Validation: Duplicate check for {} failed: {}", category, e);
                ValidationOutcome::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentStore, SqliteContentStore};
    use crate::synthesis::NoOpSynthesizer;

    async fn validator(debounce_ms: u64) -> (Arc<DuplicateValidator>, Arc<SqliteContentStore>) {
        let store = Arc::new(SqliteContentStore::new_in_memory().unwrap());
        store.insert_entry(Category::Keyword, "고양이").await.unwrap();
        let engine = Arc::new(CombinationEngine::new(
            store.clone(),
            Arc::new(NoOpSynthesizer::new("test")),
        ));
        (
            Arc::new(DuplicateValidator::new(engine, Duration::from_millis(debounce_ms))),
            store,
        )
    }

    #[tokio::test]
    async fn test_validate_flags_duplicates_and_clears_new_content() {
        let (validator, _store) = validator(0).await;

        assert_eq!(
            validator.validate(Category::Keyword, " 고양이 ").await,
            ValidationOutcome::Duplicate { message: "입력하신 단어는 이미 존재합니다.".to_string() }
        );
        assert_eq!(validator.validate(Category::Keyword, "강아지").await, ValidationOutcome::Clear);
        assert_eq!(validator.validate(Category::Problem, "고양이").await, ValidationOutcome::Clear);
        assert_eq!(validator.validate(Category::Keyword, "   ").await, ValidationOutcome::Clear);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_only_check_the_last_value() {
        let (validator, _store) = validator(300).await;

        let first = {
            let v = validator.clone();
            tokio::spawn(async move { v.validate(Category::Keyword, "고").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = {
            let v = validator.clone();
            tokio::spawn(async move { v.validate(Category::Keyword, "고양").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = {
            let v = validator.clone();
            tokio::spawn(async move { v.validate(Category::Keyword, "고양이").await })
        };

        assert_eq!(first.await.unwrap(), ValidationOutcome::Superseded);
        assert_eq!(second.await.unwrap(), ValidationOutcome::Superseded);
        assert!(matches!(last.await.unwrap(), ValidationOutcome::Duplicate { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_debounce_independently() {
        let (validator, _store) = validator(300).await;

        let keyword = {
            let v = validator.clone();
            tokio::spawn(async move { v.validate(Category::Keyword, "고양이").await })
        };
        let problem = {
            let v = validator.clone();
            tokio::spawn(async move { v.validate(Category::Problem, "야근").await })
        };

        assert!(matches!(keyword.await.unwrap(), ValidationOutcome::Duplicate { .. }));
        assert_eq!(problem.await.unwrap(), ValidationOutcome::Clear);
    }
}
