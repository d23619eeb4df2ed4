use chrono::NaiveDate;
use futures_util::future::{join3, try_join3};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::content::{Category, ContentStore, DailyRecord, Entry, StoreError};
use crate::error::AppError;
use crate::synthesis::chat_provider::DEFAULT_TIMEOUT_SECS;
use crate::synthesis::DescriptionSynthesizer;
use super::model::Combination;

const DEFAULT_DESCRIPTION_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Outcome of a single-field submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Blank input, nothing was sent to the store
    Skipped,
    Inserted { entry: Entry },
}

/// The three fields of an add-content form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub problem: String,
    pub keyword: String,
    pub metaphor: String,
}

impl ContentDraft {
    pub fn field(&self, category: Category) -> &str {
        match category {
            Category::Problem => &self.problem,
            Category::Keyword => &self.keyword,
            Category::Metaphor => &self.metaphor,
        }
    }

    pub fn is_blank(&self) -> bool {
        Category::ALL.iter().all(|c| self.field(*c).trim().is_empty())
    }
}

/// Per-field result of an add-content submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    Skipped,
    Inserted { entry: Entry },
    Duplicate { message: String },
    Failed { message: String },
}

impl From<Result<SubmitOutcome, AppError>> for FieldOutcome {
    fn from(result: Result<SubmitOutcome, AppError>) -> Self {
        match result {
            Ok(SubmitOutcome::Skipped) => FieldOutcome::Skipped,
            Ok(SubmitOutcome::Inserted { entry }) => FieldOutcome::Inserted { entry },
            Err(e @ AppError::DuplicateEntry { .. }) => FieldOutcome::Duplicate {
                message: e.user_message().to_string(),
            },
            Err(e) => FieldOutcome::Failed {
                message: e.user_message().to_string(),
            },
        }
    }
}

/// Result of submitting all three fields together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub problem: FieldOutcome,
    pub keyword: FieldOutcome,
    pub metaphor: FieldOutcome,
}

impl SubmissionReport {
    fn skipped() -> Self {
        Self {
            problem: FieldOutcome::Skipped,
            keyword: FieldOutcome::Skipped,
            metaphor: FieldOutcome::Skipped,
        }
    }

    pub fn field(&self, category: Category) -> &FieldOutcome {
        match category {
            Category::Problem => &self.problem,
            Category::Keyword => &self.keyword,
            Category::Metaphor => &self.metaphor,
        }
    }

    /// At least one insert and no failures
    pub fn all_succeeded(&self) -> bool {
        let outcomes = [&self.problem, &self.keyword, &self.metaphor];
        outcomes.iter().any(|o| matches!(o, FieldOutcome::Inserted { .. }))
            && outcomes.iter().all(|o| matches!(o, FieldOutcome::Inserted { .. } | FieldOutcome::Skipped))
    }
}

/// One entry drawn from each category
struct Draw {
    problem: Entry,
    keyword: Entry,
    metaphor: Entry,
}

/// Uniform, independent pick from each set. `None` if any set is empty.
fn pick_three(problems: &[Entry], keywords: &[Entry], metaphors: &[Entry]) -> Option<Draw> {
    let mut rng = rand::thread_rng();
    Some(Draw {
        problem: problems.choose(&mut rng)?.clone(),
        keyword: keywords.choose(&mut rng)?.clone(),
        metaphor: metaphors.choose(&mut rng)?.clone(),
    })
}

/// Produces daily and random combinations, handles submissions, and attaches
/// descriptions.
///
/// Every store or synthesizer failure is converted here: rolls degrade to a
/// placeholder combination, descriptions degrade to none. Only submissions
/// return an error, and only as a value.
pub struct CombinationEngine {
    store: Arc<dyn ContentStore>,
    synthesizer: Arc<dyn DescriptionSynthesizer>,
    description_timeout: Duration,
}

impl CombinationEngine {
    pub fn new(store: Arc<dyn ContentStore>, synthesizer: Arc<dyn DescriptionSynthesizer>) -> Self {
        Self {
            store,
            synthesizer,
            description_timeout: DEFAULT_DESCRIPTION_TIMEOUT,
        }
    }

    /// Upper bound on a single description request, on top of whatever the
    /// synthesizer enforces itself.
    pub fn with_description_timeout(mut self, timeout: Duration) -> Self {
        self.description_timeout = timeout;
        self
    }

    pub fn synthesizer(&self) -> &Arc<dyn DescriptionSynthesizer> {
        &self.synthesizer
    }

    async fn draw(&self) -> Result<Option<Draw>, StoreError> {
        let (problems, keywords, metaphors) = try_join3(
            self.store.list_entries(Category::Problem),
            self.store.list_entries(Category::Keyword),
            self.store.list_entries(Category::Metaphor),
        ).await?;

        Ok(pick_three(&problems, &keywords, &metaphors))
    }

    /// Draw a fresh random combination.
    pub async fn roll_random(&self) -> Combination {
        match self.draw().await {
            Ok(Some(draw)) => Combination::new(
                draw.problem.content,
                draw.keyword.content,
                draw.metaphor.content,
            ),
            Ok(None) => {
                eprintln!("Engine: A category is empty, returning placeholder combination");
                Combination::empty_fallback()
            }
            Err(e) => {
                eprintln!("Engine: Failed to roll combination: {}", e);
                Combination::unavailable_fallback()
            }
        }
    }

    /// Return the combination persisted for `date`, creating it on first access.
    ///
    /// Concurrent first calls race on the store's unique date key; the loser
    /// re-reads and returns the winner's record.
    pub async fn get_or_create_daily(&self, date: NaiveDate) -> Combination {
        match self.store.get_daily_record(date).await {
            Ok(Some(record)) => return Combination::from_daily(&record),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Engine: Failed to load daily combination for {}: {}", date, e);
                return Combination::unavailable_fallback();
            }
        }

        let draw = match self.draw().await {
            Ok(Some(draw)) => draw,
            Ok(None) => {
                eprintln!("Engine: Cannot create daily combination for {}, a category is empty", date);
                return Combination::empty_fallback();
            }
            Err(e) => {
                eprintln!("Engine: Failed to draw daily combination for {}: {}", date, e);
                return Combination::unavailable_fallback();
            }
        };

        let record = DailyRecord {
            date,
            problem: draw.problem,
            keyword: draw.keyword,
            metaphor: draw.metaphor,
        };

        match self.store.insert_daily_record(&record).await {
            Ok(()) => {
                eprintln!("Engine: Created daily combination for {}", date);
                Combination::from_daily(&record)
            }
            Err(StoreError::Conflict(_)) => {
                eprintln!("Engine: Daily combination for {} created concurrently, re-reading", date);
                match self.store.get_daily_record(date).await {
                    Ok(Some(winner)) => Combination::from_daily(&winner),
                    Ok(None) => {
                        eprintln!("Engine: Daily record for {} vanished after conflict", date);
                        Combination::unavailable_fallback()
                    }
                    Err(e) => {
                        eprintln!("Engine: Failed to re-read daily combination for {}: {}", date, e);
                        Combination::unavailable_fallback()
                    }
                }
            }
            Err(e) => {
                eprintln!("Engine: Failed to persist daily combination for {}: {}", date, e);
                Combination::unavailable_fallback()
            }
        }
    }

    /// Exact-match lookup of trimmed content. Blank content is never a duplicate.
    pub async fn check_duplicate(&self, category: Category, content: &str) -> Result<bool, AppError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        Ok(self.store.find_entry(category, trimmed).await?.is_some())
    }

    /// Insert a single entry after trimming. Blank input is a no-op.
    pub async fn submit_entry(&self, category: Category, content: &str) -> Result<SubmitOutcome, AppError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }

        if self.check_duplicate(category, trimmed).await? {
            return Err(AppError::DuplicateEntry {
                category,
                content: trimmed.to_string(),
            });
        }

        // The store's unique constraint catches inserts racing past the check above
        let entry = self.store.insert_entry(category, trimmed).await?;
        eprintln!("Engine: Added {} entry {}", category, entry.id);
        Ok(SubmitOutcome::Inserted { entry })
    }

    /// Submit all three fields concurrently; each succeeds or fails on its own.
    pub async fn submit_content(&self, draft: &ContentDraft) -> SubmissionReport {
        if draft.is_blank() {
            return SubmissionReport::skipped();
        }

        let (problem, keyword, metaphor) = join3(
            self.submit_entry(Category::Problem, &draft.problem),
            self.submit_entry(Category::Keyword, &draft.keyword),
            self.submit_entry(Category::Metaphor, &draft.metaphor),
        ).await;

        SubmissionReport {
            problem: problem.into(),
            keyword: keyword.into(),
            metaphor: metaphor.into(),
        }
    }

    /// Ask the synthesizer for a description. Any failure returns the
    /// combination unchanged. Placeholders are never sent.
    pub async fn attach_description(&self, combination: Combination) -> Combination {
        if combination.is_fallback() {
            return combination;
        }

        let request = combination.synthesis_request();
        let result = match tokio::time::timeout(
            self.description_timeout,
            self.synthesizer.describe(&request),
        ).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "timed out after {}s",
                self.description_timeout.as_secs()
            )),
        };

        match result {
            Ok(description) if !description.trim().is_empty() => {
                combination.with_description(description.trim())
            }
            Ok(_) => {
                eprintln!("Engine: {}", AppError::SynthesisUnavailable("empty description".to_string()));
                combination
            }
            Err(e) => {
                eprintln!("Engine: {}", AppError::SynthesisUnavailable(e));
                combination
            }
        }
    }
}
