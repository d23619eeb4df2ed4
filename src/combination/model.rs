use serde::{Deserialize, Serialize};

use crate::content::DailyRecord;
use crate::synthesis::SynthesisRequest;

/// Placeholder shown when any category has no entries
pub const EMPTY_FALLBACK: (&str, &str, &str) = (
    "데이터베이스가 비어있습니다",
    "관리자에게 문의하세요",
    "초기 데이터를 추가해주세요",
);

/// Placeholder shown when the content store cannot be reached
pub const UNAVAILABLE_FALLBACK: (&str, &str, &str) = (
    "오류가 발생했습니다",
    "다시 시도해주세요",
    "네트워크를 확인해주세요",
);

/// Where a combination came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationKind {
    /// One real entry per category
    Drawn,
    /// At least one category was empty
    EmptyFallback,
    /// The store failed; retry later
    UnavailableFallback,
}

/// A problem × keyword × metaphor triple, optionally with a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub problem: String,
    pub keyword: String,
    pub metaphor: String,

    /// Milliseconds since the Unix epoch. Doubles as the saved-list key.
    pub created_at: i64,

    /// Filled in after creation; may never arrive
    pub description: Option<String>,

    pub kind: CombinationKind,
}

impl Combination {
    pub fn new(
        problem: impl Into<String>,
        keyword: impl Into<String>,
        metaphor: impl Into<String>,
    ) -> Self {
        Self::with_kind(problem, keyword, metaphor, CombinationKind::Drawn)
    }

    fn with_kind(
        problem: impl Into<String>,
        keyword: impl Into<String>,
        metaphor: impl Into<String>,
        kind: CombinationKind,
    ) -> Self {
        Self {
            problem: problem.into(),
            keyword: keyword.into(),
            metaphor: metaphor.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
            description: None,
            kind,
        }
    }

    pub fn empty_fallback() -> Self {
        let (p, k, m) = EMPTY_FALLBACK;
        Self::with_kind(p, k, m, CombinationKind::EmptyFallback)
    }

    pub fn unavailable_fallback() -> Self {
        let (p, k, m) = UNAVAILABLE_FALLBACK;
        Self::with_kind(p, k, m, CombinationKind::UnavailableFallback)
    }

    pub fn from_daily(record: &DailyRecord) -> Self {
        Self::new(
            record.problem.content.clone(),
            record.keyword.content.clone(),
            record.metaphor.content.clone(),
        )
    }

    /// Override the creation timestamp (used as the saved-list key)
    pub fn at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.kind != CombinationKind::Drawn
    }

    pub fn triple(&self) -> (&str, &str, &str) {
        (&self.problem, &self.keyword, &self.metaphor)
    }

    /// Same problem, keyword and metaphor, regardless of timestamp or description
    pub fn same_triple(&self, other: &Combination) -> bool {
        self.triple() == other.triple()
    }

    pub fn synthesis_request(&self) -> SynthesisRequest {
        SynthesisRequest {
            problem: self.problem.clone(),
            keyword: self.keyword.clone(),
            metaphor: self.metaphor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_carry_fixed_text() {
        let empty = Combination::empty_fallback();
        assert_eq!(empty.triple(), EMPTY_FALLBACK);
        assert_eq!(empty.kind, CombinationKind::EmptyFallback);
        assert!(empty.is_fallback());

        let unavailable = Combination::unavailable_fallback();
        assert_eq!(unavailable.triple(), UNAVAILABLE_FALLBACK);
        assert!(unavailable.is_fallback());
    }

    #[test]
    fn test_same_triple_ignores_timestamp_and_description() {
        let a = Combination::new("A", "B", "C").at(1);
        let b = Combination::new("A", "B", "C").at(2).with_description("설명");
        let c = Combination::new("A", "C", "B").at(1);

        assert!(a.same_triple(&b));
        assert!(!a.same_triple(&c));
    }

    #[test]
    fn test_serializes_kind_in_snake_case() {
        let json = serde_json::to_value(Combination::empty_fallback()).unwrap();
        assert_eq!(json["kind"], "empty_fallback");
        assert!(json["description"].is_null());
    }
}
