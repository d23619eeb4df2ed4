pub mod model;
pub mod engine;

pub use model::{Combination, CombinationKind, EMPTY_FALLBACK, UNAVAILABLE_FALLBACK};
pub use engine::{
    CombinationEngine, ContentDraft, FieldOutcome, SubmissionReport, SubmitOutcome,
};
