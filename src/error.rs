use std::fmt::{self, Display, Formatter};

use crate::content::{Category, StoreError};

/// User-facing message for a duplicate submission
pub const DUPLICATE_MESSAGE: &str = "입력하신 단어는 이미 존재합니다.";

/// Application error types surfaced to the presentation layer.
///
/// Empty categories are not an error (they produce a placeholder
/// combination), and synthesis failures never reach the caller, so neither
/// has a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The submitted content already exists in the category
    DuplicateEntry { category: Category, content: String },

    /// The content store could not be read or written
    StoreUnavailable(String),

    /// The description synthesizer failed (only logged, never shown)
    SynthesisUnavailable(String),
}

impl AppError {
    /// Short message suitable for display next to the offending input
    pub fn user_message(&self) -> &str {
        match self {
            AppError::DuplicateEntry { .. } => DUPLICATE_MESSAGE,
            AppError::StoreUnavailable(_) => "잠시 후 다시 시도해주세요.",
            AppError::SynthesisUnavailable(_) => "",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AppError::DuplicateEntry { category, content } => {
                write!(f, "{} ({}: {})", DUPLICATE_MESSAGE, category, content)
            }
            AppError::StoreUnavailable(msg) => {
                write!(f, "Content store unavailable: {}", msg)
            }
            AppError::SynthesisUnavailable(msg) => {
                write!(f, "Description synthesis unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { category, content } => {
                AppError::DuplicateEntry { category, content }
            }
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}
