// DescriptionSynthesizer trait - backend-agnostic text-generation interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of an availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub reason: Option<String>,
}

/// The three fields a description is synthesized from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub problem: String,
    pub keyword: String,
    pub metaphor: String,
}

/// Backend-agnostic description synthesizer.
///
/// Implementations return a short (2-3 sentence) Korean description tying the
/// three fields together, or an error string. Callers treat every error the
/// same way: the combination is shown without a description.
#[async_trait]
pub trait DescriptionSynthesizer: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Check if the synthesizer is configured and ready
    async fn check_availability(&self) -> AvailabilityResult;

    /// Generate a description for the given triple
    async fn describe(&self, request: &SynthesisRequest) -> Result<String, String>;
}
