// NoOpSynthesizer - fallback when no text-generation backend is configured

use async_trait::async_trait;

use super::provider::{AvailabilityResult, DescriptionSynthesizer, SynthesisRequest};

/// Synthesizer that is never available.
///
/// Used when synthesis is disabled or the API key is missing, so combinations
/// are still generated, just without descriptions.
pub struct NoOpSynthesizer {
    reason: String,
}

impl NoOpSynthesizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl DescriptionSynthesizer for NoOpSynthesizer {
    fn name(&self) -> &str {
        "noop"
    }

    async fn check_availability(&self) -> AvailabilityResult {
        AvailabilityResult {
            available: false,
            reason: Some(self.reason.clone()),
        }
    }

    async fn describe(&self, _request: &SynthesisRequest) -> Result<String, String> {
        Err(format!("Synthesizer unavailable: {}", self.reason))
    }
}
