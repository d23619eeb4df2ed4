// Synthesis module - short creative descriptions for combinations

pub mod provider;
pub mod prompt;
pub mod chat_provider;
pub mod noop_provider;

pub use provider::{AvailabilityResult, DescriptionSynthesizer, SynthesisRequest};
pub use chat_provider::ChatCompletionSynthesizer;
pub use noop_provider::NoOpSynthesizer;

use std::sync::Arc;
use std::time::Duration;

use crate::settings::SynthesizerSettings;

/// Create a synthesizer with graceful fallback to NoOpSynthesizer.
///
/// Synthesis disabled, a missing API key, or a client build failure all
/// produce a NoOpSynthesizer, so generation keeps working without
/// descriptions.
pub fn create_synthesizer(settings: &SynthesizerSettings) -> Arc<dyn DescriptionSynthesizer> {
    if !settings.enabled {
        eprintln!("Synthesizer: Disabled in settings, descriptions are off");
        return Arc::new(NoOpSynthesizer::new("Synthesis disabled in settings"));
    }

    let api_key = match std::env::var(&settings.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            let reason = format!("{} is not set", settings.api_key_env);
            eprintln!("Synthesizer: {}. Using NoOpSynthesizer", reason);
            return Arc::new(NoOpSynthesizer::new(reason));
        }
    };

    match ChatCompletionSynthesizer::new(
        settings.endpoint.clone(),
        settings.model.clone(),
        api_key,
        settings.max_tokens,
        Duration::from_secs(settings.timeout_secs),
    ) {
        Ok(synth) => Arc::new(synth),
        Err(e) => {
            eprintln!("Synthesizer: Failed to initialize: {}. Using NoOpSynthesizer", e);
            Arc::new(NoOpSynthesizer::new(e))
        }
    }
}
