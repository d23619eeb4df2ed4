use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex as TokioMutex};

use crate::combination::{Combination, CombinationEngine};
use crate::content::{ContentStore, SqliteContentStore};
use crate::session::Session;
use crate::settings::Settings;
use crate::synthesis::{create_synthesizer, DescriptionSynthesizer};
use crate::validation::DuplicateValidator;

/// Events pushed to the presentation layer outside of a command's return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    DescriptionStarted { key: i64 },
    DescriptionReady { key: i64, description: String },
    DescriptionUnavailable { key: i64 },
    DailyLoaded { combination: Combination },
}

/// Everything a presentation root owns: the engine, its session, and the
/// event channel. One `AppState` per session; the content store behind the
/// engine may be shared by many.
pub struct AppState {
    pub engine: Arc<CombinationEngine>,
    pub session: Arc<TokioMutex<Session>>,
    pub validator: Arc<DuplicateValidator>,
    pub events: broadcast::Sender<SessionEvent>,
    pub min_generating: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ContentStore>,
        synthesizer: Arc<dyn DescriptionSynthesizer>,
        settings: &Settings,
    ) -> Self {
        let engine = Arc::new(
            CombinationEngine::new(store, synthesizer)
                .with_description_timeout(Duration::from_secs(settings.synthesizer.timeout_secs)),
        );
        let validator = Arc::new(DuplicateValidator::new(
            engine.clone(),
            Duration::from_millis(settings.generation.duplicate_check_debounce_ms),
        ));
        let (events, _) = broadcast::channel(64);

        Self {
            engine,
            session: Arc::new(TokioMutex::new(Session::new())),
            validator,
            events,
            min_generating: Duration::from_millis(settings.generation.min_generating_ms),
        }
    }

    /// Build the production state from settings: SQLite store at the
    /// configured path and the configured synthesizer (or its no-op fallback).
    pub fn from_settings(settings: &Settings) -> Result<Self, String> {
        let store: Arc<dyn ContentStore> = match settings.database_path() {
            Some(path) => Arc::new(SqliteContentStore::new(&path)?),
            None => {
                eprintln!("AppState: No data directory available, using in-memory store");
                Arc::new(SqliteContentStore::new_in_memory()?)
            }
        };
        let synthesizer = create_synthesizer(&settings.synthesizer);
        Ok(Self::new(store, synthesizer, settings))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No receivers is fine: the presentation may not be listening yet
        let _ = self.events.send(event);
    }
}
