// Presentation-facing command surface.
//
// Every mutation the presentation layer can make goes through one of these
// functions. They take the session's `AppState` and return plain data or a
// user-displayable `String` error.

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::combination::{Combination, ContentDraft, SubmissionReport, SubmitOutcome};
use crate::content::Category;
use crate::session::{DescriptionTicket, Mode, SessionSnapshot};
use crate::share::{self, SharePayload};
use crate::state::{AppState, SessionEvent};
use crate::synthesis::AvailabilityResult;
use crate::validation::ValidationOutcome;

// ── Daily inspiration ──

/// Load (or create) today's combination and keep it in the session.
pub async fn load_daily(state: &AppState) -> Option<Combination> {
    load_daily_for(state, chrono::Utc::now().date_naive()).await
}

/// Load (or create) the combination for a specific date.
///
/// Placeholders are returned to the caller but not kept as the session's
/// daily combination.
pub async fn load_daily_for(state: &AppState, date: NaiveDate) -> Option<Combination> {
    let combination = state.engine.get_or_create_daily(date).await;
    if combination.is_fallback() {
        return None;
    }

    state.session.lock().await.set_daily(combination.clone());
    state.emit(SessionEvent::DailyLoaded { combination: combination.clone() });
    Some(combination)
}

/// The session's daily combination, loading it on first call.
pub async fn get_daily(state: &AppState) -> Option<Combination> {
    if let Some(daily) = state.session.lock().await.daily().cloned() {
        return Some(daily);
    }
    load_daily(state).await
}

// ── Generate / view transitions ──

/// Roll a new combination and display it. Starts the description request in
/// the background; its result arrives as a `SessionEvent`.
pub async fn generate(state: &AppState) -> Result<Combination, String> {
    let (generation, token) = state.session.lock().await.begin_generating();
    run_generation(state, generation, token).await
}

/// Same as `generate`, but only valid while a combination is shown.
pub async fn regenerate(state: &AppState) -> Result<Combination, String> {
    let (generation, token) = state.session.lock().await.begin_regenerating()?;
    run_generation(state, generation, token).await
}

async fn run_generation(
    state: &AppState,
    generation: u64,
    token: CancellationToken,
) -> Result<Combination, String> {
    let started = tokio::time::Instant::now();
    let combination = state.engine.roll_random().await;

    // Placeholders show up immediately; real draws keep the generating
    // state visible for at least `min_generating`.
    if !combination.is_fallback() {
        let remaining = state.min_generating.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }

    let ticket = {
        let mut session = state.session.lock().await;
        let ticket = session
            .finish_generating(generation, combination.clone())
            .ok_or_else(|| "Superseded by a newer generation".to_string())?;
        if !combination.is_fallback() {
            session.mark_describing(ticket);
        }
        ticket
    };

    if !combination.is_fallback() {
        spawn_description(state, ticket, token, combination.clone());
    }

    Ok(combination)
}

fn spawn_description(
    state: &AppState,
    ticket: DescriptionTicket,
    token: CancellationToken,
    combination: Combination,
) {
    let engine = state.engine.clone();
    let session = state.session.clone();
    let events = state.events.clone();

    state.emit(SessionEvent::DescriptionStarted { key: ticket.key });

    tokio::spawn(async move {
        let described = tokio::select! {
            _ = token.cancelled() => {
                eprintln!("Commands: Description for {} cancelled", ticket.key);
                return;
            }
            described = engine.attach_description(combination) => described,
        };

        let mut session = session.lock().await;
        match described.description {
            Some(description) => {
                if session.apply_description(ticket, &description) {
                    let _ = events.send(SessionEvent::DescriptionReady {
                        key: ticket.key,
                        description,
                    });
                } else {
                    eprintln!("Commands: Dropping stale description for {}", ticket.key);
                }
            }
            None => {
                if session.abandon_description(ticket) {
                    let _ = events.send(SessionEvent::DescriptionUnavailable { key: ticket.key });
                }
            }
        }
    });
}

pub async fn view_as_card(state: &AppState) -> Result<(), String> {
    state.session.lock().await.view_as_card()
}

pub async fn back_to_list(state: &AppState) -> Result<(), String> {
    state.session.lock().await.back_to_list()
}

pub async fn set_mode(state: &AppState, mode: Mode) -> SessionSnapshot {
    let mut session = state.session.lock().await;
    session.set_mode(mode);
    session.snapshot()
}

pub async fn get_session(state: &AppState) -> SessionSnapshot {
    state.session.lock().await.snapshot()
}

// ── Saved combinations ──

/// Save the displayed combination. Returns whether it was newly added.
pub async fn save_current(state: &AppState) -> bool {
    state.session.lock().await.save_current()
}

pub async fn save_combination(state: &AppState, combination: Combination) -> bool {
    state.session.lock().await.save(&combination)
}

pub async fn remove_saved(state: &AppState, key: i64) -> bool {
    state.session.lock().await.remove(key)
}

pub async fn list_saved(state: &AppState) -> Vec<Combination> {
    state.session.lock().await.saved().list().to_vec()
}

// ── Add content ──

/// Live duplicate check for one form field (debounced).
pub async fn validate_entry(state: &AppState, category: Category, content: String) -> ValidationOutcome {
    state.validator.validate(category, &content).await
}

pub async fn submit_entry(
    state: &AppState,
    category: Category,
    content: String,
) -> Result<SubmitOutcome, String> {
    state.engine
        .submit_entry(category, &content)
        .await
        .map_err(|e| e.user_message().to_string())
}

/// Submit the add-content form. On full success the session returns to the
/// generate panel.
pub async fn submit_content(state: &AppState, draft: ContentDraft) -> SubmissionReport {
    let report = state.engine.submit_content(&draft).await;
    if report.all_succeeded() {
        state.session.lock().await.set_mode(Mode::Generate);
    }
    report
}

// ── Share / export ──

async fn current_combination(state: &AppState) -> Result<Combination, String> {
    state.session
        .lock()
        .await
        .current()
        .cloned()
        .ok_or_else(|| "No combination to share".to_string())
}

pub async fn share_text(state: &AppState) -> Result<String, String> {
    Ok(share::plain_text(&current_combination(state).await?))
}

pub async fn share_payload(state: &AppState) -> Result<SharePayload, String> {
    Ok(share::share_payload(&current_combination(state).await?))
}

pub async fn export_file_name(state: &AppState) -> Result<String, String> {
    Ok(share::export_file_name(&current_combination(state).await?))
}

// ── Diagnostics ──

pub async fn check_synthesizer(state: &AppState) -> AvailabilityResult {
    state.engine.synthesizer().check_availability().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast;

    use crate::combination::{CombinationKind, FieldOutcome};
    use crate::content::{ContentStore, SqliteContentStore};
    use crate::settings::Settings;
    use crate::synthesis::{DescriptionSynthesizer, SynthesisRequest};

    /// Numbers its descriptions so tests can tell calls apart
    struct CountingSynthesizer {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSynthesizer {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), delay })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DescriptionSynthesizer for CountingSynthesizer {
        fn name(&self) -> &str {
            "counting"
        }

        async fn check_availability(&self) -> AvailabilityResult {
            AvailabilityResult { available: true, reason: None }
        }

        async fn describe(&self, _request: &SynthesisRequest) -> Result<String, String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            Ok(format!("설명 #{}", n))
        }
    }

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.generation.min_generating_ms = 0;
        settings.generation.duplicate_check_debounce_ms = 0;
        settings
    }

    async fn seeded_store(entries: &[(Category, &str)]) -> Arc<SqliteContentStore> {
        let store = Arc::new(SqliteContentStore::new_in_memory().unwrap());
        for (category, content) in entries {
            store.insert_entry(*category, content).await.unwrap();
        }
        store
    }

    async fn abc_store() -> Arc<SqliteContentStore> {
        seeded_store(&[
            (Category::Problem, "A"),
            (Category::Keyword, "B"),
            (Category::Metaphor, "C"),
        ])
        .await
    }

    /// Next event that ends a description request
    async fn description_outcome(events: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
        loop {
            match events.recv().await.unwrap() {
                event @ (SessionEvent::DescriptionReady { .. }
                | SessionEvent::DescriptionUnavailable { .. }) => return event,
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_generate_with_empty_store_shows_placeholder_without_synthesis() {
        let synthesizer = CountingSynthesizer::new(Duration::ZERO);
        let state = AppState::new(
            Arc::new(SqliteContentStore::new_in_memory().unwrap()),
            synthesizer.clone(),
            &fast_settings(),
        );

        let combination = generate(&state).await.unwrap();
        assert_eq!(combination.kind, CombinationKind::EmptyFallback);
        assert_eq!(combination.description, None);

        let snapshot = get_session(&state).await;
        assert_eq!(snapshot.view.name(), "displayed");
        assert!(!snapshot.describing);
        assert!(save_current(&state).await);
        assert_eq!(list_saved(&state).await[0].kind, CombinationKind::EmptyFallback);

        tokio::task::yield_now().await;
        assert_eq!(synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_draws_only_entries_and_attaches_description() {
        let state = AppState::new(
            abc_store().await,
            CountingSynthesizer::new(Duration::ZERO),
            &fast_settings(),
        );
        let mut events = state.subscribe();

        let combination = generate(&state).await.unwrap();
        assert_eq!(combination.triple(), ("A", "B", "C"));

        assert_eq!(
            description_outcome(&mut events).await,
            SessionEvent::DescriptionReady {
                key: combination.created_at,
                description: "설명 #1".to_string(),
            }
        );

        let snapshot = get_session(&state).await;
        assert!(!snapshot.describing);
        assert_eq!(
            snapshot.view.current().unwrap().description.as_deref(),
            Some("설명 #1")
        );
        assert_eq!(share_text(&state).await.unwrap(), "A × B × C\n\n설명 #1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generating_state_lasts_at_least_the_minimum() {
        let mut settings = fast_settings();
        settings.generation.min_generating_ms = 800;
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &settings);

        let started = tokio::time::Instant::now();
        generate(&state).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_synthesizer_leaves_combination_without_description() {
        let mut settings = fast_settings();
        settings.synthesizer.timeout_secs = 1;
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::from_secs(60)), &settings);
        let mut events = state.subscribe();

        let combination = generate(&state).await.unwrap();
        assert_eq!(
            description_outcome(&mut events).await,
            SessionEvent::DescriptionUnavailable { key: combination.created_at }
        );

        let snapshot = get_session(&state).await;
        assert!(!snapshot.describing);
        assert_eq!(snapshot.view.current().unwrap().description, None);
        assert_eq!(share_text(&state).await.unwrap(), "A × B × C");
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_discards_the_pending_description() {
        let synthesizer = CountingSynthesizer::new(Duration::from_secs(5));
        let state = AppState::new(abc_store().await, synthesizer.clone(), &fast_settings());
        let mut events = state.subscribe();

        generate(&state).await.unwrap();
        while synthesizer.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let second = regenerate(&state).await.unwrap();
        assert_eq!(
            description_outcome(&mut events).await,
            SessionEvent::DescriptionReady {
                key: second.created_at,
                description: "설명 #2".to_string(),
            }
        );

        // Let the first request's timer run out too
        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = get_session(&state).await;
        assert_eq!(
            snapshot.view.current().unwrap().description.as_deref(),
            Some("설명 #2")
        );
    }

    #[tokio::test]
    async fn test_regenerate_requires_a_displayed_combination() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());
        assert!(regenerate(&state).await.is_err());
        assert!(view_as_card(&state).await.is_err());
    }

    #[tokio::test]
    async fn test_card_view_and_saved_flow() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());
        let combination = generate(&state).await.unwrap();

        view_as_card(&state).await.unwrap();
        assert_eq!(get_session(&state).await.view.name(), "card_view");
        back_to_list(&state).await.unwrap();
        assert_eq!(get_session(&state).await.view.name(), "displayed");

        assert!(save_current(&state).await);
        assert!(!save_current(&state).await);
        assert_eq!(list_saved(&state).await.len(), 1);

        let snapshot = set_mode(&state, Mode::Saved).await;
        assert_eq!(snapshot.mode, Mode::Saved);
        assert_eq!(snapshot.saved_count, 1);

        assert!(remove_saved(&state, combination.created_at).await);
        assert!(list_saved(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_daily_is_stable_across_sessions() {
        let store = abc_store().await;
        store.insert_entry(Category::Problem, "D").await.unwrap();
        store.insert_entry(Category::Keyword, "E").await.unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let first = AppState::new(store.clone(), CountingSynthesizer::new(Duration::ZERO), &fast_settings());
        let second = AppState::new(store, CountingSynthesizer::new(Duration::ZERO), &fast_settings());

        let a = load_daily_for(&first, date).await.unwrap();
        let b = load_daily_for(&second, date).await.unwrap();
        assert!(a.same_triple(&b));
        assert_eq!(get_session(&first).await.daily, Some(a));
    }

    #[tokio::test]
    async fn test_daily_with_empty_store_is_not_kept() {
        let state = AppState::new(
            Arc::new(SqliteContentStore::new_in_memory().unwrap()),
            CountingSynthesizer::new(Duration::ZERO),
            &fast_settings(),
        );
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        assert_eq!(load_daily_for(&state, date).await, None);
        assert_eq!(get_session(&state).await.daily, None);
    }

    #[tokio::test]
    async fn test_submit_entry_reports_duplicates() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());

        let outcome = submit_entry(&state, Category::Keyword, "  고양이 ".to_string()).await.unwrap();
        match outcome {
            SubmitOutcome::Inserted { entry } => assert_eq!(entry.content, "고양이"),
            other => panic!("expected insert, got {:?}", other),
        }

        assert_eq!(
            submit_entry(&state, Category::Keyword, "고양이".to_string()).await,
            Err("입력하신 단어는 이미 존재합니다.".to_string())
        );
        assert_eq!(
            submit_entry(&state, Category::Metaphor, "   ".to_string()).await,
            Ok(SubmitOutcome::Skipped)
        );
    }

    #[tokio::test]
    async fn test_submit_content_returns_to_generate_only_on_success() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());

        set_mode(&state, Mode::AddContent).await;
        let report = submit_content(
            &state,
            ContentDraft {
                problem: "야근".to_string(),
                keyword: "B".to_string(),
                metaphor: String::new(),
            },
        )
        .await;
        assert!(matches!(report.problem, FieldOutcome::Inserted { .. }));
        assert!(matches!(report.keyword, FieldOutcome::Duplicate { .. }));
        assert_eq!(report.metaphor, FieldOutcome::Skipped);
        assert_eq!(get_session(&state).await.mode, Mode::AddContent);

        let report = submit_content(
            &state,
            ContentDraft {
                keyword: "강아지".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(report.all_succeeded());
        assert_eq!(get_session(&state).await.mode, Mode::Generate);
    }

    #[tokio::test]
    async fn test_validate_entry_through_state() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());

        assert!(matches!(
            validate_entry(&state, Category::Problem, "A".to_string()).await,
            ValidationOutcome::Duplicate { .. }
        ));
        assert_eq!(
            validate_entry(&state, Category::Problem, "Z".to_string()).await,
            ValidationOutcome::Clear
        );
    }

    #[tokio::test]
    async fn test_share_requires_a_combination() {
        let state = AppState::new(abc_store().await, CountingSynthesizer::new(Duration::ZERO), &fast_settings());
        assert!(share_payload(&state).await.is_err());

        let combination = generate(&state).await.unwrap();
        assert_eq!(
            export_file_name(&state).await.unwrap(),
            format!("inspiration-{}.png", combination.created_at)
        );
        assert_eq!(share_payload(&state).await.unwrap().title, "엉뚱한 영감 한 스푼");
    }
}
