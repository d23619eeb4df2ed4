// Module declarations
pub mod combination;
pub mod commands;
pub mod content;
pub mod error;
pub mod logging;
pub mod session;
pub mod settings;
pub mod share;
pub mod state;
pub mod synthesis;
pub mod validation;

use std::path::PathBuf;
use std::time::Duration;

use combination::ContentDraft;
use content::Category;
use settings::SettingsManager;
use state::{AppState, SessionEvent};

const USAGE: &str = "usage: quirky-inspiration [daily | generate | add <problem> <keyword> <metaphor> | add-one <category> <text> | check]";

/// Per-user data directory for the content database and logs
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("com.quirky.inspiration"))
}

/// Terminal entry point. Builds the app state from settings and runs one
/// command against it.
pub async fn run(args: Vec<String>) -> Result<(), String> {
    let settings_manager = SettingsManager::new()
        .map_err(|e| format!("Failed to initialize SettingsManager: {}", e))?;
    let settings = settings_manager.get();

    if let Some(dir) = logging::logs_dir() {
        logging::init(&dir, settings.logging.keep_files);
    }

    let state = AppState::from_settings(&settings)?;

    let availability = commands::check_synthesizer(&state).await;
    if !availability.available {
        eprintln!(
            "App: Descriptions disabled: {}",
            availability.reason.as_deref().unwrap_or("unknown reason")
        );
    }

    let wait = Duration::from_secs(settings.synthesizer.timeout_secs + 1);
    let command = args.first().map(String::as_str).unwrap_or("daily");

    // Loading persists today's record, so only do it where one is shown
    let daily = if shows_daily(command) {
        commands::load_daily(&state).await
    } else {
        None
    };

    match command {
        "daily" => {
            match daily {
                Some(daily) => println!("{}", share::plain_text(&daily)),
                None => println!("오늘의 영감이 아직 없습니다."),
            }
            Ok(())
        }
        "generate" => generate(&state, wait).await,
        "add" => {
            let [problem, keyword, metaphor] = match &args[1..] {
                [p, k, m] => [p.clone(), k.clone(), m.clone()],
                _ => return Err(USAGE.to_string()),
            };
            let report = commands::submit_content(&state, ContentDraft { problem, keyword, metaphor }).await;
            for category in Category::ALL {
                println!("{}: {:?}", category.label(), report.field(category));
            }
            if report.all_succeeded() {
                Ok(())
            } else {
                Err("Some fields were not added".to_string())
            }
        }
        "add-one" => {
            let category: Category = args.get(1).ok_or_else(|| USAGE.to_string())?.parse()?;
            let text = args[2..].join(" ");
            let outcome = commands::submit_entry(&state, category, text).await?;
            println!("{:?}", outcome);
            Ok(())
        }
        "check" => {
            println!("{}", serde_json::to_string_pretty(&availability).map_err(|e| e.to_string())?);
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    }
}

/// Commands that show or build on today's combination
fn shows_daily(command: &str) -> bool {
    matches!(command, "daily" | "generate")
}

/// Roll once, print the triple, then wait for its description.
async fn generate(state: &AppState, wait: Duration) -> Result<(), String> {
    let mut events = state.subscribe();
    let combination = commands::generate(state).await?;
    println!("{} × {} × {}", combination.problem, combination.keyword, combination.metaphor);

    if combination.is_fallback() {
        return Ok(());
    }

    let key = combination.created_at;
    let outcome = tokio::time::timeout(wait, async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::DescriptionReady { key: k, description }) if k == key => {
                    return Some(description);
                }
                Ok(SessionEvent::DescriptionUnavailable { key: k }) if k == key => return None,
                Ok(_) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    })
    .await;

    if let Ok(Some(description)) = outcome {
        println!("\n{}", description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_viewing_commands_load_the_daily_combination() {
        assert!(shows_daily("daily"));
        assert!(shows_daily("generate"));
        assert!(!shows_daily("add"));
        assert!(!shows_daily("add-one"));
        assert!(!shows_daily("check"));
    }
}
