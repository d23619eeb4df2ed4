use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::synthesis::chat_provider::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Main settings structure containing all application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub synthesizer: SynthesizerSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Description synthesizer settings. The API key itself is never stored here,
/// only the name of the environment variable holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizerSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Timing of the generate flow and of live duplicate checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_min_generating_ms")]
    pub min_generating_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub duplicate_check_debounce_ms: u64,
}

/// Content database location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreSettings {
    /// Explicit database file. `None` means the app data directory.
    #[serde(default)]
    pub database_path: Option<String>,
}

/// Log file rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_keep_files")]
    pub keep_files: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_min_generating_ms() -> u64 {
    800
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_keep_files() -> usize {
    5
}

impl Default for SynthesizerSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_generating_ms: default_min_generating_ms(),
            duplicate_check_debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            keep_files: default_keep_files(),
        }
    }
}

impl Settings {
    /// Resolve the content database path: explicit setting first, then the
    /// platform data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.store.database_path {
            Some(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => crate::app_data_dir().map(|d| d.join("inspiration.db")),
        }
    }
}

/// Manages settings persistence and provides thread-safe access
pub struct SettingsManager {
    settings_path: PathBuf,
    current_settings: Arc<RwLock<Settings>>,
}

impl SettingsManager {
    /// Creates a new SettingsManager backed by `~/.quirky-inspiration/settings.json`
    ///
    /// If the settings file doesn't exist, creates it with default values.
    pub fn new() -> Result<Self, String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| "Failed to get home directory".to_string())?;

        let settings_path = home_dir.join(".quirky-inspiration").join("settings.json");

        Self::new_with_path(settings_path)
    }

    /// Creates a new SettingsManager with a custom settings path
    ///
    /// # Errors
    ///
    /// Returns an error if the settings directory cannot be created or the
    /// settings file cannot be read or written.
    pub fn new_with_path(settings_path: PathBuf) -> Result<Self, String> {
        if let Some(parent) = settings_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create settings directory: {}", e))?;
            }
        }

        let manager = Self {
            settings_path: settings_path.clone(),
            current_settings: Arc::new(RwLock::new(Settings::default())),
        };

        let settings = if settings_path.exists() {
            manager.load_from_file()?
        } else {
            let defaults = Settings::default();
            manager.save_to_file(&defaults)?;
            defaults
        };

        *manager.current_settings.write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))? = settings;

        Ok(manager)
    }

    /// Returns a clone of the current settings
    pub fn get(&self) -> Settings {
        match self.current_settings.read() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Validate, persist to disk, then swap in memory.
    ///
    /// In-memory state is only replaced once the file write succeeded, so it
    /// never runs ahead of what is on disk.
    pub fn update(&self, settings: Settings) -> Result<(), String> {
        Self::validate(&settings)?;

        self.save_to_file(&settings)?;

        *self.current_settings.write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))? = settings;

        Ok(())
    }

    /// Validates settings constraints
    pub fn validate(settings: &Settings) -> Result<(), String> {
        let synth = &settings.synthesizer;
        if synth.enabled {
            if !(synth.endpoint.starts_with("http://") || synth.endpoint.starts_with("https://")) {
                return Err(format!(
                    "Synthesizer endpoint must be an http(s) URL, got '{}'",
                    synth.endpoint
                ));
            }
            if synth.model.trim().is_empty() {
                return Err("Synthesizer model cannot be empty".to_string());
            }
            if synth.api_key_env.trim().is_empty() {
                return Err("Synthesizer API key variable name cannot be empty".to_string());
            }
        }

        if synth.max_tokens == 0 || synth.max_tokens > 1024 {
            return Err(format!(
                "max_tokens must be between 1 and 1024, got {}",
                synth.max_tokens
            ));
        }

        if synth.timeout_secs == 0 || synth.timeout_secs > 120 {
            return Err(format!(
                "timeout_secs must be between 1 and 120, got {}",
                synth.timeout_secs
            ));
        }

        if settings.generation.min_generating_ms > 5000 {
            return Err(format!(
                "min_generating_ms must be at most 5000, got {}",
                settings.generation.min_generating_ms
            ));
        }

        if settings.generation.duplicate_check_debounce_ms > 5000 {
            return Err(format!(
                "duplicate_check_debounce_ms must be at most 5000, got {}",
                settings.generation.duplicate_check_debounce_ms
            ));
        }

        if settings.logging.keep_files == 0 || settings.logging.keep_files > 50 {
            return Err(format!(
                "keep_files must be between 1 and 50, got {}",
                settings.logging.keep_files
            ));
        }

        Ok(())
    }

    /// Loads settings from disk, falling back to defaults on invalid JSON
    fn load_from_file(&self) -> Result<Settings, String> {
        let contents = std::fs::read_to_string(&self.settings_path)
            .map_err(|e| format!("Failed to read settings file: {}", e))?;

        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                eprintln!("Settings: Failed to parse settings JSON: {}. Using defaults.", e);
                Ok(Settings::default())
            }
        }
    }

    /// Saves settings to disk via temp file + rename
    fn save_to_file(&self, settings: &Settings) -> Result<(), String> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        let temp_path = self.settings_path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)
            .map_err(|e| format!("Failed to write temporary settings file: {}", e))?;

        std::fs::rename(&temp_path, &self.settings_path)
            .map_err(|e| format!("Failed to rename settings file: {}", e))?;

        Ok(())
    }
}
