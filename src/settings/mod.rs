pub mod manager;


pub use manager::{
    GenerationSettings, LoggingSettings, Settings, SettingsManager, StoreSettings,
    SynthesizerSettings,
};
