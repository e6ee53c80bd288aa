//! Library entry for langsettings exposing the settings session for the
//! binary and integration tests.

pub mod app;
pub mod args;
pub mod config;
pub mod index;
pub mod logic;
pub mod sources;
pub mod state;

pub use app::{LanguageSettings, SettingsError};
