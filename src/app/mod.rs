//! Settings session runtime.
//!
//! The session is split into small files: channel plumbing, the dispatch
//! table, initial construction, the reactor task, and the public handle.

/// Internal channels between the handle, the reactor and its workers.
pub mod channels;
/// Dispatch table from changed inputs to derivation steps.
pub mod dispatch;
pub mod error;
/// Initial fan-out fetch and model construction.
pub mod init;
pub mod pack_cache;
/// Single-writer reactor task.
mod reactor;
/// Public session handle.
mod session;

pub use error::SettingsError;
pub use pack_cache::LanguagePackCache;
pub use session::LanguageSettings;
