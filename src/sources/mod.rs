//! Collaborator interfaces consumed by the settings model.
//!
//! Each external service is a trait held as `Arc<dyn ...>` so tests and the
//! inspection binary can plug in [`MemoryBackend`]. Async calls return boxed
//! `'static` futures, which lets the reactor hand them to spawned workers.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::state::{
    DictionaryStatus, InputMethodEvent, InputMethodLists, Language, LanguagePackStatus,
    LanguagePackStatusChange, PrefPath, PrefValue,
};

mod fixture;
mod memory;

pub use fixture::{Fixture, load_fixture};
pub use memory::{FetchSource, MemoryBackend};

/// Result alias for collaborator calls.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// What: Language catalog and translate settings service.
///
/// Details:
/// - All reads are asynchronous; the model never blocks on them.
pub trait LanguageCatalog: Send + Sync {
    /// Full language catalog.
    fn list_languages(&self) -> BoxFuture<'static, Result<Vec<Language>>>;
    /// Current translate target code.
    fn translate_target(&self) -> BoxFuture<'static, Result<String>>;
    /// Codes always translated.
    fn always_translate(&self) -> BoxFuture<'static, Result<Vec<String>>>;
    /// Codes never translated.
    fn never_translate(&self) -> BoxFuture<'static, Result<Vec<String>>>;
    /// Prospective UI language; empty when the platform reports none.
    fn prospective_ui_language(&self) -> BoxFuture<'static, Result<String>>;
}

/// What: Input-method catalog and engine service.
pub trait InputMethodService: Send + Sync {
    /// Component and third-party engine catalogs.
    fn list_input_methods(&self) -> BoxFuture<'static, Result<InputMethodLists>>;
    /// Active engine id.
    fn current_input_method(&self) -> BoxFuture<'static, Result<String>>;
    /// # Errors
    /// - Returns `Err` when the engine rejects the id.
    fn set_current_input_method(&self, id: &str) -> Result<()>;
    /// # Errors
    /// - Returns `Err` when the engine preferences cannot be written.
    fn add_input_method(&self, id: &str) -> Result<()>;
    /// # Errors
    /// - Returns `Err` when the engine preferences cannot be written.
    fn remove_input_method(&self, id: &str) -> Result<()>;
    /// # Errors
    /// - Returns `Err` when the engine has no options page.
    fn open_options_page(&self, id: &str) -> Result<()>;
    /// Push stream of engine added/removed/current-changed events.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<InputMethodEvent>;
}

/// What: Preference store, the single source of truth for user choices.
pub trait PrefStore: Send + Sync {
    /// Resolves once the store has loaded; nothing is derived before that.
    fn initialized(&self) -> BoxFuture<'static, Result<()>>;
    /// Current value; unset paths report [`PrefPath::default_value`].
    fn get(&self, path: PrefPath) -> PrefValue;
    /// # Errors
    /// - Returns `Err` when the store refuses the write.
    fn set(&self, path: PrefPath, value: PrefValue) -> Result<()>;
    /// Push stream of changed paths.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<PrefPath>;
}

/// What: Spellcheck dictionary download service.
pub trait DictionaryService: Send + Sync {
    /// Status of every known dictionary.
    fn dictionary_statuses(&self) -> BoxFuture<'static, Result<Vec<DictionaryStatus>>>;
    /// # Errors
    /// - Returns `Err` when the retry cannot be scheduled.
    fn retry_download(&self, code: &str) -> Result<()>;
    /// Push stream of status batches.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<DictionaryStatus>>;
}

/// What: Language-pack installer status service.
pub trait LanguagePackService: Send + Sync {
    /// Status of the pack backing engine `id`.
    fn status(&self, id: &str) -> BoxFuture<'static, Result<LanguagePackStatus>>;
    /// Push stream of status changes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<LanguagePackStatusChange>;
}

/// Bundle of collaborator handles injected into a settings session.
#[derive(Clone)]
pub struct Services {
    /// Language catalog.
    pub catalog: Arc<dyn LanguageCatalog>,
    /// Input-method engine.
    pub input_methods: Arc<dyn InputMethodService>,
    /// Preference store.
    pub prefs: Arc<dyn PrefStore>,
    /// Dictionary service.
    pub dictionaries: Arc<dyn DictionaryService>,
    /// Language-pack service.
    pub language_packs: Arc<dyn LanguagePackService>,
}

impl Services {
    /// What: Wire every collaborator to the same in-memory backend.
    #[must_use]
    pub fn from_backend(backend: &Arc<MemoryBackend>) -> Self {
        Self {
            catalog: backend.clone(),
            input_methods: backend.clone(),
            prefs: backend.clone(),
            dictionaries: backend.clone(),
            language_packs: backend.clone(),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
