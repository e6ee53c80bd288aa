//! In-memory implementation of every collaborator interface.
//!
//! Backs the inspection binary and the test suites. Writes through
//! [`PrefStore::set`] notify subscribers the way a real preference store does,
//! so mutators round-trip through the same change path as external edits.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use super::{
    DictionaryService, InputMethodService, LanguageCatalog, LanguagePackService, PrefStore, Result,
};
use crate::logic::COMPONENT_IME_PREFIX;
use crate::state::{
    DictionaryStatus, InputMethod, InputMethodEvent, InputMethodLists, Language,
    LanguagePackStatus, LanguagePackStatusChange, PrefPath, PrefValue,
};

/// Upstream call that can be made to fail for testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchSource {
    /// `list_languages`.
    Languages,
    /// `translate_target`.
    TranslateTarget,
    /// `always_translate`.
    AlwaysTranslate,
    /// `never_translate`.
    NeverTranslate,
    /// `prospective_ui_language`.
    ProspectiveUiLanguage,
    /// `list_input_methods`.
    InputMethods,
    /// `current_input_method`.
    CurrentInputMethod,
    /// `initialized` on the preference store.
    Prefs,
    /// Preference writes.
    PrefWrites,
    /// `dictionary_statuses`.
    DictionaryStatuses,
    /// Language-pack `status`.
    LanguagePack,
}

/// Mutable backend contents.
#[derive(Default)]
struct Inner {
    /// Language catalog.
    languages: Vec<Language>,
    /// Component engines.
    component_imes: Vec<InputMethod>,
    /// Third-party engines.
    third_party_imes: Vec<InputMethod>,
    /// Active engine id.
    current_input_method: String,
    /// Translate target reported by the catalog.
    translate_target: String,
    /// Prospective UI language reported by the catalog.
    prospective_ui_language: String,
    /// Always-translate codes reported by the catalog.
    always_translate: Vec<String>,
    /// Never-translate codes reported by the catalog.
    never_translate: Vec<String>,
    /// Stored preference values.
    prefs: HashMap<PrefPath, PrefValue>,
    /// Dictionary statuses returned by fetches.
    dictionary_statuses: Vec<DictionaryStatus>,
    /// Language-pack statuses returned by fetches.
    pack_statuses: HashMap<String, LanguagePackStatus>,
    /// Number of language-pack fetches issued per id.
    pack_fetches: HashMap<String, usize>,
    /// Calls configured to fail.
    failing: HashSet<FetchSource>,
    /// Preference paths whose writes are rejected.
    rejected_writes: HashSet<PrefPath>,
    /// Delay applied to every async call.
    latency: Option<Duration>,
    /// Dictionary retries requested.
    retried_dictionaries: Vec<String>,
    /// Options pages opened.
    opened_options: Vec<String>,
    /// Preference change subscribers.
    pref_subscribers: Vec<mpsc::UnboundedSender<PrefPath>>,
    /// Engine event subscribers.
    ime_subscribers: Vec<mpsc::UnboundedSender<InputMethodEvent>>,
    /// Dictionary status subscribers.
    dictionary_subscribers: Vec<mpsc::UnboundedSender<Vec<DictionaryStatus>>>,
    /// Language-pack subscribers.
    pack_subscribers: Vec<mpsc::UnboundedSender<LanguagePackStatusChange>>,
}

/// In-memory collaborator backend.
#[derive(Default)]
pub struct MemoryBackend {
    /// Guarded contents.
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").finish_non_exhaustive()
    }
}

/// What: Deliver `event` to every live subscriber, dropping closed ones.
fn broadcast<T: Clone>(subscribers: &mut Vec<mpsc::UnboundedSender<T>>, event: &T) {
    subscribers.retain(|tx| tx.send(event.clone()).is_ok());
}

impl MemoryBackend {
    /// What: Create an empty backend (no languages, no engines, default prefs).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the contents, recovering from a poisoned mutex.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Build a response future honouring configured latency and failures.
    ///
    /// Inputs:
    /// - `source`: Which upstream call this is (for failure injection).
    /// - `value`: Value returned on success.
    fn respond<T: Send + 'static>(&self, source: FetchSource, value: T) -> BoxFuture<'static, Result<T>> {
        let (latency, fail) = {
            let inner = self.lock();
            (inner.latency, inner.failing.contains(&source))
        };
        async move {
            if let Some(delay) = latency {
                tokio::time::sleep(delay).await;
            }
            if fail {
                return Err(format!("{source:?} unavailable").into());
            }
            Ok(value)
        }
        .boxed()
    }

    /// What: Replace the language catalog.
    pub fn set_languages(&self, languages: Vec<Language>) {
        self.lock().languages = languages;
    }

    /// What: Replace both engine catalogs.
    pub fn set_input_methods(&self, component: Vec<InputMethod>, third_party: Vec<InputMethod>) {
        let mut inner = self.lock();
        inner.component_imes = component;
        inner.third_party_imes = third_party;
    }

    /// What: Set the active engine without emitting an event.
    pub fn set_current_input_method_id(&self, id: &str) {
        self.lock().current_input_method = id.to_string();
    }

    /// What: Set the translate target reported by the catalog.
    pub fn set_translate_target(&self, code: &str) {
        self.lock().translate_target = code.to_string();
    }

    /// What: Set the prospective UI language reported by the catalog.
    pub fn set_prospective_ui_language(&self, code: &str) {
        self.lock().prospective_ui_language = code.to_string();
    }

    /// What: Set the always/never translate lists reported by the catalog.
    pub fn set_translate_lists(&self, always: Vec<String>, never: Vec<String>) {
        let mut inner = self.lock();
        inner.always_translate = always;
        inner.never_translate = never;
    }

    /// What: Store a preference value without notifying subscribers.
    ///
    /// Details:
    /// - Used to seed state before a session connects.
    pub fn seed_pref(&self, path: PrefPath, value: PrefValue) {
        self.lock().prefs.insert(path, value);
    }

    /// What: Set the dictionary statuses returned by fetches, without pushing.
    pub fn set_dictionary_statuses(&self, statuses: Vec<DictionaryStatus>) {
        self.lock().dictionary_statuses = statuses;
    }

    /// What: Set the status a language-pack fetch for `id` will return.
    pub fn set_language_pack_status(&self, id: &str, status: LanguagePackStatus) {
        self.lock().pack_statuses.insert(id.to_string(), status);
    }

    /// What: Delay every async response by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    /// What: Reject writes to `path` only, until [`Self::accept_writes_to`].
    pub fn reject_writes_to(&self, path: PrefPath) {
        self.lock().rejected_writes.insert(path);
    }

    /// What: Accept writes to `path` again.
    pub fn accept_writes_to(&self, path: PrefPath) {
        self.lock().rejected_writes.remove(&path);
    }

    /// What: Make calls of kind `source` fail until [`Self::recover`].
    pub fn fail(&self, source: FetchSource) {
        self.lock().failing.insert(source);
    }

    /// What: Undo [`Self::fail`] for `source`.
    pub fn recover(&self, source: FetchSource) {
        self.lock().failing.remove(&source);
    }

    /// What: Number of language-pack fetches issued for `id` so far.
    #[must_use]
    pub fn language_pack_fetch_count(&self, id: &str) -> usize {
        self.lock().pack_fetches.get(id).copied().unwrap_or(0)
    }

    /// What: Dictionary codes passed to `retry_download`, in call order.
    #[must_use]
    pub fn retried_dictionaries(&self) -> Vec<String> {
        self.lock().retried_dictionaries.clone()
    }

    /// What: Engine ids passed to `open_options_page`, in call order.
    #[must_use]
    pub fn opened_options(&self) -> Vec<String> {
        self.lock().opened_options.clone()
    }

    /// What: Install an engine and emit `InputMethodEvent::Added`.
    ///
    /// Inputs:
    /// - `input_method`: Engine to add; ids starting with `_comp_` join the component list.
    pub fn push_input_method_added(&self, input_method: InputMethod) {
        let mut inner = self.lock();
        let id = input_method.id.clone();
        if id.starts_with(COMPONENT_IME_PREFIX) {
            inner.component_imes.push(input_method);
        } else {
            inner.third_party_imes.push(input_method);
        }
        broadcast(&mut inner.ime_subscribers, &InputMethodEvent::Added(id));
    }

    /// What: Uninstall an engine and emit `InputMethodEvent::Removed`.
    pub fn push_input_method_removed(&self, id: &str) {
        let mut inner = self.lock();
        inner.component_imes.retain(|m| m.id != id);
        inner.third_party_imes.retain(|m| m.id != id);
        broadcast(
            &mut inner.ime_subscribers,
            &InputMethodEvent::Removed(id.to_string()),
        );
    }

    /// What: Switch the active engine and emit `InputMethodEvent::CurrentChanged`.
    pub fn push_current_input_method(&self, id: &str) {
        let mut inner = self.lock();
        inner.current_input_method = id.to_string();
        broadcast(
            &mut inner.ime_subscribers,
            &InputMethodEvent::CurrentChanged(id.to_string()),
        );
    }

    /// What: Store and push a dictionary status batch.
    pub fn push_dictionary_statuses(&self, statuses: Vec<DictionaryStatus>) {
        let mut inner = self.lock();
        for status in &statuses {
            if let Some(existing) = inner
                .dictionary_statuses
                .iter_mut()
                .find(|s| s.language_code == status.language_code)
            {
                *existing = status.clone();
            } else {
                inner.dictionary_statuses.push(status.clone());
            }
        }
        broadcast(&mut inner.dictionary_subscribers, &statuses);
    }

    /// What: Store and push a language-pack status change for `ids`.
    pub fn push_language_pack_status(&self, ids: &[&str], status: LanguagePackStatus) {
        let mut inner = self.lock();
        for id in ids {
            inner.pack_statuses.insert((*id).to_string(), status);
        }
        let change = LanguagePackStatusChange {
            engine_ids: ids.iter().map(|s| (*s).to_string()).collect(),
            status,
        };
        broadcast(&mut inner.pack_subscribers, &change);
    }

    /// What: Populate the backend from a parsed fixture.
    pub fn load(&self, fixture: super::Fixture) {
        let mut inner = self.lock();
        inner.languages = fixture.languages;
        inner.component_imes = fixture.component_extension_imes;
        inner.third_party_imes = fixture.third_party_extension_imes;
        inner.current_input_method = fixture.current_input_method;
        inner.translate_target = fixture.translate_target;
        inner.prospective_ui_language = fixture.prospective_ui_language;
        inner.always_translate = fixture.always_translate;
        inner.never_translate = fixture.never_translate;
        inner.dictionary_statuses = fixture.dictionary_statuses;
        inner.pack_statuses = fixture.language_pack_statuses;
        for (key, value) in fixture.prefs {
            match PrefPath::from_key(&key) {
                Some(path) => {
                    inner.prefs.insert(path, value);
                }
                None => tracing::debug!(key = %key, "ignoring unobserved fixture preference"),
            }
        }
    }
}

/// Preference holding engines of the given id's kind.
fn engine_pref_for(id: &str) -> PrefPath {
    if id.starts_with(COMPONENT_IME_PREFIX) {
        PrefPath::PreloadEngines
    } else {
        PrefPath::EnabledExtensionImes
    }
}

impl LanguageCatalog for MemoryBackend {
    fn list_languages(&self) -> BoxFuture<'static, Result<Vec<Language>>> {
        let languages = self.lock().languages.clone();
        self.respond(FetchSource::Languages, languages)
    }

    fn translate_target(&self) -> BoxFuture<'static, Result<String>> {
        // A recent target written through the preference store wins.
        let target = {
            let inner = self.lock();
            inner
                .prefs
                .get(&PrefPath::TranslateRecentTarget)
                .map(|v| v.as_str().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| inner.translate_target.clone())
        };
        self.respond(FetchSource::TranslateTarget, target)
    }

    fn always_translate(&self) -> BoxFuture<'static, Result<Vec<String>>> {
        let codes = self.lock().always_translate.clone();
        self.respond(FetchSource::AlwaysTranslate, codes)
    }

    fn never_translate(&self) -> BoxFuture<'static, Result<Vec<String>>> {
        let codes = self.lock().never_translate.clone();
        self.respond(FetchSource::NeverTranslate, codes)
    }

    fn prospective_ui_language(&self) -> BoxFuture<'static, Result<String>> {
        let code = self.lock().prospective_ui_language.clone();
        self.respond(FetchSource::ProspectiveUiLanguage, code)
    }
}

impl InputMethodService for MemoryBackend {
    fn list_input_methods(&self) -> BoxFuture<'static, Result<InputMethodLists>> {
        let lists = {
            let inner = self.lock();
            InputMethodLists {
                component_extension_imes: inner.component_imes.clone(),
                third_party_extension_imes: inner.third_party_imes.clone(),
            }
        };
        self.respond(FetchSource::InputMethods, lists)
    }

    fn current_input_method(&self) -> BoxFuture<'static, Result<String>> {
        let id = self.lock().current_input_method.clone();
        self.respond(FetchSource::CurrentInputMethod, id)
    }

    fn set_current_input_method(&self, id: &str) -> Result<()> {
        self.push_current_input_method(id);
        Ok(())
    }

    fn add_input_method(&self, id: &str) -> Result<()> {
        let path = engine_pref_for(id);
        let mut ids = self.get(path).to_list();
        if ids.iter().any(|existing| existing == id) {
            return Ok(());
        }
        ids.push(id.to_string());
        self.set(path, PrefValue::comma_joined(&ids))
    }

    fn remove_input_method(&self, id: &str) -> Result<()> {
        for path in [PrefPath::PreloadEngines, PrefPath::EnabledExtensionImes] {
            let ids = self.get(path).to_list();
            if ids.iter().any(|existing| existing == id) {
                let kept: Vec<String> = ids.into_iter().filter(|existing| existing != id).collect();
                self.set(path, PrefValue::comma_joined(&kept))?;
            }
        }
        Ok(())
    }

    fn open_options_page(&self, id: &str) -> Result<()> {
        self.lock().opened_options.push(id.to_string());
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<InputMethodEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().ime_subscribers.push(tx);
        rx
    }
}

impl PrefStore for MemoryBackend {
    fn initialized(&self) -> BoxFuture<'static, Result<()>> {
        self.respond(FetchSource::Prefs, ())
    }

    fn get(&self, path: PrefPath) -> PrefValue {
        self.lock()
            .prefs
            .get(&path)
            .cloned()
            .unwrap_or_else(|| path.default_value())
    }

    fn set(&self, path: PrefPath, value: PrefValue) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing.contains(&FetchSource::PrefWrites) || inner.rejected_writes.contains(&path) {
            return Err(format!("write to {} rejected", path.key()).into());
        }
        if inner.prefs.get(&path) == Some(&value) {
            return Ok(());
        }
        inner.prefs.insert(path, value);
        broadcast(&mut inner.pref_subscribers, &path);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<PrefPath> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().pref_subscribers.push(tx);
        rx
    }
}

impl DictionaryService for MemoryBackend {
    fn dictionary_statuses(&self) -> BoxFuture<'static, Result<Vec<DictionaryStatus>>> {
        let statuses = self.lock().dictionary_statuses.clone();
        self.respond(FetchSource::DictionaryStatuses, statuses)
    }

    fn retry_download(&self, code: &str) -> Result<()> {
        self.lock().retried_dictionaries.push(code.to_string());
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<DictionaryStatus>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().dictionary_subscribers.push(tx);
        rx
    }
}

impl LanguagePackService for MemoryBackend {
    fn status(&self, id: &str) -> BoxFuture<'static, Result<LanguagePackStatus>> {
        let status = {
            let mut inner = self.lock();
            *inner.pack_fetches.entry(id.to_string()).or_insert(0) += 1;
            inner.pack_statuses.get(id).copied().unwrap_or_default()
        };
        self.respond(FetchSource::LanguagePack, status)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<LanguagePackStatusChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().pack_subscribers.push(tx);
        rx
    }
}
