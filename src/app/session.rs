//! Session handle: lifecycle, snapshots, and preference-writing mutators.
//!
//! Mutators never touch the model. They write the preference store (or call
//! the engine service) and let the reactor re-derive from the resulting
//! change notification, so the store stays the single source of truth.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::logic::{ARC_IME_LANGUAGE, convert_language_code_for_translate};
use crate::sources::Services;
use crate::state::{LanguagePackStatus, Lifecycle, ModelChange, ModelState, PrefPath, PrefValue};

use super::channels::{Channels, Control};
use super::error::SettingsError;
use super::reactor::{self, Outlets};

/// Buffered change notifications per subscriber before it starts lagging.
const CHANGE_CAPACITY: usize = 64;

/// What: One language settings session bound to a set of collaborators.
///
/// Details:
/// - `connect` subscribes to every collaborator stream and spawns the
///   reactor task; the model becomes readable once [`Self::ready`] resolves.
/// - Dropping the handle aborts the reactor; [`Self::shutdown`] stops it
///   gracefully.
pub struct LanguageSettings {
    services: Services,
    lifecycle_rx: watch::Receiver<Lifecycle>,
    snapshot_rx: watch::Receiver<Option<Arc<ModelState>>>,
    change_tx: broadcast::Sender<ModelChange>,
    control_tx: mpsc::UnboundedSender<Control>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LanguageSettings {
    /// What: Start a session.
    ///
    /// Inputs:
    /// - `services`: Collaborators.
    /// - `settings`: Session settings.
    ///
    /// Output:
    /// - Handle in `Uninitialized`/`Building` state.
    ///
    /// Details:
    /// - Must be called inside a tokio runtime.
    #[must_use]
    pub fn connect(services: Services, settings: Settings) -> Self {
        let (channels, control_tx, shutdown_tx) =
            Channels::subscribe(&services, settings.language_packs_enabled);
        let (lifecycle_tx, lifecycle_rx) = watch::channel(Lifecycle::Uninitialized);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (change_tx, _) = broadcast::channel(CHANGE_CAPACITY);
        let outlets = Outlets {
            lifecycle_tx,
            snapshot_tx,
            change_tx: change_tx.clone(),
        };
        info!(
            language_packs = settings.language_packs_enabled,
            "connecting language settings session"
        );
        let task = tokio::spawn(reactor::run(services.clone(), settings, channels, outlets));
        Self {
            services,
            lifecycle_rx,
            snapshot_rx,
            change_tx,
            control_tx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// What: Wait for the model to be published.
    ///
    /// # Errors
    /// - `Unavailable` when construction failed or the reactor is gone,
    ///   including after it reached `Ready`.
    pub async fn ready(&self) -> Result<(), SettingsError> {
        let mut rx = self.lifecycle_rx.clone();
        rx.wait_for(|l| *l == Lifecycle::Ready)
            .await
            .map_err(|_| SettingsError::Unavailable)?;
        // `wait_for` accepts the last value even once the reactor has exited.
        if rx.has_changed().is_err() {
            return Err(SettingsError::Unavailable);
        }
        Ok(())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle_rx.borrow()
    }

    /// What: Latest published snapshot; `None` before ready.
    #[must_use]
    pub fn model(&self) -> Option<Arc<ModelState>> {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver of change notifications published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ModelChange> {
        self.change_tx.subscribe()
    }

    /// What: Resolve once every queued event and in-flight worker was processed.
    ///
    /// # Errors
    /// - `Unavailable` when the reactor is gone.
    pub async fn settled(&self) -> Result<(), SettingsError> {
        let (tx, rx) = oneshot::channel();
        self.control_tx
            .send(Control::Settle(tx))
            .map_err(|_| SettingsError::Unavailable)?;
        rx.await.map_err(|_| SettingsError::Unavailable)
    }

    /// What: Stop the reactor and wait for it to exit.
    ///
    /// Details:
    /// - Releases every collaborator subscription. A build still in flight is
    ///   abandoned without publishing.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "language settings task ended abnormally");
        }
    }

    /// What: Snapshot gate shared by every mutator.
    fn require_model(&self) -> Result<Arc<ModelState>, SettingsError> {
        if let Some(state) = self.model() {
            return Ok(state);
        }
        if self.lifecycle_rx.has_changed().is_err() {
            Err(SettingsError::Unavailable)
        } else {
            Err(SettingsError::NotReady)
        }
    }

    /// Non-empty entries of a list preference.
    fn pref_list(&self, path: PrefPath) -> Vec<String> {
        self.services
            .prefs
            .get(path)
            .to_list()
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn write_accept_languages(&self, codes: &[String]) -> Result<(), SettingsError> {
        debug!(languages = %codes.join(","), "writing enabled languages");
        self.services
            .prefs
            .set(PrefPath::AcceptLanguages, PrefValue::comma_joined(codes))?;
        Ok(())
    }

    /// What: Append `code` to the enabled languages.
    ///
    /// # Errors
    /// - `UnknownLanguage` when the catalog does not list `code`.
    /// - `Disallowed` for prohibited languages and the ARC engine pseudo-language.
    pub fn enable_language(&self, code: &str) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        let Some(language) = state.index.language(code) else {
            return Err(SettingsError::UnknownLanguage(code.to_string()));
        };
        let mut codes = self.pref_list(PrefPath::AcceptLanguages);
        if codes.iter().any(|c| c == code) || state.is_language_enabled(code) {
            return Ok(());
        }
        if !state.can_enable_language(language) {
            warn!(code = %code, "refusing to enable language");
            return Err(SettingsError::Disallowed {
                code: code.to_string(),
                reason: "language cannot be enabled",
            });
        }
        codes.push(code.to_string());
        info!(code = %code, "enabling language");
        self.write_accept_languages(&codes)
    }

    /// What: Remove `code` from the enabled languages.
    ///
    /// # Errors
    /// - `UnknownLanguage` when `code` is not enabled.
    /// - `Disallowed` when it is forced by policy, the last enabled language,
    ///   or the only one not offered for translation; nothing is written.
    pub fn disable_language(&self, code: &str) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        let Some(entry) = state.enabled_language(code) else {
            return Err(SettingsError::UnknownLanguage(code.to_string()));
        };
        let reason = if entry.is_forced {
            Some("language is forced by policy")
        } else if state.model.enabled.len() == 1 {
            Some("last enabled language")
        } else if state.is_only_translate_blocked_language(code) {
            Some("only translate-blocked language")
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(code = %code, reason, "refusing to disable language");
            return Err(SettingsError::Disallowed {
                code: code.to_string(),
                reason,
            });
        }
        let mut codes = self.pref_list(PrefPath::AcceptLanguages);
        codes.retain(|c| c != code);
        info!(code = %code, "disabling language");
        self.write_accept_languages(&codes)
    }

    /// What: Move `code` one known position up or down the enabled list.
    ///
    /// Details:
    /// - Entries the catalog does not know are skipped, so a move always
    ///   passes a visible language. No neighbour in that direction is a no-op.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn move_language(&self, code: &str, up: bool) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        let mut codes = self.pref_list(PrefPath::AcceptLanguages);
        let Some(i) = codes.iter().position(|c| c == code) else {
            return Ok(());
        };
        let known = |c: &String| state.index.contains_language(c);
        let target = if up {
            (0..i).rev().find(|&j| known(&codes[j]))
        } else {
            (i + 1..codes.len()).find(|&j| known(&codes[j]))
        };
        let Some(j) = target else {
            return Ok(());
        };
        let moved = codes.remove(i);
        codes.insert(j, moved);
        debug!(code = %code, up, "moving language");
        self.write_accept_languages(&codes)
    }

    /// What: Move `code` to the front of the enabled list.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn move_language_to_front(&self, code: &str) -> Result<(), SettingsError> {
        self.require_model()?;
        let mut codes = self.pref_list(PrefPath::AcceptLanguages);
        match codes.iter().position(|c| c == code) {
            Some(0) | None => Ok(()),
            Some(i) => {
                let moved = codes.remove(i);
                codes.insert(0, moved);
                debug!(code = %code, "moving language to front");
                self.write_accept_languages(&codes)
            }
        }
    }

    /// What: Turn the user spellcheck dictionary for `code` on or off.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn toggle_spellcheck(&self, code: &str, enabled: bool) -> Result<(), SettingsError> {
        self.require_model()?;
        let mut dictionaries = self.pref_list(PrefPath::SpellcheckDictionaries);
        let present = dictionaries.iter().any(|c| c == code);
        if enabled == present {
            return Ok(());
        }
        if enabled {
            dictionaries.push(code.to_string());
        } else {
            dictionaries.retain(|c| c != code);
        }
        debug!(code = %code, enabled, "toggling spellcheck");
        self.services
            .prefs
            .set(PrefPath::SpellcheckDictionaries, PrefValue::List(dictionaries))?;
        Ok(())
    }

    fn set_translate_blocked(&self, code: &str, blocked: bool) -> Result<(), SettingsError> {
        self.require_model()?;
        let translate_code = convert_language_code_for_translate(code);
        let mut list = self.pref_list(PrefPath::TranslateBlockedLanguages);
        let present = list.contains(&translate_code);
        if blocked == present {
            return Ok(());
        }
        if blocked {
            list.push(translate_code);
        } else {
            list.retain(|c| *c != translate_code);
        }
        debug!(code = %code, blocked, "updating translate-blocked languages");
        self.services
            .prefs
            .set(PrefPath::TranslateBlockedLanguages, PrefValue::List(list))?;
        Ok(())
    }

    /// What: Offer `code` for translation again.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn enable_translate_language(&self, code: &str) -> Result<(), SettingsError> {
        self.set_translate_blocked(code, false)
    }

    /// What: Stop offering `code` for translation.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn disable_translate_language(&self, code: &str) -> Result<(), SettingsError> {
        self.set_translate_blocked(code, true)
    }

    /// What: Add or remove `code` from the always-translate map.
    ///
    /// Details:
    /// - Entries are keyed by translate code and point at the current target.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn set_language_always_translate_state(
        &self,
        code: &str,
        always_translate: bool,
    ) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        let translate_code = convert_language_code_for_translate(code);
        let mut allowlists = self.services.prefs.get(PrefPath::TranslateAllowlists).to_map();
        let changed = if always_translate {
            let target = state.model.translate_target.clone();
            allowlists.insert(translate_code, target.clone()) != Some(target)
        } else {
            allowlists.remove(&translate_code).is_some()
        };
        if !changed {
            return Ok(());
        }
        debug!(code = %code, always_translate, "updating always-translate languages");
        self.services
            .prefs
            .set(PrefPath::TranslateAllowlists, PrefValue::Map(allowlists))?;
        Ok(())
    }

    /// What: Make `code` the translate target, enabling it if needed.
    ///
    /// Details:
    /// - The target is written before the enabled list. When the list write
    ///   fails the previous target preference is restored.
    ///
    /// # Errors
    /// - `UnknownLanguage` when the catalog does not list `code`.
    /// - `Store` when a preference write fails.
    pub fn set_translate_target_language(&self, code: &str) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        if !state.index.contains_language(code) {
            return Err(SettingsError::UnknownLanguage(code.to_string()));
        }
        info!(code = %code, "setting translate target");
        let previous = self.services.prefs.get(PrefPath::TranslateRecentTarget);
        self.services.prefs.set(
            PrefPath::TranslateRecentTarget,
            PrefValue::Str(convert_language_code_for_translate(code)),
        )?;
        let mut codes = self.pref_list(PrefPath::AcceptLanguages);
        if codes.iter().any(|c| c == code) || state.is_language_enabled(code) {
            return Ok(());
        }
        codes.push(code.to_string());
        if let Err(e) = self.write_accept_languages(&codes) {
            warn!(code = %code, error = %e, "restoring translate target");
            if let Err(restore) = self.services.prefs.set(PrefPath::TranslateRecentTarget, previous) {
                warn!(error = %restore, "failed to restore translate target");
            }
            return Err(e);
        }
        Ok(())
    }

    /// What: Choose the UI language applied after restart.
    ///
    /// # Errors
    /// - `Store` when the preference write fails.
    pub fn set_prospective_ui_language(&self, code: &str) -> Result<(), SettingsError> {
        self.require_model()?;
        info!(code = %code, "setting prospective UI language");
        self.services
            .prefs
            .set(PrefPath::AppLocale, PrefValue::Str(code.to_string()))?;
        Ok(())
    }

    /// Pseudo-language code used by ARC input methods.
    #[must_use]
    pub const fn arc_ime_language_code(&self) -> &'static str {
        ARC_IME_LANGUAGE
    }

    /// What: Gate for engine operations: the id must be in the catalog.
    fn require_input_method(&self, id: &str) -> Result<(), SettingsError> {
        let state = self.require_model()?;
        if state.index.contains_input_method(id) {
            Ok(())
        } else {
            warn!(id = %id, "unknown input method");
            Err(SettingsError::UnknownInputMethod(id.to_string()))
        }
    }

    /// What: Enable engine `id` through the engine service.
    ///
    /// # Errors
    /// - `UnknownInputMethod` for ids absent from the catalog.
    /// - `Store` when the service rejects the change.
    pub fn add_input_method(&self, id: &str) -> Result<(), SettingsError> {
        self.require_input_method(id)?;
        info!(id = %id, "adding input method");
        self.services.input_methods.add_input_method(id)?;
        Ok(())
    }

    /// What: Disable engine `id` through the engine service.
    ///
    /// # Errors
    /// - `UnknownInputMethod` for ids absent from the catalog.
    /// - `Store` when the service rejects the change.
    pub fn remove_input_method(&self, id: &str) -> Result<(), SettingsError> {
        self.require_input_method(id)?;
        info!(id = %id, "removing input method");
        self.services.input_methods.remove_input_method(id)?;
        Ok(())
    }

    /// What: Switch the active engine.
    ///
    /// # Errors
    /// - `UnknownInputMethod` for ids absent from the catalog.
    /// - `Store` when the service rejects the change.
    pub fn set_current_input_method(&self, id: &str) -> Result<(), SettingsError> {
        self.require_input_method(id)?;
        debug!(id = %id, "setting current input method");
        self.services.input_methods.set_current_input_method(id)?;
        Ok(())
    }

    /// What: Open the options page of engine `id`.
    ///
    /// # Errors
    /// - `UnknownInputMethod` for ids absent from the catalog.
    /// - `Store` when the engine has no options page.
    pub fn open_input_method_options(&self, id: &str) -> Result<(), SettingsError> {
        self.require_input_method(id)?;
        self.services.input_methods.open_options_page(id)?;
        Ok(())
    }

    /// What: Ask the engine service for the active engine id.
    ///
    /// # Errors
    /// - `Service` when the service call fails.
    pub async fn current_input_method(&self) -> Result<String, SettingsError> {
        self.services
            .input_methods
            .current_input_method()
            .await
            .map_err(|e| SettingsError::Service(e.to_string()))
    }

    /// What: Retry the dictionary download for `code`.
    ///
    /// # Errors
    /// - `Store` when the retry cannot be scheduled.
    pub fn retry_download_dictionary(&self, code: &str) -> Result<(), SettingsError> {
        self.require_model()?;
        debug!(code = %code, "retrying dictionary download");
        self.services.dictionaries.retry_download(code)?;
        Ok(())
    }

    /// What: Cached language-pack status of engine `id`.
    ///
    /// Output:
    /// - `Unknown` before ready and for ids never fetched.
    #[must_use]
    pub fn language_pack_status(&self, id: &str) -> LanguagePackStatus {
        self.model()
            .map_or(LanguagePackStatus::Unknown, |state| state.language_pack_status(id))
    }
}

impl Drop for LanguageSettings {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for LanguageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageSettings")
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}
