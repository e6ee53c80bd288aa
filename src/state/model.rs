//! The aggregate language settings model and the snapshot published to readers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::app::pack_cache::LanguagePackCache;
use crate::index::CatalogIndex;
use crate::state::types::{DictionaryStatus, InputMethod, Language};

/// Derived record for one enabled language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageState {
    /// Shared catalog entry.
    pub language: Arc<Language>,
    /// Whether the user may remove this language right now.
    pub removable: bool,
    /// Whether spellcheck is active for this language.
    pub spell_check_enabled: bool,
    /// Whether pages in this language are offered for translation.
    pub translate_enabled: bool,
    /// Spellcheck state is dictated by policy (forced or blocked).
    pub is_managed: bool,
    /// Language is forced into the list by policy.
    pub is_forced: bool,
    /// Consecutive dictionary download failures seen.
    pub download_dictionary_failure_count: u32,
    /// Last reported dictionary status, if any.
    pub download_dictionary_status: Option<DictionaryStatus>,
}

/// Derived record for the spellcheck on/off lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheckLanguageState {
    /// Shared catalog entry.
    pub language: Arc<Language>,
    /// `true` for the "on" list, `false` for the "off" list.
    pub spell_check_enabled: bool,
    /// Placement is dictated by policy.
    pub is_managed: bool,
    /// Consecutive dictionary download failures seen.
    pub download_dictionary_failure_count: u32,
    /// Last reported dictionary status, if any.
    pub download_dictionary_status: Option<DictionaryStatus>,
}

/// Input-method part of the model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMethodsModel {
    /// Full engine catalog; `enabled` flags track the engine preferences.
    pub supported: Vec<Arc<InputMethod>>,
    /// Enabled engines in preference order.
    pub enabled: Vec<Arc<InputMethod>>,
    /// Currently active engine id.
    pub current_id: String,
    /// Language-pack status per engine id.
    pub language_packs: LanguagePackCache,
}

/// Aggregate root exposed to readers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesModel {
    /// Full language catalog.
    pub supported: Vec<Arc<Language>>,
    /// Enabled languages in user order.
    pub enabled: Vec<LanguageState>,
    /// Current translate target code.
    pub translate_target: String,
    /// Prospective UI language (may differ from the running one until restart).
    #[serde(rename = "prospectiveUILanguage")]
    pub prospective_ui_language: String,
    /// Input-method state.
    pub input_methods: InputMethodsModel,
    /// Languages always translated.
    pub always_translate: Vec<Arc<Language>>,
    /// Languages never translated.
    pub never_translate: Vec<Arc<Language>>,
    /// Spellcheck-capable languages with spellcheck on (forced first).
    pub spell_check_on_languages: Vec<SpellCheckLanguageState>,
    /// Spellcheck-capable languages with spellcheck off.
    pub spell_check_off_languages: Vec<SpellCheckLanguageState>,
}

/// Everything the reactor owns, published to readers as one immutable snapshot.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    /// The model itself.
    pub model: LanguagesModel,
    /// Lookup structures over the current catalogs.
    #[serde(skip)]
    pub index: Arc<CatalogIndex>,
    /// Codes present in `model.enabled`.
    #[serde(skip)]
    pub enabled_language_set: HashSet<String>,
    /// Every id listed in the engine preferences (including unknown ones).
    #[serde(skip)]
    pub enabled_input_method_set: HashSet<String>,
    /// Prospective UI language observed when the session was built.
    #[serde(skip)]
    pub original_prospective_ui_language: String,
    /// Incremented on every published change.
    pub revision: u64,
}

/// Sub-paths of the model a reactor step may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModelPath {
    /// `model.supported`.
    Supported,
    /// `model.enabled` (list replaced or entries updated).
    Enabled,
    /// `model.translate_target`.
    TranslateTarget,
    /// `model.prospective_ui_language`.
    ProspectiveUiLanguage,
    /// `model.always_translate`.
    AlwaysTranslate,
    /// `model.never_translate`.
    NeverTranslate,
    /// `model.spell_check_on_languages`.
    SpellCheckOn,
    /// `model.spell_check_off_languages`.
    SpellCheckOff,
    /// `model.input_methods.supported`.
    InputMethodsSupported,
    /// `model.input_methods.enabled`.
    InputMethodsEnabled,
    /// `model.input_methods.current_id`.
    CurrentInputMethod,
    /// `model.input_methods.language_packs`.
    LanguagePackStatus,
}

/// Notification that one reactor step changed the listed sub-paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelChange {
    /// Revision of the snapshot carrying the change.
    pub revision: u64,
    /// Changed sub-paths, sorted and deduplicated.
    pub paths: Vec<ModelPath>,
}

/// Session lifecycle. There is no way back to `Building` once `Ready`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    /// Session created, fetches not yet started.
    #[default]
    Uninitialized,
    /// Initial fetches in flight.
    Building,
    /// Model published.
    Ready,
}
