//! Typed preference paths, values, and the per-derivation snapshot.
//!
//! The preference store is external. Every path the model depends on is an
//! enum variant here, so change notifications dispatch on a closed set instead
//! of matching on path strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sources::PrefStore;

/// Preference paths observed by the language settings model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrefPath {
    /// Ordered, comma-separated list of enabled language codes.
    AcceptLanguages,
    /// Policy-forced language codes.
    ForcedLanguages,
    /// Prospective UI language (applies after restart).
    AppLocale,
    /// User-enabled spellcheck dictionaries.
    SpellcheckDictionaries,
    /// Policy-forced spellcheck dictionaries.
    SpellcheckForcedDictionaries,
    /// Policy-blocked spellcheck dictionaries.
    SpellcheckBlockedDictionaries,
    /// Translate codes never offered for translation.
    TranslateBlockedLanguages,
    /// Map of language code to target for always-translate.
    TranslateAllowlists,
    /// Most recent translate target language.
    TranslateRecentTarget,
    /// Comma-separated component engine ids.
    PreloadEngines,
    /// Comma-separated third-party engine ids.
    EnabledExtensionImes,
}

impl PrefPath {
    /// Every observed path, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::AcceptLanguages,
        Self::ForcedLanguages,
        Self::AppLocale,
        Self::SpellcheckDictionaries,
        Self::SpellcheckForcedDictionaries,
        Self::SpellcheckBlockedDictionaries,
        Self::TranslateBlockedLanguages,
        Self::TranslateAllowlists,
        Self::TranslateRecentTarget,
        Self::PreloadEngines,
        Self::EnabledExtensionImes,
    ];

    /// What: Dotted key under which the store keeps this preference.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AcceptLanguages => "intl.accept_languages",
            Self::ForcedLanguages => "intl.forced_languages",
            Self::AppLocale => "intl.app_locale",
            Self::SpellcheckDictionaries => "spellcheck.dictionaries",
            Self::SpellcheckForcedDictionaries => "spellcheck.forced_dictionaries",
            Self::SpellcheckBlockedDictionaries => "spellcheck.blocked_dictionaries",
            Self::TranslateBlockedLanguages => "translate_blocked_languages",
            Self::TranslateAllowlists => "translate_allowlists",
            Self::TranslateRecentTarget => "translate_recent_target",
            Self::PreloadEngines => "settings.language.preload_engines",
            Self::EnabledExtensionImes => "settings.language.enabled_extension_imes",
        }
    }

    /// What: Resolve a dotted key back to its path.
    ///
    /// Output:
    /// - `None` for keys the model does not observe.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key.trim())
    }

    /// What: Value the store reports for a path that was never written.
    #[must_use]
    pub fn default_value(self) -> PrefValue {
        match self {
            Self::AcceptLanguages
            | Self::AppLocale
            | Self::TranslateRecentTarget
            | Self::PreloadEngines
            | Self::EnabledExtensionImes => PrefValue::Str(String::new()),
            Self::TranslateAllowlists => PrefValue::Map(BTreeMap::new()),
            Self::ForcedLanguages
            | Self::SpellcheckDictionaries
            | Self::SpellcheckForcedDictionaries
            | Self::SpellcheckBlockedDictionaries
            | Self::TranslateBlockedLanguages => PrefValue::List(Vec::new()),
        }
    }
}

/// A preference value as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    /// Plain or comma-separated string.
    Str(String),
    /// List of strings.
    List(Vec<String>),
    /// String-to-string dictionary.
    Map(BTreeMap<String, String>),
}

impl PrefValue {
    /// What: Read the value as a plain string; non-string values read as empty.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(s) => s,
            Self::List(_) | Self::Map(_) => "",
        }
    }

    /// What: Read the value as a list of strings.
    ///
    /// Details:
    /// - Strings are split on `,` without dropping empty segments, so `""`
    ///   becomes `[""]`. Stale segments are filtered later by catalog lookup.
    /// - Maps yield their keys in sorted order.
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Str(s) => s.split(',').map(str::to_string).collect(),
            Self::List(v) => v.clone(),
            Self::Map(m) => m.keys().cloned().collect(),
        }
    }

    /// What: Read the value as a dictionary; non-map values read as empty.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        match self {
            Self::Map(m) => m.clone(),
            Self::Str(_) | Self::List(_) => BTreeMap::new(),
        }
    }

    /// What: Build a comma-joined string value, skipping empty entries.
    #[must_use]
    pub fn comma_joined<S: AsRef<str>>(items: &[S]) -> Self {
        let joined = items
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Self::Str(joined)
    }
}

/// Every observed preference, read once so a derivation sees one consistent view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefSnapshot {
    /// Enabled language codes in user order (raw comma split).
    pub accept_languages: Vec<String>,
    /// Policy-forced language codes.
    pub forced_languages: Vec<String>,
    /// Prospective UI language, empty when unset.
    pub app_locale: String,
    /// User-enabled dictionaries.
    pub spellcheck_dictionaries: Vec<String>,
    /// Policy-forced dictionaries.
    pub spellcheck_forced: Vec<String>,
    /// Policy-blocked dictionaries.
    pub spellcheck_blocked: Vec<String>,
    /// Translate codes excluded from translation offers.
    pub translate_blocked: Vec<String>,
    /// Always-translate map (language code to target).
    pub translate_allowlists: BTreeMap<String, String>,
    /// Most recent translate target.
    pub translate_recent_target: String,
    /// Component engine ids (raw comma split).
    pub preload_engines: Vec<String>,
    /// Third-party engine ids (raw comma split).
    pub enabled_extension_imes: Vec<String>,
}

impl PrefSnapshot {
    /// What: Read every observed path from the store.
    ///
    /// Inputs:
    /// - `store`: Preference store; must already report itself initialized.
    ///
    /// Output:
    /// - Snapshot with list/string/map values normalised per path.
    #[must_use]
    pub fn read(store: &dyn PrefStore) -> Self {
        Self {
            accept_languages: store.get(PrefPath::AcceptLanguages).to_list(),
            forced_languages: store.get(PrefPath::ForcedLanguages).to_list(),
            app_locale: store.get(PrefPath::AppLocale).as_str().to_string(),
            spellcheck_dictionaries: store.get(PrefPath::SpellcheckDictionaries).to_list(),
            spellcheck_forced: store.get(PrefPath::SpellcheckForcedDictionaries).to_list(),
            spellcheck_blocked: store.get(PrefPath::SpellcheckBlockedDictionaries).to_list(),
            translate_blocked: store.get(PrefPath::TranslateBlockedLanguages).to_list(),
            translate_allowlists: store.get(PrefPath::TranslateAllowlists).to_map(),
            translate_recent_target: store
                .get(PrefPath::TranslateRecentTarget)
                .as_str()
                .to_string(),
            preload_engines: store.get(PrefPath::PreloadEngines).to_list(),
            enabled_extension_imes: store.get(PrefPath::EnabledExtensionImes).to_list(),
        }
    }
}
