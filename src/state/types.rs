//! Core value types fetched from the catalog and engine services.

use serde::{Deserialize, Serialize};

/// Catalog entry describing one language the browser knows about.
///
/// Entries are immutable once fetched. The index owns them behind an `Arc`
/// and every derived collection shares that allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Unique language code (e.g., "en-US").
    pub code: String,
    /// Name in the current UI language.
    pub display_name: String,
    /// Name in the language itself.
    #[serde(default)]
    pub native_display_name: String,
    /// Whether the browser UI can be displayed in this language.
    #[serde(default)]
    pub supports_ui: bool,
    /// Whether the translate service handles this language.
    #[serde(default)]
    pub supports_translate: bool,
    /// Whether a spellcheck dictionary exists for this language.
    #[serde(default)]
    pub supports_spellcheck: bool,
    /// Whether policy forbids adding this language.
    #[serde(default)]
    pub is_prohibited_language: bool,
}

/// Catalog entry describing one input method (keyboard or typing engine).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMethod {
    /// Unique engine id. Component engines are prefixed with `_comp_`.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Language codes this engine can type.
    #[serde(default)]
    pub language_codes: Vec<String>,
    /// Whether the engine is in the enabled preference lists.
    #[serde(default)]
    pub enabled: bool,
    /// Whether policy forbids enabling this engine.
    #[serde(default)]
    pub is_prohibited_by_policy: bool,
}

/// The two engine lists reported by the input-method catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMethodLists {
    /// Engines shipped with the system.
    #[serde(default)]
    pub component_extension_imes: Vec<InputMethod>,
    /// Engines installed from third-party extensions.
    #[serde(default)]
    pub third_party_extension_imes: Vec<InputMethod>,
}

impl InputMethodLists {
    /// What: Flatten both lists into a single catalog.
    ///
    /// Output:
    /// - Component engines first, then third-party engines, each in reported order.
    #[must_use]
    pub fn into_combined(self) -> Vec<InputMethod> {
        let mut all = self.component_extension_imes;
        all.extend(self.third_party_extension_imes);
        all
    }
}

/// Download state of one spellcheck dictionary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryStatus {
    /// Language code the dictionary belongs to.
    pub language_code: String,
    /// Dictionary is downloaded and usable.
    #[serde(default)]
    pub is_ready: bool,
    /// A download is in progress.
    #[serde(default)]
    pub is_downloading: bool,
    /// The last download attempt failed.
    #[serde(default)]
    pub download_failed: bool,
}

/// Install state of the language pack backing an input method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguagePackStatus {
    /// Nothing known yet, or a fetch is outstanding.
    #[default]
    Unknown,
    /// Pack is not installed.
    NotInstalled,
    /// Pack is being downloaded or installed.
    InProgress,
    /// Pack is installed and ready.
    Installed,
    /// Install failed for a reason other than a pending reboot.
    ErrorOther,
    /// Install needs a reboot to complete.
    ErrorNeedsReboot,
}

/// Push notification from the language-pack service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePackStatusChange {
    /// Engine ids affected by the change.
    pub engine_ids: Vec<String>,
    /// New status for every listed id.
    pub status: LanguagePackStatus,
}

/// Push notification from the input-method engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputMethodEvent {
    /// An engine was installed.
    Added(String),
    /// An engine was uninstalled.
    Removed(String),
    /// The active engine changed.
    CurrentChanged(String),
}
