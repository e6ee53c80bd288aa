//! JSON fixture describing a complete backend state.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use super::Result;
use crate::state::{DictionaryStatus, InputMethod, Language, LanguagePackStatus, PrefValue};

/// Serialized backend contents loaded by the inspection binary and tests.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fixture {
    /// Language catalog.
    pub languages: Vec<Language>,
    /// Component engine catalog.
    pub component_extension_imes: Vec<InputMethod>,
    /// Third-party engine catalog.
    pub third_party_extension_imes: Vec<InputMethod>,
    /// Active engine id.
    pub current_input_method: String,
    /// Translate target reported by the catalog.
    pub translate_target: String,
    /// Prospective UI language reported by the catalog.
    #[serde(rename = "prospectiveUILanguage")]
    pub prospective_ui_language: String,
    /// Always-translate codes reported by the catalog.
    pub always_translate: Vec<String>,
    /// Never-translate codes reported by the catalog.
    pub never_translate: Vec<String>,
    /// Preference values keyed by dotted path (e.g. `intl.accept_languages`).
    pub prefs: BTreeMap<String, PrefValue>,
    /// Dictionary statuses.
    pub dictionary_statuses: Vec<DictionaryStatus>,
    /// Language-pack status per engine id.
    pub language_pack_statuses: HashMap<String, LanguagePackStatus>,
}

/// What: Read and parse a fixture file.
///
/// Inputs:
/// - `path`: JSON file path.
///
/// Output:
/// - Parsed fixture.
///
/// # Errors
/// - Returns `Err` when the file cannot be read or is not a valid fixture.
pub fn load_fixture(path: &Path) -> Result<Fixture> {
    let raw = std::fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %path.display(),
        languages = fixture.languages.len(),
        input_methods =
            fixture.component_extension_imes.len() + fixture.third_party_extension_imes.len(),
        "loaded fixture"
    );
    Ok(fixture)
}
