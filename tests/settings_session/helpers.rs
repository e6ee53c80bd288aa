//! Shared fixtures for session tests.

#![cfg(test)]
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use langsettings::LanguageSettings;
use langsettings::config::Settings;
use langsettings::sources::{MemoryBackend, Services};
use langsettings::state::{InputMethod, Language, ModelState, PrefPath, PrefValue};

/// What: Build a catalog language.
///
/// Inputs:
/// - `code`: Language code.
/// - `translate` / `spellcheck`: Capability flags.
///
/// Output:
/// - `Language` with display names set to the code.
pub fn language(code: &str, translate: bool, spellcheck: bool) -> Language {
    Language {
        code: code.into(),
        display_name: code.into(),
        native_display_name: code.into(),
        supports_ui: true,
        supports_translate: translate,
        supports_spellcheck: spellcheck,
        is_prohibited_language: false,
    }
}

/// What: Build an engine typing `codes`.
pub fn input_method(id: &str, codes: &[&str]) -> InputMethod {
    InputMethod {
        id: id.into(),
        display_name: id.into(),
        language_codes: codes.iter().map(|c| (*c).to_string()).collect(),
        ..InputMethod::default()
    }
}

/// What: Backend with a small catalog and a typical preference state.
///
/// Details:
/// - Languages: en, fr, de (translate + spellcheck), ja (translate only),
///   ru (prohibited).
/// - Engines: `_comp_us` (en), `_comp_fr` (fr), `_comp_de` (de).
/// - Prefs: accept `en,fr`, spellcheck `[en]`, preload `_comp_us`;
///   translate target `en`.
pub fn backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    let mut ru = language("ru", true, false);
    ru.is_prohibited_language = true;
    backend.set_languages(vec![
        language("en", true, true),
        language("fr", true, true),
        language("de", true, true),
        language("ja", true, false),
        ru,
    ]);
    backend.set_input_methods(
        vec![
            input_method("_comp_us", &["en"]),
            input_method("_comp_fr", &["fr"]),
            input_method("_comp_de", &["de"]),
        ],
        Vec::new(),
    );
    backend.set_current_input_method_id("_comp_us");
    backend.set_translate_target("en");
    backend.seed_pref(PrefPath::AcceptLanguages, PrefValue::Str("en,fr".into()));
    backend.seed_pref(
        PrefPath::SpellcheckDictionaries,
        PrefValue::List(vec!["en".into()]),
    );
    backend.seed_pref(PrefPath::PreloadEngines, PrefValue::Str("_comp_us".into()));
    backend
}

/// What: Connect with `settings`, wait for ready, then for the initial workers.
pub async fn connect_with(backend: &Arc<MemoryBackend>, settings: Settings) -> LanguageSettings {
    let session = LanguageSettings::connect(Services::from_backend(backend), settings);
    session.ready().await.expect("session ready");
    session.settled().await.expect("session settled");
    session
}

/// What: Connect with default settings and wait until quiescent.
pub async fn connect(backend: &Arc<MemoryBackend>) -> LanguageSettings {
    connect_with(backend, Settings::default()).await
}

/// What: Latest published snapshot.
pub fn model(session: &LanguageSettings) -> Arc<ModelState> {
    session.model().expect("model published")
}

/// What: Enabled language codes in order.
pub fn enabled_codes(session: &LanguageSettings) -> Vec<String> {
    model(session)
        .model
        .enabled
        .iter()
        .map(|s| s.language.code.clone())
        .collect()
}

/// What: Enabled engine ids in order.
pub fn enabled_input_methods(session: &LanguageSettings) -> Vec<String> {
    model(session)
        .model
        .input_methods
        .enabled
        .iter()
        .map(|m| m.id.clone())
        .collect()
}

/// What: Assert the model-wide invariants every published snapshot must hold.
///
/// Details:
/// - Enabled code set equals the codes in the enabled list.
/// - Spellcheck on/off lists partition the spellcheck-capable catalog.
pub fn assert_invariants(state: &ModelState) {
    let listed: BTreeSet<&str> = state
        .model
        .enabled
        .iter()
        .map(|s| s.language.code.as_str())
        .collect();
    let set: BTreeSet<&str> = state
        .enabled_language_codes()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(listed, set, "enabled set out of sync");

    let on: Vec<&str> = state
        .model
        .spell_check_on_languages
        .iter()
        .map(|s| s.language.code.as_str())
        .collect();
    let off: Vec<&str> = state
        .model
        .spell_check_off_languages
        .iter()
        .map(|s| s.language.code.as_str())
        .collect();
    for language in state.model.supported.iter().filter(|l| l.supports_spellcheck) {
        let code = language.code.as_str();
        let count = on.iter().filter(|c| **c == code).count()
            + off.iter().filter(|c| **c == code).count();
        assert_eq!(count, 1, "{code} must be classified exactly once");
    }
}

/// Spellcheck "on" codes in order.
pub fn spellcheck_on(state: &ModelState) -> Vec<&str> {
    state
        .model
        .spell_check_on_languages
        .iter()
        .map(|s| s.language.code.as_str())
        .collect()
}

/// Spellcheck "off" codes in order.
pub fn spellcheck_off(state: &ModelState) -> Vec<&str> {
    state
        .model
        .spell_check_off_languages
        .iter()
        .map(|s| s.language.code.as_str())
        .collect()
}
