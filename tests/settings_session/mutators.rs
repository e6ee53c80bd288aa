//! Mutators: preference round-trips and refusals.

#![cfg(test)]

use langsettings::SettingsError;
use langsettings::sources::{FetchSource, PrefStore};
use langsettings::state::{PrefPath, PrefValue};

use crate::helpers::{assert_invariants, backend, connect, enabled_codes, enabled_input_methods, model};

#[tokio::test]
/// What: Enabling appends known languages and refuses the rest.
///
/// Inputs:
/// - `de` (known), `fr` (already enabled), `xx` (unknown), `ru` (prohibited).
///
/// Output:
/// - Only `de` is written; unknown and prohibited codes are errors.
async fn enable_language_rules() {
    let backend = backend();
    let session = connect(&backend).await;
    session.enable_language("de").expect("enable de");
    session.enable_language("fr").expect("already enabled");
    assert_eq!(
        session.enable_language("xx"),
        Err(SettingsError::UnknownLanguage("xx".into()))
    );
    assert!(matches!(
        session.enable_language("ru"),
        Err(SettingsError::Disallowed { .. })
    ));
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "en,fr,de");
    session.settled().await.expect("settled");
    assert_eq!(enabled_codes(&session), vec!["en", "fr", "de"]);
    assert_invariants(&model(&session));
}

#[tokio::test]
/// What: Disabling refuses the removability rules before writing anything.
///
/// Inputs:
/// - `en` (only untranslatable), `de` (not enabled), `fr`, then `en` alone.
///
/// Output:
/// - Refusals leave the preference untouched; `fr` is removed.
async fn disable_language_refuses_before_writing() {
    let backend = backend();
    let session = connect(&backend).await;
    assert_eq!(
        session.disable_language("en"),
        Err(SettingsError::Disallowed {
            code: "en".into(),
            reason: "only translate-blocked language",
        })
    );
    assert_eq!(
        session.disable_language("de"),
        Err(SettingsError::UnknownLanguage("de".into()))
    );
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "en,fr");

    session.disable_language("fr").expect("disable fr");
    session.settled().await.expect("settled");
    assert_eq!(enabled_codes(&session), vec!["en"]);
    assert_eq!(
        session.disable_language("en"),
        Err(SettingsError::Disallowed {
            code: "en".into(),
            reason: "last enabled language",
        })
    );
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "en");
}

#[tokio::test]
/// What: Moves skip catalog-unknown entries and keep them in the preference.
///
/// Inputs:
/// - Preference `en,xx,fr,de`; `de` up, `en` down, `fr` to front, `fr` up.
///
/// Output:
/// - Each move passes one visible language; the last is a no-op.
async fn move_language_skips_unknown_entries() {
    let backend = backend();
    backend.seed_pref(
        PrefPath::AcceptLanguages,
        PrefValue::Str("en,xx,fr,de".into()),
    );
    let session = connect(&backend).await;
    assert_eq!(enabled_codes(&session), vec!["en", "fr", "de"]);

    session.move_language("de", true).expect("up");
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "en,xx,de,fr");
    session.move_language("en", false).expect("down");
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "xx,de,en,fr");
    session.move_language_to_front("fr").expect("front");
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "fr,xx,de,en");
    session.move_language("fr", true).expect("no-op");
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "fr,xx,de,en");

    session.settled().await.expect("settled");
    assert_eq!(enabled_codes(&session), vec!["fr", "de", "en"]);
}

#[tokio::test]
/// What: Always-translate edits key the map by translate code.
///
/// Inputs:
/// - `de` set to always translate, then cleared.
///
/// Output:
/// - Map entry `de -> en` and the always list follow.
async fn always_translate_state_round_trips() {
    let backend = backend();
    let session = connect(&backend).await;
    session
        .set_language_always_translate_state("de", true)
        .expect("allow");
    session.settled().await.expect("settled");
    let map = backend.get(PrefPath::TranslateAllowlists).to_map();
    assert_eq!(map.get("de").map(String::as_str), Some("en"));
    let always: Vec<String> = model(&session)
        .model
        .always_translate
        .iter()
        .map(|l| l.code.clone())
        .collect();
    assert_eq!(always, vec!["de"]);

    session
        .set_language_always_translate_state("de", false)
        .expect("clear");
    session.settled().await.expect("settled");
    assert!(model(&session).model.always_translate.is_empty());
}

#[tokio::test]
/// What: Setting a translate target enables the language when missing.
async fn translate_target_enables_language() {
    let backend = backend();
    let session = connect(&backend).await;
    session.set_translate_target_language("de").expect("target");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(state.model.translate_target, "de");
    assert_eq!(enabled_codes(&session), vec!["en", "fr", "de"]);
    assert!(!state.enabled_language("de").expect("de").translate_enabled);
    assert_eq!(
        session.set_translate_target_language("xx"),
        Err(SettingsError::UnknownLanguage("xx".into()))
    );
}

#[tokio::test]
/// What: A rejected enabled-list write restores the previous translate target.
///
/// Inputs:
/// - Writes to `intl.accept_languages` rejected; target set to `de`.
///
/// Output:
/// - `Store` error; target pref cleared again, model target back to `en`,
///   enabled list untouched.
async fn translate_target_rolls_back_on_failed_enable() {
    let backend = backend();
    let session = connect(&backend).await;
    backend.reject_writes_to(PrefPath::AcceptLanguages);
    assert!(matches!(
        session.set_translate_target_language("de"),
        Err(SettingsError::Store(_))
    ));
    session.settled().await.expect("settled");
    assert_eq!(backend.get(PrefPath::TranslateRecentTarget).as_str(), "");
    assert_eq!(model(&session).model.translate_target, "en");
    assert_eq!(enabled_codes(&session), vec!["en", "fr"]);

    backend.accept_writes_to(PrefPath::AcceptLanguages);
    session.set_translate_target_language("de").expect("target");
    session.settled().await.expect("settled");
    assert_eq!(model(&session).model.translate_target, "de");
    assert_eq!(enabled_codes(&session), vec!["en", "fr", "de"]);
}

#[tokio::test]
/// What: Policy-forced languages lead the enabled list and cannot be disabled.
///
/// Inputs:
/// - `intl.forced_languages` set to `de` after ready; `de` also forced and
///   blocked for spellcheck; later the forced list cleared.
///
/// Output:
/// - Enabled `[de, en, fr]` with only `de` forced; disabling `de` is refused
///   without a write and enabling it is a no-op; forced spellcheck wins over
///   blocked; clearing the policy drops `de` again.
async fn forced_languages_are_enabled_and_locked() {
    let backend = backend();
    let session = connect(&backend).await;
    backend
        .set(PrefPath::ForcedLanguages, PrefValue::List(vec!["de".into()]))
        .expect("write");
    session.settled().await.expect("settled");

    let state = model(&session);
    assert_eq!(enabled_codes(&session), vec!["de", "en", "fr"]);
    let forced: Vec<&str> = state
        .model
        .enabled
        .iter()
        .filter(|s| s.is_forced)
        .map(|s| s.language.code.as_str())
        .collect();
    assert_eq!(forced, vec!["de"]);
    assert!(state.is_language_enabled("de"));
    assert_invariants(&state);

    assert_eq!(
        session.disable_language("de"),
        Err(SettingsError::Disallowed {
            code: "de".into(),
            reason: "language is forced by policy",
        })
    );
    session.enable_language("de").expect("already enabled");
    assert_eq!(backend.get(PrefPath::AcceptLanguages).as_str(), "en,fr");

    backend
        .set(
            PrefPath::SpellcheckForcedDictionaries,
            PrefValue::List(vec!["de".into()]),
        )
        .expect("write");
    backend
        .set(
            PrefPath::SpellcheckBlockedDictionaries,
            PrefValue::List(vec!["de".into()]),
        )
        .expect("write");
    session.settled().await.expect("settled");
    let state = model(&session);
    let de = state.enabled_language("de").expect("de");
    assert!(de.is_forced && de.spell_check_enabled && de.is_managed);
    assert_invariants(&state);

    backend
        .set(PrefPath::ForcedLanguages, PrefValue::List(Vec::new()))
        .expect("write");
    session.settled().await.expect("settled");
    assert_eq!(enabled_codes(&session), vec!["en", "fr"]);
    assert!(model(&session).enabled_language("de").is_none());
}

#[tokio::test]
/// What: Engine mutators go through the engine service and reject unknown ids.
///
/// Inputs:
/// - Add `_comp_fr`, remove `_comp_us`, switch current, open options, and
///   try an unknown id.
///
/// Output:
/// - Enabled list and supported flags follow the engine preferences.
async fn input_method_mutators() {
    let backend = backend();
    let session = connect(&backend).await;
    assert_eq!(session.current_input_method().await, Ok("_comp_us".to_string()));

    session.add_input_method("_comp_fr").expect("add");
    session.settled().await.expect("settled");
    assert_eq!(enabled_input_methods(&session), vec!["_comp_us", "_comp_fr"]);
    let state = model(&session);
    let flagged: Vec<&str> = state
        .model
        .input_methods
        .supported
        .iter()
        .filter(|m| m.enabled)
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(flagged, vec!["_comp_us", "_comp_fr"]);

    session.remove_input_method("_comp_us").expect("remove");
    session.settled().await.expect("settled");
    assert_eq!(enabled_input_methods(&session), vec!["_comp_fr"]);
    assert!(!model(&session).is_input_method_enabled("_comp_us"));

    session.set_current_input_method("_comp_fr").expect("current");
    session.settled().await.expect("settled");
    assert_eq!(model(&session).model.input_methods.current_id, "_comp_fr");

    session.open_input_method_options("_comp_fr").expect("options");
    assert_eq!(backend.opened_options(), vec!["_comp_fr"]);

    assert_eq!(
        session.add_input_method("bogus"),
        Err(SettingsError::UnknownInputMethod("bogus".into()))
    );
    assert_eq!(
        session.remove_input_method("bogus"),
        Err(SettingsError::UnknownInputMethod("bogus".into()))
    );
}

#[tokio::test]
/// What: Dictionary retries reach the service; write failures surface as
/// `Store`, read failures as `Service`.
async fn retry_and_store_failures() {
    let backend = backend();
    let session = connect(&backend).await;
    session.retry_download_dictionary("fr").expect("retry");
    assert_eq!(backend.retried_dictionaries(), vec!["fr"]);

    backend.fail(FetchSource::PrefWrites);
    assert!(matches!(
        session.toggle_spellcheck("fr", true),
        Err(SettingsError::Store(_))
    ));
    backend.recover(FetchSource::PrefWrites);
    backend.fail(FetchSource::CurrentInputMethod);
    assert!(matches!(
        session.current_input_method().await,
        Err(SettingsError::Service(_))
    ));
    backend.recover(FetchSource::CurrentInputMethod);
    session.toggle_spellcheck("fr", true).expect("toggle");
    session.settled().await.expect("settled");
    assert!(
        model(&session)
            .enabled_language("fr")
            .expect("fr")
            .spell_check_enabled
    );
}

#[tokio::test]
/// What: The ARC engine pseudo-language is never offered for enabling.
async fn arc_pseudo_language_cannot_be_enabled() {
    let backend = backend();
    let session = connect(&backend).await;
    let code = session.arc_ime_language_code();
    assert!(langsettings::logic::is_language_code_for_arc_ime(code));
    let arc = langsettings::state::Language {
        code: code.to_string(),
        ..Default::default()
    };
    assert!(!model(&session).can_enable_language(&arc));
}
