//! Reactor behaviour for preference changes and collaborator pushes.

#![cfg(test)]

use std::sync::Arc;

use langsettings::sources::PrefStore;
use langsettings::state::{DictionaryStatus, ModelState, PrefPath, PrefValue};

use crate::helpers::{
    assert_invariants, backend, connect, enabled_codes, enabled_input_methods, input_method,
    model, spellcheck_off, spellcheck_on,
};

fn status(code: &str, ready: bool, failed: bool) -> DictionaryStatus {
    DictionaryStatus {
        language_code: code.into(),
        is_ready: ready,
        is_downloading: false,
        download_failed: failed,
    }
}

#[tokio::test]
/// What: An external edit of the enabled preference is picked up.
///
/// Inputs:
/// - Store write `fr,xx,en` after ready.
///
/// Output:
/// - Enabled `[fr, en]`; invariants hold.
async fn external_pref_change_rederives_enabled() {
    let backend = backend();
    let session = connect(&backend).await;
    backend
        .set(PrefPath::AcceptLanguages, PrefValue::Str("fr,xx,en".into()))
        .expect("write");
    session.settled().await.expect("settled");
    assert_eq!(enabled_codes(&session), vec!["fr", "en"]);
    assert_invariants(&model(&session));
}

#[tokio::test]
/// What: Toggling spellcheck moves a language between the on and off lists.
///
/// Inputs:
/// - `fr` turned on, then `en` turned off.
///
/// Output:
/// - Newly enabled codes append to "on"; enabled entries mirror the flags.
async fn spellcheck_toggle_moves_language_between_lists() {
    let backend = backend();
    let session = connect(&backend).await;
    assert_eq!(spellcheck_on(&model(&session)), vec!["en"]);

    session.toggle_spellcheck("fr", true).expect("toggle");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(spellcheck_on(&state), vec!["en", "fr"]);
    assert_eq!(spellcheck_off(&state), vec!["de"]);
    assert!(state.enabled_language("fr").expect("fr").spell_check_enabled);
    assert_invariants(&state);

    session.toggle_spellcheck("en", false).expect("toggle");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(spellcheck_on(&state), vec!["fr"]);
    assert!(!state.enabled_language("en").expect("en").spell_check_enabled);
    assert_invariants(&state);
}

#[tokio::test]
/// What: Forced dictionaries are always on and managed, even when blocked.
///
/// Inputs:
/// - `de` both forced and blocked, `fr` blocked, `en` user-enabled.
///
/// Output:
/// - On `[de, en]` with `de` managed; off `[fr]` managed.
async fn forced_dictionary_wins_over_blocked() {
    let backend = backend();
    backend.seed_pref(
        PrefPath::SpellcheckForcedDictionaries,
        PrefValue::List(vec!["de".into()]),
    );
    backend.seed_pref(
        PrefPath::SpellcheckBlockedDictionaries,
        PrefValue::List(vec!["de".into(), "fr".into()]),
    );
    let session = connect(&backend).await;
    let state = model(&session);
    assert_eq!(spellcheck_on(&state), vec!["de", "en"]);
    assert!(state.model.spell_check_on_languages[0].is_managed);
    assert!(!state.model.spell_check_on_languages[1].is_managed);
    assert_eq!(spellcheck_off(&state), vec!["fr"]);
    assert!(state.model.spell_check_off_languages[0].is_managed);
    let fr = state.enabled_language("fr").expect("fr");
    assert!(fr.is_managed);
    assert!(!fr.spell_check_enabled);
    assert_invariants(&state);
}

#[tokio::test]
/// What: Blocking translation updates eligibility and removability in place.
///
/// Inputs:
/// - `fr` blocked, then unblocked.
///
/// Output:
/// - While blocked both languages are untranslatable and removable, and the
///   never-translate list holds `fr`; unblocking restores the start state.
async fn translate_blocking_updates_eligibility() {
    let backend = backend();
    let session = connect(&backend).await;
    session.disable_translate_language("fr").expect("block");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert!(state.model.enabled.iter().all(|s| !s.translate_enabled));
    assert!(state.model.enabled.iter().all(|s| s.removable));
    let never: Vec<&str> = state
        .model
        .never_translate
        .iter()
        .map(|l| l.code.as_str())
        .collect();
    assert_eq!(never, vec!["fr"]);

    session.enable_translate_language("fr").expect("unblock");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert!(state.model.never_translate.is_empty());
    assert!(state.enabled_language("fr").expect("fr").translate_enabled);
    assert!(!state.enabled_language("en").expect("en").removable);
}

#[tokio::test]
/// What: Engine push events refresh the catalog or only the current id.
///
/// Inputs:
/// - Current engine switched, an engine installed, then one uninstalled.
///
/// Output:
/// - `current_id` follows; the catalog and language buckets are rebuilt;
///   an uninstalled but still-listed engine stays in the enabled-id set.
async fn input_method_events_update_catalog() {
    let backend = backend();
    let session = connect(&backend).await;

    backend.push_current_input_method("_comp_fr");
    session.settled().await.expect("settled");
    assert_eq!(model(&session).model.input_methods.current_id, "_comp_fr");

    backend.push_input_method_added(input_method("_comp_ja", &["ja"]));
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(state.model.input_methods.supported.len(), 4);
    assert_eq!(state.input_methods_for_language("ja").len(), 1);
    assert_eq!(state.input_method_display_name("_comp_ja"), "_comp_ja");

    backend.push_input_method_removed("_comp_us");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert!(state.index.input_method("_comp_us").is_none());
    assert!(enabled_input_methods(&session).is_empty());
    assert!(state.is_input_method_enabled("_comp_us"));
}

#[tokio::test]
/// What: The index and its language buckets hand out the model's engine entries.
///
/// Inputs:
/// - `_comp_us` enabled at start, `_comp_fr` enabled later, then an engine
///   installed (catalog refetch).
///
/// Output:
/// - At every step the model list, index lookup and language bucket agree
///   on the `enabled` flag and share one allocation.
async fn index_tracks_enabled_input_methods() {
    let backend = backend();
    let session = connect(&backend).await;
    let assert_agrees = |state: &ModelState, id: &str, code: &str, enabled: bool| {
        let supported = state
            .model
            .input_methods
            .supported
            .iter()
            .find(|m| m.id == id)
            .expect("supported");
        let indexed = state.index.input_method(id).expect("indexed");
        let bucket = state
            .input_methods_for_language(code)
            .iter()
            .find(|m| m.id == id)
            .expect("bucketed");
        assert_eq!(supported.enabled, enabled, "{id} model flag");
        assert_eq!(indexed.enabled, enabled, "{id} index flag");
        assert_eq!(bucket.enabled, enabled, "{id} bucket flag");
        assert!(Arc::ptr_eq(supported, indexed));
        assert!(Arc::ptr_eq(supported, bucket));
    };

    let state = model(&session);
    assert_agrees(&state, "_comp_us", "en", true);
    assert_agrees(&state, "_comp_fr", "fr", false);

    session.add_input_method("_comp_fr").expect("add");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_agrees(&state, "_comp_us", "en", true);
    assert_agrees(&state, "_comp_fr", "fr", true);

    backend.push_input_method_added(input_method("_comp_ja", &["ja"]));
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_agrees(&state, "_comp_us", "en", true);
    assert_agrees(&state, "_comp_fr", "fr", true);
    assert_agrees(&state, "_comp_ja", "ja", false);
}

#[tokio::test]
/// What: Successive snapshots share catalog data instead of copying it.
///
/// Inputs:
/// - Snapshot held while spellcheck is toggled and a no-op engine event arrives.
///
/// Output:
/// - The held snapshot is unchanged; the new one shares the index, catalog
///   languages and engines; the no-op event publishes nothing.
async fn snapshots_share_catalog_entries() {
    let backend = backend();
    let session = connect(&backend).await;
    let before = model(&session);

    session.toggle_spellcheck("fr", true).expect("toggle");
    session.settled().await.expect("settled");
    let after = model(&session);
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!before.enabled_language("fr").expect("fr").spell_check_enabled);
    assert!(Arc::ptr_eq(&before.index, &after.index));
    for (old, new) in before.model.supported.iter().zip(&after.model.supported) {
        assert!(Arc::ptr_eq(old, new));
    }
    for (old, new) in before
        .model
        .input_methods
        .supported
        .iter()
        .zip(&after.model.input_methods.supported)
    {
        assert!(Arc::ptr_eq(old, new));
    }

    backend.push_current_input_method("_comp_us");
    session.settled().await.expect("settled");
    assert!(Arc::ptr_eq(&after, &model(&session)));
}

#[tokio::test]
/// What: Dictionary statuses land on every list and count failures per transition.
///
/// Inputs:
/// - Initial status `en` ready; pushes for `fr`: failed, failed, ready.
///
/// Output:
/// - Failure count 1 after the repeated failure, 0 after ready; the count
///   survives re-deriving the enabled list.
async fn dictionary_statuses_track_failures() {
    let backend = backend();
    backend.set_dictionary_statuses(vec![status("en", true, false)]);
    let session = connect(&backend).await;
    let state = model(&session);
    let en = state.enabled_language("en").expect("en");
    assert_eq!(en.download_dictionary_status, Some(status("en", true, false)));
    assert!(
        state.model.spell_check_on_languages[0]
            .download_dictionary_status
            .is_some()
    );

    backend.push_dictionary_statuses(vec![status("fr", false, true)]);
    session.settled().await.expect("settled");
    backend.push_dictionary_statuses(vec![status("fr", false, true)]);
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(
        state
            .enabled_language("fr")
            .expect("fr")
            .download_dictionary_failure_count,
        1
    );
    let fr_off = state
        .model
        .spell_check_off_languages
        .iter()
        .find(|s| s.language.code == "fr")
        .expect("fr off");
    assert_eq!(fr_off.download_dictionary_failure_count, 1);

    session.enable_language("de").expect("enable");
    session.settled().await.expect("settled");
    assert_eq!(
        model(&session)
            .enabled_language("fr")
            .expect("fr")
            .download_dictionary_failure_count,
        1
    );

    backend.push_dictionary_statuses(vec![status("fr", true, false)]);
    session.settled().await.expect("settled");
    assert_eq!(
        model(&session)
            .enabled_language("fr")
            .expect("fr")
            .download_dictionary_failure_count,
        0
    );
}

#[tokio::test]
/// What: Target and UI-language changes re-run translate eligibility.
///
/// Inputs:
/// - Target switched to `fr`; then the prospective UI language set to `de`
///   after enabling it, then cleared.
///
/// Output:
/// - Eligibility follows the target and prospective language; clearing the
///   locale restores the original language and drops the restart flag.
async fn target_and_locale_changes_refresh_translate() {
    let backend = backend();
    let session = connect(&backend).await;

    session.set_translate_target_language("fr").expect("target");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(state.model.translate_target, "fr");
    assert!(state.enabled_language("en").expect("en").translate_enabled);
    assert!(!state.enabled_language("fr").expect("fr").translate_enabled);
    assert!(state.enabled_language("en").expect("en").removable);
    assert!(!state.enabled_language("fr").expect("fr").removable);

    session.enable_language("de").expect("enable");
    session.settled().await.expect("settled");
    assert_eq!(model(&session).model.translate_target, "fr");
    session.set_prospective_ui_language("de").expect("locale");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(state.model.prospective_ui_language, "de");
    assert!(state.requires_restart());
    assert!(!state.enabled_language("de").expect("de").translate_enabled);

    session.set_prospective_ui_language("").expect("locale");
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(state.model.prospective_ui_language, "en-US");
    assert!(!state.requires_restart());
    assert!(state.enabled_language("de").expect("de").translate_enabled);
}
