//! Language-pack status cache behaviour inside a live session.

#![cfg(test)]

use langsettings::config::Settings;
use langsettings::sources::FetchSource;
use langsettings::state::LanguagePackStatus;

use crate::helpers::{backend, connect, connect_with, model};

#[tokio::test]
/// What: Each enabled engine is fetched once; refresh passes never refetch.
///
/// Inputs:
/// - `_comp_us` installed (enabled at start), `_comp_fr` not installed and
///   added later, then removed and re-added.
///
/// Output:
/// - Statuses resolve from the service; every id is fetched exactly once.
async fn statuses_fetched_once_per_engine() {
    let backend = backend();
    backend.set_language_pack_status("_comp_us", LanguagePackStatus::Installed);
    backend.set_language_pack_status("_comp_fr", LanguagePackStatus::NotInstalled);
    let session = connect(&backend).await;
    assert_eq!(
        session.language_pack_status("_comp_us"),
        LanguagePackStatus::Installed
    );
    assert_eq!(
        session.language_pack_status("_comp_fr"),
        LanguagePackStatus::Unknown
    );
    assert_eq!(backend.language_pack_fetch_count("_comp_us"), 1);

    session.add_input_method("_comp_fr").expect("add");
    session.settled().await.expect("settled");
    assert_eq!(
        session.language_pack_status("_comp_fr"),
        LanguagePackStatus::NotInstalled
    );

    session.remove_input_method("_comp_fr").expect("remove");
    session.settled().await.expect("settled");
    session.add_input_method("_comp_fr").expect("re-add");
    session.settled().await.expect("settled");
    assert_eq!(backend.language_pack_fetch_count("_comp_fr"), 1);
    assert_eq!(backend.language_pack_fetch_count("_comp_us"), 1);
    assert_eq!(model(&session).model.input_methods.language_packs.len(), 2);
}

#[tokio::test]
/// What: Pushed changes overwrite cached statuses for every listed id.
async fn pushed_status_overwrites_cache() {
    let backend = backend();
    backend.set_language_pack_status("_comp_us", LanguagePackStatus::Installed);
    let session = connect(&backend).await;
    backend.push_language_pack_status(&["_comp_us", "_comp_de"], LanguagePackStatus::InProgress);
    session.settled().await.expect("settled");
    let state = model(&session);
    assert_eq!(
        state.language_pack_status("_comp_us"),
        LanguagePackStatus::InProgress
    );
    assert_eq!(
        state.language_pack_status("_comp_de"),
        LanguagePackStatus::InProgress
    );
}

#[tokio::test]
/// What: A failed fetch keeps its placeholder until the next refresh pass.
///
/// Inputs:
/// - Pack fetches failing while `_comp_fr` is added; recovered before
///   `_comp_de` is added.
///
/// Output:
/// - `_comp_fr` stays `Unknown` after the failure and is fetched again by
///   the next pass, which resolves it.
async fn failed_fetch_keeps_placeholder_until_next_pass() {
    let backend = backend();
    backend.set_language_pack_status("_comp_fr", LanguagePackStatus::Installed);
    let session = connect(&backend).await;

    backend.fail(FetchSource::LanguagePack);
    session.add_input_method("_comp_fr").expect("add");
    session.settled().await.expect("settled");
    assert_eq!(
        session.language_pack_status("_comp_fr"),
        LanguagePackStatus::Unknown
    );
    assert_eq!(backend.language_pack_fetch_count("_comp_fr"), 1);

    backend.recover(FetchSource::LanguagePack);
    session.add_input_method("_comp_de").expect("add");
    session.settled().await.expect("settled");
    assert_eq!(backend.language_pack_fetch_count("_comp_fr"), 2);
    assert_eq!(
        session.language_pack_status("_comp_fr"),
        LanguagePackStatus::Installed
    );
}

#[tokio::test]
/// What: With language packs disabled nothing is fetched or cached.
async fn disabled_language_packs_are_ignored() {
    let backend = backend();
    backend.set_language_pack_status("_comp_us", LanguagePackStatus::Installed);
    let settings = Settings {
        language_packs_enabled: false,
        ..Settings::default()
    };
    let session = connect_with(&backend, settings).await;
    assert_eq!(backend.language_pack_fetch_count("_comp_us"), 0);
    backend.push_language_pack_status(&["_comp_us"], LanguagePackStatus::InProgress);
    session.settled().await.expect("settled");
    assert_eq!(
        session.language_pack_status("_comp_us"),
        LanguagePackStatus::Unknown
    );
    assert!(model(&session).model.input_methods.language_packs.is_empty());
}
