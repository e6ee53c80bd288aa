//! Initial fan-out fetch and one-shot model construction.

use std::sync::Arc;

use crate::config::Settings;
use crate::index::CatalogIndex;
use crate::logic;
use crate::sources::{Result, Services};
use crate::state::{
    InputMethod, InputMethodsModel, Language, LanguagesModel, ModelState, PrefSnapshot,
};

use super::dispatch::{self, Effect, Step};

/// Everything fetched before the model can be built.
#[derive(Clone, Debug, Default)]
pub struct ModelArgs {
    /// Language catalog.
    pub supported_languages: Vec<Language>,
    /// Translate target.
    pub translate_target: String,
    /// Engine catalog, component engines first.
    pub supported_input_methods: Vec<InputMethod>,
    /// Active engine id.
    pub current_input_method_id: String,
    /// Always-translate codes.
    pub always_translate_codes: Vec<String>,
    /// Never-translate codes.
    pub never_translate_codes: Vec<String>,
    /// Prospective UI language reported by the catalog (may be empty).
    pub prospective_ui_language: String,
}

/// What: Issue every initial fetch concurrently and wait for all of them.
///
/// Inputs:
/// - `services`: Collaborators.
///
/// Output:
/// - Collected arguments once the preference store is initialized and every
///   fetch resolved.
///
/// # Errors
/// - Returns the first fetch error; nothing is built in that case.
pub async fn fetch_model_args(services: &Services) -> Result<ModelArgs> {
    let (
        (),
        supported_languages,
        translate_target,
        input_method_lists,
        current_input_method_id,
        always_translate_codes,
        never_translate_codes,
        prospective_ui_language,
    ) = tokio::try_join!(
        services.prefs.initialized(),
        services.catalog.list_languages(),
        services.catalog.translate_target(),
        services.input_methods.list_input_methods(),
        services.input_methods.current_input_method(),
        services.catalog.always_translate(),
        services.catalog.never_translate(),
        services.catalog.prospective_ui_language(),
    )?;
    Ok(ModelArgs {
        supported_languages,
        translate_target,
        supported_input_methods: input_method_lists.into_combined(),
        current_input_method_id,
        always_translate_codes,
        never_translate_codes,
        prospective_ui_language,
    })
}

/// What: Build the complete model from fetched arguments and a preference snapshot.
///
/// Inputs:
/// - `args`: Fetched catalogs and translate settings.
/// - `prefs`: Preference snapshot taken after the store initialized.
/// - `settings`: Session settings.
///
/// Output:
/// - `(state, effects)`: the model with every derivation run once, plus the
///   post-build fetches (dictionary statuses and language-pack claims).
///
/// Details:
/// - The prospective UI language is `intl.app_locale`, else the catalog's
///   value, else `settings.fallback_ui_language`.
#[must_use]
pub fn create_model(
    args: ModelArgs,
    prefs: &PrefSnapshot,
    settings: &Settings,
) -> (ModelState, Vec<Effect>) {
    let supported: Vec<Arc<Language>> =
        args.supported_languages.into_iter().map(Arc::new).collect();
    let input_methods: Vec<Arc<InputMethod>> =
        args.supported_input_methods.into_iter().map(Arc::new).collect();
    let index = Arc::new(CatalogIndex::build(&supported, &input_methods));

    let original = if args.prospective_ui_language.is_empty() {
        settings.fallback_ui_language.clone()
    } else {
        args.prospective_ui_language
    };
    let prospective_ui_language = if prefs.app_locale.is_empty() {
        original.clone()
    } else {
        prefs.app_locale.clone()
    };

    let (on, off) = logic::spell_check_partition(&supported, &index, prefs, &[], &[]);
    let always_translate = logic::translate_languages(&index, &args.always_translate_codes);
    let never_translate = logic::translate_languages(&index, &args.never_translate_codes);

    let mut state = ModelState {
        model: LanguagesModel {
            supported,
            enabled: Vec::new(),
            translate_target: args.translate_target,
            prospective_ui_language,
            input_methods: InputMethodsModel {
                supported: input_methods,
                enabled: Vec::new(),
                current_id: args.current_input_method_id,
                language_packs: Default::default(),
            },
            always_translate,
            never_translate,
            spell_check_on_languages: on,
            spell_check_off_languages: off,
        },
        index,
        original_prospective_ui_language: original,
        ..ModelState::default()
    };

    let mut step = Step::default();
    dispatch::rederive_enabled_languages(&mut state, prefs, &mut step);
    dispatch::update_enabled_input_methods(&mut state, prefs, settings, &mut step);
    let mut effects = vec![Effect::FetchDictionaryStatuses];
    effects.extend(step.effects);
    tracing::info!(
        supported = state.model.supported.len(),
        enabled = state.model.enabled.len(),
        input_methods = state.model.input_methods.supported.len(),
        enabled_input_methods = state.model.input_methods.enabled.len(),
        "built language settings model"
    );
    (state, effects)
}
