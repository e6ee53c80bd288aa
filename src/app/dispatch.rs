//! Reactor steps: which derivations each change re-runs.
//!
//! Every function here edits a [`ModelState`] synchronously and returns a
//! [`Step`] naming the touched model paths plus follow-up fetches. The reactor
//! task publishes the paths and spawns the fetches.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::Settings;
use crate::index::CatalogIndex;
use crate::logic::{self, statuses_by_code};
use crate::state::{
    DictionaryStatus, InputMethod, InputMethodEvent, InputMethodLists, LanguagePackStatus,
    LanguagePackStatusChange, ModelPath, ModelState, PrefPath, PrefSnapshot,
};

/// Follow-up fetch requested by a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Refetch dictionary statuses.
    FetchDictionaryStatuses,
    /// Refetch the translate target.
    FetchTranslateTarget,
    /// Refetch the engine catalog.
    FetchInputMethods,
    /// Fetch language-pack status for each claimed id.
    FetchLanguagePacks(Vec<String>),
}

/// Outcome of one reactor step.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// Model paths changed by the step.
    pub paths: BTreeSet<ModelPath>,
    /// Fetches to issue.
    pub effects: Vec<Effect>,
}

impl Step {
    fn touch_if(&mut self, changed: bool, path: ModelPath) {
        if changed {
            self.paths.insert(path);
        }
    }
}

/// Assign `value` to `slot` and report whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// What: Re-run the derivations that depend on `path`.
///
/// Inputs:
/// - `state`: Model to update in place.
/// - `path`: Changed preference.
/// - `prefs`: Snapshot read after the change.
/// - `settings`: Session settings.
///
/// Output:
/// - Touched paths and follow-up fetches.
pub fn apply_pref_change(
    state: &mut ModelState,
    path: PrefPath,
    prefs: &PrefSnapshot,
    settings: &Settings,
) -> Step {
    let mut step = Step::default();
    match path {
        PrefPath::AcceptLanguages | PrefPath::ForcedLanguages => {
            rederive_enabled_languages(state, prefs, &mut step);
            update_enabled_input_methods(state, prefs, settings, &mut step);
            step.effects.push(Effect::FetchDictionaryStatuses);
            step.effects.push(Effect::FetchTranslateTarget);
        }
        PrefPath::SpellcheckDictionaries
        | PrefPath::SpellcheckForcedDictionaries
        | PrefPath::SpellcheckBlockedDictionaries => {
            let flags = logic::apply_spell_check_flags(&mut state.model.enabled, prefs);
            step.touch_if(flags, ModelPath::Enabled);
            let (on, off) = logic::spell_check_partition(
                &state.model.supported,
                &state.index,
                prefs,
                &state.model.spell_check_on_languages,
                &state.model.spell_check_off_languages,
            );
            let on_changed = replace(&mut state.model.spell_check_on_languages, on);
            step.touch_if(on_changed, ModelPath::SpellCheckOn);
            let off_changed = replace(&mut state.model.spell_check_off_languages, off);
            step.touch_if(off_changed, ModelPath::SpellCheckOff);
        }
        PrefPath::TranslateBlockedLanguages => {
            let never = logic::translate_languages(&state.index, &prefs.translate_blocked);
            let changed = replace(&mut state.model.never_translate, never);
            step.touch_if(changed, ModelPath::NeverTranslate);
            refresh_translate_and_removable(state, prefs, &mut step);
        }
        PrefPath::TranslateAllowlists => {
            let codes: Vec<&String> = prefs.translate_allowlists.keys().collect();
            let always = logic::translate_languages(&state.index, &codes);
            let changed = replace(&mut state.model.always_translate, always);
            step.touch_if(changed, ModelPath::AlwaysTranslate);
        }
        PrefPath::TranslateRecentTarget => {
            if prefs.translate_recent_target.is_empty() {
                // Cleared: the catalog service owns the target again.
                step.effects.push(Effect::FetchTranslateTarget);
            } else {
                let changed = replace(
                    &mut state.model.translate_target,
                    prefs.translate_recent_target.clone(),
                );
                step.touch_if(changed, ModelPath::TranslateTarget);
            }
            refresh_translate_and_removable(state, prefs, &mut step);
        }
        PrefPath::AppLocale => {
            let prospective = if prefs.app_locale.is_empty() {
                state.original_prospective_ui_language.clone()
            } else {
                prefs.app_locale.clone()
            };
            let changed = replace(&mut state.model.prospective_ui_language, prospective);
            step.touch_if(changed, ModelPath::ProspectiveUiLanguage);
            refresh_translate_and_removable(state, prefs, &mut step);
        }
        PrefPath::PreloadEngines | PrefPath::EnabledExtensionImes => {
            update_enabled_input_methods(state, prefs, settings, &mut step);
            let removable = logic::refresh_removable(&mut state.model.enabled);
            step.touch_if(removable, ModelPath::Enabled);
        }
    }
    step
}

/// What: Rebuild the enabled-language list and its code set.
pub fn rederive_enabled_languages(state: &mut ModelState, prefs: &PrefSnapshot, step: &mut Step) {
    let mut enabled = logic::enabled_language_states(
        &state.index,
        prefs,
        &state.model.translate_target,
        &state.model.prospective_ui_language,
        &state.model.enabled,
    );
    logic::refresh_removable(&mut enabled);
    state.enabled_language_set = enabled.iter().map(|s| s.language.code.clone()).collect();
    let changed = replace(&mut state.model.enabled, enabled);
    step.touch_if(changed, ModelPath::Enabled);
}

/// Recompute `translate_enabled` in place, then removability.
fn refresh_translate_and_removable(state: &mut ModelState, prefs: &PrefSnapshot, step: &mut Step) {
    let model = &mut state.model;
    let translate = logic::refresh_translate_enabled(
        &mut model.enabled,
        prefs,
        &model.translate_target,
        &model.prospective_ui_language,
    );
    let removable = logic::refresh_removable(&mut model.enabled);
    step.touch_if(translate || removable, ModelPath::Enabled);
}

/// What: Re-derive enabled engines, sync supported flags, and claim pack slots.
///
/// Details:
/// - When a flag changes the index is rebuilt over the supported list, so
///   index lookups, language buckets and both model lists share one `Arc`
///   per engine.
pub fn update_enabled_input_methods(
    state: &mut ModelState,
    prefs: &PrefSnapshot,
    settings: &Settings,
    step: &mut Step,
) {
    let (ids, enabled) =
        logic::enabled_input_methods(&state.index, prefs, settings.hide_dictation_ime);
    state.enabled_input_method_set = ids;
    let flags =
        logic::refresh_supported_flags(&mut state.model.input_methods.supported, &enabled);
    if flags {
        // Flagged entries are fresh allocations; the index must hand them out.
        state.index = Arc::new(CatalogIndex::build(
            &state.model.supported,
            &state.model.input_methods.supported,
        ));
    }
    step.touch_if(flags, ModelPath::InputMethodsSupported);
    let enabled: Vec<Arc<InputMethod>> = enabled
        .iter()
        .map(|m| Arc::clone(state.index.input_method(&m.id).unwrap_or(m)))
        .collect();
    let input_methods = &mut state.model.input_methods;
    let enabled_changed = replace(&mut input_methods.enabled, enabled);
    step.touch_if(enabled_changed, ModelPath::InputMethodsEnabled);
    if settings.language_packs_enabled {
        let claimed = input_methods
            .language_packs
            .claim_missing(input_methods.enabled.iter().map(|m| m.id.as_str()));
        if !claimed.is_empty() {
            step.paths.insert(ModelPath::LanguagePackStatus);
            step.effects.push(Effect::FetchLanguagePacks(claimed));
        }
    }
}

/// What: Install a refetched engine catalog.
///
/// Details:
/// - The index is rebuilt wholesale, then the enabled engines re-derived.
pub fn apply_input_method_catalog(
    state: &mut ModelState,
    lists: InputMethodLists,
    prefs: &PrefSnapshot,
    settings: &Settings,
) -> Step {
    let mut step = Step::default();
    let supported: Vec<Arc<InputMethod>> =
        lists.into_combined().into_iter().map(Arc::new).collect();
    state.index = Arc::new(CatalogIndex::build(&state.model.supported, &supported));
    let changed = replace(&mut state.model.input_methods.supported, supported);
    step.touch_if(changed, ModelPath::InputMethodsSupported);
    update_enabled_input_methods(state, prefs, settings, &mut step);
    step
}

/// What: React to an engine push event.
///
/// Output:
/// - Added/removed request a catalog refetch; current-changed updates only
///   `current_id`.
pub fn apply_input_method_event(state: &mut ModelState, event: InputMethodEvent) -> Step {
    let mut step = Step::default();
    match event {
        InputMethodEvent::Added(_) | InputMethodEvent::Removed(_) => {
            step.effects.push(Effect::FetchInputMethods);
        }
        InputMethodEvent::CurrentChanged(id) => {
            let changed = replace(&mut state.model.input_methods.current_id, id);
            step.touch_if(changed, ModelPath::CurrentInputMethod);
        }
    }
    step
}

/// What: Store dictionary statuses on every tracked collection.
pub fn apply_dictionary_statuses(state: &mut ModelState, statuses: &[DictionaryStatus]) -> Step {
    let mut step = Step::default();
    let by_code = statuses_by_code(statuses);
    let model = &mut state.model;
    let enabled = logic::apply_dictionary_statuses(&mut model.enabled, &by_code);
    step.touch_if(enabled, ModelPath::Enabled);
    let on = logic::apply_dictionary_statuses(&mut model.spell_check_on_languages, &by_code);
    step.touch_if(on, ModelPath::SpellCheckOn);
    let off = logic::apply_dictionary_statuses(&mut model.spell_check_off_languages, &by_code);
    step.touch_if(off, ModelPath::SpellCheckOff);
    step
}

/// What: Install a refetched translate target and re-run translate eligibility.
pub fn apply_translate_target(state: &mut ModelState, target: String, prefs: &PrefSnapshot) -> Step {
    let mut step = Step::default();
    let changed = replace(&mut state.model.translate_target, target);
    step.touch_if(changed, ModelPath::TranslateTarget);
    if changed {
        refresh_translate_and_removable(state, prefs, &mut step);
    }
    step
}

/// What: Record one language-pack status.
pub fn apply_language_pack_status(
    state: &mut ModelState,
    id: &str,
    status: LanguagePackStatus,
) -> Step {
    let mut step = Step::default();
    let changed = state.model.input_methods.language_packs.record(id, status);
    step.touch_if(changed, ModelPath::LanguagePackStatus);
    step
}

/// What: Keep the placeholder of a failed pack fetch and mark it for reclaiming.
pub fn apply_language_pack_failure(state: &mut ModelState, id: &str) -> Step {
    state.model.input_methods.language_packs.mark_failed(id);
    Step::default()
}

/// What: Apply a pushed language-pack change to every listed id.
pub fn apply_language_pack_change(state: &mut ModelState, change: &LanguagePackStatusChange) -> Step {
    let mut step = Step::default();
    for id in &change.engine_ids {
        let changed = state.model.input_methods.language_packs.record(id, change.status);
        step.touch_if(changed, ModelPath::LanguagePackStatus);
    }
    step
}
