//! Derivations from the catalog index plus a preference snapshot.
//!
//! Each function recomputes one slice of the model. The reactor decides
//! which ones to run from the changed preference path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::index::CatalogIndex;
use crate::logic::translate::{convert_language_code_for_translate, language_code_without_region};
use crate::state::{DictionaryStatus, Language, LanguageState, PrefSnapshot, SpellCheckLanguageState};

/// Dictionary progress carried from a previous derivation.
type DictionaryCarry = (Option<DictionaryStatus>, u32);

/// Spellcheck preference lists as sets, for per-code classification.
struct SpellCheckSets<'a> {
    /// `spellcheck.dictionaries`.
    user: HashSet<&'a str>,
    /// `spellcheck.forced_dictionaries`.
    forced: HashSet<&'a str>,
    /// `spellcheck.blocked_dictionaries`.
    blocked: HashSet<&'a str>,
}

impl<'a> SpellCheckSets<'a> {
    fn new(prefs: &'a PrefSnapshot) -> Self {
        Self {
            user: prefs.spellcheck_dictionaries.iter().map(String::as_str).collect(),
            forced: prefs.spellcheck_forced.iter().map(String::as_str).collect(),
            blocked: prefs.spellcheck_blocked.iter().map(String::as_str).collect(),
        }
    }

    /// Forced wins; otherwise user-enabled and not blocked.
    fn enabled(&self, code: &str) -> bool {
        (self.user.contains(code) && !self.blocked.contains(code)) || self.forced.contains(code)
    }

    fn managed(&self, code: &str) -> bool {
        self.forced.contains(code) || self.blocked.contains(code)
    }
}

/// What: Look a code up exactly, then without its region.
///
/// Inputs:
/// - `index`: Catalog index.
/// - `code`: Language or translate code (`en-GB`, `iw`, ...).
///
/// Output:
/// - Matching catalog entry, or `None` for stale codes.
#[must_use]
pub fn resolve_language<'a>(index: &'a CatalogIndex, code: &str) -> Option<&'a Arc<Language>> {
    index
        .language(code)
        .or_else(|| index.language(&language_code_without_region(code)))
}

/// What: Decide whether pages in `code` are offered for translation.
///
/// Inputs:
/// - `code`: Language code.
/// - `supports_translate`: Catalog capability flag.
/// - `blocked`: Translate-blocked translate codes.
/// - `target`: Current translate target.
/// - `prospective_ui_language`: Prospective UI language; empty when undefined.
///
/// Output:
/// - `true` iff translate is supported, the translate code is neither blocked
///   nor the target, and `code` is not the prospective UI language.
#[must_use]
pub fn is_translate_enabled(
    code: &str,
    supports_translate: bool,
    blocked: &HashSet<&str>,
    target: &str,
    prospective_ui_language: &str,
) -> bool {
    let translate_code = convert_language_code_for_translate(code);
    supports_translate
        && !blocked.contains(translate_code.as_str())
        && translate_code != target
        && (prospective_ui_language.is_empty() || code != prospective_ui_language)
}

/// What: Build the ordered enabled-language list from `intl.forced_languages`
/// and `intl.accept_languages`.
///
/// Inputs:
/// - `index`: Catalog index.
/// - `prefs`: Preference snapshot.
/// - `target`: Current translate target.
/// - `prospective_ui_language`: Prospective UI language (may be empty).
/// - `previous`: Entries from the prior derivation, used to carry dictionary
///   progress for codes that remain enabled.
///
/// Output:
/// - One entry per known code in preference order; `removable` is left
///   `false` for [`refresh_removable`] to fill in.
///
/// Details:
/// - Policy-forced codes come first and are flagged `is_forced`; user codes
///   follow in their own order.
/// - Codes absent from the catalog and repeated codes are skipped silently.
#[must_use]
pub fn enabled_language_states(
    index: &CatalogIndex,
    prefs: &PrefSnapshot,
    target: &str,
    prospective_ui_language: &str,
    previous: &[LanguageState],
) -> Vec<LanguageState> {
    let spell = SpellCheckSets::new(prefs);
    let forced: HashSet<&str> = prefs.forced_languages.iter().map(String::as_str).collect();
    let blocked = translate_blocked_set(prefs);
    let carried: HashMap<&str, DictionaryCarry> = previous
        .iter()
        .map(|s| {
            (
                s.language.code.as_str(),
                (
                    s.download_dictionary_status.clone(),
                    s.download_dictionary_failure_count,
                ),
            )
        })
        .collect();

    let mut seen = HashSet::new();
    let listed: Vec<&String> = prefs
        .forced_languages
        .iter()
        .chain(&prefs.accept_languages)
        .collect();
    let mut states = Vec::with_capacity(listed.len());
    for code in listed.iter().copied() {
        let Some(language) = index.language(code) else {
            continue;
        };
        if !seen.insert(code.as_str()) {
            continue;
        }
        let (status, failures) = carried.get(code.as_str()).cloned().unwrap_or_default();
        states.push(LanguageState {
            language: Arc::clone(language),
            removable: false,
            spell_check_enabled: spell.enabled(code),
            translate_enabled: is_translate_enabled(
                code,
                language.supports_translate,
                &blocked,
                target,
                prospective_ui_language,
            ),
            is_managed: spell.managed(code),
            is_forced: forced.contains(code.as_str()),
            download_dictionary_failure_count: failures,
            download_dictionary_status: status,
        });
    }
    let dropped = listed
        .iter()
        .filter(|c| !c.is_empty() && !index.contains_language(c))
        .count();
    if dropped > 0 {
        tracing::debug!(dropped, "skipped enabled languages missing from catalog");
    }
    states
}

/// What: Recompute `spell_check_enabled` and `is_managed` on every enabled entry.
///
/// Output:
/// - `true` when any entry changed.
pub fn apply_spell_check_flags(enabled: &mut [LanguageState], prefs: &PrefSnapshot) -> bool {
    let spell = SpellCheckSets::new(prefs);
    let mut changed = false;
    for state in enabled.iter_mut() {
        let code = state.language.code.as_str();
        let on = spell.enabled(code);
        let managed = spell.managed(code);
        if state.spell_check_enabled != on || state.is_managed != managed {
            state.spell_check_enabled = on;
            state.is_managed = managed;
            changed = true;
        }
    }
    changed
}

/// What: Split spellcheck-capable languages into the "on" and "off" lists.
///
/// Inputs:
/// - `supported`: Language catalog in catalog order.
/// - `index`: Catalog index.
/// - `prefs`: Preference snapshot.
/// - `previous_on` / `previous_off`: Prior lists, for dictionary carry-over.
///
/// Output:
/// - `(on, off)`.
///
/// Details:
/// - Codes are deduplicated in priority order forced, blocked, user, so a
///   code is classified once. "On" holds forced codes then user codes; "off"
///   holds every spellcheck-capable language not yet seen, plus blocked ones.
/// - A code that is both forced and blocked stays "on" and managed.
#[must_use]
pub fn spell_check_partition(
    supported: &[Arc<Language>],
    index: &CatalogIndex,
    prefs: &PrefSnapshot,
    previous_on: &[SpellCheckLanguageState],
    previous_off: &[SpellCheckLanguageState],
) -> (Vec<SpellCheckLanguageState>, Vec<SpellCheckLanguageState>) {
    let mut seen: HashSet<String> = HashSet::new();
    let forced = take_unseen(&prefs.spellcheck_forced, &mut seen);
    let blocked = take_unseen(&prefs.spellcheck_blocked, &mut seen);
    let user = take_unseen(&prefs.spellcheck_dictionaries, &mut seen);

    let forced_set: HashSet<&str> = forced.iter().map(String::as_str).collect();
    let blocked_set: HashSet<&str> = blocked.iter().map(String::as_str).collect();
    let carried: HashMap<&str, DictionaryCarry> = previous_on
        .iter()
        .chain(previous_off)
        .map(|s| {
            (
                s.language.code.as_str(),
                (
                    s.download_dictionary_status.clone(),
                    s.download_dictionary_failure_count,
                ),
            )
        })
        .collect();
    let make = |language: &Arc<Language>, on: bool, managed: bool| {
        let (status, failures) = carried
            .get(language.code.as_str())
            .cloned()
            .unwrap_or_default();
        SpellCheckLanguageState {
            language: Arc::clone(language),
            spell_check_enabled: on,
            is_managed: managed,
            download_dictionary_failure_count: failures,
            download_dictionary_status: status,
        }
    };

    let on = forced
        .iter()
        .chain(&user)
        .filter_map(|code| index.language(code).map(|l| (code, l)))
        .map(|(code, language)| make(language, true, forced_set.contains(code.as_str())))
        .collect();
    let off = supported
        .iter()
        .filter(|l| l.supports_spellcheck)
        .filter(|l| !seen.contains(l.code.as_str()) || blocked_set.contains(l.code.as_str()))
        .map(|language| make(language, false, blocked_set.contains(language.code.as_str())))
        .collect();
    (on, off)
}

/// Codes of `list` not in `seen`, first occurrence only; marks them seen.
fn take_unseen(list: &[String], seen: &mut HashSet<String>) -> Vec<String> {
    list.iter()
        .filter(|code| seen.insert((*code).clone()))
        .cloned()
        .collect()
}

/// Translate-blocked codes as a set.
fn translate_blocked_set(prefs: &PrefSnapshot) -> HashSet<&str> {
    prefs.translate_blocked.iter().map(String::as_str).collect()
}

/// What: Recompute `translate_enabled` in place on every enabled entry.
///
/// Output:
/// - `true` when any entry changed.
pub fn refresh_translate_enabled(
    enabled: &mut [LanguageState],
    prefs: &PrefSnapshot,
    target: &str,
    prospective_ui_language: &str,
) -> bool {
    let blocked = translate_blocked_set(prefs);
    let mut changed = false;
    for state in enabled.iter_mut() {
        let value = is_translate_enabled(
            &state.language.code,
            state.language.supports_translate,
            &blocked,
            target,
            prospective_ui_language,
        );
        if state.translate_enabled != value {
            state.translate_enabled = value;
            changed = true;
        }
    }
    changed
}

/// What: Whether `state` is the single enabled language not offered for translation.
#[must_use]
pub fn is_only_translate_blocked_language(enabled: &[LanguageState], state: &LanguageState) -> bool {
    !state.translate_enabled && enabled.iter().filter(|s| !s.translate_enabled).count() == 1
}

/// What: Whether the user may remove `state` from the enabled list.
///
/// Output:
/// - `false` when it is the only enabled language or the only
///   translate-blocked one.
#[must_use]
pub fn can_disable_language(enabled: &[LanguageState], state: &LanguageState) -> bool {
    if enabled.len() == 1 {
        return false;
    }
    !is_only_translate_blocked_language(enabled, state)
}

/// What: Recompute `removable` on every enabled entry.
///
/// Output:
/// - `true` when any entry changed.
pub fn refresh_removable(enabled: &mut [LanguageState]) -> bool {
    let flags: Vec<bool> = enabled
        .iter()
        .map(|s| can_disable_language(enabled, s))
        .collect();
    let mut changed = false;
    for (state, removable) in enabled.iter_mut().zip(flags) {
        if state.removable != removable {
            state.removable = removable;
            changed = true;
        }
    }
    changed
}

/// What: Resolve translate-list codes to catalog languages, dropping stale codes.
#[must_use]
pub fn translate_languages<S: AsRef<str>>(index: &CatalogIndex, codes: &[S]) -> Vec<Arc<Language>> {
    codes
        .iter()
        .filter_map(|code| resolve_language(index, code.as_ref()).cloned())
        .collect()
}
