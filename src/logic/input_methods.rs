//! Enabled input-method derivation.

use std::collections::HashSet;
use std::sync::Arc;

use crate::index::CatalogIndex;
use crate::state::{InputMethod, PrefSnapshot};

/// Accessibility dictation engine, which is never listed with ordinary engines.
pub const ACCESSIBILITY_COMMON_IME_ID: &str = "_ext_ime_egfdjlfmgnehecnclamagfafdccgfndpdictation";

/// Id prefix of engines shipped with the system.
pub const COMPONENT_IME_PREFIX: &str = "_comp_";

/// What: Derive the enabled engines from the engine preferences.
///
/// Inputs:
/// - `index`: Catalog index.
/// - `prefs`: Preference snapshot.
/// - `hide_dictation`: Drop [`ACCESSIBILITY_COMMON_IME_ID`] from the list.
///
/// Output:
/// - `(ids, enabled)`: every listed id (known or not), and the known engines
///   in preference order.
///
/// Details:
/// - Component engines (`preload_engines`) precede third-party ones.
#[must_use]
pub fn enabled_input_methods(
    index: &CatalogIndex,
    prefs: &PrefSnapshot,
    hide_dictation: bool,
) -> (HashSet<String>, Vec<Arc<InputMethod>>) {
    let ids: Vec<&String> = prefs
        .preload_engines
        .iter()
        .chain(&prefs.enabled_extension_imes)
        .collect();
    let id_set: HashSet<String> = ids.iter().map(|id| (*id).clone()).collect();
    let mut seen = HashSet::new();
    let enabled = ids
        .into_iter()
        .filter_map(|id| index.input_method(id))
        .filter(|m| !(hide_dictation && m.id == ACCESSIBILITY_COMMON_IME_ID))
        .filter(|m| seen.insert(m.id.clone()))
        .cloned()
        .collect();
    (id_set, enabled)
}

/// What: Sync the `enabled` flag of supported engines with the enabled list.
///
/// Output:
/// - `true` when any entry changed.
///
/// Details:
/// - Changed entries are replaced by a fresh `Arc`; unchanged ones keep theirs.
pub fn refresh_supported_flags(
    supported: &mut [Arc<InputMethod>],
    enabled: &[Arc<InputMethod>],
) -> bool {
    let enabled_ids: HashSet<&str> = enabled.iter().map(|m| m.id.as_str()).collect();
    let mut changed = false;
    for entry in supported.iter_mut() {
        let flag = enabled_ids.contains(entry.id.as_str());
        if entry.enabled != flag {
            Arc::make_mut(entry).enabled = flag;
            changed = true;
        }
    }
    changed
}

/// What: Engines for several languages, deduplicated, in first-seen order.
#[must_use]
pub fn input_methods_for_languages<S: AsRef<str>>(
    index: &CatalogIndex,
    codes: &[S],
) -> Vec<Arc<InputMethod>> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .flat_map(|code| index.input_methods_for_language(code.as_ref()))
        .filter(|m| seen.insert(m.id.clone()))
        .cloned()
        .collect()
}

/// Whether the engine ships with the system.
#[must_use]
pub fn is_component_ime(input_method: &InputMethod) -> bool {
    input_method.id.starts_with(COMPONENT_IME_PREFIX)
}
