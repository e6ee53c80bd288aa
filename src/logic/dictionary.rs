//! Spellcheck dictionary download tracking.

use std::collections::HashMap;

use crate::state::{DictionaryStatus, LanguageState, SpellCheckLanguageState};

/// Model entries that carry dictionary download progress.
pub trait DictionaryTracked {
    /// Language code of the entry.
    fn code(&self) -> &str;
    /// Mutable status and failure counter.
    fn dictionary_mut(&mut self) -> (&mut Option<DictionaryStatus>, &mut u32);
}

impl DictionaryTracked for LanguageState {
    fn code(&self) -> &str {
        &self.language.code
    }

    fn dictionary_mut(&mut self) -> (&mut Option<DictionaryStatus>, &mut u32) {
        (
            &mut self.download_dictionary_status,
            &mut self.download_dictionary_failure_count,
        )
    }
}

impl DictionaryTracked for SpellCheckLanguageState {
    fn code(&self) -> &str {
        &self.language.code
    }

    fn dictionary_mut(&mut self) -> (&mut Option<DictionaryStatus>, &mut u32) {
        (
            &mut self.download_dictionary_status,
            &mut self.download_dictionary_failure_count,
        )
    }
}

/// What: Store reported statuses on matching entries and maintain failure counts.
///
/// Inputs:
/// - `entries`: Entries of one model collection.
/// - `statuses`: Status per language code.
///
/// Output:
/// - `true` when any entry changed.
///
/// Details:
/// - The counter grows by one on a transition into `download_failed` and
///   resets to zero on a transition into `is_ready`.
/// - Entries without a reported status are untouched.
pub fn apply_dictionary_statuses<T: DictionaryTracked>(
    entries: &mut [T],
    statuses: &HashMap<&str, &DictionaryStatus>,
) -> bool {
    let mut changed = false;
    for entry in entries.iter_mut() {
        let Some(status) = statuses.get(entry.code()).copied() else {
            continue;
        };
        let (current, failures) = entry.dictionary_mut();
        let was_failed = current.as_ref().is_some_and(|s| s.download_failed);
        let was_ready = current.as_ref().is_some_and(|s| s.is_ready);
        if status.download_failed && !was_failed {
            *failures += 1;
            changed = true;
        } else if status.is_ready && !was_ready && *failures != 0 {
            *failures = 0;
            changed = true;
        }
        if current.as_ref() != Some(status) {
            *current = Some(status.clone());
            changed = true;
        }
    }
    changed
}

/// What: Index a status batch by language code; later entries win.
#[must_use]
pub fn statuses_by_code(statuses: &[DictionaryStatus]) -> HashMap<&str, &DictionaryStatus> {
    statuses
        .iter()
        .map(|s| (s.language_code.as_str(), s))
        .collect()
}
