//! Language-pack status cache keyed by input-method id.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::state::LanguagePackStatus;

/// What: Last known language-pack status per engine id.
///
/// Details:
/// - An `Unknown` entry claims the id: once present, the refresh pass never
///   fetches that id again while its fetch is outstanding or resolved.
/// - A failed fetch leaves the `Unknown` placeholder in place; the id is
///   reclaimed by the next refresh pass, not retried on its own.
/// - Push notifications overwrite entries regardless of in-flight fetches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguagePackCache {
    /// Status by engine id.
    entries: BTreeMap<String, LanguagePackStatus>,
    /// Ids whose last fetch failed and still hold a placeholder.
    #[serde(skip)]
    failed: BTreeSet<String>,
}

impl LanguagePackCache {
    /// Last known status; `Unknown` when nothing is cached.
    #[must_use]
    pub fn status(&self, id: &str) -> LanguagePackStatus {
        self.entries.get(id).copied().unwrap_or_default()
    }

    /// What: Claim every id without an entry by writing an `Unknown` placeholder.
    ///
    /// Inputs:
    /// - `ids`: Currently enabled engine ids.
    ///
    /// Output:
    /// - Ids claimed by this call; each needs exactly one fetch.
    pub fn claim_missing<'a, I>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut claimed = Vec::new();
        for id in ids {
            if self.entries.contains_key(id) && !self.failed.remove(id) {
                continue;
            }
            self.entries
                .insert(id.to_string(), LanguagePackStatus::Unknown);
            claimed.push(id.to_string());
        }
        claimed
    }

    /// What: Store a status for `id`.
    ///
    /// Output:
    /// - `true` when the cached value changed.
    pub fn record(&mut self, id: &str, status: LanguagePackStatus) -> bool {
        self.failed.remove(id);
        self.entries.insert(id.to_string(), status) != Some(status)
    }

    /// What: Note that the fetch for `id` failed so the next pass reclaims it.
    ///
    /// Details:
    /// - Ignored when a push already resolved the entry.
    pub fn mark_failed(&mut self, id: &str) {
        if self.entries.get(id) == Some(&LanguagePackStatus::Unknown) {
            self.failed.insert(id.to_string());
        }
    }

    /// Number of cached ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
