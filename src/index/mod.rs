//! Lookup structures over the language and input-method catalogs.
//!
//! The index is a pure function of the two catalogs. It is rebuilt wholesale
//! whenever the engine catalog changes and never patched in place.

use std::collections::HashMap;
use std::sync::Arc;

use crate::state::{InputMethod, Language};

/// Maps for O(1) catalog lookups.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    /// Language by code.
    languages: HashMap<String, Arc<Language>>,
    /// Engine by id.
    input_methods: HashMap<String, Arc<InputMethod>>,
    /// Engines supporting each catalog language, in catalog order.
    language_input_methods: HashMap<String, Vec<Arc<InputMethod>>>,
}

impl CatalogIndex {
    /// What: Build every lookup map from the catalogs.
    ///
    /// Inputs:
    /// - `languages`: Language catalog.
    /// - `input_methods`: Engine catalog (component then third-party).
    ///
    /// Output:
    /// - Index sharing the given `Arc`s.
    ///
    /// Details:
    /// - Each engine is bucketed under every language code it lists, skipping
    ///   codes absent from the language catalog.
    #[must_use]
    pub fn build(languages: &[Arc<Language>], input_methods: &[Arc<InputMethod>]) -> Self {
        let languages: HashMap<String, Arc<Language>> = languages
            .iter()
            .map(|l| (l.code.clone(), Arc::clone(l)))
            .collect();
        let mut by_id = HashMap::with_capacity(input_methods.len());
        let mut by_language: HashMap<String, Vec<Arc<InputMethod>>> = HashMap::new();
        for input_method in input_methods {
            by_id.insert(input_method.id.clone(), Arc::clone(input_method));
            for code in &input_method.language_codes {
                if !languages.contains_key(code) {
                    continue;
                }
                by_language
                    .entry(code.clone())
                    .or_default()
                    .push(Arc::clone(input_method));
            }
        }
        tracing::debug!(
            languages = languages.len(),
            input_methods = by_id.len(),
            buckets = by_language.len(),
            "built catalog index"
        );
        Self {
            languages,
            input_methods: by_id,
            language_input_methods: by_language,
        }
    }

    /// Exact language lookup.
    #[must_use]
    pub fn language(&self, code: &str) -> Option<&Arc<Language>> {
        self.languages.get(code)
    }

    /// Whether `code` is in the language catalog.
    #[must_use]
    pub fn contains_language(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Engine lookup by id.
    #[must_use]
    pub fn input_method(&self, id: &str) -> Option<&Arc<InputMethod>> {
        self.input_methods.get(id)
    }

    /// Whether `id` is in the engine catalog.
    #[must_use]
    pub fn contains_input_method(&self, id: &str) -> bool {
        self.input_methods.contains_key(id)
    }

    /// Engines supporting `code`; empty for unknown languages.
    #[must_use]
    pub fn input_methods_for_language(&self, code: &str) -> &[Arc<InputMethod>] {
        self.language_input_methods
            .get(code)
            .map_or(&[], Vec::as_slice)
    }
}
