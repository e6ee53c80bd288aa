//! Read-only queries over a published snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use crate::logic::derive::{self, resolve_language};
use crate::logic::input_methods;
use crate::logic::translate::is_language_code_for_arc_ime;
use crate::state::{InputMethod, Language, LanguagePackStatus, LanguageState, ModelState};

impl ModelState {
    /// Whether `code` is in the enabled list.
    #[must_use]
    pub fn is_language_enabled(&self, code: &str) -> bool {
        self.enabled_language_set.contains(code)
    }

    /// Codes of every enabled language.
    #[must_use]
    pub fn enabled_language_codes(&self) -> &HashSet<String> {
        &self.enabled_language_set
    }

    /// What: Catalog entry for `code`, falling back to the code without region.
    #[must_use]
    pub fn get_language(&self, code: &str) -> Option<&Arc<Language>> {
        resolve_language(&self.index, code)
    }

    /// Enabled entry for `code`.
    #[must_use]
    pub fn enabled_language(&self, code: &str) -> Option<&LanguageState> {
        self.model.enabled.iter().find(|s| s.language.code == code)
    }

    /// What: Whether `language` may be added to the enabled list.
    ///
    /// Output:
    /// - `false` when already enabled, prohibited by policy, or the ARC
    ///   engine pseudo-language.
    #[must_use]
    pub fn can_enable_language(&self, language: &Language) -> bool {
        !(self.is_language_enabled(&language.code)
            || language.is_prohibited_language
            || is_language_code_for_arc_ime(&language.code))
    }

    /// What: Whether the enabled language `code` may be removed.
    ///
    /// Output:
    /// - `false` for codes that are not enabled.
    #[must_use]
    pub fn can_disable_language(&self, code: &str) -> bool {
        self.enabled_language(code)
            .is_some_and(|state| derive::can_disable_language(&self.model.enabled, state))
    }

    /// Whether `code` is the only enabled language not offered for translation.
    #[must_use]
    pub fn is_only_translate_blocked_language(&self, code: &str) -> bool {
        self.enabled_language(code).is_some_and(|state| {
            derive::is_only_translate_blocked_language(&self.model.enabled, state)
        })
    }

    /// Whether `id` is listed in the engine preferences, known or not.
    #[must_use]
    pub fn is_input_method_enabled(&self, id: &str) -> bool {
        self.enabled_input_method_set.contains(id)
    }

    /// Engines typing `code`.
    #[must_use]
    pub fn input_methods_for_language(&self, code: &str) -> &[Arc<InputMethod>] {
        self.index.input_methods_for_language(code)
    }

    /// Engines typing any of `codes`, deduplicated.
    #[must_use]
    pub fn input_methods_for_languages<S: AsRef<str>>(&self, codes: &[S]) -> Vec<Arc<InputMethod>> {
        input_methods::input_methods_for_languages(&self.index, codes)
    }

    /// Display name of engine `id`; empty when unknown.
    #[must_use]
    pub fn input_method_display_name(&self, id: &str) -> String {
        self.index
            .input_method(id)
            .map(|m| m.display_name.clone())
            .unwrap_or_default()
    }

    /// Cached language-pack status for engine `id`.
    #[must_use]
    pub fn language_pack_status(&self, id: &str) -> LanguagePackStatus {
        self.model.input_methods.language_packs.status(id)
    }

    /// Whether the prospective UI language differs from the one at startup.
    #[must_use]
    pub fn requires_restart(&self) -> bool {
        self.original_prospective_ui_language != self.model.prospective_ui_language
    }
}
