//! Pure derivation logic for the language settings model.

pub mod derive;
pub mod dictionary;
pub mod input_methods;
mod queries;
pub mod translate;

pub use derive::{
    apply_spell_check_flags, can_disable_language, enabled_language_states,
    is_only_translate_blocked_language, is_translate_enabled, refresh_removable,
    refresh_translate_enabled, resolve_language, spell_check_partition, translate_languages,
};
pub use dictionary::{DictionaryTracked, apply_dictionary_statuses, statuses_by_code};
pub use input_methods::{
    ACCESSIBILITY_COMMON_IME_ID, COMPONENT_IME_PREFIX, enabled_input_methods,
    input_methods_for_languages, is_component_ime, refresh_supported_flags,
};
pub use translate::{
    ARC_IME_LANGUAGE, convert_language_code_for_translate, is_language_code_for_arc_ime,
    is_language_translatable, language_code_without_region,
};
