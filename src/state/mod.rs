//! Model state: catalog value types, derived records, and preference paths.
//!
//! Re-exports keep the common types reachable as `crate::state::*`.

pub mod model;
pub mod prefs;
pub mod types;

pub use model::{
    InputMethodsModel, LanguageState, LanguagesModel, Lifecycle, ModelChange, ModelPath,
    ModelState, SpellCheckLanguageState,
};
pub use prefs::{PrefPath, PrefSnapshot, PrefValue};
pub use types::{
    DictionaryStatus, InputMethod, InputMethodEvent, InputMethodLists, Language,
    LanguagePackStatus, LanguagePackStatusChange,
};
