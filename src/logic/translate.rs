//! Language code normalisation for the translate service.

use crate::state::Language;

/// Codes the translate server treats as another code.
const TRANSLATE_CODE_OVERRIDES: [(&str, &str); 5] = [
    ("nb", "no"),
    ("fil", "tl"),
    ("zh-HK", "zh-TW"),
    ("zh-MO", "zh-TW"),
    ("zh-SG", "zh-CN"),
];

/// Renamed ISO 639 codes the translate server still knows by their old name.
const TRANSLATE_SYNONYMS: [(&str, &str); 2] = [("he", "iw"), ("jv", "jw")];

/// Pseudo-language used to group Android (ARC) input methods.
pub const ARC_IME_LANGUAGE: &str = "_arc_ime_language_";

/// What: Convert an accept-language code into the code the translate server uses.
///
/// Inputs:
/// - `code`: Language code such as `en-US` or `zh-HK`.
///
/// Output:
/// - Translate code (`en`, `zh-TW`, `iw`, ...).
///
/// Details:
/// - Explicit overrides win; Chinese keeps its region; otherwise the region
///   is dropped and old synonyms are substituted.
#[must_use]
pub fn convert_language_code_for_translate(code: &str) -> String {
    if let Some((_, mapped)) = TRANSLATE_CODE_OVERRIDES.iter().find(|(from, _)| *from == code) {
        return (*mapped).to_string();
    }
    let main = code.split('-').next().unwrap_or(code);
    if main == "zh" {
        return code.to_string();
    }
    if let Some((_, synonym)) = TRANSLATE_SYNONYMS.iter().find(|(from, _)| *from == main) {
        return (*synonym).to_string();
    }
    main.to_string()
}

/// What: Strip the region from a language code (`en-GB` -> `en`).
///
/// Details:
/// - Norwegian variants fold into `no`; the legacy `iw` becomes `he` so it
///   matches the catalog.
#[must_use]
pub fn language_code_without_region(code: &str) -> String {
    match code {
        "nb" | "nn" => "no".to_string(),
        "iw" => "he".to_string(),
        _ => code.split('-').next().unwrap_or(code).to_string(),
    }
}

/// What: Whether pages in `language` can be translated.
///
/// Output:
/// - `true` for `zh-CN`/`zh-TW`, or for region-less codes the service supports.
#[must_use]
pub fn is_language_translatable(language: &Language) -> bool {
    if language.code == "zh-CN" || language.code == "zh-TW" {
        return true;
    }
    language.code == language_code_without_region(&language.code) && language.supports_translate
}

/// Whether `code` is the ARC input-method pseudo-language.
#[must_use]
pub fn is_language_code_for_arc_ime(code: &str) -> bool {
    code == ARC_IME_LANGUAGE
}
