use std::fs;
use std::path::Path;

use tracing::debug;

/// Session settings parsed from `settings.conf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Track language-pack install status for enabled input methods.
    pub language_packs_enabled: bool,
    /// Prospective UI language used when neither the catalog nor the
    /// `intl.app_locale` preference reports one.
    pub fallback_ui_language: String,
    /// Keep the accessibility dictation engine out of the enabled list.
    pub hide_dictation_ime: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language_packs_enabled: true,
            fallback_ui_language: "en-US".to_string(),
            hide_dictation_ime: true,
        }
    }
}

/// Interpret a config value as a boolean flag.
fn parse_bool(val: &str) -> bool {
    let lv = val.to_ascii_lowercase();
    lv == "true" || lv == "1" || lv == "yes" || lv == "on"
}

/// Drop a trailing `# comment` or `// comment` from a value.
fn strip_inline_comment(mut s: &str) -> &str {
    if let Some(i) = s.find("//") {
        s = &s[..i];
    }
    if let Some(i) = s.find('#') {
        s = &s[..i];
    }
    s.trim()
}

/// What: Parse settings from `settings.conf` content.
///
/// Inputs:
/// - `content`: File contents.
/// - `settings`: Settings to populate in place.
///
/// Output:
/// - None (modifies `settings`).
///
/// Details:
/// - Keys are lowercased with `.`, `-` and spaces folded to `_`.
/// - Blank lines, `#`/`//` comments and lines without `=` are skipped;
///   unknown keys are ignored.
pub fn parse_settings(content: &str, settings: &mut Settings) {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        if !trimmed.contains('=') {
            continue;
        }
        let mut parts = trimmed.splitn(2, '=');
        let raw_key = parts.next().unwrap_or("");
        let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
        let val = strip_inline_comment(parts.next().unwrap_or("").trim());
        match key.as_str() {
            "language_packs_enabled" | "language_packs" => {
                settings.language_packs_enabled = parse_bool(val);
            }
            "fallback_ui_language" | "ui_language" => {
                if !val.is_empty() {
                    settings.fallback_ui_language = val.to_string();
                }
            }
            "hide_dictation_ime" => {
                settings.hide_dictation_ime = parse_bool(val);
            }
            _ => debug!(key = %key, "[Config] ignoring unknown settings key"),
        }
    }
}

/// What: Load settings from `path`, or from the resolved default location.
///
/// Inputs:
/// - `path`: Explicit file (`--config`); `None` searches the default locations.
///
/// Output:
/// - Parsed settings; defaults when no file exists or it cannot be read.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut out = Settings::default();
    let resolved = path
        .map(Path::to_path_buf)
        .or_else(super::paths::resolve_settings_path);
    let Some(p) = resolved else {
        debug!("[Config] no settings.conf found; using defaults");
        return out;
    };
    match fs::read_to_string(&p) {
        Ok(content) => {
            debug!(path = %p.display(), bytes = content.len(), "[Config] Loaded settings.conf");
            parse_settings(&content, &mut out);
        }
        Err(e) => {
            tracing::warn!(path = %p.display(), error = %e, "[Config] failed to read settings.conf");
        }
    }
    out
}
