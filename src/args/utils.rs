//! Shared utilities for argument processing.

/// What: Determine the log level based on command-line arguments.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `log_level`. `RUST_LOG` still wins at filter setup.
#[must_use]
pub fn determine_log_level(args: &crate::args::Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}

/// What: Parse a `--spellcheck` value.
///
/// Inputs:
/// - `raw`: `CODE=on|off` (also accepts true/false, 1/0, yes/no).
///
/// Output:
/// - `(code, enabled)`.
///
/// # Errors
/// - Returns a message when the `=` or a recognised state is missing.
pub fn parse_spellcheck(raw: &str) -> Result<(String, bool), String> {
    let Some((code, state)) = raw.split_once('=') else {
        return Err(format!("expected CODE=on|off, got {raw:?}"));
    };
    let code = code.trim();
    if code.is_empty() {
        return Err(format!("missing language code in {raw:?}"));
    }
    let enabled = match state.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => true,
        "off" | "false" | "0" | "no" => false,
        other => return Err(format!("unknown spellcheck state {other:?} in {raw:?}")),
    };
    Ok((code.to_string(), enabled))
}
