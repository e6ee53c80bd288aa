//! Command-line argument definition and processing.

use std::path::PathBuf;

use clap::Parser;

use crate::app::{LanguageSettings, SettingsError};
use crate::args::utils::parse_spellcheck;

/// langsettings - inspect and edit a language & input-method settings model
#[derive(Parser, Debug, Default)]
#[command(name = "langsettings")]
#[command(version)]
#[command(about = "Build the language settings model from a fixture, apply edits, print the result", long_about = None)]
pub struct Args {
    /// JSON fixture with catalogs and preferences for the in-memory backend
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Settings file (default: ~/.config/langsettings/settings.conf)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable a language (repeatable)
    #[arg(long, value_name = "CODE")]
    pub enable: Vec<String>,

    /// Disable a language (repeatable)
    #[arg(long, value_name = "CODE")]
    pub disable: Vec<String>,

    /// Turn a spellcheck dictionary on or off, e.g. `--spellcheck fr=on` (repeatable)
    #[arg(long, value_name = "CODE=on|off")]
    pub spellcheck: Vec<String>,

    /// Set the translate target language
    #[arg(long, value_name = "CODE")]
    pub translate_target: Option<String>,

    /// Enable an input method (repeatable)
    #[arg(long, value_name = "ID")]
    pub add_ime: Vec<String>,

    /// Disable an input method (repeatable)
    #[arg(long, value_name = "ID")]
    pub remove_ime: Vec<String>,

    /// Move a language one position up (repeatable)
    #[arg(long, value_name = "CODE")]
    pub move_up: Vec<String>,

    /// Move a language one position down (repeatable)
    #[arg(long, value_name = "CODE")]
    pub move_down: Vec<String>,

    /// Move a language to the front (repeatable)
    #[arg(long, value_name = "CODE")]
    pub move_to_front: Vec<String>,
}

/// One edit requested on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// `--enable`
    Enable(String),
    /// `--disable`
    Disable(String),
    /// `--spellcheck`
    Spellcheck(String, bool),
    /// `--translate-target`
    TranslateTarget(String),
    /// `--add-ime`
    AddInputMethod(String),
    /// `--remove-ime`
    RemoveInputMethod(String),
    /// `--move-up` / `--move-down`
    Move(String, bool),
    /// `--move-to-front`
    MoveToFront(String),
}

impl Args {
    /// What: Flatten the edit flags into an ordered operation list.
    ///
    /// Output:
    /// - Operations grouped by kind: enables, spellcheck, translate target,
    ///   input-method adds and removes, moves, then disables.
    ///
    /// # Errors
    /// - Returns the offending argument when a `--spellcheck` value is malformed.
    pub fn operations(&self) -> Result<Vec<Operation>, String> {
        let mut ops: Vec<Operation> = self.enable.iter().cloned().map(Operation::Enable).collect();
        for raw in &self.spellcheck {
            let (code, on) = parse_spellcheck(raw)?;
            ops.push(Operation::Spellcheck(code, on));
        }
        if let Some(code) = &self.translate_target {
            ops.push(Operation::TranslateTarget(code.clone()));
        }
        ops.extend(self.add_ime.iter().cloned().map(Operation::AddInputMethod));
        ops.extend(self.remove_ime.iter().cloned().map(Operation::RemoveInputMethod));
        ops.extend(self.move_up.iter().map(|c| Operation::Move(c.clone(), true)));
        ops.extend(self.move_down.iter().map(|c| Operation::Move(c.clone(), false)));
        ops.extend(self.move_to_front.iter().cloned().map(Operation::MoveToFront));
        ops.extend(self.disable.iter().cloned().map(Operation::Disable));
        Ok(ops)
    }
}

/// What: Apply one operation through the session's mutators.
///
/// # Errors
/// - Whatever the mutator refuses with.
pub fn apply_operation(session: &LanguageSettings, op: &Operation) -> Result<(), SettingsError> {
    match op {
        Operation::Enable(code) => session.enable_language(code),
        Operation::Disable(code) => session.disable_language(code),
        Operation::Spellcheck(code, on) => session.toggle_spellcheck(code, *on),
        Operation::TranslateTarget(code) => session.set_translate_target_language(code),
        Operation::AddInputMethod(id) => session.add_input_method(id),
        Operation::RemoveInputMethod(id) => session.remove_input_method(id),
        Operation::Move(code, up) => session.move_language(code, *up),
        Operation::MoveToFront(code) => session.move_language_to_front(code),
    }
}

/// What: Apply every operation, letting the reactor settle after each one.
///
/// Inputs:
/// - `ops`: Operations in application order.
/// - `session`: Ready session.
///
/// Output:
/// - Refused operations with their errors; the rest were applied.
///
/// # Errors
/// - `Unavailable` when the session goes away mid-run.
pub async fn process_args(
    ops: &[Operation],
    session: &LanguageSettings,
) -> Result<Vec<(Operation, SettingsError)>, SettingsError> {
    let mut refused = Vec::new();
    for op in ops {
        match apply_operation(session, op) {
            Ok(()) => tracing::info!(op = ?op, "applied operation"),
            Err(SettingsError::Unavailable) => return Err(SettingsError::Unavailable),
            Err(e) => {
                tracing::warn!(op = ?op, error = %e, "operation refused");
                refused.push((op.clone(), e));
            }
        }
        session.settled().await?;
    }
    Ok(refused)
}
