//! Errors surfaced by a settings session.

use std::fmt;

/// What: Failure of a session operation.
///
/// Details:
/// - Refused mutations are reported before any preference write, so the
///   store is never left half-updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Construction failed or the session was torn down; settings are unavailable.
    Unavailable,
    /// Operation issued before the ready signal fired.
    NotReady,
    /// Mutation refused by a model rule.
    Disallowed {
        /// Language code the mutation targeted.
        code: String,
        /// Rule that refused it.
        reason: &'static str,
    },
    /// Engine id absent from the supported catalog.
    UnknownInputMethod(String),
    /// Language code absent from the enabled list or catalog.
    UnknownLanguage(String),
    /// The preference store or engine service rejected a write.
    Store(String),
    /// A collaborator read failed.
    Service(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "language settings are unavailable"),
            Self::NotReady => write!(f, "language settings are not ready yet"),
            Self::Disallowed { code, reason } => {
                write!(f, "cannot change language {code}: {reason}")
            }
            Self::UnknownInputMethod(id) => write!(f, "unknown input method: {id}"),
            Self::UnknownLanguage(code) => write!(f, "unknown language: {code}"),
            Self::Store(msg) => write!(f, "preference write failed: {msg}"),
            Self::Service(msg) => write!(f, "settings service request failed: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<Box<dyn std::error::Error + Send + Sync>> for SettingsError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Store(err.to_string())
    }
}
