//! Error classification shared across the bot

use serde::Serialize;

/// How a failure must be handled by the step that observed it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Network or venue hiccup; logged and the cycle continues
    Transient,
    /// Bad or unsupported setup; fatal at startup
    Configuration,
    /// The requested data or capability does not exist right now
    Unavailable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Unavailable => write!(f, "unavailable"),
        }
    }
}
