//! User-facing status messages
//!
//! Tools and sessions report progress ("Click on the center point"),
//! warnings ("No shape selected") and outcomes ("Done.") through
//! [`StatusMessage`]. The host decides how to show them.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    /// Prompt or progress information
    Info,
    /// An operation finished successfully
    Success,
    /// A step was aborted; the editor is unchanged
    Warning,
    /// An operation failed; the editor is unchanged
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A single message for the status bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }

    /// Whether this message reports an aborted step.
    pub fn is_failure(&self) -> bool {
        matches!(self.level, MessageLevel::Warning | MessageLevel::Error)
    }
}

impl From<&EditorError> for StatusMessage {
    fn from(err: &EditorError) -> Self {
        match err {
            EditorError::EmptyGeometry
            | EditorError::EmptyResult { .. }
            | EditorError::UnsupportedShapeKind { .. } => Self::error(err.to_string()),
            _ => Self::warning(err.to_string()),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}
