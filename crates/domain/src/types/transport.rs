//! Transport identity and failure records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two HTTP mechanisms produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Primary,
    Fallback,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Primary => f.write_str("primary"),
            TransportKind::Fallback => f.write_str("fallback"),
        }
    }
}

/// Failure detail for one transport attempt.
///
/// Returned by value alongside the failure; there is no shared slot holding
/// the last error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub source: TransportKind,
}

impl ErrorRecord {
    pub fn new(source: TransportKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), source }
    }

    pub fn primary(message: impl Into<String>) -> Self {
        Self::new(TransportKind::Primary, message)
    }

    pub fn fallback(message: impl Into<String>) -> Self {
        Self::new(TransportKind::Fallback, message)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.source, self.message)
    }
}
