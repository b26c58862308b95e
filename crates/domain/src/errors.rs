//! Error types used throughout the client

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ErrorRecord, Verb};

/// Classification of a failed dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// Primary and fallback both returned an empty result or failed.
    AllTransportsExhausted,
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchErrorKind::AllTransportsExhausted => f.write_str("all transports exhausted"),
        }
    }
}

/// Terminal failure of a single dispatch.
///
/// Carries the failure detail of both transports, so concurrent calls never
/// observe each other's errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub verb: Verb,
    pub url: String,
    /// Why the primary transport result was rejected.
    pub primary: ErrorRecord,
    /// Why the fallback transport result was rejected.
    pub fallback: ErrorRecord,
    /// Diagnostics file the failure was written to, if the write succeeded.
    pub diagnostics_path: Option<PathBuf>,
}

impl DispatchError {
    pub fn exhausted(
        verb: Verb,
        url: impl Into<String>,
        primary: ErrorRecord,
        fallback: ErrorRecord,
    ) -> Self {
        Self {
            kind: DispatchErrorKind::AllTransportsExhausted,
            verb,
            url: url.into(),
            primary,
            fallback,
            diagnostics_path: None,
        }
    }

    #[must_use]
    pub fn with_diagnostics_path(mut self, path: Option<PathBuf>) -> Self {
        self.diagnostics_path = path;
        self
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} {}: {}; {}",
            self.kind,
            self.verb.method_name(),
            self.url,
            self.primary,
            self.fallback
        )?;
        if let Some(path) = &self.diagnostics_path {
            write!(f, " (details in {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {}

/// Main error type for Sigil
#[derive(Error, Debug)]
pub enum SigilError {
    /// Verb outside get/post/put/patch/delete. Never retried.
    #[error("Unsupported verb: {0}")]
    UnsupportedVerb(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Call cancelled")]
    Cancelled,

    #[error("Call deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SigilError {
    /// The dispatch failure, if this error is one.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            SigilError::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for Sigil operations
pub type Result<T> = std::result::Result<T, SigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_message_names_both_transports_and_file() {
        let err = DispatchError::exhausted(
            Verb::Post,
            "https://api.example.com/orders",
            ErrorRecord::primary("HTTP request timed out"),
            ErrorRecord::fallback("empty response body"),
        )
        .with_diagnostics_path(Some(PathBuf::from("logs/app.2024-01-01-10.log")));

        let message = err.to_string();
        assert!(message.starts_with("all transports exhausted for POST https://api.example.com/orders"));
        assert!(message.contains("[primary] HTTP request timed out"));
        assert!(message.contains("[fallback] empty response body"));
        assert!(message.ends_with("(details in logs/app.2024-01-01-10.log)"));
    }

    #[test]
    fn sigil_error_wraps_dispatch_error() {
        let dispatch = DispatchError::exhausted(
            Verb::Get,
            "http://localhost/x",
            ErrorRecord::primary("a"),
            ErrorRecord::fallback("b"),
        );
        let err: SigilError = dispatch.clone().into();

        assert_eq!(err.as_dispatch(), Some(&dispatch));
        assert!(SigilError::Cancelled.as_dispatch().is_none());
        assert_eq!(SigilError::UnsupportedVerb("head".into()).to_string(), "Unsupported verb: head");
    }
}
