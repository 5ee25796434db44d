//! Error types for the html2xhtml-client library.
//!
//! Every failure is fatal for the single request a conversion makes, so one
//! enum covers them all. [`Html2XhtmlError::category`] groups the variants
//! into the three families callers usually branch on:
//!
//! * **File** — the input could not be read. Raised before any network
//!   activity takes place.
//! * **Network** — the connection could not be established, or the
//!   transport failed mid-exchange.
//! * **Service** — the service answered, but with a status other than 200.
//!
//! No variant is ever retried by the library.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the html2xhtml-client library.
#[derive(Debug, Error)]
pub enum Html2XhtmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("HTML file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed (directory, I/O error, …).
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Network errors ────────────────────────────────────────────────────
    /// TCP connect or DNS resolution failed.
    #[error("Could not connect to '{url}': {reason}\nCheck your internet connection and the --host/--port settings.")]
    ConnectFailed { url: String, reason: String },

    /// The request was sent but the exchange broke down.
    #[error("Request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The configured request timeout elapsed.
    #[error("Request to '{url}' timed out after {secs}s\nIncrease --timeout.")]
    Timeout { url: String, secs: u64 },

    // ── Service errors ────────────────────────────────────────────────────
    /// The service answered with a status other than 200.
    #[error("{status} {reason}")]
    ServiceError { status: u16, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output XHTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping of [`Html2XhtmlError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    File,
    Network,
    Service,
    Output,
    Config,
    Internal,
}

impl Html2XhtmlError {
    /// The family this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } | Self::FileRead { .. } => {
                ErrorCategory::File
            }
            Self::ConnectFailed { .. } | Self::RequestFailed { .. } | Self::Timeout { .. } => {
                ErrorCategory::Network
            }
            Self::ServiceError { .. } => ErrorCategory::Service,
            Self::OutputWriteFailed { .. } => ErrorCategory::Output,
            Self::InvalidConfig(_) => ErrorCategory::Config,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// HTTP status of a [`Html2XhtmlError::ServiceError`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display_is_status_line() {
        let e = Html2XhtmlError::ServiceError {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(e.to_string(), "404 Not Found");
        assert_eq!(e.status(), Some(404));
        assert_eq!(e.category(), ErrorCategory::Service);
    }

    #[test]
    fn timeout_display() {
        let e = Html2XhtmlError::Timeout {
            url: "http://localhost/x".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("http://localhost/x"));
        assert_eq!(e.category(), ErrorCategory::Network);
    }

    #[test]
    fn file_errors_are_grouped() {
        let e = Html2XhtmlError::FileNotFound {
            path: PathBuf::from("missing.html"),
        };
        assert!(e.to_string().contains("missing.html"));
        assert_eq!(e.category(), ErrorCategory::File);
        assert_eq!(e.status(), None);

        let e = Html2XhtmlError::FileRead {
            path: PathBuf::from("dir"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "is a directory"),
        };
        assert_eq!(e.category(), ErrorCategory::File);
        assert!(e.to_string().contains("is a directory"));
    }

    #[test]
    fn connect_failed_display() {
        let e = Html2XhtmlError::ConnectFailed {
            url: "http://127.0.0.1:1/".into(),
            reason: "connection refused".into(),
        };
        assert!(e.to_string().contains("connection refused"));
        assert_eq!(e.category(), ErrorCategory::Network);
    }
}
