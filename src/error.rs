//! Error types
//!
//! Every failure carries an error kind and the HTTP-style status code that
//! tooling built against the control plane depends on.

use serde::{Deserialize, Serialize};

/// Result type alias for control plane operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failure, independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Authentication,
    Throttled,
    Authorization,
    Internal,
    ServiceUnavailable,
}

impl ErrorKind {
    /// Status code reported for this kind
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::Authorization => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::Throttled => 429,
            ErrorKind::Internal => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }
}

/// Errors surfaced by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Missing or malformed request field.
    #[error("(400) {0}")]
    Validation(String),

    /// Unknown resource group, resource or scope.
    #[error("(404) {0}")]
    NotFound(String),

    /// Reserved for strict-create semantics.
    #[error("(409) {0}")]
    AlreadyExists(String),

    /// Credential failure.
    #[error("(401) {0}")]
    Authentication(String),

    #[error("(429) {0}")]
    Throttled(String),

    #[error("(403) {0}")]
    Authorization(String),

    #[error("(500) {0}")]
    Internal(String),

    #[error("(503) {0}")]
    ServiceUnavailable(String),
}

impl Error {
    /// Build an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => Error::Validation(message),
            ErrorKind::NotFound => Error::NotFound(message),
            ErrorKind::AlreadyExists => Error::AlreadyExists(message),
            ErrorKind::Authentication => Error::Authentication(message),
            ErrorKind::Throttled => Error::Throttled(message),
            ErrorKind::Authorization => Error::Authorization(message),
            ErrorKind::Internal => Error::Internal(message),
            ErrorKind::ServiceUnavailable => Error::ServiceUnavailable(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Throttled(_) => ErrorKind::Throttled,
            Error::Authorization(_) => ErrorKind::Authorization,
            Error::Internal(_) => ErrorKind::Internal,
            Error::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Message without the status prefix
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(m)
            | Error::NotFound(m)
            | Error::AlreadyExists(m)
            | Error::Authentication(m)
            | Error::Throttled(m)
            | Error::Authorization(m)
            | Error::Internal(m)
            | Error::ServiceUnavailable(m) => m,
        }
    }
}

/// Format an error for display to a CLI user
pub fn format_arm_error(error: &anyhow::Error) -> String {
    if let Some(err) = error.downcast_ref::<Error>() {
        let hint = match err.kind() {
            ErrorKind::Authorization => "Permission denied.",
            ErrorKind::Authentication => "Authentication failed. Check your credentials.",
            ErrorKind::NotFound => "Resource not found.",
            ErrorKind::Throttled => "Rate limit exceeded. Please try again later.",
            ErrorKind::Validation => "Invalid request. Check your parameters.",
            ErrorKind::Internal | ErrorKind::ServiceUnavailable => {
                "Service temporarily unavailable. Please try again."
            }
            ErrorKind::AlreadyExists => "Resource conflict. The resource may already exist.",
        };
        return format!("{} {}", hint, truncate(err.message()));
    }

    truncate(&error.to_string())
}

fn truncate(message: &str) -> String {
    let sanitized = message
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < message.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::Authentication("x".into()).status_code(), 401);
        assert_eq!(Error::Authorization("x".into()).status_code(), 403);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::AlreadyExists("x".into()).status_code(), 409);
        assert_eq!(Error::Throttled("x".into()).status_code(), 429);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
        assert_eq!(Error::ServiceUnavailable("x".into()).status_code(), 503);
    }

    #[test]
    fn test_new_matches_kind() {
        let err = Error::new(ErrorKind::Throttled, "QuotaExceeded: vm-1");
        assert_eq!(err.kind(), ErrorKind::Throttled);
        assert_eq!(err.message(), "QuotaExceeded: vm-1");
        assert_eq!(err.to_string(), "(429) QuotaExceeded: vm-1");
    }

    #[test]
    fn test_format_arm_error() {
        let err = anyhow::Error::new(Error::NotFound("Resource group 'rg' not found".into()));
        let msg = format_arm_error(&err);
        assert!(msg.starts_with("Resource not found."));
        assert!(msg.contains("rg"));

        let long = anyhow::anyhow!("{}", "x".repeat(200));
        assert!(format_arm_error(&long).ends_with("..."));
    }
}
