//! Error types for the element transport

use thiserror::Error;

/// Transport error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Reference no longer denotes a live remote object
    #[error("Invalid element reference: {0}")]
    InvalidReference(String),

    /// The platform refused the request (e.g. accessibility not enabled)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The element does not support the requested capability
    #[error("Unsupported capability '{name}' on {element}")]
    Unsupported { element: String, name: String },

    /// No transport is wired up
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// Any other platform failure
    #[error("Transport failure: {0}")]
    Failure(String),
}

impl TransportError {
    pub fn invalid(element: impl std::fmt::Display) -> Self {
        Self::InvalidReference(element.to_string())
    }

    pub fn unsupported(element: impl std::fmt::Display, name: impl Into<String>) -> Self {
        Self::Unsupported {
            element: element.to_string(),
            name: name.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_) | TransportError::Failure(_))
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            TransportError::PermissionDenied(_) | TransportError::Unavailable(_) => 3,
            TransportError::Failure(_) => 2,
            TransportError::InvalidReference(_) => 1,
            TransportError::Unsupported { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(TransportError::Unavailable("down".into()).is_retryable());
        assert!(!TransportError::invalid("element#4").is_retryable());
        assert!(!TransportError::unsupported("element#4", "AXPress").is_retryable());
    }

    #[test]
    fn test_severity_ordering() {
        let denied = TransportError::PermissionDenied("ax disabled".into());
        let invalid = TransportError::invalid("element#1");
        assert!(denied.severity() > invalid.severity());
    }
}
