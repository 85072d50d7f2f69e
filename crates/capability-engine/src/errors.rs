//! Error types for capability resolution and search

use element_transport::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Capability namespace a lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    Attribute,
    Action,
    ParameterizedAttribute,
    /// The whole resolution chain, including the search fallback
    Call,
}

impl Namespace {
    pub fn name(&self) -> &'static str {
        match self {
            Namespace::Attribute => "attribute",
            Namespace::Action => "action",
            Namespace::ParameterizedAttribute => "parameterized attribute",
            Namespace::Call => "call",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine error enumeration
#[derive(Debug, Error, Clone)]
pub enum AxError {
    /// Name matched nothing in the namespace (or, for calls, nothing at all)
    #[error("No {namespace} matching '{name}' on {}", .role.as_deref().unwrap_or("element"))]
    CapabilityNotFound {
        name: String,
        namespace: Namespace,
        role: Option<String>,
    },

    /// Attribute matched but the transport reports it read-only
    #[error("Attribute '{name}' is not writable")]
    AttributeNotWritable { name: String },

    /// Call was given the wrong kind or number of arguments
    #[error("Invalid argument for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Failure surfaced by the element transport, unchanged
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A wait exhausted its timeout
    #[error("Search timed out after {waited_ms}ms")]
    SearchTimeout { waited_ms: u64 },
}

impl AxError {
    pub fn not_found(name: &str, namespace: Namespace, role: Option<String>) -> Self {
        Self::CapabilityNotFound {
            name: name.to_string(),
            namespace,
            role,
        }
    }

    pub fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AxError::CapabilityNotFound { .. })
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AxError::Transport(err) => err.is_retryable(),
            AxError::SearchTimeout { .. } => true,
            _ => false,
        }
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            AxError::Transport(err) => err.severity(),
            AxError::AttributeNotWritable { .. } | AxError::InvalidArgument { .. } => 2,
            AxError::CapabilityNotFound { .. } => 1,
            AxError::SearchTimeout { .. } => 0,
        }
    }
}

impl From<wait_gate::Timeout> for AxError {
    fn from(timeout: wait_gate::Timeout) -> Self {
        AxError::SearchTimeout {
            waited_ms: timeout.waited.as_millis() as u64,
        }
    }
}
