//! Error handling module
//!
//! Application-level failures on top of the engine's `AxError`.

use capability_engine::AxError;
use element_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ax(#[from] AxError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The platform knows no application with this bundle identifier
    #[error("No application registered for bundle '{0}'")]
    UnknownBundle(String),

    #[error("'{bundle}' was not running after {attempts} launch attempts")]
    LaunchTimeout { bundle: String, attempts: u32 },

    #[error("Menu path is empty")]
    EmptyMenuPath,

    #[error("No menu item matching '{item}' under '{parent}'")]
    MenuItemNotFound { item: String, parent: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl AppError {
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Ax(err) => err.is_retryable(),
            AppError::Transport(err) => err.is_retryable(),
            AppError::LaunchTimeout { .. } | AppError::MenuItemNotFound { .. } => true,
            _ => false,
        }
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            AppError::Ax(err) => err.severity(),
            AppError::Transport(err) => err.severity(),
            AppError::UnknownBundle(_) | AppError::Config(_) | AppError::Pattern(_) => 2,
            AppError::LaunchTimeout { .. }
            | AppError::MenuItemNotFound { .. }
            | AppError::NotFound(_) => 1,
            AppError::EmptyMenuPath => 0,
        }
    }
}
