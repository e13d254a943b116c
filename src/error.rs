//! Centralized error types for jiractl.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::api::{ApiError, CredentialError};
use crate::config::ConfigError;
use crate::issue::NoMatchingTransition;

/// The main application error type.
///
/// Operations never let these escape to the process boundary: the
/// orchestrator turns each one into a logged line and a degraded result.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Credential store or prompt errors.
    #[error("{0}")]
    Credential(#[from] CredentialError),

    /// A precondition could not be resolved (transition, field, type...).
    #[error("{0}")]
    Resolution(String),

    /// IO errors (file system, etc.).
    #[error("Generic error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a resolution error.
    pub fn resolution(msg: impl Into<String>) -> Self {
        AppError::Resolution(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file exists and is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::MissingSite => {
                    "No JIRA site configured. Set 'site' in config.toml.".to_string()
                }
            },
            AppError::Api(e) => match e {
                ApiError::Status { status: 401, .. } => {
                    "Authentication failed. Please check your username and API token.".to_string()
                }
                ApiError::Status { status: 403, .. } => {
                    "Access denied. You don't have permission to access this resource.".to_string()
                }
                ApiError::Network(_) => {
                    "Connection failed. Please check your network and JIRA site.".to_string()
                }
                other => other.to_string(),
            },
            AppError::Credential(e) => e.to_string(),
            AppError::Resolution(msg) => msg.clone(),
            AppError::Io(e) => format!("Generic error: {}", e),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(_) => {
                Some("Edit config.toml (or point JIRACTL_CONFIG at one) with your site, username and project.")
            }
            AppError::Api(ApiError::Status { status: 401, .. }) => Some(
                "Check your API token; remove the 'jiractl' keyring entry to be prompted again.",
            ),
            AppError::Api(ApiError::Network(_)) => {
                Some("Check your internet connection and JIRA site.")
            }
            _ => None,
        }
    }
}

impl From<NoMatchingTransition> for AppError {
    fn from(err: NoMatchingTransition) -> Self {
        AppError::Resolution(err.to_string())
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
