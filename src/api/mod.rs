//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA REST API.

pub mod auth;
mod client;
pub mod error;
pub mod types;

pub use auth::{CredentialError, CredentialStore, KeyringStore, SecretPrompt, TerminalPrompt};
pub use client::JiraClient;
pub use error::{ApiError, FieldErrors, SaveOutcome};
pub use types::{FieldValue, Issue, Transition};
