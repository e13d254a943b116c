//! API error types for the JIRA client.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors that can occur when talking to the JIRA REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx answer from JIRA.
    ///
    /// Displays as every server-supplied message joined with `; `, followed
    /// by the HTTP status code, e.g. `Issue does not exist (404)`.
    #[error("{} ({status})", .messages.join("; "))]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Messages extracted from `errorMessages` and `errors`.
        messages: Vec<String>,
    },

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be understood.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Local file error while preparing a request.
    #[error("Generic error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build an error from an HTTP status and the raw response body.
    ///
    /// JIRA reports problems as `{"errorMessages": [...], "errors": {...}}`.
    /// Both collections are flattened into the message list; when neither
    /// is present the request URL stands in as the message.
    pub fn from_response(status: u16, url: &str, body: &str) -> Self {
        let errors = FieldErrors::from_body(body);
        let mut messages = errors.messages;
        messages.extend(
            errors
                .fields
                .into_iter()
                .map(|(field, message)| format!("{}: {}", field, message)),
        );
        if messages.is_empty() {
            messages.push(url.to_string());
        }
        ApiError::Status { status, messages }
    }

    /// The HTTP status code, if this error came from a JIRA answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Field-level validation errors returned by JIRA for create/edit requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    /// General messages (`errorMessages`).
    pub messages: Vec<String>,
    /// Per-field messages (`errors`), keyed by field id.
    pub fields: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Parse an error body. Anything that is not JSON yields no errors.
    pub fn from_body(body: &str) -> Self {
        let mut errors = FieldErrors::default();
        let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
            return errors;
        };

        if let Some(arr) = json.get("errorMessages").and_then(|m| m.as_array()) {
            errors.messages = arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect();
        }
        if let Some(obj) = json.get("errors").and_then(|e| e.as_object()) {
            errors.fields = obj
                .iter()
                .map(|(k, v)| {
                    let message = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                    (k.clone(), message)
                })
                .collect();
        }
        errors
    }

    /// Check if any field-level error was reported.
    pub fn has_field_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// The message reported for one field, if any.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .messages
            .iter()
            .cloned()
            .chain(self.fields.iter().map(|(k, v)| format!("{}: {}", k, v)))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Outcome of a write JIRA accepts in shape but may reject by value.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<T> {
    /// The write was applied.
    Saved(T),
    /// JIRA rejected one or more field values.
    Rejected(FieldErrors),
}

impl<T> SaveOutcome<T> {
    /// Check if the write was applied.
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_joins_messages() {
        let body = r#"{"errorMessages": ["Issue does not exist", "or you lack permission"]}"#;
        let err = ApiError::from_response(404, "https://jira/rest/api/2/issue/X-1", body);
        assert_eq!(
            err.to_string(),
            "Issue does not exist; or you lack permission (404)"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_status_error_includes_field_errors() {
        let body = r#"{"errorMessages": [], "errors": {"assignee": "User 'bob' does not exist."}}"#;
        let err = ApiError::from_response(400, "url", body);
        assert_eq!(
            err.to_string(),
            "assignee: User 'bob' does not exist. (400)"
        );
    }

    #[test]
    fn test_status_error_falls_back_to_url() {
        let err = ApiError::from_response(502, "https://jira/rest/api/2/search", "<html>");
        assert_eq!(err.to_string(), "https://jira/rest/api/2/search (502)");
    }

    #[test]
    fn test_field_errors_parse() {
        let body = r#"{"errorMessages": ["bad"], "errors": {"issuetype": "valid issue type is required", "priority": 3}}"#;
        let errors = FieldErrors::from_body(body);
        assert_eq!(errors.messages, vec!["bad".to_string()]);
        assert!(errors.has_field_errors());
        assert_eq!(errors.field("issuetype"), Some("valid issue type is required"));
        assert_eq!(errors.field("priority"), Some("3"));
        assert_eq!(errors.field("summary"), None);
    }

    #[test]
    fn test_field_errors_display() {
        let errors = FieldErrors::from_body(
            r#"{"errorMessages": ["bad"], "errors": {"assignee": "User 'x' does not exist."}}"#,
        );
        assert_eq!(errors.to_string(), "bad; assignee: User 'x' does not exist.");
    }

    #[test]
    fn test_field_errors_from_garbage() {
        let errors = FieldErrors::from_body("not json");
        assert!(errors.messages.is_empty());
        assert!(!errors.has_field_errors());
    }

    #[test]
    fn test_save_outcome_is_saved() {
        assert!(SaveOutcome::Saved(()).is_saved());
        assert!(!SaveOutcome::<()>::Rejected(FieldErrors::default()).is_saved());
    }
}
