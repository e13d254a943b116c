//! Workflow transition resolution.
//!
//! Transitions are only ever taken from the issue's own expanded list, in
//! the order the server returned them.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::debug;

use super::IssueKey;
use crate::api::error::Result;
use crate::api::{JiraClient, Transition};

/// Pattern for "begin work".
pub const IN_PROGRESS: &str = "in progress";

/// Pattern for "close".
pub const DONE: &str = "done";

/// Pattern for "block".
pub const BLOCKED: &str = "blocked";

/// No legal transition matched the requested pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No transition matching '{pattern}' (available: {})", .available.join(", "))]
pub struct NoMatchingTransition {
    pub pattern: String,
    pub available: Vec<String>,
}

enum NameMatcher {
    Regex(Regex),
    Literal(String),
}

impl NameMatcher {
    fn new(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => NameMatcher::Regex(re),
            Err(e) => {
                debug!(pattern, error = %e, "Not a regex, matching literally");
                NameMatcher::Literal(pattern.to_lowercase())
            }
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Regex(re) => re.is_match(name),
            NameMatcher::Literal(text) => name.to_lowercase().contains(text.as_str()),
        }
    }
}

/// Pick the first transition whose name matches `pattern`, case-insensitively.
pub fn resolve<'a>(
    transitions: &'a [Transition],
    pattern: &str,
) -> std::result::Result<&'a Transition, NoMatchingTransition> {
    let matcher = NameMatcher::new(pattern);
    transitions
        .iter()
        .find(|t| matcher.is_match(&t.name))
        .ok_or_else(|| NoMatchingTransition {
            pattern: pattern.to_string(),
            available: transitions.iter().map(|t| t.name.clone()).collect(),
        })
}

/// Execute a resolved transition.
pub async fn apply(client: &JiraClient, key: &IssueKey, transition: &Transition) -> Result<()> {
    debug!(%key, transition = %transition.name, id = %transition.id, "Applying transition");
    client.transition_issue(key.as_str(), &transition.id).await
}
