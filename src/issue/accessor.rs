//! Single-issue reads and writes.
//!
//! Every function takes an [`IssueKey`], so the key reaching the server is
//! always uppercase.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::IssueKey;
use crate::api::error::Result;
use crate::api::{Issue, JiraClient, SaveOutcome};

/// Expansion that carries the issue's legal transitions.
pub const EXPAND_TRANSITIONS: &str = "transitions";

/// Fetch one issue, optionally with expansions.
pub async fn fetch(client: &JiraClient, key: &IssueKey, expand: &[&str]) -> Result<Issue> {
    debug!(%key, ?expand, "Fetching issue");
    client.get_issue(key.as_str(), expand).await
}

/// Apply a partial field update.
pub async fn save(
    client: &JiraClient,
    key: &IssueKey,
    fields: Map<String, Value>,
) -> Result<SaveOutcome<()>> {
    client
        .edit_issue(key.as_str(), &json!({ "fields": fields }))
        .await
}

/// Add labels with the `update` verb, keeping the labels already present.
pub async fn add_labels(
    client: &JiraClient,
    key: &IssueKey,
    labels: &[String],
) -> Result<SaveOutcome<()>> {
    let verbs: Vec<Value> = labels.iter().map(|l| json!({ "add": l })).collect();
    client
        .edit_issue(key.as_str(), &json!({ "update": { "labels": verbs } }))
        .await
}

/// Delete an issue.
pub async fn delete(client: &JiraClient, key: &IssueKey) -> Result<()> {
    client.delete_issue(key.as_str()).await
}
