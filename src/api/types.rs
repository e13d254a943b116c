//! JIRA API request and response types.
//!
//! These types model the JIRA REST API v2 responses for issues, search
//! results, projects and field metadata.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Search result from a JQL query.
///
/// Returned by `POST /rest/api/2/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The index of the first result.
    #[serde(default)]
    pub start_at: u32,
    /// Maximum results the server agreed to return.
    #[serde(default)]
    pub max_results: u32,
    /// Total number of matching issues.
    #[serde(default)]
    pub total: u32,
    /// The list of issues.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchResult {
    /// Check if the server matched more issues than it returned.
    pub fn is_truncated(&self) -> bool {
        self.start_at + (self.issues.len() as u32) < self.total
    }
}

/// A JIRA issue snapshot.
///
/// Returned by `GET /rest/api/2/issue/{issueKey}` or as part of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// The issue ID.
    #[serde(default)]
    pub id: String,
    /// The issue key (e.g., "PROJ-123").
    pub key: String,
    /// REST URL of this issue.
    #[serde(rename = "self", default)]
    pub self_url: String,
    /// The issue fields.
    #[serde(default)]
    pub fields: IssueFields,
    /// Transitions legal from the current status (only with `expand=transitions`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
}

impl Issue {
    /// Get the issue summary, or empty string if not returned.
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    /// Get the issue status name.
    pub fn status(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or_default()
    }

    /// Get the issue type name.
    pub fn issue_type(&self) -> &str {
        self.fields
            .issuetype
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or_default()
    }

    /// Get the issue type id.
    pub fn issue_type_id(&self) -> Option<&str> {
        self.fields.issuetype.as_ref().map(|t| t.id.as_str())
    }

    /// Get the assignee display name, if assigned.
    pub fn assignee(&self) -> Option<&str> {
        self.fields
            .assignee
            .as_ref()
            .map(|a| a.display_name.as_str())
    }

    /// Get the assignee display name, or "Unassigned" if not set.
    pub fn assignee_name(&self) -> &str {
        self.assignee().unwrap_or("Unassigned")
    }

    /// Get the comment thread in server order.
    pub fn comments(&self) -> &[Comment] {
        self.fields
            .comment
            .as_ref()
            .map(|c| c.comments.as_slice())
            .unwrap_or_default()
    }

    /// Get an arbitrary field by storage key.
    pub fn custom(&self, key: &str) -> &FieldValue {
        self.fields.custom.get(key).unwrap_or(&FieldValue::Absent)
    }

    /// Browsable URL derived from the REST self link.
    ///
    /// `https://host/ctx/rest/api/2/issue/10001` becomes
    /// `https://host/ctx/browse/PROJ-123`.
    pub fn browse_url(&self) -> String {
        let base = self
            .self_url
            .split("/rest/api")
            .next()
            .unwrap_or_default();
        format!("{}/browse/{}", base, self.key)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary())
    }
}

/// Issue fields.
///
/// Well-known fields are typed; everything else, including custom fields
/// such as `customfield_24007`, is kept in `custom`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    /// The issue summary/title.
    #[serde(default)]
    pub summary: Option<String>,
    /// The issue description (plain text in API v2).
    #[serde(default)]
    pub description: Option<String>,
    /// The issue status.
    #[serde(default)]
    pub status: Option<Status>,
    /// The issue type.
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    /// The issue assignee.
    #[serde(default)]
    pub assignee: Option<User>,
    /// Labels attached to the issue.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// The comment thread.
    #[serde(default)]
    pub comment: Option<CommentPage>,
    /// When the issue was created.
    #[serde(default)]
    pub created: Option<String>,
    /// Every other field, keyed by storage key.
    #[serde(flatten)]
    pub custom: BTreeMap<String, FieldValue>,
}

/// An opaque field value.
///
/// Custom fields carry whatever shape their field type dictates. Option
/// fields arrive as objects with a `value` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `null` or not returned.
    #[default]
    Absent,
    /// A boolean.
    Bool(bool),
    /// A number, kept as received.
    Number(serde_json::Number),
    /// A string.
    Text(String),
    /// An array of values.
    List(Vec<FieldValue>),
    /// A nested object.
    Object(serde_json::Map<String, serde_json::Value>),
}

impl FieldValue {
    /// Check whether the field holds a value.
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldValue::Absent)
    }

    /// The `value` member of an option-style object.
    pub fn option_value(&self) -> Option<&str> {
        match self {
            FieldValue::Object(map) => map.get("value").and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// Render the value as display text. `Absent` has no text.
    pub fn display_text(&self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(FieldValue::display_text)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            FieldValue::Object(map) => ["value", "name", "displayName"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
                .map(str::to_string)
                .or_else(|| Some(serde_json::Value::Object(map.clone()).to_string())),
        }
    }
}

/// Issue status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// The status ID.
    #[serde(default)]
    pub id: String,
    /// The status name (e.g., "To Do", "In Progress", "Done").
    pub name: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Issue type (Task, Epic, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueType {
    /// The issue type ID.
    #[serde(default)]
    pub id: String,
    /// The issue type name.
    pub name: String,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A JIRA user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's login name (Server/Data Center).
    #[serde(default)]
    pub name: Option<String>,
    /// The user's display name.
    pub display_name: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// A workflow transition legal from an issue's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Server-assigned transition id.
    pub id: String,
    /// Display name (e.g., "In Progress").
    pub name: String,
}

/// The comment page embedded in an issue's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    /// The comments, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A comment on a JIRA issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// The comment ID.
    #[serde(default)]
    pub id: String,
    /// The user who authored the comment.
    pub author: User,
    /// The comment text.
    #[serde(default)]
    pub body: Option<String>,
    /// When the comment was created.
    pub created: String,
}

/// A JIRA project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// The project ID.
    pub id: String,
    /// The project key (e.g., "PROJ").
    pub key: String,
    /// The project name.
    pub name: String,
}

/// Field metadata from `GET /rest/api/2/field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Storage key (e.g., `customfield_11444`).
    pub id: String,
    /// Display name (e.g., "Epic Name").
    pub name: String,
    /// Whether this is a custom field.
    #[serde(default)]
    pub custom: bool,
}

/// The answer to `POST /rest/api/2/issue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// The new issue ID.
    pub id: String,
    /// The new issue key.
    pub key: String,
    /// REST URL of the new issue.
    #[serde(rename = "self", default)]
    pub self_url: String,
}

/// An uploaded attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The attachment ID.
    pub id: String,
    /// The stored file name.
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// MIME type recorded by JIRA.
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Issue creation metadata (`GET /rest/api/2/issue/createmeta`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMeta {
    /// Projects matching the request.
    #[serde(default)]
    pub projects: Vec<ProjectMeta>,
}

/// Creation metadata for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// The project key.
    pub key: String,
    /// Issue types creatable in the project.
    #[serde(default)]
    pub issuetypes: Vec<IssueTypeMeta>,
}

/// Creation metadata for one issue type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTypeMeta {
    /// The issue type name.
    pub name: String,
    /// Fields keyed by storage key.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMeta>,
}

/// Creation metadata for one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    /// Display name.
    pub name: String,
    /// Whether the field must be set on creation.
    #[serde(default)]
    pub required: bool,
    /// Allowed values, for option-style fields.
    #[serde(default)]
    pub allowed_values: Vec<serde_json::Value>,
}

impl FieldMeta {
    /// Up to `limit` allowed value names, and whether more exist.
    pub fn allowed_names(&self, limit: usize) -> (Vec<String>, bool) {
        let names = self
            .allowed_values
            .iter()
            .take(limit)
            .map(|v| {
                v.get("name")
                    .or_else(|| v.get("value"))
                    .and_then(|n| n.as_str())
                    .unwrap_or("Unknown")
                    .to_string()
            })
            .collect();
        (names, self.allowed_values.len() > limit)
    }
}
