//! JQL query construction and execution.

use tracing::{debug, warn};

use crate::api::error::Result;
use crate::api::{Issue, JiraClient};

/// Fields returned by a search when none are requested.
pub const DEFAULT_FIELDS: [&str; 7] = [
    "description",
    "summary",
    "issuetype",
    "status",
    "assignee",
    "created",
    "labels",
];

/// Hard cap on search results. Nothing past it is ever fetched.
pub const MAX_RESULTS: u32 = 5000;

/// A search against one project.
///
/// The project clause always comes first; free-form filter text is
/// appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    clauses: Vec<String>,
    fields: Vec<String>,
    max_results: u32,
}

impl Query {
    pub fn new(project: &str, filter: &str) -> Self {
        let mut clauses = vec![format!("project = \"{}\"", project)];
        if !filter.is_empty() {
            clauses.push(filter.to_string());
        }
        Self {
            clauses,
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            max_results: MAX_RESULTS,
        }
    }

    /// Replace the field projection. An empty list keeps the defaults.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.is_empty() {
            self.fields = fields;
        }
        self
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// The JQL sent to the server.
    pub fn jql(&self) -> String {
        self.clauses.join(" and ")
    }

    /// Run the query, returning issues in server order.
    pub async fn execute(&self, client: &JiraClient) -> Result<Vec<Issue>> {
        let jql = self.jql();
        debug!(%jql, fields = ?self.fields, "Performing JIRA search");

        let result = client.search(&jql, &self.fields, self.max_results).await?;
        if result.is_truncated() {
            warn!(
                total = result.total,
                returned = result.issues.len(),
                "Search results truncated at the result cap"
            );
        }
        Ok(result.issues)
    }
}

/// Split a comma-separated field list.
pub fn parse_fields(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}
