//! Bordered tables for issues, search results and projects.

use chrono::DateTime;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::{Cell, Columns};
use tabled::settings::{Alignment, Span, Style};
use tabled::{Table, Tabled};

use super::wrap::{wrap, WRAP_WIDTH};
use crate::api::types::{IssueTypeMeta, Project};
use crate::api::Issue;

/// Issue type id rendered with [`cluster_table`].
pub const CLUSTER_ISSUE_TYPE_ID: &str = "21686";

/// Two-column label/value table with optional full-width section rows.
#[derive(Default)]
struct PanelTable {
    builder: Builder,
    rows: usize,
    sections: Vec<(usize, Alignment)>,
}

impl PanelTable {
    fn row(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.builder.push_record([label.into(), value.into()]);
        self.rows += 1;
    }

    fn section(&mut self, title: &str, alignment: Alignment) {
        self.sections.push((self.rows, alignment));
        self.row(title, "");
    }

    fn render(self) -> String {
        let mut table = self.builder.build();
        table.with(Style::modern());
        table.modify(Columns::first(), Alignment::right());
        for (row, alignment) in self.sections {
            table.modify(Cell::new(row, 0), Span::column(2));
            table.modify(Cell::new(row, 0), alignment);
        }
        table.to_string()
    }
}

/// Comment timestamps as `YYYY-MM-DD HH:MM:SS`; anything unparsable verbatim.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Header rows shared by the issue and cluster panels.
fn identity_rows(table: &mut PanelTable, issue: &Issue) {
    table.row(issue.issue_type(), issue.key.as_str());
    table.row("Assignee", issue.assignee_name());
    table.row("Status", issue.status());
    table.row("Summary", issue.summary());
}

/// An issue with its description and comment thread.
pub fn issue_table(issue: &Issue) -> String {
    let mut table = PanelTable::default();
    identity_rows(&mut table, issue);
    table.row(
        "Description",
        wrap(issue.fields.description.as_deref(), WRAP_WIDTH),
    );

    let comments = issue.comments();
    if !comments.is_empty() {
        table.section("Comments", Alignment::center());
        for comment in comments {
            table.row(
                format!(
                    "{}\n{}",
                    comment.author.display_name,
                    format_timestamp(&comment.created)
                ),
                wrap(comment.body.as_deref(), WRAP_WIDTH),
            );
        }
    }
    table.render()
}

/// Where a panel value comes from.
#[derive(Clone, Copy)]
enum Source {
    /// The field's own text.
    Text(&'static str),
    /// The `value` of an option-style field.
    Choice(&'static str),
}

impl Source {
    fn text(self, issue: &Issue) -> Option<String> {
        match self {
            Source::Text(key) => issue.custom(key).display_text(),
            Source::Choice(key) => issue.custom(key).option_value().map(str::to_string),
        }
    }
}

const LOAD_ROWS: [&str; 4] = ["Read", "Write", "Update", "Delete"];
const QPS_FIELDS: [&str; 4] = [
    "customfield_24007",
    "customfield_24008",
    "customfield_24009",
    "customfield_24010",
];
const THROUGHPUT_FIELDS: [&str; 4] = [
    "customfield_24011",
    "customfield_24012",
    "customfield_24013",
    "customfield_24014",
];

const GEO_DISTRIBUTED: &str = "customfield_24017";
const WORKLOAD_KIND: &str = "customfield_23868";
const WORKLOAD_ORIGIN: &str = "customfield_23869";

const TEAM_ROWS: [(&str, Source); 16] = [
    ("Okta Username", Source::Text("customfield_23853")),
    ("Service Tag", Source::Text("customfield_23856")),
    ("Team Name", Source::Text("customfield_23854")),
    ("Project Name", Source::Text("customfield_23852")),
    ("Team DRI", Source::Text("customfield_23857")),
    ("Team Okta Group", Source::Text("customfield_23860")),
    ("Team DDPD Alias", Source::Text("customfield_23858")),
    ("Team Slack Channel", Source::Text("customfield_23859")),
    ("Tier", Source::Choice("customfield_23863")),
    ("Environment", Source::Choice("customfield_23861")),
    ("Team Terraform Directories", Source::Text("customfield_23862")),
    ("Service Name", Source::Text("customfield_23865")),
    ("Service Language", Source::Text("customfield_23866")),
    ("Service Location", Source::Choice("customfield_23867")),
    ("Team Email", Source::Text("customfield_23855")),
    ("The workload is", Source::Choice(WORKLOAD_KIND)),
];

fn panel_value(issue: &Issue, source: Source) -> String {
    wrap(source.text(issue).as_deref(), WRAP_WIDTH)
}

/// The extended panel for database cluster requests.
pub fn cluster_table(issue: &Issue) -> String {
    let mut table = PanelTable::default();
    identity_rows(&mut table, issue);

    for (title, keys) in [
        ("Anticipated QPS", QPS_FIELDS),
        ("Anticipated throughput", THROUGHPUT_FIELDS),
    ] {
        table.section(title, Alignment::left());
        for (label, key) in LOAD_ROWS.iter().zip(keys) {
            table.row(*label, panel_value(issue, Source::Text(key)));
        }
    }

    table.section("Business Use", Alignment::left());
    table.row(
        "Expected Data Size",
        panel_value(issue, Source::Text("customfield_24018")),
    );
    table.row(
        "Required SLA",
        panel_value(issue, Source::Text("customfield_24016")),
    );
    if issue.custom(GEO_DISTRIBUTED).is_present() {
        table.row(
            "Clients are geographically distributed",
            panel_value(issue, Source::Choice(GEO_DISTRIBUTED)),
        );
    }

    for (label, source) in TEAM_ROWS {
        table.row(label, panel_value(issue, source));
    }
    if issue.custom(WORKLOAD_KIND).option_value() == Some("Existing") {
        table.row(
            "This workload is coming from",
            panel_value(issue, Source::Text(WORKLOAD_ORIGIN)),
        );
    }
    table.render()
}

/// One search hit.
pub fn search_table(issue: &Issue) -> String {
    let mut table = PanelTable::default();
    table.row(issue.issue_type(), issue.key.as_str());
    table.row("Status", issue.status());
    table.row("Summary", issue.summary());
    table.row("Labels", issue.fields.labels.join(", "));
    table.render()
}

/// Flat row of `issue list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct IssueRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    pub issue_type: String,
    #[tabled(rename = "Summary")]
    #[serde(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Assignee")]
    #[serde(rename = "Assignee")]
    pub assignee: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.key.clone(),
            issue_type: issue.issue_type().to_string(),
            summary: issue.summary().to_string(),
            status: issue.status().to_string(),
            assignee: issue.assignee().unwrap_or("unassigned").to_string(),
        }
    }
}

pub fn list_table(rows: &[IssueRow]) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}

#[derive(Tabled)]
struct ProjectRow<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "Key")]
    key: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
}

pub fn project_table(projects: &[Project]) -> String {
    let rows = projects.iter().map(|p| ProjectRow {
        id: &p.id,
        key: &p.key,
        name: &p.name,
    });
    Table::new(rows).with(Style::modern()).to_string()
}

/// Number of allowed values shown per field.
const ALLOWED_VALUES_SHOWN: usize = 5;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Required")]
    required: String,
    #[tabled(rename = "Allowed Values")]
    allowed: String,
}

/// Creation fields for one issue type, required fields first.
pub fn field_table(meta: &IssueTypeMeta) -> String {
    let mut fields: Vec<_> = meta.fields.iter().collect();
    fields.sort_by_key(|(_, field)| !field.required);

    let rows = fields.into_iter().map(|(key, field)| {
        let (names, more) = field.allowed_names(ALLOWED_VALUES_SHOWN);
        let mut allowed = names.join(", ");
        if more {
            allowed.push_str(", ...");
        }
        FieldRow {
            name: field.name.clone(),
            key: key.clone(),
            required: if field.required { "yes" } else { "no" }.to_string(),
            allowed,
        }
    });
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(json: &str) -> Issue {
        serde_json::from_str(json).unwrap()
    }

    fn task() -> Issue {
        issue(
            r#"{"key": "ABC-1", "fields": {
                "summary": "Fix login",
                "description": "first line\r\nsecond line",
                "issuetype": {"id": "20534", "name": "Task"},
                "status": {"name": "To Do"},
                "labels": ["web", "auth"],
                "comment": {"comments": [
                    {"author": {"displayName": "Jane Smith"}, "body": "On it",
                     "created": "2024-01-16T08:05:09.000+0000"}
                ]}
            }}"#,
        )
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2024-01-16T08:05:09.000+0000"),
            "2024-01-16 08:05:09"
        );
        assert_eq!(
            format_timestamp("2024-01-16T08:05:09+02:00"),
            "2024-01-16 08:05:09"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_issue_table_contents() {
        let out = issue_table(&task());
        assert!(out.contains("ABC-1"));
        assert!(out.contains("Unassigned"));
        assert!(out.contains("Fix login"));
        assert!(out.contains("first line"));
        assert!(!out.contains('\r'));
        assert!(out.contains("Comments"));
        assert!(out.contains("Jane Smith"));
        assert!(out.contains("2024-01-16 08:05:09"));
        assert!(out.contains("On it"));
    }

    #[test]
    fn test_issue_table_without_description_or_comments() {
        let out = issue_table(&issue(r#"{"key": "ABC-2", "fields": {"summary": "s"}}"#));
        assert!(out.contains("Not Specified"));
        assert!(!out.contains("Comments"));
    }

    #[test]
    fn test_search_table_labels() {
        let out = search_table(&task());
        assert!(out.contains("web, auth"));
        assert!(out.contains("To Do"));
    }

    #[test]
    fn test_cluster_table_conditional_rows() {
        let base = r#"{"key": "DB-1", "fields": {
            "summary": "New cluster",
            "issuetype": {"id": "21686", "name": "CRDB Cluster"},
            "customfield_24007": 1.0,
            "customfield_23863": {"value": "Tier 1"},
            "customfield_23868": {"value": "New"},
            "customfield_23869": "legacy-db"
        }}"#;
        let out = cluster_table(&issue(base));
        assert!(out.contains("Anticipated QPS"));
        assert!(out.contains("1.0"));
        assert!(out.contains("Tier 1"));
        assert!(out.contains("Not Specified"));
        assert!(!out.contains("geographically"));
        assert!(!out.contains("coming from"));

        let existing = base
            .replace(r#"{"value": "New"}"#, r#"{"value": "Existing"}"#)
            .replace(
                r#""customfield_24007": 1.0"#,
                r#""customfield_24017": {"value": "Yes"}"#,
            );
        let out = cluster_table(&issue(&existing));
        assert!(out.contains("Clients are geographically distributed"));
        assert!(out.contains("This workload is coming from"));
        assert!(out.contains("legacy-db"));
    }

    #[test]
    fn test_issue_row_unassigned_marker() {
        let row = IssueRow::from(&task());
        assert_eq!(row.id, "ABC-1");
        assert_eq!(row.issue_type, "Task");
        assert_eq!(row.assignee, "unassigned");

        let out = list_table(&[row]);
        assert!(out.contains("Assignee"));
        assert!(out.contains("Fix login"));
    }

    #[test]
    fn test_project_table() {
        let projects = vec![Project {
            id: "10000".to_string(),
            key: "ABC".to_string(),
            name: "Alphabet".to_string(),
        }];
        let out = project_table(&projects);
        assert!(out.contains("Key"));
        assert!(out.contains("Alphabet"));
    }

    #[test]
    fn test_field_table_required_first() {
        let meta: IssueTypeMeta = serde_json::from_str(
            r#"{"name": "Task", "fields": {
                "labels": {"name": "Labels", "required": false},
                "summary": {"name": "Summary", "required": true},
                "priority": {"name": "Priority", "required": false, "allowedValues": [
                    {"name": "P1"}, {"name": "P2"}, {"name": "P3"},
                    {"name": "P4"}, {"name": "P5"}, {"name": "P6"}]}
            }}"#,
        )
        .unwrap();
        let out = field_table(&meta);
        let summary = out.find("Summary").unwrap();
        let labels = out.find("Labels").unwrap();
        assert!(summary < labels);
        assert!(out.contains("P1, P2, P3, P4, P5, ..."));
    }
}
