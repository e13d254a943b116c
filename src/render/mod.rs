//! Terminal rendering of issues and projects.

mod table;
mod wrap;

pub use table::{
    cluster_table, field_table, format_timestamp, issue_table, list_table, project_table,
    search_table, IssueRow, CLUSTER_ISSUE_TYPE_ID,
};
pub use wrap::{wrap, NOT_SPECIFIED, WRAP_WIDTH};
