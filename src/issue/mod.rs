//! The issue engine: fetching, saving, transitioning and querying issues.

pub mod accessor;
pub mod query;
pub mod transition;

use std::fmt;

pub use query::Query;
pub use transition::NoMatchingTransition;

/// An issue key (`PROJECT-NUMBER`), always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IssueKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
