//! The command orchestrator.
//!
//! Each user operation is an async method on [`Orchestrator`] taking a
//! [`CallContext`]. Operations compose by calling each other with
//! [`CallContext::internal`]; failures become console errors and a
//! degraded return value, never a panic or an escaping error.

mod browser;
mod console;
mod context;
mod issue;
mod project;

use serde::Serialize;

pub use browser::{SystemBrowser, UrlOpener};
pub use console::{Console, Level};
pub use context::CallContext;
pub use issue::{CreateArgs, ListArgs, SearchArgs};

use crate::api::{Issue, JiraClient};
use crate::error::AppError;
use crate::issue::accessor::{self, EXPAND_TRANSITIONS};
use crate::issue::IssueKey;
use crate::session::Session;

/// Runs user operations against one session.
pub struct Orchestrator<'a> {
    session: &'a Session,
    console: &'a Console,
    opener: &'a dyn UrlOpener,
    json: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(session: &'a Session, console: &'a Console, opener: &'a dyn UrlOpener) -> Self {
        Self {
            session,
            console,
            opener,
            json: false,
        }
    }

    /// Print raw JSON instead of tables.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// The session client. Pending configuration warnings are reported the
    /// first time through.
    fn client(&self) -> Option<&'a JiraClient> {
        for warning in self.session.drain_warnings() {
            self.console.error(warning);
        }
        match self.session.client() {
            Ok(client) => Some(client),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Turn an error into console lines.
    fn report(&self, err: impl Into<AppError>) {
        let err = err.into();
        self.console.error(err.user_message());
        if let Some(action) = err.suggested_action() {
            self.console.error(action);
        }
    }

    /// Fetch an issue together with its legal transitions.
    async fn load_issue(&self, id: &str) -> Option<(&'a JiraClient, IssueKey, Issue)> {
        let client = self.client()?;
        let key = IssueKey::new(id);
        match accessor::fetch(client, &key, &[EXPAND_TRANSITIONS]).await {
            Ok(issue) => Some((client, key, issue)),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn emit_json<T: Serialize + ?Sized>(&self, ctx: CallContext, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.console.output(ctx, text),
            Err(err) => self.console.error(format!("Could not encode JSON: {}", err)),
        }
    }
}
