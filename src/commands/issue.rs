//! Issue operations.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{CallContext, Orchestrator};
use crate::api::types::{Attachment, Comment, CreateMeta};
use crate::api::{FieldErrors, Issue, SaveOutcome};
use crate::error::AppError;
use crate::issue::query::{self, Query};
use crate::issue::transition::{self, BLOCKED, DONE, IN_PROGRESS};
use crate::issue::{accessor, IssueKey};
use crate::render::{self, IssueRow, CLUSTER_ISSUE_TYPE_ID};
use crate::session::{resolve_issue_type_id, EPIC_LINK_FIELD, EPIC_NAME_FIELD};

/// Fields requested by `issue list`.
const LIST_FIELDS: &str = "key,summary,status,assignee,issuetype";

/// MIME type used when none is given for an attachment.
pub const DEFAULT_MIME_TYPE: &str = "application/binary";

/// Inputs to `issue create`.
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub title: String,
    pub description: String,
    pub issue_type: String,
    /// Project key; the configured project when `None`.
    pub project: Option<String>,
    /// Key of an existing epic to link to.
    pub epic: Option<String>,
    /// Name of the epic being created.
    pub epic_name: Option<String>,
    /// Comma-separated labels.
    pub labels: Option<String>,
    pub assign: bool,
    pub begin: bool,
    pub browse: bool,
}

/// Inputs to `issue search`.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub project: Option<String>,
    pub jql: String,
    /// Comma-separated field projection.
    pub fields: Option<String>,
}

/// Inputs to `issue list`.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub project: Option<String>,
    /// Only issues assigned to the current user.
    pub mine: bool,
    /// Include issues in status Done.
    pub done: bool,
}

/// Split comma-separated labels, dropping blanks.
fn split_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl Orchestrator<'_> {
    fn project_or_default(&self, project: Option<&str>) -> String {
        project
            .unwrap_or_else(|| self.session.default_project())
            .to_string()
    }

    fn report_rejection(&self, action: &str, key: &str, errors: &FieldErrors) {
        if errors.fields.is_empty() {
            self.console
                .error(format!("Error {} {}: {}", action, key, errors));
        }
        for (field, message) in &errors.fields {
            self.console
                .error(format!("Error {} {}: {}: {}", action, key, field, message));
        }
    }

    /// Create an issue, then optionally assign, begin and browse it.
    pub async fn create(&self, ctx: CallContext, args: &CreateArgs) -> Option<String> {
        let client = self.client()?;
        let project = self
            .project_or_default(args.project.as_deref())
            .to_uppercase();

        if let Err(err) = client.get_project(&project).await {
            self.report(err);
            return None;
        }

        let Some(type_id) = resolve_issue_type_id(&args.issue_type) else {
            self.report(AppError::resolution(format!(
                "Unknown issue type '{}' (expected epic, task or crdb_cluster)",
                args.issue_type
            )));
            return None;
        };
        let is_epic = args.issue_type == "epic";

        let mut fields = Map::new();
        fields.insert("summary".into(), json!(args.title));
        fields.insert(
            "description".into(),
            json!(args.description.replace("\\n", "\n")),
        );
        fields.insert("project".into(), json!({ "key": project }));
        fields.insert("issuetype".into(), json!({ "id": type_id.to_string() }));

        if args.epic.is_some() && is_epic {
            self.console.error("You're trying to link an epic to an epic");
        }

        if let Some(labels) = &args.labels {
            debug!(%labels, "Adding labels");
            fields.insert("labels".into(), json!(split_labels(labels)));
        }

        if is_epic {
            let Some(epic_name) = &args.epic_name else {
                self.report(AppError::resolution(
                    "Epic Name is required if creating an Epic",
                ));
                return None;
            };
            let index = match self.session.field_index().await {
                Ok(index) => index,
                Err(err) => {
                    self.report(err);
                    return None;
                }
            };
            let Some(field) = index.key_for(EPIC_NAME_FIELD) else {
                self.report(AppError::resolution(format!(
                    "No custom field named '{}'",
                    EPIC_NAME_FIELD
                )));
                return None;
            };
            fields.insert(field.to_string(), json!(epic_name));
        }

        if let Some(epic) = &args.epic {
            if let Some((field, epic_key)) = self.epic_link(epic).await {
                fields.insert(field, json!(epic_key.as_str()));
            }
        }

        let created = match client.create_issue(fields).await {
            Ok(SaveOutcome::Saved(created)) => created,
            Ok(SaveOutcome::Rejected(errors)) => {
                self.report_rejection("creating", "issue", &errors);
                return None;
            }
            Err(err) => {
                self.report(err);
                return None;
            }
        };
        self.console.info(
            ctx,
            format!("Created Jira {}: {}", args.issue_type, created.key),
        );

        let sub = CallContext::internal();
        if args.assign || args.begin {
            self.assign(sub, &created.key).await;
        }
        if args.begin {
            self.begin(sub, &created.key).await;
        }
        if args.browse {
            self.browse(sub, &created.key).await;
        }
        Some(created.key)
    }

    /// Resolve the epic link field and check the epic exists. Any failure
    /// is reported and the link skipped.
    async fn epic_link(&self, epic: &str) -> Option<(String, IssueKey)> {
        let client = self.client()?;
        let epic_key = IssueKey::new(epic);
        if let Err(err) = accessor::fetch(client, &epic_key, &[]).await {
            self.report(err);
            return None;
        }
        match self.session.field_index().await {
            Ok(index) => match index.key_for(EPIC_LINK_FIELD) {
                Some(field) => Some((field.to_string(), epic_key)),
                None => {
                    self.console.error(format!(
                        "No custom field named '{}'; not linking {}",
                        EPIC_LINK_FIELD, epic_key
                    ));
                    None
                }
            },
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Assign an issue to the configured user.
    pub async fn assign(&self, ctx: CallContext, id: &str) -> bool {
        let Some(client) = self.client() else {
            return false;
        };
        let key = IssueKey::new(id);
        let assignee = self.session.username();

        let mut fields = Map::new();
        fields.insert("assignee".into(), json!({ "name": assignee }));
        match accessor::save(client, &key, fields).await {
            Ok(SaveOutcome::Saved(())) => {
                self.console
                    .info(ctx, format!("{} assigned to {}", key, assignee));
                true
            }
            Ok(SaveOutcome::Rejected(errors)) => {
                self.report_rejection("assigning", key.as_str(), &errors);
                false
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Apply the first transition whose name matches `pattern`.
    pub async fn transition(&self, ctx: CallContext, id: &str, pattern: &str) -> bool {
        let Some((client, key, issue)) = self.load_issue(id).await else {
            return false;
        };
        let chosen = match transition::resolve(&issue.transitions, pattern) {
            Ok(chosen) => chosen,
            Err(err) => {
                self.report(err);
                return false;
            }
        };
        match transition::apply(client, &key, chosen).await {
            Ok(()) => {
                self.console
                    .info(ctx, format!("{} moved to {}", key, chosen.name));
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Mark an issue in progress.
    pub async fn begin(&self, ctx: CallContext, id: &str) -> bool {
        self.transition(ctx, id, IN_PROGRESS).await
    }

    /// Mark an issue done.
    pub async fn close(&self, ctx: CallContext, id: &str) -> bool {
        self.transition(ctx, id, DONE).await
    }

    /// Mark an issue blocked, optionally explaining why.
    pub async fn block(&self, ctx: CallContext, id: &str, comment: Option<&str>) -> bool {
        if !self.transition(ctx, id, BLOCKED).await {
            return false;
        }
        match comment {
            Some(body) => self
                .comment(CallContext::internal(), id, body, false)
                .await
                .is_some(),
            None => true,
        }
    }

    /// Add a comment, then close the issue if asked.
    pub async fn comment(
        &self,
        ctx: CallContext,
        id: &str,
        body: &str,
        close: bool,
    ) -> Option<Comment> {
        let client = self.client()?;
        let key = IssueKey::new(id);
        let comment = match client.add_comment(key.as_str(), body).await {
            Ok(comment) => comment,
            Err(err) => {
                self.report(err);
                return None;
            }
        };
        self.console.info(ctx, format!("Comment added to {}", key));

        if close {
            self.close(CallContext::internal(), key.as_str()).await;
        }
        Some(comment)
    }

    pub async fn delete(&self, ctx: CallContext, id: &str) -> bool {
        let Some(client) = self.client() else {
            return false;
        };
        let key = IssueKey::new(id);
        match accessor::delete(client, &key).await {
            Ok(()) => {
                self.console
                    .info(ctx, format!("Delete of issue {} succeeded", key));
                true
            }
            Err(err) => {
                self.console.error(format!("Delete of issue {} failed", key));
                self.report(err);
                false
            }
        }
    }

    /// Open an issue in the browser.
    pub async fn browse(&self, ctx: CallContext, id: &str) -> bool {
        let Some((_, key, issue)) = self.load_issue(id).await else {
            return false;
        };
        let url = issue.browse_url();
        debug!(%key, %url, "Opening issue in browser");
        match self.opener.open(&url) {
            Ok(()) => {
                self.console.info(ctx, format!("Opened {}", url));
                true
            }
            Err(err) => {
                self.console
                    .error(format!("Could not open {} in a browser: {}", url, err));
                false
            }
        }
    }

    /// Run a JQL search in a project.
    ///
    /// Internal callers get the issues back without anything printed.
    pub async fn search(&self, ctx: CallContext, args: &SearchArgs) -> Option<Vec<Issue>> {
        let client = self.client()?;
        let project = self.project_or_default(args.project.as_deref());
        let projection = args.fields.as_deref().map(query::parse_fields);
        let query = Query::new(&project, &args.jql).with_fields(projection.unwrap_or_default());

        let issues = match query.execute(client).await {
            Ok(issues) => issues,
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        if self.json {
            self.emit_json(ctx, &issues);
        } else {
            for issue in &issues {
                self.console.output(ctx, render::search_table(issue));
            }
        }
        Some(issues)
    }

    /// List a project's issues as flat rows.
    pub async fn list(&self, ctx: CallContext, args: &ListArgs) -> Option<Vec<IssueRow>> {
        let mut clauses = Vec::new();
        if args.mine {
            clauses.push("assignee = currentUser()");
        }
        if !args.done {
            clauses.push("Status != Done");
        }
        let project = self.project_or_default(args.project.as_deref());
        debug!(%project, "Listing issues");

        let search = SearchArgs {
            project: Some(project),
            jql: clauses.join(" and "),
            fields: Some(LIST_FIELDS.to_string()),
        };
        let issues = self.search(CallContext::internal(), &search).await?;
        let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from).collect();

        if self.json {
            self.emit_json(ctx, &rows);
        } else {
            self.console.output(ctx, render::list_table(&rows));
        }
        Some(rows)
    }

    /// Upload a file as an attachment.
    pub async fn attach(
        &self,
        ctx: CallContext,
        id: &str,
        path: &Path,
        mime_type: Option<&str>,
    ) -> Option<Vec<Attachment>> {
        let (client, key, _) = self.load_issue(id).await?;

        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(err) => {
                self.report(err);
                return None;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_type.unwrap_or(DEFAULT_MIME_TYPE);

        match client
            .add_attachment(key.as_str(), &file_name, mime_type, content)
            .await
        {
            Ok(attachments) => {
                self.console
                    .info(ctx, format!("Attached {} to {}", file_name, key));
                Some(attachments)
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Display one issue.
    pub async fn show(&self, ctx: CallContext, id: &str) -> Option<Issue> {
        let (_, _, issue) = self.load_issue(id).await?;
        if self.json {
            self.emit_json(ctx, &issue);
        } else if issue.issue_type_id() == Some(CLUSTER_ISSUE_TYPE_ID) {
            self.console.output(ctx, render::cluster_table(&issue));
        } else {
            self.console.output(ctx, render::issue_table(&issue));
        }
        Some(issue)
    }

    /// Change an issue's summary and/or description.
    pub async fn update(
        &self,
        ctx: CallContext,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> bool {
        let mut fields = Map::new();
        if let Some(title) = title {
            fields.insert("summary".into(), Value::from(title));
        }
        if let Some(description) = description {
            fields.insert(
                "description".into(),
                Value::from(description.replace("\\n", "\n")),
            );
        }
        if fields.is_empty() {
            self.console
                .error("Nothing to update: pass --title and/or --description");
            return false;
        }

        let Some(client) = self.client() else {
            return false;
        };
        let key = IssueKey::new(id);
        match accessor::save(client, &key, fields).await {
            Ok(SaveOutcome::Saved(())) => {
                self.console.info(ctx, format!("{} updated", key));
                true
            }
            Ok(SaveOutcome::Rejected(errors)) => {
                self.report_rejection("updating", key.as_str(), &errors);
                false
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Add labels, keeping those already present.
    pub async fn label(&self, ctx: CallContext, id: &str, labels: &str) -> bool {
        let labels = split_labels(labels);
        if labels.is_empty() {
            self.console.error("No labels given");
            return false;
        }

        let Some(client) = self.client() else {
            return false;
        };
        let key = IssueKey::new(id);
        match accessor::add_labels(client, &key, &labels).await {
            Ok(SaveOutcome::Saved(())) => {
                self.console
                    .info(ctx, format!("Labelled {}: {}", key, labels.join(", ")));
                true
            }
            Ok(SaveOutcome::Rejected(errors)) => {
                self.report_rejection("labelling", key.as_str(), &errors);
                false
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Show creatable issue types, or one type's fields.
    pub async fn fields(
        &self,
        ctx: CallContext,
        project: Option<&str>,
        issue_type: Option<&str>,
    ) -> Option<CreateMeta> {
        let client = self.client()?;
        let project = self.project_or_default(project).to_uppercase();
        let meta = match client.create_meta(&project, issue_type).await {
            Ok(meta) => meta,
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        let types = meta
            .projects
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(&project))
            .map(|p| p.issuetypes.as_slice())
            .unwrap_or_default();

        match issue_type {
            None if self.json => self.emit_json(ctx, &meta),
            None => {
                let mut text = format!("Issue types in {}:", project);
                for t in types {
                    text.push_str("\n  ");
                    text.push_str(&t.name);
                }
                self.console.output(ctx, text);
            }
            Some(wanted) => {
                let Some(found) = types.iter().find(|t| t.name.eq_ignore_ascii_case(wanted))
                else {
                    self.report(AppError::resolution(format!(
                        "Issue type '{}' not found in project {}",
                        wanted, project
                    )));
                    return None;
                };
                if self.json {
                    self.emit_json(ctx, found);
                } else {
                    self.console.output(ctx, render::field_table(found));
                }
            }
        }
        Some(meta)
    }
}
