//! Project operations.

use super::{CallContext, Orchestrator};
use crate::api::types::Project;
use crate::render;

/// Case-insensitive substring match; `None` matches everything.
fn matches(value: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| value.to_lowercase().contains(&f.to_lowercase()))
}

impl Orchestrator<'_> {
    /// List visible projects, optionally filtered by name and/or key.
    pub async fn list_projects(
        &self,
        ctx: CallContext,
        name: Option<&str>,
        key: Option<&str>,
    ) -> Option<Vec<Project>> {
        let client = self.client()?;
        let projects: Vec<Project> = match client.list_projects().await {
            Ok(projects) => projects
                .into_iter()
                .filter(|p| matches(&p.name, name) && matches(&p.key, key))
                .collect(),
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        if self.json {
            self.emit_json(ctx, &projects);
        } else {
            self.console.output(ctx, render::project_table(&projects));
        }
        Some(projects)
    }

    /// Show one project.
    pub async fn show_project(&self, ctx: CallContext, key: &str) -> Option<Project> {
        let client = self.client()?;
        let project = match client.get_project(&key.trim().to_uppercase()).await {
            Ok(project) => project,
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        if self.json {
            self.emit_json(ctx, &project);
        } else {
            self.console
                .output(ctx, render::project_table(std::slice::from_ref(&project)));
        }
        Some(project)
    }
}
