//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{CallContext, CreateArgs, ListArgs, Orchestrator, SearchArgs};

#[derive(Parser, Debug)]
#[command(name = "jiractl")]
#[command(about = "Create, query and move JIRA issues from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to config.toml (defaults to $JIRACTL_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write debug-level diagnostics to the log file
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with issues
    Issue {
        #[command(subcommand)]
        action: IssueCommand,
    },
    /// Work with projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum IssueCommand {
    /// Create a new issue
    Create {
        /// Issue title
        #[arg(long, short)]
        title: String,

        /// Why do we need this issue? A literal "\n" becomes a newline
        #[arg(long, short)]
        description: String,

        /// Issue type to create
        #[arg(long = "type", short = 'y', default_value = "task",
              value_parser = ["crdb_cluster", "task", "epic"])]
        issue_type: String,

        /// Project key (defaults to the configured project)
        #[arg(long, short)]
        project: Option<String>,

        /// Tie this issue to an existing epic
        #[arg(long)]
        epic: Option<String>,

        /// Name of the epic being created (required with --type epic)
        #[arg(long)]
        epic_name: Option<String>,

        /// Comma-separated labels, e.g. label1,label2
        #[arg(long)]
        labels: Option<String>,

        /// Assign the issue to yourself
        #[arg(long)]
        assign: bool,

        /// Mark the issue in progress (implies --assign)
        #[arg(long)]
        begin: bool,

        /// Open the issue in your browser once created
        #[arg(long)]
        browse: bool,
    },
    /// Assign an issue to yourself
    Assign {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Mark an issue in progress
    Begin {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Mark an issue done
    Close {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Mark an issue blocked
    Block {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// Explain what the issue is blocked on
        #[arg(long, short)]
        comment: Option<String>,
    },
    /// Apply the first transition whose name matches a pattern
    Transition {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// Case-insensitive regex matched against transition names
        pattern: String,
    },
    /// Comment on an issue
    Comment {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// Comment to add
        #[arg(long, short)]
        comment: String,

        /// Close the issue after commenting
        #[arg(long)]
        close: bool,
    },
    /// Delete an issue
    Delete {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Open an issue in your default browser
    Browse {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Search a project with JQL
    Search {
        /// JQL appended to the project clause, e.g. 'labels = CertRenewals'
        #[arg(long, short)]
        jql: String,

        /// Comma-separated fields to return
        #[arg(long, short)]
        fields: Option<String>,

        /// Project key (defaults to the configured project)
        #[arg(long, short)]
        project: Option<String>,
    },
    /// List issues in a project
    List {
        /// Project key (defaults to the configured project)
        #[arg(long, short)]
        project: Option<String>,

        /// Only issues assigned to you
        #[arg(long)]
        mine: bool,

        /// Include issues marked Done
        #[arg(long)]
        done: bool,
    },
    /// Attach a file to an issue
    Attach {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// File to attach
        #[arg(long, short)]
        file: PathBuf,

        /// MIME type sent with the file
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Show an issue
    Show {
        /// Issue key (e.g., PROJ-123)
        id: String,
    },
    /// Change an issue's title and/or description
    Update {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// New title
        #[arg(long, short)]
        title: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Add labels to an issue
    Label {
        /// Issue key (e.g., PROJ-123)
        id: String,

        /// Comma-separated labels to add
        #[arg(long, short)]
        labels: String,
    },
    /// Show the fields needed to create an issue
    Fields {
        /// Project key (defaults to the configured project)
        #[arg(long, short)]
        project: Option<String>,

        /// Issue type name; lists the project's types when omitted
        #[arg(long = "type", short = 'y')]
        issue_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    List {
        /// Only projects whose name contains this text
        #[arg(long)]
        name: Option<String>,

        /// Only projects whose key contains this text
        #[arg(long)]
        key: Option<String>,
    },
    /// Show a project
    Show {
        /// Project key
        key: String,
    },
}

impl Commands {
    /// Run the command. Returns whether the operation succeeded.
    pub async fn run(self, orchestrator: &Orchestrator<'_>) -> bool {
        let ctx = CallContext::top_level();
        match self {
            Commands::Issue { action } => action.run(orchestrator, ctx).await,
            Commands::Project { action } => match action {
                ProjectCommand::List { name, key } => orchestrator
                    .list_projects(ctx, name.as_deref(), key.as_deref())
                    .await
                    .is_some(),
                ProjectCommand::Show { key } => {
                    orchestrator.show_project(ctx, &key).await.is_some()
                }
            },
        }
    }
}

impl IssueCommand {
    async fn run(self, o: &Orchestrator<'_>, ctx: CallContext) -> bool {
        match self {
            IssueCommand::Create {
                title,
                description,
                issue_type,
                project,
                epic,
                epic_name,
                labels,
                assign,
                begin,
                browse,
            } => {
                let args = CreateArgs {
                    title,
                    description,
                    issue_type,
                    project,
                    epic,
                    epic_name,
                    labels,
                    assign,
                    begin,
                    browse,
                };
                o.create(ctx, &args).await.is_some()
            }
            IssueCommand::Assign { id } => o.assign(ctx, &id).await,
            IssueCommand::Begin { id } => o.begin(ctx, &id).await,
            IssueCommand::Close { id } => o.close(ctx, &id).await,
            IssueCommand::Block { id, comment } => o.block(ctx, &id, comment.as_deref()).await,
            IssueCommand::Transition { id, pattern } => o.transition(ctx, &id, &pattern).await,
            IssueCommand::Comment { id, comment, close } => {
                o.comment(ctx, &id, &comment, close).await.is_some()
            }
            IssueCommand::Delete { id } => o.delete(ctx, &id).await,
            IssueCommand::Browse { id } => o.browse(ctx, &id).await,
            IssueCommand::Search {
                jql,
                fields,
                project,
            } => {
                let args = SearchArgs {
                    project,
                    jql,
                    fields,
                };
                o.search(ctx, &args).await.is_some()
            }
            IssueCommand::List {
                project,
                mine,
                done,
            } => {
                let args = ListArgs {
                    project,
                    mine,
                    done,
                };
                o.list(ctx, &args).await.is_some()
            }
            IssueCommand::Attach {
                id,
                file,
                mime_type,
            } => o
                .attach(ctx, &id, &file, mime_type.as_deref())
                .await
                .is_some(),
            IssueCommand::Show { id } => o.show(ctx, &id).await.is_some(),
            IssueCommand::Update {
                id,
                title,
                description,
            } => {
                o.update(ctx, &id, title.as_deref(), description.as_deref())
                    .await
            }
            IssueCommand::Label { id, labels } => o.label(ctx, &id, &labels).await,
            IssueCommand::Fields {
                project,
                issue_type,
            } => o
                .fields(ctx, project.as_deref(), issue_type.as_deref())
                .await
                .is_some(),
        }
    }
}
