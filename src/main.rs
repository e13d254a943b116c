//! jiractl - create, query and move JIRA issues from the terminal.

use std::process::ExitCode;

use clap::Parser;

use jiractl::api::{KeyringStore, TerminalPrompt};
use jiractl::cli::Cli;
use jiractl::commands::{Console, Orchestrator, SystemBrowser};
use jiractl::error::AppError;
use jiractl::session::Session;
use jiractl::{config, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    let console = Console::terminal();
    let settings = match config::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            let err = AppError::from(err);
            console.error(err.user_message());
            if let Some(action) = err.suggested_action() {
                console.error(action);
            }
            return ExitCode::FAILURE;
        }
    };

    let session = Session::new(settings, Box::new(KeyringStore), Box::new(TerminalPrompt));
    let browser = SystemBrowser;
    let orchestrator = Orchestrator::new(&session, &console, &browser).with_json(cli.json);

    let succeeded = cli.command.run(&orchestrator).await;
    tracing::info!(succeeded, "jiractl finished");

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
