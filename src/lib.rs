//! jiractl - a command-line client for JIRA issues.
//!
//! The crate is split leaves first: [`api`] talks to the REST API,
//! [`session`] owns the authenticated client, [`issue`] fetches, transitions
//! and queries issues, [`render`] draws tables, and [`commands`] composes
//! all of them into the operations exposed by [`cli`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod issue;
pub mod logging;
pub mod render;
pub mod session;
