//! Connection settings.

use serde::{Deserialize, Serialize};

/// Placeholder site shipped in a fresh config.
pub const PLACEHOLDER_SITE: &str = "https://jira.atlassian.com";

/// Placeholder for values the operator must fill in.
pub const INVALID_DEFAULT: &str = "INVALID_DEFAULT";

/// Connection settings for one JIRA instance.
///
/// The API token is never stored here; it lives in the OS keyring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The JIRA instance URL.
    pub site: String,
    /// Path prefix of the JIRA web app, e.g. `/jira`. Usually empty.
    pub context_path: String,
    /// The login name used for Basic Auth and for self-assignment.
    pub username: String,
    /// The default project key.
    pub project: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: PLACEHOLDER_SITE.to_string(),
            context_path: String::new(),
            username: INVALID_DEFAULT.to_string(),
            project: INVALID_DEFAULT.to_string(),
        }
    }
}

impl Settings {
    /// Warnings for values still holding a shipped placeholder.
    ///
    /// These are advisory: remote calls are still attempted.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.site == PLACEHOLDER_SITE {
            warnings.push(
                "Please update config.toml with your site at key 'site'".to_string(),
            );
        }
        if self.project == INVALID_DEFAULT {
            warnings.push(
                "Please update config.toml with your project at key 'project'".to_string(),
            );
        }
        if self.username == INVALID_DEFAULT {
            warnings.push(
                "Please update config.toml with your username at key 'username'".to_string(),
            );
        }
        warnings
    }

    /// Check that the settings can reach a server at all.
    pub fn has_site(&self) -> bool {
        !self.site.trim().is_empty()
    }
}
