//! The authenticated session.
//!
//! One [`Session`] is built at process start and handed to the command
//! orchestrator. It resolves credentials and builds the [`JiraClient`] on
//! first use, then hands out the same client for the rest of the process.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use tracing::{debug, info};

use crate::api::auth::resolve_secret;
use crate::api::types::Field;
use crate::api::{CredentialStore, JiraClient, SecretPrompt};
use crate::config::{ConfigError, Settings};
use crate::error::Result;

/// Display name of the custom field holding an epic's name.
pub const EPIC_NAME_FIELD: &str = "Epic Name";

/// Display name of the custom field linking an issue to its epic.
pub const EPIC_LINK_FIELD: &str = "Epic Link";

/// Map a known issue type name to its server-side id.
///
/// Unknown names give `None`; nothing is guessed.
pub fn resolve_issue_type_id(name: &str) -> Option<u32> {
    match name {
        "epic" => Some(20),
        "task" => Some(20_534),
        "crdb_cluster" => Some(21_686),
        _ => None,
    }
}

/// Display name to storage key lookup, built from `GET /field`.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    by_name: HashMap<String, String>,
}

impl FieldIndex {
    /// Build the index. When two fields share a display name the first wins.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        for field in fields {
            by_name.entry(field.name).or_insert(field.id);
        }
        Self { by_name }
    }

    /// The storage key (e.g. `customfield_11444`) for a display name.
    pub fn key_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Connection state for one process.
pub struct Session {
    settings: Settings,
    store: Box<dyn CredentialStore>,
    prompt: Box<dyn SecretPrompt>,
    client: OnceCell<JiraClient>,
    fields: OnceCell<FieldIndex>,
    warnings: RefCell<Vec<String>>,
}

impl Session {
    /// Create a session. Nothing is contacted until [`Session::client`].
    pub fn new(
        settings: Settings,
        store: Box<dyn CredentialStore>,
        prompt: Box<dyn SecretPrompt>,
    ) -> Self {
        let warnings = settings.warnings();
        Self {
            settings,
            store,
            prompt,
            client: OnceCell::new(),
            fields: OnceCell::new(),
            warnings: RefCell::new(warnings),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The configured default project key.
    pub fn default_project(&self) -> &str {
        &self.settings.project
    }

    /// The configured login name.
    pub fn username(&self) -> &str {
        &self.settings.username
    }

    /// The authenticated client, built on first call.
    ///
    /// Resolving the secret may prompt on the terminal. An empty site is a
    /// [`ConfigError::MissingSite`] and nothing is attempted.
    pub fn client(&self) -> Result<&JiraClient> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        if !self.settings.has_site() {
            return Err(ConfigError::MissingSite.into());
        }

        let secret = resolve_secret(
            self.store.as_ref(),
            self.prompt.as_ref(),
            &self.settings.username,
        )?;
        let client = JiraClient::new(
            &self.settings.site,
            &self.settings.context_path,
            &self.settings.username,
            &secret,
        )?;
        info!(site = %self.settings.site, "Session connected");
        Ok(self.client.get_or_init(|| client))
    }

    /// Take the pending configuration warnings. Later calls return nothing.
    pub fn drain_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }

    /// The field index, fetched once per session.
    pub async fn field_index(&self) -> Result<&FieldIndex> {
        if let Some(index) = self.fields.get() {
            return Ok(index);
        }

        let fields = self.client()?.list_fields().await?;
        let index = FieldIndex::from_fields(fields);
        debug!(fields = index.len(), "Field index built");
        Ok(self.fields.get_or_init(|| index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::testing::{MemoryStore, ScriptedPrompt};
    use crate::error::AppError;
    use mockito::Server;

    fn settings(site: &str) -> Settings {
        Settings {
            site: site.to_string(),
            context_path: String::new(),
            username: "jdoe".to_string(),
            project: "ABC".to_string(),
        }
    }

    #[test]
    fn test_resolve_issue_type_id() {
        assert_eq!(resolve_issue_type_id("epic"), Some(20));
        assert_eq!(resolve_issue_type_id("task"), Some(20534));
        assert_eq!(resolve_issue_type_id("crdb_cluster"), Some(21686));
        assert_eq!(resolve_issue_type_id("story"), None);
        assert_eq!(resolve_issue_type_id("Epic"), None);
    }

    #[test]
    fn test_field_index_first_name_wins() {
        let index = FieldIndex::from_fields(vec![
            Field {
                id: "customfield_11444".to_string(),
                name: "Epic Name".to_string(),
                custom: true,
            },
            Field {
                id: "customfield_99999".to_string(),
                name: "Epic Name".to_string(),
                custom: true,
            },
        ]);
        assert_eq!(index.key_for("Epic Name"), Some("customfield_11444"));
        assert_eq!(index.key_for("Epic Link"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_client_is_memoized() {
        let session = Session::new(
            settings("https://jira.example.com"),
            Box::new(MemoryStore::with_entry("jdoe", "token")),
            Box::new(ScriptedPrompt::answering("unused")),
        );

        let first = session.client().unwrap() as *const JiraClient;
        let second = session.client().unwrap() as *const JiraClient;
        assert_eq!(first, second);
    }

    #[test]
    fn test_client_prompts_when_no_secret_stored() {
        let session = Session::new(
            settings("https://jira.example.com"),
            Box::new(MemoryStore::default()),
            Box::new(ScriptedPrompt::answering("typed")),
        );
        let client = session.client().unwrap();
        assert_eq!(client.username(), "jdoe");
    }

    #[test]
    fn test_missing_site_is_fatal() {
        let session = Session::new(
            settings(""),
            Box::new(MemoryStore::with_entry("jdoe", "token")),
            Box::new(ScriptedPrompt::answering("unused")),
        );
        assert!(matches!(
            session.client(),
            Err(AppError::Config(ConfigError::MissingSite))
        ));
    }

    #[test]
    fn test_warnings_drain_once() {
        let session = Session::new(
            Settings::default(),
            Box::new(MemoryStore::default()),
            Box::new(ScriptedPrompt::answering("unused")),
        );
        assert_eq!(session.drain_warnings().len(), 3);
        assert!(session.drain_warnings().is_empty());
    }

    #[tokio::test]
    async fn test_field_index_fetched_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/field")
            .with_status(200)
            .with_body(
                r#"[{"id": "summary", "name": "Summary", "custom": false},
                    {"id": "customfield_11444", "name": "Epic Name", "custom": true}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let session = Session::new(
            settings(&server.url()),
            Box::new(MemoryStore::with_entry("jdoe", "token")),
            Box::new(ScriptedPrompt::answering("unused")),
        );

        let index = session.field_index().await.unwrap();
        assert_eq!(index.key_for(EPIC_NAME_FIELD), Some("customfield_11444"));
        session.field_index().await.unwrap();
        mock.assert_async().await;
    }
}
