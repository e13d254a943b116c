//! Authentication handling for JIRA API.
//!
//! This module handles authentication with JIRA using Basic Auth
//! (username + API token) and secure token storage via the OS keyring.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;
use tracing::{debug, info};

/// The keyring service name for jiractl tokens.
pub const KEYRING_SERVICE: &str = "jiractl";

/// Errors from the credential store or the secret prompt.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The terminal prompt failed.
    #[error("Could not read API token: {0}")]
    Prompt(String),
}

/// Authentication credentials for JIRA.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The login name.
    username: String,
    /// The Base64-encoded authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from username and token.
    ///
    /// The token is immediately encoded and the raw token is not stored.
    pub fn new(username: &str, token: &str) -> Self {
        let auth_header = build_auth_header(username, token);
        Self {
            username: username.to_string(),
            auth_header,
        }
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the login name.
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "username:token" in Base64 and prepends "Basic ".
fn build_auth_header(username: &str, token: &str) -> String {
    let credentials = format!("{}:{}", username, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

/// A service-scoped secret store.
pub trait CredentialStore {
    /// Look up the secret stored for `account`. `Ok(None)` means no entry.
    fn lookup(&self, account: &str) -> Result<Option<String>, CredentialError>;

    /// Persist a secret for `account`.
    fn store(&self, account: &str, secret: &str) -> Result<(), CredentialError>;
}

/// The OS keyring, scoped to [`KEYRING_SERVICE`].
#[derive(Debug, Default)]
pub struct KeyringStore;

impl CredentialStore for KeyringStore {
    fn lookup(&self, account: &str) -> Result<Option<String>, CredentialError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .map_err(|e| CredentialError::Keyring(format!("failed to access keyring: {}", e)))?;

        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Keyring(format!(
                "failed to retrieve token: {}",
                e
            ))),
        }
    }

    fn store(&self, account: &str, secret: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .map_err(|e| CredentialError::Keyring(format!("failed to create keyring entry: {}", e)))?;

        entry
            .set_password(secret)
            .map_err(|e| CredentialError::Keyring(format!("failed to store token: {}", e)))
    }
}

/// Asks the operator for a secret.
pub trait SecretPrompt {
    /// Prompt once and return what was typed.
    fn prompt(&self, label: &str) -> Result<String, CredentialError>;
}

/// Hidden-input prompt on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt(&self, label: &str) -> Result<String, CredentialError> {
        dialoguer::Password::new()
            .with_prompt(label)
            .allow_empty_password(false)
            .interact()
            .map(|s| s.trim_end().to_string())
            .map_err(|e| CredentialError::Prompt(e.to_string()))
    }
}

/// Resolve the API token for `account`.
///
/// Reads the store; while nothing is stored, prompts, persists the answer
/// and reads the store again.
pub fn resolve_secret(
    store: &dyn CredentialStore,
    prompt: &dyn SecretPrompt,
    account: &str,
) -> Result<String, CredentialError> {
    loop {
        if let Some(secret) = store.lookup(account)? {
            debug!(account, "API token found in credential store");
            return Ok(secret);
        }

        info!(account, "No API token stored, prompting");
        let secret = prompt.prompt("Jira API key")?;
        store.store(account, &secret)?;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory credential doubles.

    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    /// A credential store backed by a map.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: RefCell<HashMap<String, String>>,
        pub stores: Cell<usize>,
    }

    impl MemoryStore {
        pub fn with_entry(account: &str, secret: &str) -> Self {
            let store = Self::default();
            store
                .entries
                .borrow_mut()
                .insert(account.to_string(), secret.to_string());
            store
        }
    }

    impl CredentialStore for MemoryStore {
        fn lookup(&self, account: &str) -> Result<Option<String>, CredentialError> {
            Ok(self.entries.borrow().get(account).cloned())
        }

        fn store(&self, account: &str, secret: &str) -> Result<(), CredentialError> {
            self.stores.set(self.stores.get() + 1);
            self.entries
                .borrow_mut()
                .insert(account.to_string(), secret.to_string());
            Ok(())
        }
    }

    /// A prompt that always answers the same secret and counts calls.
    #[derive(Debug)]
    pub struct ScriptedPrompt {
        answer: String,
        pub calls: Cell<usize>,
    }

    impl ScriptedPrompt {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                calls: Cell::new(0),
            }
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn prompt(&self, _label: &str) -> Result<String, CredentialError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.answer.clone())
        }
    }
}
