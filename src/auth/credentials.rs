//! Saved-login storage backed by the OS keychain.
//!
//! Passwords are filed under one keychain service, keyed by username, so
//! switching accounts keeps each saved login intact. A password is only
//! ever written after the backend has accepted it.

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name under which saved logins are filed
const SERVICE_NAME: &str = "costbench";

pub struct CredentialStore;

impl CredentialStore {
    fn entry(username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, username).context("Failed to open keyring entry")
    }

    /// Save the password after a successful login.
    pub fn store(username: &str, password: &str) -> Result<()> {
        Self::entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Stored password for the given username, used to prefill the login
    /// form.
    pub fn get_password(username: &str) -> Result<String> {
        Self::entry(username)?
            .get_password()
            .context("No stored password for this username")
    }

    /// Drop the saved password (the login view's forget action).
    pub fn forget(username: &str) -> Result<()> {
        Self::entry(username)?
            .delete_credential()
            .context("Failed to remove password from keychain")
    }

    pub fn has_credentials(username: &str) -> bool {
        Self::entry(username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
