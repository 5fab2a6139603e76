//! Credential storage in the OS keychain.
//!
//! macOS uses the `security` command (Keychain), Linux uses `secret-tool`
//! (libsecret). Three keys are stored under the `freshet` service:
//! `api_url`, `username`, `password`. Absence of any one of them means the
//! tool is not configured.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::app::error::{FreshetError, Result};

pub const SERVICE_NAME: &str = "freshet";

pub const KEY_API_URL: &str = "api_url";
pub const KEY_USERNAME: &str = "username";
pub const KEY_PASSWORD: &str = "password";

const KEYS: [&str; 3] = [KEY_API_URL, KEY_USERNAME, KEY_PASSWORD];

/// FreshRSS API credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_url: String,
    pub username: String,
    pub password: String,
}

/// Key-value secret storage. `get` returns `None` for an absent key;
/// failures of the underlying secret service are errors.
pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Load stored credentials; `None` when any key is absent.
pub fn load_credentials(store: &dyn SecretStore) -> Result<Option<Credentials>> {
    let Some(api_url) = store.get(KEY_API_URL)? else {
        return Ok(None);
    };
    let Some(username) = store.get(KEY_USERNAME)? else {
        return Ok(None);
    };
    let Some(password) = store.get(KEY_PASSWORD)? else {
        return Ok(None);
    };
    Ok(Some(Credentials {
        api_url,
        username,
        password,
    }))
}

pub fn save_credentials(store: &dyn SecretStore, credentials: &Credentials) -> Result<()> {
    store.set(KEY_API_URL, &credentials.api_url)?;
    store.set(KEY_USERNAME, &credentials.username)?;
    store.set(KEY_PASSWORD, &credentials.password)?;
    Ok(())
}

pub fn clear_credentials(store: &dyn SecretStore) -> Result<()> {
    for key in KEYS {
        store.delete(key)?;
    }
    Ok(())
}

/// Secret store backed by the platform keychain command.
#[derive(Default)]
pub struct KeychainStore;

impl KeychainStore {
    pub fn new() -> Self {
        Self
    }

    /// Run a keychain command, optionally feeding `input` on stdin.
    /// Returns the exit success flag and trimmed stdout.
    fn run(mut command: Command, input: Option<&str>) -> Result<(bool, String)> {
        command.stdout(Stdio::piped()).stderr(Stdio::null());
        if input.is_some() {
            command.stdin(Stdio::piped());
        }

        let mut child = command
            .spawn()
            .map_err(|e| FreshetError::Keychain(format!("failed to run keychain tool: {e}")))?;

        if let Some(data) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| FreshetError::Keychain("keychain tool stdin unavailable".into()))?;
            stdin
                .write_all(data.as_bytes())
                .map_err(|e| FreshetError::Keychain(format!("failed to write secret: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| FreshetError::Keychain(format!("keychain tool failed: {e}")))?;

        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}

#[cfg(target_os = "macos")]
impl SecretStore for KeychainStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut command = Command::new("security");
        command
            .args(["find-generic-password", "-s", SERVICE_NAME, "-a", key, "-w"]);
        let (ok, stdout) = Self::run(command, None)?;
        Ok(ok.then_some(stdout))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Replace any existing entry; a failed delete just means there was
        // none.
        let mut delete = Command::new("security");
        delete.args(["delete-generic-password", "-s", SERVICE_NAME, "-a", key]);
        let _ = Self::run(delete, None);

        let mut add = Command::new("security");
        add.args([
            "add-generic-password",
            "-s",
            SERVICE_NAME,
            "-a",
            key,
            "-w",
            value,
        ]);
        let (ok, _) = Self::run(add, None)?;
        if !ok {
            return Err(FreshetError::Keychain(format!("failed to store {key}")));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut command = Command::new("security");
        command.args(["delete-generic-password", "-s", SERVICE_NAME, "-a", key]);
        let (ok, _) = Self::run(command, None)?;
        if !ok {
            return Err(FreshetError::Keychain(format!("failed to delete {key}")));
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
impl SecretStore for KeychainStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut command = Command::new("secret-tool");
        command.args(["lookup", "service", SERVICE_NAME, "key", key]);
        let (ok, stdout) = Self::run(command, None)?;
        Ok(ok.then_some(stdout))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let label = format!("{SERVICE_NAME}/{key}");
        let mut command = Command::new("secret-tool");
        command.args([
            "store",
            "--label",
            label.as_str(),
            "service",
            SERVICE_NAME,
            "key",
            key,
        ]);
        let (ok, _) = Self::run(command, Some(value))?;
        if !ok {
            return Err(FreshetError::Keychain(format!("failed to store {key}")));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut command = Command::new("secret-tool");
        command.args(["clear", "service", SERVICE_NAME, "key", key]);
        let (ok, _) = Self::run(command, None)?;
        if !ok {
            return Err(FreshetError::Keychain(format!("failed to delete {key}")));
        }
        Ok(())
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl SecretStore for KeychainStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(FreshetError::Keychain("unsupported platform".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(FreshetError::Keychain("unsupported platform".into()))
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Err(FreshetError::Keychain("unsupported platform".into()))
    }
}
