//! Workstation configuration storage.
//!
//! Credentials for the dashboard backend (base URL, API key, workstation id)
//! live in the OS credential store: DPAPI on Windows, Keychain on macOS, the
//! Secret Service API on Linux. Environment variables act as fallbacks for
//! headless and CI use, where no keyring is available.

use keyring::Entry;
use tracing::{info, warn};

use crate::api::{self, AdminClient};

const SERVICE_NAME: &str = "the-small-admin";

// Credential keys
const KEY_BACKEND_URL: &str = "backend_url";
const KEY_API_KEY: &str = "admin_api_key";
const KEY_WORKSTATION_ID: &str = "workstation_id";

/// All credential keys managed by this module.
const ALL_KEYS: &[&str] = &[KEY_BACKEND_URL, KEY_API_KEY, KEY_WORKSTATION_ID];

// ---------------------------------------------------------------------------
// Low-level helpers
// ---------------------------------------------------------------------------

/// Retrieve a single credential from the OS keyring. Returns `None` when the
/// entry does not exist (or the platform returns a "not found" error).
pub fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

/// Store a credential in the OS keyring.
pub fn set_credential(key: &str, value: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    entry.set_password(value).map_err(|e| e.to_string())?;
    Ok(())
}

/// Delete a credential from the OS keyring. Silently succeeds if the entry
/// does not exist.
pub fn delete_credential(key: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn env_fallback(key: &str) -> Option<String> {
    let var = match key {
        KEY_BACKEND_URL => "SMALL_ADMIN_URL",
        KEY_API_KEY => "SMALL_ADMIN_API_KEY",
        KEY_WORKSTATION_ID => "SMALL_ADMIN_WORKSTATION_ID",
        _ => return None,
    };
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keyring first, environment second.
pub fn resolve(key: &str) -> Option<String> {
    get_credential(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| env_fallback(key))
}

// ---------------------------------------------------------------------------
// High-level API
// ---------------------------------------------------------------------------

/// The workstation is considered configured when a backend URL and API key
/// are resolvable.
pub fn is_configured() -> bool {
    resolve(KEY_BACKEND_URL).is_some() && resolve(KEY_API_KEY).is_some()
}

/// Store credentials from a dashboard pairing string.
pub fn configure_from_connect_string(raw: &str) -> Result<(), String> {
    let info =
        api::decode_connect_string(raw).ok_or("Unrecognized connect string".to_string())?;
    set_credential(KEY_BACKEND_URL, &info.url)?;
    set_credential(KEY_API_KEY, &info.api_key)?;
    if let Some(wid) = info.workstation_id.as_deref() {
        set_credential(KEY_WORKSTATION_ID, wid)?;
    }
    info!("workstation credentials updated from connect string");
    Ok(())
}

/// Build an [`AdminClient`] from the stored configuration.
pub fn client_from_config() -> Result<AdminClient, String> {
    let url = resolve(KEY_BACKEND_URL).ok_or("Workstation not configured: missing backend URL")?;
    let api_key = resolve(KEY_API_KEY).ok_or("Workstation not configured: missing API key")?;
    let workstation_id = resolve(KEY_WORKSTATION_ID).unwrap_or_default();
    AdminClient::new(&url, &api_key, &workstation_id).map_err(|e| e.to_string())
}

/// Delete every stored credential.
pub fn clear() -> Result<(), String> {
    info!("clearing workstation credentials");
    for key in ALL_KEYS {
        delete_credential(key)?;
    }
    Ok(())
}
