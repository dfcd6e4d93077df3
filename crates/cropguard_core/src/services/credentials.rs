//! API key storage with configurable providers.
//!
//! ## Provider Selection
//!
//! - **Debug builds**: File-based storage at `~/.config/cropguard/dev_credentials.json`
//!   - Override with `CROPGUARD_USE_KEYCHAIN=1` to force keychain usage
//! - **Release builds**: OS keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)
//!
//! A key can also be supplied through the environment (`CROPGUARD_<SERVICE>_KEY`),
//! which takes precedence over any stored key.

use crate::error::CropGuardError;

use keyring::Entry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Service name used for keychain entries.
const KEYRING_SERVICE: &str = "dev.cropguard.CropGuard";

/// Environment variable to force keychain usage in debug builds.
const FORCE_KEYCHAIN_ENV: &str = "CROPGUARD_USE_KEYCHAIN";

/// Name of the image hosting service whose key uploads use.
pub const IMAGE_HOST_SERVICE: &str = "imgbb";

/// Environment variable that supplies the key for `service`.
pub fn api_key_env(service: &str) -> String {
    format!("CROPGUARD_{}_KEY", service.to_ascii_uppercase())
}

// ============================================================================
// CredentialsProvider Trait
// ============================================================================

/// Pluggable secret storage backend.
pub trait CredentialsProvider: Send + Sync {
    fn store(&self, key: &str, value: &str) -> Result<(), CropGuardError>;

    fn get(&self, key: &str) -> Result<Option<String>, CropGuardError>;

    fn delete(&self, key: &str) -> Result<(), CropGuardError>;

    fn exists(&self, key: &str) -> Result<bool, CropGuardError> {
        Ok(self.get(key)?.is_some())
    }

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

// ============================================================================
// FileCredentialsProvider
// ============================================================================

/// File-based secret storage for development builds.
#[derive(Debug)]
pub struct FileCredentialsProvider {
    file_path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CredentialsFile {
    credentials: HashMap<String, String>,
}

impl FileCredentialsProvider {
    /// Create a provider backed by `~/.config/cropguard/dev_credentials.json`.
    pub fn new() -> Result<Self, CropGuardError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropGuardError::storage("Could not determine config directory", None))?
            .join("cropguard");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                CropGuardError::storage(
                    format!("Failed to create config directory: {e}"),
                    Some("Check permissions for ~/.config/cropguard"),
                )
            })?;
        }

        Self::with_path(config_dir.join("dev_credentials.json"))
    }

    /// Create a provider backed by a specific file.
    pub fn with_path(file_path: PathBuf) -> Result<Self, CropGuardError> {
        let provider = Self { file_path, cache: RwLock::new(HashMap::new()) };
        provider.load_from_file()?;
        Ok(provider)
    }

    fn load_from_file(&self) -> Result<(), CropGuardError> {
        if !self.file_path.exists() {
            return Ok(());
        }

        let contents = fs::read_to_string(&self.file_path).map_err(|e| {
            CropGuardError::storage(format!("Failed to read credentials file: {e}"), None)
        })?;

        if contents.trim().is_empty() {
            return Ok(());
        }

        let creds_file: CredentialsFile = serde_json::from_str(&contents).map_err(|e| {
            CropGuardError::storage(format!("Invalid credentials file format: {e}"), None)
        })?;

        *self.cache.write() = creds_file.credentials;
        Ok(())
    }

    /// Write the cache to disk. Owner read/write only on Unix.
    fn save_to_file(&self) -> Result<(), CropGuardError> {
        let creds_file = CredentialsFile { credentials: self.cache.read().clone() };

        let json = serde_json::to_string_pretty(&creds_file).map_err(|e| {
            CropGuardError::storage(format!("Failed to serialize credentials: {e}"), None)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.file_path)
                .map_err(|e| {
                    CropGuardError::storage(format!("Failed to create credentials file: {e}"), None)
                })?;
            file.write_all(json.as_bytes()).map_err(|e| {
                CropGuardError::storage(format!("Failed to write credentials file: {e}"), None)
            })?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.file_path, json).map_err(|e| {
                CropGuardError::storage(format!("Failed to write credentials file: {e}"), None)
            })?;
        }

        Ok(())
    }
}

impl CredentialsProvider for FileCredentialsProvider {
    fn store(&self, key: &str, value: &str) -> Result<(), CropGuardError> {
        self.cache.write().insert(key.to_string(), value.to_string());
        self.save_to_file()?;
        tracing::debug!(key = key, "Credential stored in file");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CropGuardError> {
        Ok(self.cache.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CropGuardError> {
        self.cache.write().remove(key);
        self.save_to_file()?;
        tracing::debug!(key = key, "Credential deleted from file");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FileCredentialsProvider"
    }
}

// ============================================================================
// KeychainCredentialsProvider
// ============================================================================

/// OS keychain storage for release builds.
#[derive(Debug)]
pub struct KeychainCredentialsProvider {
    service: String,
}

impl Default for KeychainCredentialsProvider {
    fn default() -> Self {
        Self { service: KEYRING_SERVICE.to_string() }
    }
}

impl KeychainCredentialsProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialsProvider for KeychainCredentialsProvider {
    fn store(&self, key: &str, value: &str) -> Result<(), CropGuardError> {
        Entry::new(&self.service, key)?.set_password(value).map_err(|e| {
            CropGuardError::keyring(e.to_string(), Some("Grant Crop Guard access to the keychain"))
        })?;
        tracing::debug!(key = key, "Credential stored in keychain");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CropGuardError> {
        match Entry::new(&self.service, key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CropGuardError::keyring(
                e.to_string(),
                Some("Grant Crop Guard access to the keychain"),
            )),
        }
    }

    fn delete(&self, key: &str) -> Result<(), CropGuardError> {
        match Entry::new(&self.service, key)?.delete_credential() {
            Ok(()) => {
                tracing::debug!(key = key, "Credential deleted from keychain");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CropGuardError::keyring(e.to_string(), None)),
        }
    }

    fn name(&self) -> &'static str {
        "KeychainCredentialsProvider"
    }
}

// ============================================================================
// SessionCredentialsProvider (Fallback)
// ============================================================================

/// In-memory storage used when neither file nor keychain is available.
///
/// Keys are lost when the process exits.
#[derive(Debug, Default)]
pub struct SessionCredentialsProvider {
    store: RwLock<HashMap<String, String>>,
}

impl SessionCredentialsProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialsProvider for SessionCredentialsProvider {
    fn store(&self, key: &str, value: &str) -> Result<(), CropGuardError> {
        self.store.write().insert(key.to_string(), value.to_string());
        tracing::debug!(key = key, "Credential stored in session");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CropGuardError> {
        Ok(self.store.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CropGuardError> {
        self.store.write().remove(key);
        tracing::debug!(key = key, "Credential deleted from session");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SessionCredentialsProvider"
    }
}

// ============================================================================
// CredentialService
// ============================================================================

fn select_provider() -> Box<dyn CredentialsProvider> {
    let force_keychain = std::env::var(FORCE_KEYCHAIN_ENV).map(|v| v == "1").unwrap_or(false);

    #[cfg(debug_assertions)]
    {
        if force_keychain {
            tracing::debug!(
                provider = "KeychainCredentialsProvider",
                reason = "CROPGUARD_USE_KEYCHAIN=1",
                "Using keychain provider (override)"
            );
            return Box::new(KeychainCredentialsProvider::new());
        }

        match FileCredentialsProvider::new() {
            Ok(provider) => {
                tracing::debug!(
                    provider = "FileCredentialsProvider",
                    reason = "debug build",
                    "Using file-based credential storage"
                );
                Box::new(provider)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create file provider, falling back to session");
                Box::new(SessionCredentialsProvider::new())
            }
        }
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = force_keychain;
        tracing::debug!(
            provider = "KeychainCredentialsProvider",
            reason = "release build",
            "Using keychain credential storage"
        );
        Box::new(KeychainCredentialsProvider::new())
    }
}

/// API key storage for external services.
///
/// Keys are never logged; only the service name appears in traces.
pub struct CredentialService {
    provider: Box<dyn CredentialsProvider>,
}

impl CredentialService {
    /// Create a service with the provider appropriate for this build.
    pub fn new() -> Self {
        Self::with_provider(select_provider())
    }

    /// Create a service with an explicit provider.
    pub fn with_provider(provider: Box<dyn CredentialsProvider>) -> Self {
        tracing::info!(provider = provider.name(), "Credential service initialized");
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn key(service: &str) -> String {
        format!("api:{service}")
    }

    /// Store an API key for `service`.
    pub fn store_api_key(&self, service: &str, api_key: &str) -> Result<(), CropGuardError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CropGuardError::missing_api_key(service));
        }
        self.provider.store(&Self::key(service), api_key)?;
        tracing::debug!(service = service, "API key stored");
        Ok(())
    }

    /// API key for `service`: the environment override first, then the provider.
    pub fn get_api_key(&self, service: &str) -> Result<Option<String>, CropGuardError> {
        if let Ok(value) = std::env::var(api_key_env(service)) {
            if !value.trim().is_empty() {
                return Ok(Some(value.trim().to_string()));
            }
        }
        self.provider.get(&Self::key(service))
    }

    /// API key for `service`, or a missing-key error.
    pub fn require_api_key(&self, service: &str) -> Result<String, CropGuardError> {
        self.get_api_key(service)?.ok_or_else(|| CropGuardError::missing_api_key(service))
    }

    /// Delete the stored API key for `service`.
    pub fn delete_api_key(&self, service: &str) -> Result<(), CropGuardError> {
        self.provider.delete(&Self::key(service))?;
        tracing::debug!(service = service, "API key deleted");
        Ok(())
    }

    pub fn has_api_key(&self, service: &str) -> Result<bool, CropGuardError> {
        Ok(self.get_api_key(service)?.is_some())
    }
}

impl Default for CredentialService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService").field("provider", &self.provider.name()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
