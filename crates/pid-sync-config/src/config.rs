// crates/pid-sync-config/src/config.rs
// ============================================================================
// Module: PID Sync Configuration
// Description: Configuration loading and validation for pid-sync.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pid-sync-core, pid-sync-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `PID_SYNC_CONFIG`, then
//! `pid-sync.toml` in the working directory. Missing or invalid configuration
//! fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pid_sync_core::PidPrefix;
use pid_sync_store_sqlite::SqliteStoreConfig;
use pid_sync_store_sqlite::SqliteStoreMode;
use pid_sync_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "pid-sync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PID_SYNC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default fixed identity for download repair.
pub(crate) const DEFAULT_DOWNLOAD_IDENTITY: &str = "download-service";
/// Maximum identity name length.
pub(crate) const MAX_IDENTITY_LENGTH: usize = 128;
/// Default registrar request timeout in milliseconds.
pub(crate) const DEFAULT_REGISTRAR_TIMEOUT_MS: u64 = 5_000;
/// Minimum registrar request timeout in milliseconds.
pub(crate) const MIN_REGISTRAR_TIMEOUT_MS: u64 = 100;
/// Maximum registrar request timeout in milliseconds.
pub(crate) const MAX_REGISTRAR_TIMEOUT_MS: u64 = 60_000;
/// Default maximum registrar response size in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Maximum allowed registrar response size in bytes.
pub(crate) const MAX_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum user agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;
/// Default `SQLite` busy timeout in milliseconds.
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default repair journal path.
pub(crate) const DEFAULT_REPAIR_JOURNAL: &str = "pid-sync-repairs.jsonl";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level pid-sync configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidSyncConfig {
    /// Local registry namespace configuration.
    pub registry: RegistryConfig,
    /// External registrar configuration.
    pub registrar: RegistrarConfig,
    /// Local store configuration.
    pub store: StoreConfig,
    /// Repair journal configuration.
    #[serde(default)]
    pub repair: RepairConfig,
    /// Metadata export configuration.
    #[serde(default)]
    pub export: ExportConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl PidSyncConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.registrar.validate()?;
        self.store.validate()?;
        self.repair.validate()?;
        self.export.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the self-minted prefix as a validated value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the prefix is invalid.
    pub fn local_prefix(&self) -> Result<PidPrefix, ConfigError> {
        self.registry.local_prefix()
    }

    /// Returns the `SQLite` store configuration.
    #[must_use]
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.store.path.clone(),
            busy_timeout_ms: self.store.busy_timeout_ms,
            journal_mode: self.store.journal_mode,
            sync_mode: self.store.sync_mode,
        }
    }
}

/// Local registry namespace configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Namespace prefix this system mints PIDs under.
    pub prefix: String,
    /// Fixed identity used when replaying download state changes.
    #[serde(default = "default_download_identity")]
    pub download_identity: String,
}

impl RegistryConfig {
    /// Parses the configured prefix.
    fn local_prefix(&self) -> Result<PidPrefix, ConfigError> {
        PidPrefix::parse(&self.prefix)
            .map_err(|err| ConfigError::Invalid(format!("registry.prefix is invalid: {err}")))
    }

    /// Validates registry configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.local_prefix()?;
        let identity = self.download_identity.trim();
        if identity.is_empty() {
            return Err(ConfigError::Invalid(
                "registry.download_identity must be non-empty".to_string(),
            ));
        }
        if identity.len() > MAX_IDENTITY_LENGTH {
            return Err(ConfigError::Invalid(
                "registry.download_identity exceeds max length".to_string(),
            ));
        }
        Ok(())
    }
}

/// External registrar configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrarConfig {
    /// Base URL of the registrar REST API.
    pub api_url: String,
    /// Allow cleartext HTTP (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_registrar_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent sent with registrar requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Optional basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
}

impl RegistrarConfig {
    /// Validates registrar configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.api_url.trim();
        if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "registrar.api_url must include http:// or https://".to_string(),
            ));
        }
        if trimmed.starts_with("http://") && !self.allow_http {
            return Err(ConfigError::Invalid(
                "registrar.api_url uses http:// without allow_http".to_string(),
            ));
        }
        if !(MIN_REGISTRAR_TIMEOUT_MS ..= MAX_REGISTRAR_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "registrar.timeout_ms must be between {MIN_REGISTRAR_TIMEOUT_MS} and \
                 {MAX_REGISTRAR_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(
                "registrar.max_response_bytes out of range".to_string(),
            ));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() || agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid("registrar.user_agent length out of range".to_string()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Invalid(
                "registrar.password requires registrar.username".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_config_path("store.path", &self.path)
    }
}

/// Repair journal configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepairConfig {
    /// Journal file receiving replay requests.
    #[serde(default = "default_repair_journal")]
    pub journal_path: PathBuf,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            journal_path: default_repair_journal(),
        }
    }
}

impl RepairConfig {
    /// Validates repair configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_config_path("repair.journal_path", &self.journal_path)
    }
}

/// Metadata export configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory exported documents are written into.
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

impl ExportConfig {
    /// Validates export configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_config_path("export.directory", &self.directory)
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink type.
    #[serde(default)]
    pub sink: AuditSinkType,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, Some(path)) => validate_config_path("audit.path", path),
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field against length constraints.
fn validate_config_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default download repair identity.
fn default_download_identity() -> String {
    DEFAULT_DOWNLOAD_IDENTITY.to_string()
}

/// Default registrar timeout.
const fn default_registrar_timeout_ms() -> u64 {
    DEFAULT_REGISTRAR_TIMEOUT_MS
}

/// Default registrar response limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default registrar user agent.
fn default_user_agent() -> String {
    concat!("pid-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Default store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Default repair journal path.
fn default_repair_journal() -> PathBuf {
    PathBuf::from(DEFAULT_REPAIR_JOURNAL)
}

/// Default export directory.
fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}
