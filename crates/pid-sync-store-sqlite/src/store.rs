// crates/pid-sync-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Local Store
// Description: Durable LocalStore backed by SQLite WAL.
// Purpose: Persist PID records and owning resources for reconciliation.
// Dependencies: pid-sync-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`LocalStore`] using `SQLite`. Rows are parsed back
//! into validated core types on every read; a stored value that no longer
//! parses (an invalid PID, an unknown status label) fails closed as
//! corruption instead of being skipped.
//!
//! Alternate identifiers of kind `doi` are stored in canonical PID form so
//! [`LocalStore::find_datasets_by_pid`] can match them with a plain equality
//! join.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use pid_sync_core::AlternateIdentifier;
use pid_sync_core::Dataset;
use pid_sync_core::Download;
use pid_sync_core::DownloadStatus;
use pid_sync_core::Identity;
use pid_sync_core::IdentifierKind;
use pid_sync_core::LocalPidRecord;
use pid_sync_core::LocalStore;
use pid_sync_core::OwnerType;
use pid_sync_core::Pid;
use pid_sync_core::PidStatus;
use pid_sync_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` local store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row no longer parses into a valid record.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed local store with WAL support.
#[derive(Clone)]
pub struct SqliteLocalStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLocalStore {
    /// Opens an `SQLite`-backed local store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Inserts or replaces a local PID record.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_record(&self, record: &LocalPidRecord) -> Result<(), SqliteStoreError> {
        self.lock()?.execute(
            "INSERT INTO pid_records (pid, owner_type, status, metadata, target) VALUES (?1, ?2, \
             ?3, ?4, ?5) ON CONFLICT(pid) DO UPDATE SET owner_type = excluded.owner_type, status \
             = excluded.status, metadata = excluded.metadata, target = excluded.target",
            params![
                record.pid.as_str(),
                record.owner_type.as_str(),
                record.status.as_str(),
                record.metadata,
                record.target
            ],
        )?;
        Ok(())
    }

    /// Inserts or replaces a dataset and its alternate identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_dataset(&self, dataset: &Dataset) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        tx.execute(
            "INSERT INTO datasets (dataset_key, current_pid) VALUES (?1, ?2) ON \
             CONFLICT(dataset_key) DO UPDATE SET current_pid = excluded.current_pid",
            params![dataset.key, dataset.current_pid.as_ref().map(Pid::as_str)],
        )?;
        tx.execute("DELETE FROM dataset_identifiers WHERE dataset_key = ?1", params![dataset.key])?;
        for identifier in &dataset.alternate_identifiers {
            tx.execute(
                "INSERT OR IGNORE INTO dataset_identifiers (dataset_key, kind, value) VALUES (?1, \
                 ?2, ?3)",
                params![dataset.key, identifier.kind.as_str(), stored_identifier_value(identifier)],
            )?;
        }
        tx.commit()?;
        drop(guard);
        Ok(())
    }

    /// Inserts or replaces a download.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails, including when
    /// another download already owns the PID.
    pub fn upsert_download(&self, download: &Download) -> Result<(), SqliteStoreError> {
        self.lock()?.execute(
            "INSERT INTO downloads (download_key, pid, status, requesting_user) VALUES (?1, ?2, \
             ?3, ?4) ON CONFLICT(download_key) DO UPDATE SET pid = excluded.pid, status = \
             excluded.status, requesting_user = excluded.requesting_user",
            params![
                download.key,
                download.pid.as_str(),
                download.status.as_str(),
                download.requesting_user
            ],
        )?;
        Ok(())
    }

    /// Inserts or replaces an identity.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_identity(&self, identity: &Identity) -> Result<(), SqliteStoreError> {
        self.lock()?.execute(
            "INSERT INTO identities (name, identity_key) VALUES (?1, ?2) ON CONFLICT(name) DO \
             UPDATE SET identity_key = excluded.identity_key",
            params![identity.name, identity.key],
        )?;
        Ok(())
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Loads the owner type indexed for `pid`.
    fn load_owner_type(&self, pid: &Pid) -> Result<Option<OwnerType>, SqliteStoreError> {
        let label: Option<String> = self
            .lock()?
            .query_row(
                "SELECT owner_type FROM pid_records WHERE pid = ?1",
                params![pid.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        label.map(|label| parse_owner_type(&label)).transpose()
    }

    /// Loads the local PID record for `pid`.
    fn load_record(&self, pid: &Pid) -> Result<Option<LocalPidRecord>, SqliteStoreError> {
        let row: Option<(String, String, Option<String>, Option<String>)> = self
            .lock()?
            .query_row(
                "SELECT owner_type, status, metadata, target FROM pid_records WHERE pid = ?1",
                params![pid.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((owner_type, status, metadata, target)) = row else {
            return Ok(None);
        };
        Ok(Some(LocalPidRecord {
            pid: pid.clone(),
            owner_type: parse_owner_type(&owner_type)?,
            status: parse_pid_status(&status)?,
            metadata,
            target,
        }))
    }

    /// Loads every dataset linked to `pid` directly or through an alternate.
    fn load_datasets(&self, pid: &Pid) -> Result<Vec<Dataset>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT DISTINCT d.dataset_key, d.current_pid FROM datasets d LEFT JOIN \
             dataset_identifiers i ON i.dataset_key = d.dataset_key AND i.kind = 'doi' WHERE \
             d.current_pid = ?1 OR i.value = ?1 ORDER BY d.dataset_key",
        )?;
        let rows = statement
            .query_map(params![pid.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(statement);

        let mut identifiers: BTreeMap<String, Vec<AlternateIdentifier>> = BTreeMap::new();
        let mut statement = guard.prepare(
            "SELECT kind, value FROM dataset_identifiers WHERE dataset_key = ?1 ORDER BY kind, \
             value",
        )?;
        for (key, _) in &rows {
            let alternates = statement
                .query_map(params![key], |row| {
                    Ok(AlternateIdentifier {
                        kind: IdentifierKind::parse(&row.get::<_, String>(0)?),
                        value: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            identifiers.insert(key.clone(), alternates);
        }
        drop(statement);
        drop(guard);

        rows.into_iter()
            .map(|(key, current_pid)| {
                let current_pid = current_pid.as_deref().map(parse_pid).transpose()?;
                let alternate_identifiers = identifiers.remove(&key).unwrap_or_default();
                Ok(Dataset {
                    key,
                    current_pid,
                    alternate_identifiers,
                })
            })
            .collect()
    }

    /// Loads the download owning `pid`.
    fn load_download(&self, pid: &Pid) -> Result<Option<Download>, SqliteStoreError> {
        let row: Option<(String, String, String)> = self
            .lock()?
            .query_row(
                "SELECT download_key, status, requesting_user FROM downloads WHERE pid = ?1",
                params![pid.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let Some((key, status, requesting_user)) = row else {
            return Ok(None);
        };
        let status = DownloadStatus::parse(&status).ok_or_else(|| {
            SqliteStoreError::Corrupt(format!("unknown download status: {status}"))
        })?;
        Ok(Some(Download {
            key,
            pid: pid.clone(),
            status,
            requesting_user,
        }))
    }

    /// Lists failed PIDs of `owner_type`.
    fn load_failed(&self, owner_type: OwnerType) -> Result<Vec<Pid>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT pid FROM pid_records WHERE owner_type = ?1 AND status = ?2 ORDER BY pid",
        )?;
        let values = statement
            .query_map(params![owner_type.as_str(), PidStatus::Failed.as_str()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(statement);
        drop(guard);
        values.iter().map(|value| parse_pid(value)).collect()
    }

    /// Loads an identity by name.
    fn load_identity(&self, name: &str) -> Result<Option<Identity>, SqliteStoreError> {
        let key: Option<String> = self
            .lock()?
            .query_row(
                "SELECT identity_key FROM identities WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(key.map(|key| Identity {
            name: name.to_string(),
            key,
        }))
    }
}

impl LocalStore for SqliteLocalStore {
    fn find_owner_type(&self, pid: &Pid) -> Result<Option<OwnerType>, StoreError> {
        self.load_owner_type(pid).map_err(StoreError::from)
    }

    fn get_local_record(&self, pid: &Pid) -> Result<Option<LocalPidRecord>, StoreError> {
        self.load_record(pid).map_err(StoreError::from)
    }

    fn find_datasets_by_pid(&self, pid: &Pid) -> Result<Vec<Dataset>, StoreError> {
        self.load_datasets(pid).map_err(StoreError::from)
    }

    fn find_download_by_pid(&self, pid: &Pid) -> Result<Option<Download>, StoreError> {
        self.load_download(pid).map_err(StoreError::from)
    }

    fn list_failed(&self, owner_type: OwnerType) -> Result<Vec<Pid>, StoreError> {
        self.load_failed(owner_type).map_err(StoreError::from)
    }

    fn resolve_identity(&self, name: &str) -> Result<Option<Identity>, StoreError> {
        self.load_identity(name).map_err(StoreError::from)
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Returns the stored form of an alternate identifier value.
fn stored_identifier_value(identifier: &AlternateIdentifier) -> String {
    if identifier.kind == IdentifierKind::Doi
        && let Ok(pid) = Pid::parse(&identifier.value)
    {
        return pid.as_str().to_string();
    }
    identifier.value.clone()
}

/// Parses a stored PID.
fn parse_pid(value: &str) -> Result<Pid, SqliteStoreError> {
    Pid::parse(value).map_err(|err| SqliteStoreError::Corrupt(format!("stored pid {value}: {err}")))
}

/// Parses a stored owner type label.
fn parse_owner_type(label: &str) -> Result<OwnerType, SqliteStoreError> {
    OwnerType::parse(label)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("unknown owner type: {label}")))
}

/// Parses a stored PID status label.
fn parse_pid_status(label: &str) -> Result<PidStatus, SqliteStoreError> {
    PidStatus::parse(label)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("unknown pid status: {label}")))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS pid_records (
                    pid TEXT PRIMARY KEY,
                    owner_type TEXT NOT NULL,
                    status TEXT NOT NULL,
                    metadata TEXT,
                    target TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_pid_records_status
                    ON pid_records (owner_type, status);
                CREATE TABLE IF NOT EXISTS datasets (
                    dataset_key TEXT PRIMARY KEY,
                    current_pid TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_datasets_current_pid
                    ON datasets (current_pid);
                CREATE TABLE IF NOT EXISTS dataset_identifiers (
                    dataset_key TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    value TEXT NOT NULL,
                    PRIMARY KEY (dataset_key, kind, value),
                    FOREIGN KEY (dataset_key) REFERENCES datasets(dataset_key) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_dataset_identifiers_value
                    ON dataset_identifiers (kind, value);
                CREATE TABLE IF NOT EXISTS downloads (
                    download_key TEXT PRIMARY KEY,
                    pid TEXT NOT NULL UNIQUE,
                    status TEXT NOT NULL,
                    requesting_user TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS identities (
                    name TEXT PRIMARY KEY,
                    identity_key TEXT NOT NULL
                );",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}
