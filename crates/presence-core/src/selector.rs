//! Store selection
//!
//! The backend is decided once, at startup, from configuration. The
//! decision is never revisited per request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::storage::{MemoryStore, PresenceStore, SqliteStore};
use crate::DEFAULT_DATABASE_PATH;

/// Which store implementation backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Durable SQLite file
    Sqlite,
    /// Process-local stand-in
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        }
    }

    /// Resolve the backend from the deployment environment.
    ///
    /// An explicit `store` value wins. Otherwise a `platform_flag` of `"1"`
    /// (a host that offers no writable filesystem) selects the memory store.
    /// `None` means the environment expresses no preference.
    pub fn from_environment(
        store: Option<&str>,
        platform_flag: Option<&str>,
    ) -> Result<Option<Self>> {
        if let Some(value) = store {
            return value.parse().map(Some);
        }
        if platform_flag == Some("1") {
            return Ok(Some(StoreBackend::Memory));
        }
        Ok(None)
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(StoreError::UnknownBackend(s.to_string())),
        }
    }
}

/// Store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,

    /// Database file, used by the SQLite backend
    pub database_path: PathBuf,

    /// Fall back to the memory store when the database cannot be opened
    pub allow_memory_fallback: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            allow_memory_fallback: false,
        }
    }
}

/// Build the store described by `settings` and bring its schema up to date.
///
/// Migration runs here and only here, so callers get a ready store or an error.
pub fn select_store(settings: &StoreSettings) -> Result<Arc<dyn PresenceStore>> {
    match settings.backend {
        StoreBackend::Memory => {
            info!("Using in-memory presence store; records will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite => match open_sqlite(settings) {
            Ok(store) => Ok(store),
            Err(e) if settings.allow_memory_fallback => {
                warn!(
                    "SQLite store at {} unavailable ({}), falling back to in-memory store",
                    settings.database_path.display(),
                    e
                );
                Ok(Arc::new(MemoryStore::new()))
            }
            Err(e) => Err(e),
        },
    }
}

fn open_sqlite(settings: &StoreSettings) -> Result<Arc<dyn PresenceStore>> {
    let store = SqliteStore::open(&settings.database_path)?;
    store.migrate()?;
    info!(
        "Using SQLite presence store at {}",
        settings.database_path.display()
    );
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LineStatus, NewPresence};

    #[test]
    fn test_backend_from_environment() {
        assert_eq!(StoreBackend::from_environment(None, None).unwrap(), None);
        assert_eq!(
            StoreBackend::from_environment(None, Some("1")).unwrap(),
            Some(StoreBackend::Memory)
        );
        assert_eq!(StoreBackend::from_environment(None, Some("0")).unwrap(), None);
        // Explicit choice beats the platform flag
        assert_eq!(
            StoreBackend::from_environment(Some("sqlite"), Some("1")).unwrap(),
            Some(StoreBackend::Sqlite)
        );
        assert!(StoreBackend::from_environment(Some("postgres"), None).is_err());
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn test_select_memory() {
        let settings = StoreSettings {
            backend: StoreBackend::Memory,
            ..StoreSettings::default()
        };
        let store = select_store(&settings).unwrap();
        assert_eq!(store.backend(), StoreBackend::Memory);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_select_sqlite_migrates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StoreSettings {
            database_path: dir.path().join("sqlite").join("dev.sqlite"),
            ..StoreSettings::default()
        };

        let store = select_store(&settings).unwrap();
        assert_eq!(store.backend(), StoreBackend::Sqlite);
        store
            .create(NewPresence::new("Alice", LineStatus::Online).unwrap())
            .unwrap();
        drop(store);

        // A second startup re-runs migration without touching existing rows
        let store = select_store(&settings).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(settings.database_path.exists());
    }

    #[test]
    fn test_select_sqlite_fallback() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        let mut settings = StoreSettings {
            database_path: dir.path().to_path_buf(),
            ..StoreSettings::default()
        };
        assert!(select_store(&settings).is_err());

        settings.allow_memory_fallback = true;
        let store = select_store(&settings).unwrap();
        assert_eq!(store.backend(), StoreBackend::Memory);
    }
}
