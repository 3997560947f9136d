//! Presence Core - records, storage backends and store selection
//!
//! A presence record is a name paired with an online/offline line status.
//! This crate owns the record model and every way of keeping records:
//!
//! - **Durable store** (`storage::SqliteStore`): one SQLite file, WAL mode,
//!   auto-incrementing ids that are never reused.
//! - **Stand-in store** (`storage::MemoryStore`): process-local, lost on
//!   restart, for hosts without a writable filesystem.
//! - **Selector** (`selector`): picks one of the two once at startup and
//!   hands back a `dyn PresenceStore`.
//!
//! # Quick Start
//!
//! ```
//! use presence_core::storage::{MemoryStore, PresenceStore};
//! use presence_core::{LineStatus, NewPresence};
//!
//! let store = MemoryStore::new();
//! let alice = store
//!     .create(NewPresence::new("Alice", LineStatus::Offline).unwrap())
//!     .unwrap();
//!
//! assert_eq!(alice.id, 1);
//! assert_eq!(store.get(alice.id).unwrap().unwrap().name, "Alice");
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod error;
pub mod record;
pub mod seed;
pub mod selector;
pub mod storage;

pub use error::{Result, StoreError, ValidationError};
pub use record::{LineStatus, NewPresence, PresencePatch, PresenceRecord, RecordId};
pub use seed::seed_sample_data;
pub use selector::{select_store, StoreBackend, StoreSettings};
pub use storage::{MemoryStore, PresenceStore, SqliteStore};

/// Default location of the durable database file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "./sqlite/dev.sqlite";
