//! Storage backends for presence records
//!
//! Both backends expose the same surface through [`PresenceStore`], so the
//! HTTP layer never knows which one is active.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              dyn PresenceStore           │
//! ├─────────────────────┬────────────────────┤
//! │     SqliteStore     │    MemoryStore     │
//! │ (presence_records,  │  (BTreeMap, lost   │
//! │  WAL, AUTOINCREMENT)│   on restart)      │
//! └─────────────────────┴────────────────────┘
//! ```

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::Result;
use crate::record::{NewPresence, PresencePatch, PresenceRecord, RecordId};
use crate::selector::StoreBackend;

/// Record storage shared by every backend.
///
/// Each mutating call is atomic on its own; no call spans more than one record.
pub trait PresenceStore: Send + Sync + std::fmt::Debug {
    /// Which backend this is
    fn backend(&self) -> StoreBackend;

    /// Ensure the schema exists. Safe to call any number of times; never
    /// drops or rewrites existing rows.
    fn migrate(&self) -> Result<()>;

    /// All records in ascending id (creation) order
    fn list(&self) -> Result<Vec<PresenceRecord>>;

    fn get(&self, id: RecordId) -> Result<Option<PresenceRecord>>;

    /// Insert a record, assigning a fresh id greater than any id handed out before
    fn create(&self, new: NewPresence) -> Result<PresenceRecord>;

    /// Apply a partial update. `None` when no record has `id`.
    fn save(&self, id: RecordId, patch: &PresencePatch) -> Result<Option<PresenceRecord>>;

    /// Hard delete. `false` when no record has `id`.
    fn destroy(&self, id: RecordId) -> Result<bool>;

    fn count(&self) -> Result<usize>;
}

/// Current time at the millisecond precision the durable store keeps
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
