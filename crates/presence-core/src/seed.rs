//! Sample data for a fresh store

use tracing::info;

use crate::error::Result;
use crate::record::{LineStatus, NewPresence};
use crate::storage::PresenceStore;

const SAMPLE_RECORDS: [(&str, LineStatus); 3] = [
    ("Student 12345678", LineStatus::Online),
    ("La Trobe University", LineStatus::Offline),
    ("CSE3CWA/CSE5006", LineStatus::Online),
];

/// Insert the sample records if, and only if, the store is empty.
///
/// Returns how many records were inserted.
pub fn seed_sample_data(store: &dyn PresenceStore) -> Result<usize> {
    let existing = store.count()?;
    if existing > 0 {
        info!("Store already has {} records, skipping sample data", existing);
        return Ok(0);
    }

    let mut inserted = 0;
    for (name, status) in SAMPLE_RECORDS {
        // Sample names are non-empty constants
        if let Ok(new) = NewPresence::new(name, status) {
            store.create(new)?;
            inserted += 1;
        }
    }

    info!("Seeded {} sample records", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    #[test]
    fn test_seed_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(seed_sample_data(&store).unwrap(), 3);

        let records = store.list().unwrap();
        assert_eq!(records[0].name, "Student 12345678");
        assert_eq!(records[1].status, LineStatus::Offline);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();

        seed_sample_data(&store).unwrap();
        assert_eq!(seed_sample_data(&store).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 3);
    }
}
