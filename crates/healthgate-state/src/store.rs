//! StateStore: the startup journal behind the readiness storage check.
//!
//! Every daemon start appends one [`Record`]; the storage check reads the
//! whole table back. Records are JSON in redb's `&[u8]` value column, keyed
//! by a `u64` id so table order is start order.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::RECORDS;
use crate::types::Record;

/// Thread-safe record store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let store = Self::with_database(Database::create(path)?)?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        Self::with_database(Database::builder().create_with_backend(backend)?)
    }

    fn with_database(db: Database) -> StateResult<Self> {
        let txn = db.begin_write()?;
        txn.open_table(RECORDS)?;
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Append a record under the next free id and return it.
    pub fn append_record(&self, name: &str, created_at: u64) -> StateResult<Record> {
        let txn = self.db.begin_write()?;
        let record = {
            let mut table = txn.open_table(RECORDS)?;
            let id = match table.last()? {
                Some((last, _)) => last.value() + 1,
                None => 1,
            };
            let record = Record {
                id,
                name: name.to_string(),
                created_at,
            };
            let value =
                serde_json::to_vec(&record).map_err(|source| StateError::Encode { id, source })?;
            table.insert(id, value.as_slice())?;
            record
        };
        txn.commit()?;
        debug!(id = record.id, name = %record.name, "record appended");
        Ok(record)
    }

    /// Read every record, oldest first.
    pub fn list_records(&self) -> StateResult<Vec<Record>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(RECORDS)?;
        table
            .iter()?
            .map(|entry| -> StateResult<Record> {
                let (key, value) = entry?;
                serde_json::from_slice(value.value()).map_err(|source| StateError::Corrupt {
                    id: key.value(),
                    source,
                })
            })
            .collect()
    }
}
