//! Rows of the record table.

use serde::{Deserialize, Serialize};

pub type RecordId = u64;

/// One daemon start. The storage check only needs the table to be
/// readable; the journal gives it real rows to read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    /// Unix timestamp (seconds).
    pub created_at: u64,
}
