//! Errors raised by the record store.
//!
//! redb reports each stage of a transaction with its own error type; they
//! are kept apart here so a failed storage check names the stage that broke.

use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot open record store: {0}")]
    Open(#[from] redb::DatabaseError),

    #[error("cannot begin transaction: {0}")]
    Begin(#[from] redb::TransactionError),

    #[error("cannot open record table: {0}")]
    Table(#[from] redb::TableError),

    #[error("record table I/O failed: {0}")]
    Io(#[from] redb::StorageError),

    #[error("cannot commit transaction: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("cannot encode record {id}: {source}")]
    Encode {
        id: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {id} is corrupt: {source}")]
    Corrupt {
        id: u64,
        #[source]
        source: serde_json::Error,
    },
}
