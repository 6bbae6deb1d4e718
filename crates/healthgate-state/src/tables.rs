//! redb table layout.

use redb::TableDefinition;

/// JSON-encoded [`crate::Record`]s keyed by id; ids only ever grow.
pub const RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("records");
