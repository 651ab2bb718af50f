// Persisted dataset: the CSV store, its row model and the dedup ledger.

pub mod csv;
pub mod ledger;
pub mod models;

pub use self::csv::{decode_row, CsvStore, RawTable, StoreError};
pub use self::ledger::DedupLedger;
pub use self::models::{format_score, ColumnIndex, PostRecord, COLUMNS, TIMESTAMP_FORMAT};
