// Append-only CSV store.
//
// Every field is quoted. Appends open the file, write one row (plus the
// header when the file is new or empty), flush and sync before returning, so
// a row that was reported as written survives a crash of the process.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, QuoteStyle, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use tracing::{debug, warn};

use super::models::{ColumnIndex, PostRecord, COLUMNS, ID_COLUMN, REQUIRED_COLUMNS};

/// Failures callers branch on. Everything else travels as `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store not found: {0}")]
    NotFound(PathBuf),

    #[error("store {path} is missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("no data in store {0}")]
    Empty(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A raw view of the store: header plus every row as stored bytes. Rows are
/// never decoded here, so a row with invalid UTF-8 survives a rewrite.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: StringRecord,
    pub rows: Vec<ByteRecord>,
}

/// Handle to the CSV file backing the dataset. Holds no open file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create (or truncate) the store so it holds only the header row.
    pub fn reset(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut writer = quoted_writer(file);
        writer.write_record(COLUMNS)?;
        finish(writer)?;
        debug!(path = %self.path.display(), "Store reset to header only");
        Ok(())
    }

    /// Durably append one record.
    pub fn append(&self, record: &PostRecord) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = quoted_writer(file);
        if needs_header {
            writer.write_record(COLUMNS)?;
        }
        writer.write_record(&record.to_row())?;
        finish(writer)
    }

    /// Every non-empty `Post_ID` in file order.
    pub fn read_ids(&self) -> Result<Vec<String>, StoreError> {
        let table = self.read_raw()?;
        let columns = ColumnIndex::new(&table.headers);
        let Some(position) = columns.position(ID_COLUMN) else {
            return Err(StoreError::MissingColumns {
                path: self.path.clone(),
                columns: vec![ID_COLUMN.to_string()],
            });
        };

        Ok(table
            .rows
            .iter()
            .filter_map(|row| row.get(position))
            .map(|id| String::from_utf8_lossy(id).trim().to_string())
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// All records, for reporting. Fails when the store is missing, lacks a
    /// required column, or has no rows.
    pub fn read_records(&self) -> Result<Vec<PostRecord>, StoreError> {
        let table = self.read_raw()?;
        let columns = ColumnIndex::new(&table.headers);

        let missing = columns.missing(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(StoreError::MissingColumns {
                path: self.path.clone(),
                columns: missing,
            });
        }
        if table.rows.is_empty() {
            return Err(StoreError::Empty(self.path.clone()));
        }

        Ok(table
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| PostRecord::from_row(&columns, &decode_row(i, row)))
            .collect())
    }

    /// Header and rows as stored. Any read failure fails the whole read, so
    /// nothing downstream works from a partial table.
    pub fn read_raw(&self) -> Result<RawTable, StoreError> {
        if !self.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let rows = reader.byte_records().collect::<Result<Vec<_>, _>>()?;

        Ok(RawTable { headers, rows })
    }

    /// Write `table` to a sibling temp file, sync it, then rename it over the
    /// store. Readers see either the old file or the new one.
    pub fn replace(&self, table: &RawTable) -> Result<(), StoreError> {
        let tmp = self.sibling_with_suffix(".tmp");
        let file = File::create(&tmp)?;
        let mut writer = quoted_writer(file);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_byte_record(row)?;
        }
        if let Err(e) = finish(writer) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// `<store><suffix>` in the same directory.
    pub fn sibling_with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Text view of a stored row. Invalid UTF-8 is replaced rather than dropped.
pub fn decode_row(index: usize, row: ByteRecord) -> StringRecord {
    StringRecord::from_byte_record(row).unwrap_or_else(|e| {
        warn!(row = index + 1, "Store row is not valid UTF-8, decoding lossily");
        StringRecord::from_byte_record_lossy(e.into_byte_record())
    })
}

fn quoted_writer(file: File) -> Writer<File> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .from_writer(file)
}

/// Flush the writer and sync the file to disk.
fn finish(writer: Writer<File>) -> Result<(), StoreError> {
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_data()?;
    Ok(())
}
