//! Table store backed by a single CSV file

use std::borrow::Cow;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use lbl_core::{Table, TableStore};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::schema;
use crate::DataError;

/// File name of the current table inside the data directory
pub const CURRENT_TABLE_FILE: &str = "current.csv";

/// CSV table store
///
/// One mutex guards the backing file. Every read and every write of the
/// whole table takes it, so at most one caller touches the file at a time.
/// The lock is intentionally coarse: it serializes I/O but gives no
/// isolation to read-modify-write sequences built on top of it.
pub struct CsvTableStore {
    /// Path to the CSV file, guarded by the store lock
    file: Mutex<PathBuf>,
}

impl CsvTableStore {
    /// Create a store for the given file path; nothing is touched on disk yet
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Mutex::new(path),
        }
    }
    
    /// Create a store for `current.csv` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CURRENT_TABLE_FILE))
    }
    
    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        self.file.lock().clone()
    }
    
    /// Whether a table has been loaded
    pub fn has_table(&self) -> bool {
        self.file.lock().exists()
    }
    
    /// Parse uploaded bytes and make them the current table
    ///
    /// Nothing is written if the upload is rejected, so a previously loaded
    /// table stays readable.
    pub fn load(&self, raw: &[u8]) -> Result<Table, DataError> {
        let table = parse_table(raw)?;
        self.write(&table)?;
        info!(
            "Loaded table with {} rows and {} columns",
            table.len(),
            table.column_count()
        );
        Ok(table)
    }
    
    /// Read the current table, or `None` if none has been loaded
    pub fn read(&self) -> Result<Option<Table>, DataError> {
        let bytes = {
            let path = self.file.lock();
            match fs::read(&*path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        };
        
        let table = parse_table(&bytes)?;
        debug!("Read table with {} rows", table.len());
        Ok(Some(table))
    }
    
    /// Replace the stored table
    ///
    /// The new contents go to a temporary file in the same directory that is
    /// then renamed over the old one.
    pub fn write(&self, table: &Table) -> Result<(), DataError> {
        let bytes = export_table(table)?;
        
        let path = self.file.lock();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&*path)?;
        
        debug!("Wrote {} bytes to {:?}", bytes.len(), *path);
        Ok(())
    }
}

impl TableStore for CsvTableStore {
    fn read(&self) -> anyhow::Result<Option<Table>> {
        Ok(CsvTableStore::read(self)?)
    }
    
    fn write(&self, table: &Table) -> anyhow::Result<()> {
        Ok(CsvTableStore::write(self, table)?)
    }
}

/// Decode uploaded bytes as UTF-8 (dropping a byte order mark), falling back to Latin-1
pub fn decode_text(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(raw.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Parse CSV bytes with a header row into a normalized table
pub fn parse_table(raw: &[u8]) -> Result<Table, DataError> {
    let text = decode_text(raw);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    
    let headers = reader.headers()?.iter().map(String::from).collect();
    
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(String::from).collect());
    }
    
    schema::normalize(headers, rows)
}

/// Serialize a table to UTF-8 CSV with a header row
pub fn export_table(table: &Table) -> Result<Vec<u8>, DataError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DataError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
}
