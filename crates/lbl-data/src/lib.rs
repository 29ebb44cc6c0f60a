//! Persistence for the labeling tool: the CSV-backed table store and settings

pub mod config;
pub mod schema;
pub mod store;

use lbl_core::LabelError;
use thiserror::Error;

// Re-exports
pub use config::{Settings, SettingsStore};
pub use store::{column_for, completion, CsvTableStore, parse_table, export_table};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("CSV parsing error: {0}")]
    Csv(String),
    
    #[error("Settings error: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error(transparent)]
    Label(#[from] LabelError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for DataError {
    fn from(error: tempfile::PersistError) -> Self {
        DataError::Io(error.error)
    }
}
