//! Column normalization applied to every table read from CSV

use ahash::AHashSet;
use lbl_core::annotator::{ANNOTATOR_COLUMNS, FIFTH_ANNOTATOR_COLUMN};
use lbl_core::{LabelError, Table, TEXT_COLUMN};
use tracing::{debug, warn};

use crate::DataError;

/// Spellings of the fifth annotator column accepted on input, in priority order
pub const FIFTH_ANNOTATOR_ALIASES: [&str; 5] = ["coder_5", "_coder5", "coder5", "Coder_5", "Coder5"];

/// Normalize raw headers and rows into a table
///
/// - Trims whitespace around header names
/// - Renames the first alias of the fifth annotator column if the canonical
///   name is absent
/// - Requires a `text` column
/// - Appends missing annotator columns and pads short rows with empty strings
pub fn normalize(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table, DataError> {
    let mut headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
    canonicalize_aliases(&mut headers);
    
    if !headers.iter().any(|h| h == TEXT_COLUMN) {
        return Err(LabelError::InvalidSchema(format!("CSV must contain a '{}' column", TEXT_COLUMN)).into());
    }
    
    let mut seen = AHashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            warn!("Duplicate column '{}'; only the first one is used", header);
        }
    }
    
    let file_width = headers.len();
    for column in ANNOTATOR_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            debug!("Adding missing annotator column '{}'", column);
            headers.push(column.to_string());
        }
    }
    
    let mut padded = Vec::with_capacity(rows.len());
    for (idx, mut row) in rows.into_iter().enumerate() {
        if row.len() > file_width {
            return Err(DataError::Csv(format!(
                "row {} has {} fields, but the header has {}",
                idx + 1,
                row.len(),
                file_width
            )));
        }
        row.resize(headers.len(), String::new());
        padded.push(row);
    }
    
    Ok(Table::from_parts(headers, padded)?)
}

fn canonicalize_aliases(headers: &mut [String]) {
    for alias in FIFTH_ANNOTATOR_ALIASES {
        if headers.iter().any(|h| h == FIFTH_ANNOTATOR_COLUMN) {
            return;
        }
        if let Some(header) = headers.iter_mut().find(|h| h.as_str() == alias) {
            debug!("Renaming column '{}' to '{}'", alias, FIFTH_ANNOTATOR_COLUMN);
            *header = FIFTH_ANNOTATOR_COLUMN.to_string();
        }
    }
}
