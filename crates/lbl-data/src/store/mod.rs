pub mod csv_store;

pub use csv_store::{CsvTableStore, decode_text, export_table, parse_table};

use lbl_core::{Annotator, Completion, LabelError, Table};

/// Column written by an annotator number
pub fn column_for(number: i64) -> Result<&'static str, LabelError> {
    Ok(Annotator::from_number(number)?.column_name())
}

/// Labeling progress of an annotator in a table
pub fn completion(table: &Table, annotator: Annotator) -> Completion {
    table.completion(annotator)
}
