//! Navigator implementation

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{wrap_index, LabelOutcome, ResumePoint, RowView};
use crate::annotator::Annotator;
use crate::error::LabelError;
use crate::label::Label;
use crate::store::TableStore;
use crate::table::Table;

/// Decides which row an annotator sees and writes labels through to the store
///
/// Every mutating call is a read-modify-write of the whole table. Two callers
/// that read before either writes will race: the second write replaces the
/// first one's table, including cells it never touched.
#[derive(Clone)]
pub struct Navigator {
    store: Arc<dyn TableStore>,
}

impl Navigator {
    /// Create a navigator over a table store
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Read the current table
    pub fn current_table(&self) -> Result<Table, LabelError> {
        self.store.read()?.ok_or(LabelError::NoTableLoaded)
    }

    /// Read the current table, rejecting one without rows
    fn navigable_table(&self) -> Result<Table, LabelError> {
        let table = self.current_table()?;
        ensure_rows(&table)?;
        Ok(table)
    }

    /// Resume point for an annotator against the stored table
    pub fn resume(&self, annotator: Annotator) -> Result<ResumePoint, LabelError> {
        let table = self.navigable_table()?;
        Self::resume_index(&table, annotator)
    }

    /// First unlabeled row, or `Complete` when there is none
    pub fn resume_index(table: &Table, annotator: Annotator) -> Result<ResumePoint, LabelError> {
        ensure_rows(table)?;
        Ok(match table.first_unlabeled(annotator) {
            Some(row) => ResumePoint::Row(row),
            None => ResumePoint::Complete,
        })
    }

    /// First unlabeled row, falling back to row 0 for a complete table
    ///
    /// Used where the completion check is deliberately bypassed, e.g. when an
    /// annotator who has finished starts over from the beginning.
    pub fn fallback_row(table: &Table, annotator: Annotator) -> usize {
        table.first_unlabeled(annotator).unwrap_or(0)
    }

    /// Resolve a requested 1-based row number
    ///
    /// An explicit request is wrapped into range and never re-checked for
    /// completeness. Without one, the annotator resumes at the first unlabeled
    /// row or lands on `Complete`.
    pub fn locate(
        table: &Table,
        annotator: Annotator,
        requested: Option<i64>,
    ) -> Result<ResumePoint, LabelError> {
        ensure_rows(table)?;
        match requested {
            Some(number) => Ok(ResumePoint::Row(wrap_index(number.saturating_sub(1), table.len()))),
            None => Self::resume_index(table, annotator),
        }
    }

    /// Open the row an annotator asked for; `None` means show the completion view
    pub fn open(&self, annotator: Annotator, requested: Option<i64>) -> Result<Option<RowView>, LabelError> {
        let table = self.navigable_table()?;
        let view = match Self::locate(&table, annotator, requested)? {
            ResumePoint::Row(row) => Some(Self::row_view(&table, annotator, row)),
            ResumePoint::Complete => None,
        };
        debug!("Annotator {} opened {:?}", annotator, view.as_ref().map(|v| v.index));
        Ok(view)
    }

    /// Build the display data for one row; the index wraps into range
    pub fn row_view(table: &Table, annotator: Annotator, index: usize) -> RowView {
        let n = table.len();
        let index = wrap_index(index as i64, n);
        RowView {
            index,
            text: table.text(index).unwrap_or_default().to_string(),
            current_label: table.label(index, annotator).unwrap_or_default().trim().to_string(),
            completion: table.completion(annotator),
            prev: wrap_index(index as i64 - 1, n),
            next: wrap_index(index as i64 + 1, n),
        }
    }

    /// Label a row with one of the fixed keys and persist the table
    pub fn set_label(&self, annotator: Annotator, row: i64, key: &str) -> Result<LabelOutcome, LabelError> {
        let label = key.parse::<Label>().map_err(|e| {
            warn!("Rejected label {:?} from annotator {}", key, annotator);
            e
        })?;
        let mut table = self.navigable_table()?;
        self.apply_label(&mut table, annotator, row, label)
    }

    /// Remove the label from a row and persist the table
    pub fn clear_label(&self, annotator: Annotator, row: i64) -> Result<LabelOutcome, LabelError> {
        let mut table = self.navigable_table()?;
        self.apply_clear(&mut table, annotator, row)
    }

    /// Write a label into a table the caller already read, then persist it
    ///
    /// On a failed write the cell is restored, so `table` is left as it was.
    pub fn apply_label(
        &self,
        table: &mut Table,
        annotator: Annotator,
        row: i64,
        label: Label,
    ) -> Result<LabelOutcome, LabelError> {
        let row = self.write_cell(table, annotator, row, label.key())?;
        let completion = table.completion(annotator);
        let next = if completion.is_complete() {
            ResumePoint::Complete
        } else {
            ResumePoint::Row(wrap_index(row as i64 + 1, table.len()))
        };

        info!(
            "Annotator {} labeled row {} as '{}' ({}/{})",
            annotator, row + 1, label, completion.done, completion.total
        );

        Ok(LabelOutcome { row, completion, next })
    }

    /// Clear a label in a table the caller already read, then persist it
    ///
    /// The annotator stays on the same row.
    pub fn apply_clear(
        &self,
        table: &mut Table,
        annotator: Annotator,
        row: i64,
    ) -> Result<LabelOutcome, LabelError> {
        let row = self.write_cell(table, annotator, row, "")?;
        let completion = table.completion(annotator);

        info!(
            "Annotator {} cleared row {} ({}/{})",
            annotator, row + 1, completion.done, completion.total
        );

        Ok(LabelOutcome {
            row,
            completion,
            next: ResumePoint::Row(row),
        })
    }

    fn write_cell(
        &self,
        table: &mut Table,
        annotator: Annotator,
        row: i64,
        value: &str,
    ) -> Result<usize, LabelError> {
        ensure_rows(table)?;
        let row = wrap_index(row, table.len());
        let previous = table.label(row, annotator).unwrap_or_default().to_string();

        table.set_label(row, annotator, value);
        if let Err(e) = self.store.write(table) {
            table.set_label(row, annotator, &previous);
            return Err(e.into());
        }

        Ok(row)
    }
}

fn ensure_rows(table: &Table) -> Result<(), LabelError> {
    if table.is_empty() {
        Err(LabelError::EmptyTable)
    } else {
        Ok(())
    }
}
