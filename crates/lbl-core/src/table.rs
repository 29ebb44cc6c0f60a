//! In-memory table of rows to label

use crate::annotator::{Annotator, ANNOTATOR_COLUMNS};
use crate::error::LabelError;

/// Column holding the content shown to annotators
pub const TEXT_COLUMN: &str = "text";

/// A fully loaded table
///
/// Every row has exactly one value per header. The `text` column and all five
/// annotator columns are guaranteed to exist; their positions are resolved
/// once at construction so lookups never go through column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    text_idx: usize,
    annotator_idx: [usize; 5],
}

/// Labeling progress of one annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Rows with a non-blank label
    pub done: usize,
    /// Total rows
    pub total: usize,
}

/// Progress state of an (annotator, table) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotatorState {
    InProgress,
    Complete,
}

impl Completion {
    /// Every row is labeled and there is at least one row
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done >= self.total
    }

    /// State of the annotator; a table without rows has none
    pub fn state(&self) -> Option<AnnotatorState> {
        if self.total == 0 {
            None
        } else if self.is_complete() {
            Some(AnnotatorState::Complete)
        } else {
            Some(AnnotatorState::InProgress)
        }
    }

    /// Progress rounded to a whole percent, halves to even
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.done as f64 / self.total as f64) * 100.0;
        pct.round_ties_even().clamp(0.0, 100.0) as u8
    }
}

impl Table {
    /// Build a table from headers and rows
    ///
    /// Fails if a required column is missing or a row does not have one value
    /// per header. Duplicate header names resolve to their first occurrence.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, LabelError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let text_idx = position(TEXT_COLUMN)
            .ok_or_else(|| LabelError::InvalidSchema(format!("missing required column '{}'", TEXT_COLUMN)))?;

        let mut annotator_idx = [0usize; 5];
        for (slot, column) in annotator_idx.iter_mut().zip(ANNOTATOR_COLUMNS) {
            *slot = position(column)
                .ok_or_else(|| LabelError::InvalidSchema(format!("missing annotator column '{}'", column)))?;
        }

        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            return Err(LabelError::InvalidSchema(format!(
                "row {} has {} values, expected {}",
                row + 1,
                values.len(),
                headers.len()
            )));
        }

        Ok(Self {
            headers,
            rows,
            text_idx,
            annotator_idx,
        })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in file order, one value per header
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Value of the `text` column
    pub fn text(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|r| r[self.text_idx].as_str())
    }

    /// Raw value of an annotator's cell
    pub fn label(&self, row: usize, annotator: Annotator) -> Option<&str> {
        self.rows
            .get(row)
            .map(|r| r[self.annotator_idx[annotator.index()]].as_str())
    }

    /// Overwrite an annotator's cell
    pub fn set_label(&mut self, row: usize, annotator: Annotator, value: &str) -> Option<()> {
        let col = self.annotator_idx[annotator.index()];
        let cell = self.rows.get_mut(row)?.get_mut(col)?;
        *cell = value.to_string();
        Some(())
    }

    /// Whether a row still needs a label from this annotator
    pub fn is_unlabeled(&self, row: usize, annotator: Annotator) -> bool {
        self.label(row, annotator)
            .map(|v| v.trim().is_empty())
            .unwrap_or(false)
    }

    /// First row without a label, scanning in order
    pub fn first_unlabeled(&self, annotator: Annotator) -> Option<usize> {
        (0..self.len()).find(|&row| self.is_unlabeled(row, annotator))
    }

    /// Labeling progress for one annotator
    pub fn completion(&self, annotator: Annotator) -> Completion {
        let total = self.len();
        let unlabeled = (0..total).filter(|&row| self.is_unlabeled(row, annotator)).count();
        Completion {
            done: total - unlabeled,
            total,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Table with the full schema and the given (text, coder_1) pairs
    pub(crate) fn sample_table(rows: &[(&str, &str)]) -> Table {
        let mut headers = vec![TEXT_COLUMN.to_string()];
        headers.extend(ANNOTATOR_COLUMNS.iter().map(|c| c.to_string()));
        let rows = rows
            .iter()
            .map(|(text, label)| {
                vec![
                    text.to_string(),
                    label.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]
            })
            .collect();
        Table::from_parts(headers, rows).unwrap()
    }

    #[test]
    fn test_completion_counts_trimmed_values() {
        let table = sample_table(&[("a", ""), ("b", "help"), ("c", "   ")]);
        let first = Annotator::from_number(1).unwrap();

        assert_eq!(table.completion(first), Completion { done: 1, total: 3 });
        assert_eq!(table.first_unlabeled(first), Some(0));
        assert_eq!(table.completion(first).state(), Some(AnnotatorState::InProgress));

        let second = Annotator::from_number(2).unwrap();
        assert_eq!(table.completion(second).done, 0);
    }

    #[test]
    fn test_completion_states() {
        assert_eq!(Completion { done: 0, total: 0 }.state(), None);
        assert!(!Completion { done: 0, total: 0 }.is_complete());
        assert_eq!(Completion { done: 2, total: 2 }.state(), Some(AnnotatorState::Complete));
        assert_eq!(Completion { done: 1, total: 3 }.percent(), 33);
        assert_eq!(Completion { done: 2, total: 3 }.percent(), 67);
        assert_eq!(Completion { done: 1, total: 8 }.percent(), 12);
        assert_eq!(Completion { done: 3, total: 8 }.percent(), 38);
    }

    #[test]
    fn test_missing_columns_rejected() {
        let result = Table::from_parts(vec!["body".to_string()], vec![]);
        assert!(matches!(result, Err(LabelError::InvalidSchema(_))));

        let mut headers = vec![TEXT_COLUMN.to_string()];
        headers.extend(ANNOTATOR_COLUMNS.iter().take(4).map(|c| c.to_string()));
        assert!(matches!(Table::from_parts(headers, vec![]), Err(LabelError::InvalidSchema(_))));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut headers = vec![TEXT_COLUMN.to_string()];
        headers.extend(ANNOTATOR_COLUMNS.iter().map(|c| c.to_string()));
        let result = Table::from_parts(headers, vec![vec!["only text".to_string()]]);
        assert!(matches!(result, Err(LabelError::InvalidSchema(_))));
    }

    #[test]
    fn test_set_label_out_of_range() {
        let mut table = sample_table(&[("a", "")]);
        let first = Annotator::from_number(1).unwrap();
        assert!(table.set_label(3, first, "help").is_none());
        assert!(table.set_label(0, first, "help").is_some());
        assert_eq!(table.label(0, first), Some("help"));
    }
}
