mod engine;
mod position;

pub use engine::Navigator;
pub use position::{wrap_index, ResumePoint};

use crate::table::Completion;

/// Result of writing or clearing a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOutcome {
    /// Row that was written (after wrap-around)
    pub row: usize,
    /// Recomputed progress of the annotator
    pub completion: Completion,
    /// Where the annotator goes next
    pub next: ResumePoint,
}

/// Everything needed to display one row to an annotator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// 0-based row index
    pub index: usize,
    /// Row text as stored
    pub text: String,
    /// Current cell value, trimmed; empty when unlabeled
    pub current_label: String,
    pub completion: Completion,
    /// 0-based index of the previous row, wrapping to the end
    pub prev: usize,
    /// 0-based index of the next row, wrapping to the start
    pub next: usize,
}

impl RowView {
    /// 1-based position, as shown to humans and used in URLs
    pub fn display_index(&self) -> usize {
        self.index + 1
    }
    
    pub fn total(&self) -> usize {
        self.completion.total
    }
}
