//! Core functionality for the labeling tool
//! 
//! This crate provides the domain types (labels, annotators, tables) and the
//! navigation logic that decides which row an annotator sees next.

pub mod annotator;
pub mod error;
pub mod label;
pub mod navigation;
pub mod table;

// Re-export commonly used types
pub use annotator::Annotator;
pub use error::LabelError;
pub use label::{Label, LABELS};
pub use navigation::{
    wrap_index, LabelOutcome, Navigator, ResumePoint, RowView,
};
pub use table::{AnnotatorState, Completion, Table, TEXT_COLUMN};
pub use store::TableStore;

pub mod store {
    use crate::table::Table;

    /// Durable home of the current table
    ///
    /// Implementations hold a single exclusive lock around every read and
    /// every write of the whole table. Callers doing read-modify-write get no
    /// further isolation: the last `write` replaces the table wholesale.
    pub trait TableStore: Send + Sync {
        /// Get the persisted table, or `None` if nothing has been loaded yet
        fn read(&self) -> anyhow::Result<Option<Table>>;
        
        /// Replace the persisted table
        fn write(&self, table: &Table) -> anyhow::Result<()>;
    }
}
