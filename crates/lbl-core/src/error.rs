use thiserror::Error;

/// Errors that can occur while labeling
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    
    #[error("Invalid annotator {0}: must be in 1..=5")]
    InvalidAnnotator(i64),
    
    #[error("Invalid label '{0}'")]
    InvalidLabel(String),
    
    #[error("Table contains no rows")]
    EmptyTable,
    
    #[error("No table loaded")]
    NoTableLoaded,
    
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LabelError {
    /// Whether the error was caused by the request rather than the backing store
    pub fn is_user_error(&self) -> bool {
        !matches!(self, LabelError::Storage(_))
    }
}
