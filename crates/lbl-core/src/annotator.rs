//! Annotator identities and the columns they own

use std::fmt;

use crate::error::LabelError;

/// Column owned by the fifth annotator; the others follow `coder_N`
pub const FIFTH_ANNOTATOR_COLUMN: &str = "_coder_5";

/// Annotator column names in annotator order
pub const ANNOTATOR_COLUMNS: [&str; 5] = ["coder_1", "coder_2", "coder_3", "coder_4", FIFTH_ANNOTATOR_COLUMN];

/// One of the five fixed annotator roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Annotator(u8);

impl Annotator {
    /// All annotators in order
    pub const ALL: [Annotator; 5] = [Annotator(1), Annotator(2), Annotator(3), Annotator(4), Annotator(5)];
    
    /// Build an annotator from its 1-based number
    pub fn from_number(number: i64) -> Result<Self, LabelError> {
        match number {
            1..=5 => Ok(Annotator(number as u8)),
            _ => Err(LabelError::InvalidAnnotator(number)),
        }
    }
    
    /// The 1-based annotator number
    pub fn number(&self) -> u8 {
        self.0
    }
    
    /// Name of the column holding this annotator's labels
    pub fn column_name(&self) -> &'static str {
        ANNOTATOR_COLUMNS[self.index()]
    }
    
    /// Default display name
    pub fn default_name(&self) -> String {
        format!("Coder {}", self.0)
    }
    
    pub(crate) fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_column_mapping() {
        let columns: Vec<_> = Annotator::ALL.iter().map(|a| a.column_name()).collect();
        assert_eq!(columns, vec!["coder_1", "coder_2", "coder_3", "coder_4", "_coder_5"]);
    }
    
    #[test]
    fn test_out_of_range() {
        for bad in [0, 6, -1, 100] {
            assert!(matches!(Annotator::from_number(bad), Err(LabelError::InvalidAnnotator(n)) if n == bad));
        }
        assert_eq!(Annotator::from_number(5).unwrap().column_name(), "_coder_5");
    }
}
