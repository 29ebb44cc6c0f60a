/// Where an annotator should continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// Show this 0-based row
    Row(usize),
    /// Every row is labeled; show the completion view
    Complete,
}

impl ResumePoint {
    /// Row index, if any
    pub fn row(&self) -> Option<usize> {
        match self {
            ResumePoint::Row(idx) => Some(*idx),
            ResumePoint::Complete => None,
        }
    }
}

/// Map any index onto `0..n`, cycling in both directions
///
/// Returns 0 for an empty range.
pub fn wrap_index(index: i64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    index.rem_euclid(n as i64) as usize
}
