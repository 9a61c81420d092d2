//! Line difference detection and reporting
//!
//! The default comparison is positional: line `i` of the left input is
//! compared with line `i` of the right input, the shorter input padded with
//! empty lines. Alignment-based strategies are available as an opt-in
//! preprocessing step that pads both inputs before the same positional pass.

pub mod algorithms;
pub mod engine;
pub mod formatter;

use serde::{Deserialize, Serialize};

pub use algorithms::{
    Alignment, AlignmentStats, DiffAlgorithm, DiffStrategy, LcsAlgorithm, MyersAlgorithm,
    PatienceAlgorithm, PositionalAlgorithm,
};
pub use engine::{Comparison, DiffEngine};
pub use formatter::{DiffFormatter, ReportFormat};

/// One position where the two inputs diverge.
///
/// Never constructed for equal lines; `line_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    line_number: usize,
    left: String,
    right: String,
}

impl Difference {
    /// Returns `None` when the contents are equal or `line_number` is 0.
    pub fn new(line_number: usize, left: impl Into<String>, right: impl Into<String>) -> Option<Self> {
        let left = left.into();
        let right = right.into();
        if line_number == 0 || left == right {
            return None;
        }
        Some(Self {
            line_number,
            left,
            right,
        })
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }
}

/// Convenience function: positional differences between two texts
pub fn compare_texts(left: &str, right: &str) -> Vec<Difference> {
    DiffEngine::default().compare(
        &crate::source::LineSequence::from_text(left),
        &crate::source::LineSequence::from_text(right),
    )
}
