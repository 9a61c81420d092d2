use super::algorithms::{AlignmentStats, DiffAlgorithm, DiffStrategy};
use super::Difference;
use crate::source::LineSequence;

/// Result of one comparison pass: the sequences that were compared and
/// the differences between them.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub left: LineSequence,
    pub right: LineSequence,
    pub differences: Vec<Difference>,
    pub alignment: AlignmentStats,
}

impl Comparison {
    /// Number of positions covered: the longer of the two sequences
    pub fn span(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Computes line differences between two sequences
pub struct DiffEngine {
    algorithm: Box<dyn DiffAlgorithm>,
}

impl DiffEngine {
    /// Create a new engine with the specified strategy
    pub fn new(strategy: DiffStrategy) -> Self {
        Self {
            algorithm: strategy.create(),
        }
    }

    /// Create an engine with a custom alignment algorithm
    pub fn with_algorithm(algorithm: Box<dyn DiffAlgorithm>) -> Self {
        Self { algorithm }
    }

    /// Positional comparison. Position `i` is compared across both inputs,
    /// a missing line counting as the empty string; every unequal position
    /// yields a [`Difference`] numbered `i + 1`, in increasing order.
    pub fn compare(&self, left: &LineSequence, right: &LineSequence) -> Vec<Difference> {
        let span = left.len().max(right.len());

        (0..span)
            .filter_map(|i| Difference::new(i + 1, left.line_or_empty(i), right.line_or_empty(i)))
            .collect()
    }

    /// Align the inputs with the configured algorithm, then compare
    /// positionally. With the default strategy the inputs are unchanged.
    pub fn diff(&self, left: LineSequence, right: LineSequence) -> Comparison {
        let alignment = self.algorithm.align(&left, &right);
        let differences = self.compare(&alignment.left, &alignment.right);

        tracing::debug!(
            "{} comparison: {} differences across {} lines",
            self.algorithm.name(),
            differences.len(),
            alignment.left.len().max(alignment.right.len())
        );

        Comparison {
            left: alignment.left,
            right: alignment.right,
            differences,
            alignment: alignment.stats,
        }
    }

    /// Get the current algorithm name
    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    /// Get the current algorithm description
    pub fn algorithm_description(&self) -> &str {
        self.algorithm.description()
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DiffStrategy::default())
    }
}
