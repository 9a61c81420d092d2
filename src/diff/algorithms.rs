use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag};

use crate::source::LineSequence;

/// Trait defining how two inputs are lined up before positional comparison
pub trait DiffAlgorithm: Send + Sync {
    /// Produce a pair of equal-length sequences to compare index by index
    fn align(&self, left: &LineSequence, right: &LineSequence) -> Alignment;

    /// Get the algorithm name
    fn name(&self) -> &'static str;

    /// Get algorithm description
    fn description(&self) -> &'static str;
}

/// Two inputs lined up for comparison
#[derive(Debug, Clone)]
pub struct Alignment {
    pub left: LineSequence,
    pub right: LineSequence,
    pub stats: AlignmentStats,
}

/// Statistics about an alignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub gaps_left: usize,
    pub gaps_right: usize,
    pub replaced: usize,
}

impl AlignmentStats {
    pub fn total_gaps(&self) -> usize {
        self.gaps_left + self.gaps_right
    }
}

/// Index-by-index comparison with no realignment. The default.
pub struct PositionalAlgorithm;

impl DiffAlgorithm for PositionalAlgorithm {
    fn align(&self, left: &LineSequence, right: &LineSequence) -> Alignment {
        Alignment {
            left: left.clone(),
            right: right.clone(),
            stats: AlignmentStats::default(),
        }
    }

    fn name(&self) -> &'static str {
        "Positional"
    }

    fn description(&self) -> &'static str {
        "Compare line i with line i; an inserted line shifts every later line"
    }
}

/// Myers diff alignment
pub struct MyersAlgorithm;

impl DiffAlgorithm for MyersAlgorithm {
    fn align(&self, left: &LineSequence, right: &LineSequence) -> Alignment {
        self.align_with(Algorithm::Myers, left, right)
    }

    fn name(&self) -> &'static str {
        "Myers"
    }

    fn description(&self) -> &'static str {
        "Myers' O(ND) diff algorithm - fast and widely used"
    }
}

/// Patience diff alignment
pub struct PatienceAlgorithm;

impl DiffAlgorithm for PatienceAlgorithm {
    fn align(&self, left: &LineSequence, right: &LineSequence) -> Alignment {
        self.align_with(Algorithm::Patience, left, right)
    }

    fn name(&self) -> &'static str {
        "Patience"
    }

    fn description(&self) -> &'static str {
        "Patience diff - better for refactored text with moved blocks"
    }
}

/// LCS (Longest Common Subsequence) alignment
pub struct LcsAlgorithm;

impl DiffAlgorithm for LcsAlgorithm {
    fn align(&self, left: &LineSequence, right: &LineSequence) -> Alignment {
        self.align_with(Algorithm::Lcs, left, right)
    }

    fn name(&self) -> &'static str {
        "LCS"
    }

    fn description(&self) -> &'static str {
        "Longest Common Subsequence - produces minimal diffs"
    }
}

// Shared implementation: pad each non-equal op with empty lines so both
// sides have the same length, keeping equal runs on the same index.
trait AlignmentConverter {
    fn align_with(&self, algorithm: Algorithm, left: &LineSequence, right: &LineSequence) -> Alignment {
        let ops = similar::capture_diff_slices(algorithm, left.lines(), right.lines());

        let mut aligned_left = Vec::with_capacity(left.len().max(right.len()));
        let mut aligned_right = Vec::with_capacity(left.len().max(right.len()));
        let mut stats = AlignmentStats::default();

        for op in &ops {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let span = old_range.len().max(new_range.len());

            match tag {
                DiffTag::Delete => stats.gaps_right += span,
                DiffTag::Insert => stats.gaps_left += span,
                DiffTag::Replace => {
                    stats.replaced += old_range.len().min(new_range.len());
                    stats.gaps_left += span - old_range.len();
                    stats.gaps_right += span - new_range.len();
                }
                DiffTag::Equal => {}
            }

            for offset in 0..span {
                aligned_left.push(if offset < old_range.len() {
                    left.line_or_empty(old_range.start + offset).to_string()
                } else {
                    String::new()
                });
                aligned_right.push(if offset < new_range.len() {
                    right.line_or_empty(new_range.start + offset).to_string()
                } else {
                    String::new()
                });
            }
        }

        Alignment {
            left: LineSequence::new(aligned_left),
            right: LineSequence::new(aligned_right),
            stats,
        }
    }
}

impl AlignmentConverter for MyersAlgorithm {}
impl AlignmentConverter for PatienceAlgorithm {}
impl AlignmentConverter for LcsAlgorithm {}

/// Available comparison strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStrategy {
    /// Index-by-index comparison (default)
    #[default]
    Positional,
    /// Align with Myers before comparing
    Myers,
    /// Align with patience diff before comparing
    Patience,
    /// Align with LCS before comparing
    Lcs,
}

impl DiffStrategy {
    pub fn all() -> &'static [DiffStrategy] {
        &[Self::Positional, Self::Myers, Self::Patience, Self::Lcs]
    }

    pub fn create(&self) -> Box<dyn DiffAlgorithm> {
        match self {
            Self::Positional => Box::new(PositionalAlgorithm),
            Self::Myers => Box::new(MyersAlgorithm),
            Self::Patience => Box::new(PatienceAlgorithm),
            Self::Lcs => Box::new(LcsAlgorithm),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Positional => "Positional",
            Self::Myers => "Myers",
            Self::Patience => "Patience",
            Self::Lcs => "LCS",
        }
    }
}

impl std::fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DiffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
