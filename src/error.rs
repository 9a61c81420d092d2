//! Error types for comparison, resolution and persistence.

use std::path::PathBuf;

/// Errors raised anywhere in the compare/resolve/save pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// An input path does not resolve to a readable file.
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A decision value other than the two recognized choices.
    #[error("invalid choice '{value}': expected 1/left or 2/right")]
    InvalidResolution { value: String },

    /// Reading an input or writing the output failed.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a choice from, or writing a prompt to, the terminal failed.
    #[error("terminal I/O failed while asking about line {line_number}")]
    Prompt {
        line_number: usize,
        #[source]
        source: std::io::Error,
    },

    /// A rich document needs converting but the converter is not installed.
    #[error("cannot read {}: converter '{converter}' is not installed", path.display())]
    ConversionUnavailable { converter: String, path: PathBuf },

    /// The converter ran but did not produce plain text.
    #[error("converting {} failed: {reason}", path.display())]
    ConversionFailed { path: PathBuf, reason: String },

    /// The decision source was closed while a difference was waiting.
    #[error("decision source closed before line {line_number} was resolved")]
    Cancelled { line_number: usize },

    /// A pre-supplied decision list ran out.
    #[error("no decision supplied for line {line_number} ({supplied} decisions given)")]
    DecisionsExhausted { line_number: usize, supplied: usize },

    /// Resolutions were not strictly increasing or fell outside the output.
    #[error("resolution for line {line_number} is out of order or beyond line {span}")]
    UnorderedResolutions { line_number: usize, span: usize },

    /// Amending a line that the file does not have.
    #[error("line {line_number} is out of range: {} has {len} lines", path.display())]
    LineOutOfRange {
        path: PathBuf,
        line_number: usize,
        len: usize,
    },

    /// A workflow step was called out of sequence.
    #[error("cannot {action} while workflow is {state}")]
    InvalidState { action: &'static str, state: String },

    /// A background step panicked or was aborted.
    #[error("background {step} task failed: {reason}")]
    TaskFailed { step: &'static str, reason: String },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the run stopped because the decision source went away.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Step label for an error returned by a merge: only file I/O comes
    /// from saving, everything else happens while resolving.
    pub fn merge_step(&self) -> &'static str {
        match self {
            Self::Io { .. } => "Saving merged output",
            _ => "Resolving differences",
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = MergeError> = std::result::Result<T, E>;
