//! Merged output assembly and persistence
//!
//! Two assembly policies are supported:
//!
//! * [`AssemblyMode::Full`] (default): one output line for every position up
//!   to the longer input. Positions without a difference are copied from the
//!   base side; positions with a difference take the resolved content.
//! * [`AssemblyMode::ResolvedOnly`]: only the resolved lines, in order.
//!
//! Blank-line filtering is off unless `skip_blank_lines` is set.

pub mod persist;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::resolve::ResolvedLine;
use crate::source::LineSequence;

pub use persist::{amend_line, persist, LINE_ENDING};

/// Which lines make up the merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    /// Every position: unchanged lines plus resolved conflicts
    #[default]
    Full,
    /// Only the resolved conflict lines
    ResolvedOnly,
}

/// An input side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Assembly options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    pub mode: AssemblyMode,
    /// Side that unchanged positions are copied from
    pub base: Side,
    /// Drop empty and whitespace-only lines from the output
    pub skip_blank_lines: bool,
}

/// Final lines, ready to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedOutput {
    lines: Vec<String>,
}

impl MergedOutput {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined with the platform terminator, one terminator per line.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 2).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push_str(LINE_ENDING);
        }
        text
    }
}

/// Builds [`MergedOutput`] from a base sequence and resolutions
#[derive(Debug, Clone, Default)]
pub struct OutputAssembler {
    options: AssemblyOptions,
}

impl OutputAssembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Pick the configured base out of the compared pair.
    pub fn base<'a>(&self, left: &'a LineSequence, right: &'a LineSequence) -> &'a LineSequence {
        match self.options.base {
            Side::Left => left,
            Side::Right => right,
        }
    }

    /// Assemble `span` positions (full mode) or just the resolutions.
    ///
    /// Resolutions must be strictly increasing and within `1..=span`.
    pub fn assemble(
        &self,
        base: &LineSequence,
        span: usize,
        resolutions: &[ResolvedLine],
    ) -> Result<MergedOutput> {
        let mut previous = 0;
        for resolved in resolutions {
            if resolved.line_number <= previous || resolved.line_number > span {
                return Err(MergeError::UnorderedResolutions {
                    line_number: resolved.line_number,
                    span,
                });
            }
            previous = resolved.line_number;
        }

        let lines: Vec<String> = match self.options.mode {
            AssemblyMode::ResolvedOnly => resolutions.iter().map(|r| r.content.clone()).collect(),
            AssemblyMode::Full => {
                let mut pending = resolutions.iter().peekable();
                (0..span)
                    .map(|i| match pending.next_if(|r| r.line_number == i + 1) {
                        Some(resolved) => resolved.content.clone(),
                        None => base.line_or_empty(i).to_string(),
                    })
                    .collect()
            }
        };

        let lines = if self.options.skip_blank_lines {
            lines.into_iter().filter(|l| !l.trim().is_empty()).collect()
        } else {
            lines
        };

        tracing::debug!(
            "Assembled {} lines ({:?}, {} resolved)",
            lines.len(),
            self.options.mode,
            resolutions.len()
        );
        Ok(MergedOutput::new(lines))
    }
}
