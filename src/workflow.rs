//! End-to-end compare → resolve → assemble → save workflow.
//!
//! [`MergeWorkflow`] runs the steps in sequence on the caller's thread and
//! tracks where a run stands with [`WorkflowState`], so a front end can ask
//! whether there is something to merge or whether the output was saved.
//! [`run_async`] runs the same steps with the I/O and comparison off the
//! async executor, awaiting each step before starting the next.
//!
//! Any failure aborts the remaining steps. Nothing is written unless every
//! difference was resolved.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::MergeConfig;
use crate::convert::{self, DocumentConverter, PandocConverter};
use crate::diff::{Comparison, DiffEngine, DiffStrategy, Difference};
use crate::error::{MergeError, Result};
use crate::merge::{self, OutputAssembler};
use crate::resolve::{ConflictResolver, DecisionSource};
use crate::source::{LineSequence, LineSource};

/// Where a workflow run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WorkflowState {
    #[default]
    NotStarted,
    Compared,
    Saved,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Compared => "compared",
            Self::Saved => "saved",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub differences: usize,
    pub lines_written: usize,
}

/// Orchestrates one comparison and merge
pub struct MergeWorkflow {
    engine: DiffEngine,
    resolver: ConflictResolver,
    assembler: OutputAssembler,
    converter: Option<Box<dyn DocumentConverter>>,
    state: WorkflowState,
    comparison: Option<Comparison>,
}

impl MergeWorkflow {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            engine: DiffEngine::new(config.diff.strategy),
            resolver: ConflictResolver::new(),
            assembler: OutputAssembler::new(config.assembly),
            converter: configured_converter(config),
            state: WorkflowState::NotStarted,
            comparison: None,
        }
    }

    /// Replace the document converter (or disable conversion with `None`)
    pub fn with_converter(mut self, converter: Option<Box<dyn DocumentConverter>>) -> Self {
        self.converter = converter;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    /// Differences from the last comparison, empty when there is none
    pub fn differences(&self) -> &[Difference] {
        self.comparison
            .as_ref()
            .map(|c| c.differences.as_slice())
            .unwrap_or(&[])
    }

    /// Drop any held comparison and start over
    pub fn reset(&mut self) {
        self.comparison = None;
        self.state = WorkflowState::NotStarted;
    }

    /// Load both inputs and compare them. Replaces any earlier comparison.
    pub fn compare<P: AsRef<Path>>(&mut self, left: P, right: P) -> Result<&[Difference]> {
        self.reset();

        let (left_lines, right_lines) =
            load_inputs(self.converter.as_deref(), left.as_ref(), right.as_ref())?;
        let comparison = self.engine.diff(left_lines, right_lines);

        tracing::info!(
            "Compared {} and {}: {} differences",
            left.as_ref().display(),
            right.as_ref().display(),
            comparison.differences.len()
        );

        self.state = WorkflowState::Compared;
        Ok(self.comparison.insert(comparison).differences.as_slice())
    }

    /// Resolve every difference of the held comparison, assemble the output
    /// and save it to `output`. The comparison is consumed either way; on
    /// failure the workflow returns to [`WorkflowState::NotStarted`].
    pub fn merge<D, P>(&mut self, decisions: &mut D, output: P) -> Result<MergeSummary>
    where
        D: DecisionSource + ?Sized,
        P: AsRef<Path>,
    {
        let comparison = self.comparison.take().ok_or(MergeError::InvalidState {
            action: "merge",
            state: self.state.to_string(),
        })?;
        self.state = WorkflowState::NotStarted;

        let summary = finish(&self.resolver, &self.assembler, &comparison, decisions, output.as_ref())
            .map_err(|err| {
                if err.is_cancelled() {
                    tracing::warn!("Merge cancelled: {}", err);
                } else {
                    tracing::error!("Merge aborted: {}", err);
                }
                err
            })?;

        self.state = WorkflowState::Saved;
        Ok(summary)
    }

    /// Compare and merge in one call
    pub fn run<D, P>(&mut self, left: P, right: P, output: P, decisions: &mut D) -> Result<MergeSummary>
    where
        D: DecisionSource + ?Sized,
        P: AsRef<Path>,
    {
        self.compare(left, right)?;
        self.merge(decisions, output)
    }
}

fn configured_converter(config: &MergeConfig) -> Option<Box<dyn DocumentConverter>> {
    if config.conversion.enabled {
        Some(Box::new(PandocConverter::new(config.conversion.program.clone())))
    } else {
        None
    }
}

fn load_inputs(
    converter: Option<&dyn DocumentConverter>,
    left: &Path,
    right: &Path,
) -> Result<(LineSequence, LineSequence)> {
    convert::check_available(converter, &[left, right])?;

    let scratch = if convert::needs_conversion(left) || convert::needs_conversion(right) {
        Some(tempfile::tempdir().map_err(|err| MergeError::io(std::env::temp_dir(), err))?)
    } else {
        None
    };

    let load = |path: &Path| -> Result<LineSequence> {
        match (converter, &scratch) {
            (Some(converter), Some(dir)) if convert::needs_conversion(path) => {
                let converted = converter.convert(path, dir.path())?;
                LineSource::load(converted)
            }
            _ => LineSource::load(path),
        }
    };

    Ok((load(left)?, load(right)?))
}

fn finish<D: DecisionSource + ?Sized>(
    resolver: &ConflictResolver,
    assembler: &OutputAssembler,
    comparison: &Comparison,
    decisions: &mut D,
    output: &Path,
) -> Result<MergeSummary> {
    let resolved = resolver.resolve(&comparison.differences, decisions)?;
    let base = assembler.base(&comparison.left, &comparison.right);
    let merged = assembler.assemble(base, comparison.span(), &resolved)?;
    merge::persist(&merged, output)?;

    Ok(MergeSummary {
        output: output.to_path_buf(),
        differences: comparison.differences.len(),
        lines_written: merged.len(),
    })
}

fn join_failed(step: &'static str) -> impl FnOnce(tokio::task::JoinError) -> MergeError {
    move |err| MergeError::TaskFailed {
        step,
        reason: err.to_string(),
    }
}

/// Async workflow: inputs are read with `tokio::fs`, comparison, resolution
/// and persistence run on the blocking pool. Each step completes before the
/// next starts. `decisions` may block (e.g. a [`crate::resolve::ChannelSource`]).
pub async fn run_async<D>(
    config: MergeConfig,
    left: PathBuf,
    right: PathBuf,
    output: PathBuf,
    mut decisions: D,
) -> Result<MergeSummary>
where
    D: DecisionSource + Send + 'static,
{
    let (left_lines, right_lines) =
        if convert::needs_conversion(&left) || convert::needs_conversion(&right) {
            let converter = configured_converter(&config);
            tokio::task::spawn_blocking(move || load_inputs(converter.as_deref(), &left, &right))
                .await
                .map_err(join_failed("load"))??
        } else {
            tokio::try_join!(LineSource::load_async(&left), LineSource::load_async(&right))?
        };

    let strategy: DiffStrategy = config.diff.strategy;
    let comparison = tokio::task::spawn_blocking(move || {
        DiffEngine::new(strategy).diff(left_lines, right_lines)
    })
    .await
    .map_err(join_failed("compare"))?;

    let assembler = OutputAssembler::new(config.assembly);
    tokio::task::spawn_blocking(move || {
        finish(&ConflictResolver::new(), &assembler, &comparison, &mut decisions, &output)
    })
    .await
    .map_err(join_failed("merge"))?
}
