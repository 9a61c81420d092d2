pub mod cli;
pub mod config;
pub mod convert;
pub mod diff;
pub mod error;
pub mod merge;
pub mod resolve;
pub mod source;
pub mod workflow;

pub use config::MergeConfig;
pub use convert::{DocumentConverter, PandocConverter};
pub use diff::{compare_texts, Comparison, DiffEngine, DiffFormatter, DiffStrategy, Difference, ReportFormat};
pub use error::{MergeError, Result};
pub use merge::{amend_line, persist, AssemblyMode, AssemblyOptions, MergedOutput, OutputAssembler, Side};
pub use resolve::{
    ConflictResolver, DecisionSource, FixedSource, PromptSource, Resolution, ResolvedLine,
    ScriptedSource,
};
pub use source::{LineSequence, LineSource};
pub use workflow::{run_async, MergeSummary, MergeWorkflow, WorkflowState};
