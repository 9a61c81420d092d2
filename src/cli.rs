use std::path::PathBuf;

use clap::Parser;

use crate::config::MergeConfig;
use crate::diff::{DiffStrategy, ReportFormat};
use crate::merge::{AssemblyMode, Side};

#[derive(Parser)]
#[command(name = "linemerge")]
#[command(version)]
#[command(about = "Compare two text files line by line and merge them interactively")]
#[command(long_about = "linemerge compares two text files position by position, asks which version to keep for every line that differs, and saves the merged result. Decisions can also be supplied up front for unattended runs.")]
pub struct Cli {
    /// Left input ("File1")
    #[arg(value_name = "LEFT", help = "Left input file (defaults to paths.left from config)")]
    pub left: Option<PathBuf>,

    /// Right input ("File2")
    #[arg(value_name = "RIGHT", help = "Right input file (defaults to paths.right from config)")]
    pub right: Option<PathBuf>,

    /// Where the merged result is written
    #[arg(value_name = "OUTPUT", help = "Output file (defaults to paths.output from config)")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", help = "Read configuration from FILE instead of linemerge.toml")]
    pub config: Option<PathBuf>,

    /// How lines are paired before comparing
    #[arg(short, long, help = "Line pairing strategy")]
    pub strategy: Option<DiffStrategy>,

    /// Which lines end up in the output
    #[arg(short, long, help = "Output assembly mode")]
    pub mode: Option<AssemblyMode>,

    /// Input whose lines fill undisputed positions
    #[arg(long, help = "Base input for lines that do not differ")]
    pub base: Option<Side>,

    /// Drop whitespace-only lines from the output
    #[arg(long, help = "Omit blank lines from the merged output")]
    pub skip_blank_lines: bool,

    /// Decisions in order, e.g. `1,2,left`
    #[arg(short, long, value_name = "LIST", conflicts_with = "prefer", help = "Pre-supplied decisions, one per difference")]
    pub decisions: Option<String>,

    /// Resolve every difference the same way
    #[arg(long, value_name = "SIDE", help = "Keep this side for every difference")]
    pub prefer: Option<Side>,

    /// Print the differences and exit without merging
    #[arg(short, long, help = "Report differences only, nothing is written")]
    pub report: bool,

    /// Report format
    #[arg(long, default_value = "text", help = "Report output format")]
    pub format: ReportFormat,

    /// Replace a line of the saved output, e.g. `3=new text`
    #[arg(long, value_name = "N=TEXT", value_parser = parse_amendment, help = "Amend line N of the output after saving")]
    pub amend: Vec<(usize, String)>,

    /// Skip converting .doc/.docx/.odt inputs
    #[arg(long, help = "Disable document conversion")]
    pub no_convert: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

fn parse_amendment(value: &str) -> Result<(usize, String), String> {
    let (line, text) = value
        .split_once('=')
        .ok_or_else(|| format!("expected N=TEXT, got '{}'", value))?;
    let line: usize = line
        .trim()
        .parse()
        .map_err(|_| format!("invalid line number '{}'", line.trim()))?;
    if line == 0 {
        return Err("line numbers start at 1".to_string());
    }
    Ok((line, text.to_string()))
}

impl Cli {
    /// Load the config file (explicit, or `linemerge.toml` if present),
    /// apply environment overrides, then the flags given on the command line.
    pub fn resolve_config(&self) -> crate::Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => MergeConfig::load(path)?,
            None => MergeConfig::load_or_default()?,
        };
        config.apply_env()?;

        if let Some(left) = &self.left {
            config.paths.left = left.clone();
        }
        if let Some(right) = &self.right {
            config.paths.right = right.clone();
        }
        if let Some(output) = &self.output {
            config.paths.output = output.clone();
        }
        if let Some(strategy) = self.strategy {
            config.diff.strategy = strategy;
        }
        if let Some(mode) = self.mode {
            config.assembly.mode = mode;
        }
        if let Some(base) = self.base {
            config.assembly.base = base;
        }
        if self.skip_blank_lines {
            config.assembly.skip_blank_lines = true;
        }
        if self.no_convert {
            config.conversion.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_ansi(self.use_color())
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        if let Some(decisions) = &self.decisions {
            if decisions.trim().is_empty() {
                return Err("Decision list must not be empty".to_string());
            }
        }

        if self.report && !self.amend.is_empty() {
            return Err("--amend cannot be combined with --report".to_string());
        }

        Ok(())
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
            output: None,
            config: None,
            strategy: None,
            mode: None,
            base: None,
            skip_blank_lines: false,
            decisions: None,
            prefer: None,
            report: false,
            format: ReportFormat::Text,
            amend: Vec::new(),
            no_convert: false,
            verbose: false,
            no_color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amendment() {
        assert_eq!(parse_amendment("3=new text").unwrap(), (3, "new text".to_string()));
        assert_eq!(parse_amendment("1=").unwrap(), (1, String::new()));
        assert_eq!(parse_amendment("2=a=b").unwrap(), (2, "a=b".to_string()));
        assert!(parse_amendment("0=x").is_err());
        assert!(parse_amendment("x=y").is_err());
        assert!(parse_amendment("no separator").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "linemerge",
            "a.txt",
            "b.txt",
            "out.txt",
            "--strategy",
            "myers",
            "--mode",
            "resolved-only",
            "--skip-blank-lines",
            "--no-convert",
        ])
        .unwrap();

        assert_eq!(cli.left, Some(PathBuf::from("a.txt")));
        assert_eq!(cli.strategy, Some(DiffStrategy::Myers));
        assert_eq!(cli.mode, Some(AssemblyMode::ResolvedOnly));
        assert!(cli.skip_blank_lines);
        assert!(cli.no_convert);
    }

    #[test]
    fn test_decisions_conflict_with_prefer() {
        let result = Cli::try_parse_from(["linemerge", "--decisions", "1,2", "--prefer", "left"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Cli::default().validate().is_ok());

        let cli = Cli {
            decisions: Some("  ".to_string()),
            ..Cli::default()
        };
        assert!(cli.validate().is_err());

        let cli = Cli {
            report: true,
            amend: vec![(1, "x".to_string())],
            ..Cli::default()
        };
        assert!(cli.validate().is_err());
    }
}
