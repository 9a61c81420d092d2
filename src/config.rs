//! Configuration management for linemerge
//!
//! This module provides configuration structures and defaults for the
//! comparison, assembly and conversion steps, loaded from an optional TOML
//! file and overridable from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diff::DiffStrategy;
use crate::error::{MergeError, Result};
use crate::merge::{AssemblyMode, AssemblyOptions, Side};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "linemerge.toml";

/// Global configuration for linemerge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Default input and output paths
    pub paths: PathsConfig,
    /// Comparison configuration
    pub diff: DiffConfig,
    /// Output assembly configuration
    pub assembly: AssemblyOptions,
    /// Document conversion configuration
    pub conversion: ConversionConfig,
}

/// Paths used when the caller omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub left: PathBuf,
    pub right: PathBuf,
    pub output: PathBuf,
}

/// Configuration for difference detection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Positional by default; alignment strategies are opt-in
    pub strategy: DiffStrategy,
}

/// Configuration for document conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Converter executable
    pub program: PathBuf,
    /// Convert `.doc`/`.docx`/`.odt` inputs before comparing
    pub enabled: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            left: PathBuf::from("Modified.txt"),
            right: PathBuf::from("Original.txt"),
            output: PathBuf::from("Output.txt"),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            enabled: true,
        }
    }
}

impl MergeConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| MergeError::io(path, err))?;
        toml::from_str(&text)
            .map_err(|err| MergeError::Config(format!("{}: {}", path.display(), err)))
    }

    /// Load `linemerge.toml` from the working directory, or use defaults
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Override with environment variables if present
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("LINEMERGE_STRATEGY") {
            self.diff.strategy = val.parse().map_err(|_| {
                MergeError::Config(format!("LINEMERGE_STRATEGY: unknown strategy '{}'", val))
            })?;
        }

        if let Ok(val) = std::env::var("LINEMERGE_ASSEMBLY_MODE") {
            self.assembly.mode = match val.to_ascii_lowercase().as_str() {
                "full" => AssemblyMode::Full,
                "resolved_only" | "resolved-only" => AssemblyMode::ResolvedOnly,
                _ => {
                    return Err(MergeError::Config(format!(
                        "LINEMERGE_ASSEMBLY_MODE: unknown mode '{}'",
                        val
                    )))
                }
            };
        }

        if let Ok(val) = std::env::var("LINEMERGE_BASE") {
            self.assembly.base = match val.to_ascii_lowercase().as_str() {
                "left" => Side::Left,
                "right" => Side::Right,
                _ => {
                    return Err(MergeError::Config(format!(
                        "LINEMERGE_BASE: expected left or right, got '{}'",
                        val
                    )))
                }
            };
        }

        if let Ok(val) = std::env::var("LINEMERGE_SKIP_BLANK_LINES") {
            self.assembly.skip_blank_lines = matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(val) = std::env::var("LINEMERGE_CONVERTER") {
            self.conversion.program = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("paths.left", &self.paths.left),
            ("paths.right", &self.paths.right),
            ("paths.output", &self.paths.output),
        ] {
            if path.as_os_str().is_empty() {
                return Err(MergeError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.conversion.enabled && self.conversion.program.as_os_str().is_empty() {
            return Err(MergeError::Config(
                "conversion.program must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
