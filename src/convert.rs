//! Conversion of rich documents (`.doc`, `.docx`, `.odt`) to plain text.
//!
//! The comparison engine only reads plain text. Inputs in a document format
//! are handed to an external converter first, and the converter's presence
//! is checked before any input is loaded.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{MergeError, Result};

const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "odt"];

/// True when `path` has a document extension that needs converting.
pub fn needs_conversion<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DOCUMENT_EXTENSIONS.iter().any(|d| d.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// An external tool that turns a document into a plain-text file
pub trait DocumentConverter: Send + Sync {
    /// Tool name for messages
    fn name(&self) -> &str;

    /// Whether the tool can be run on this system
    fn is_available(&self) -> bool;

    /// Convert `input`, writing `<stem>.txt` into `out_dir`
    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf>;
}

/// Converts with `pandoc --to=plain+smart --wrap=none`
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
}

impl PandocConverter {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl DocumentConverter for PandocConverter {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("pandoc")
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(MergeError::NotFound {
                path: input.to_path_buf(),
            });
        }

        let stem = input.file_stem().unwrap_or_default();
        let output = out_dir.join(stem).with_extension("txt");

        let result = Command::new(&self.program)
            .arg("--to=plain+smart")
            .arg("--wrap=none")
            .arg(input)
            .arg("-o")
            .arg(&output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| MergeError::ConversionFailed {
                path: input.to_path_buf(),
                reason: err.to_string(),
            })?;

        if !result.status.success() {
            return Err(MergeError::ConversionFailed {
                path: input.to_path_buf(),
                reason: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        tracing::info!("Converted {} to {}", input.display(), output.display());
        Ok(output)
    }
}

/// Check that every input needing conversion can be converted.
/// Runs before anything is read.
pub fn check_available(converter: Option<&dyn DocumentConverter>, inputs: &[&Path]) -> Result<()> {
    for input in inputs.iter().filter(|p| needs_conversion(p)) {
        match converter {
            Some(converter) if converter.is_available() => {}
            Some(converter) => {
                return Err(MergeError::ConversionUnavailable {
                    converter: converter.name().to_string(),
                    path: input.to_path_buf(),
                })
            }
            None => {
                return Err(MergeError::ConversionUnavailable {
                    converter: "none configured".to_string(),
                    path: input.to_path_buf(),
                })
            }
        }
    }
    Ok(())
}
