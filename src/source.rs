//! Loading text inputs as ordered line sequences.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::error::{MergeError, Result};

/// Ordered, immutable lines of one input. Index 0 is line 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split text on `\r\n`, `\n` or a lone `\r`. A final terminator does
    /// not start another line and empty text yields no lines.
    pub fn from_text(text: &str) -> Self {
        let mut rest = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = Vec::new();

        while !rest.is_empty() {
            match rest.find(['\r', '\n']) {
                Some(end) => {
                    lines.push(rest[..end].to_string());
                    let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                    rest = &rest[end + terminator..];
                }
                None => {
                    lines.push(rest.to_string());
                    break;
                }
            }
        }

        Self { lines }
    }

    /// Decode raw bytes as UTF-8, replacing invalid sequences with U+FFFD.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(&String::from_utf8_lossy(bytes))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Line at `index`, or the empty string past the end.
    pub fn line_or_empty(&self, index: usize) -> &str {
        self.get(index).unwrap_or("")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

impl<'a> FromIterator<&'a str> for LineSequence {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(str::to_string).collect())
    }
}

/// Reads plain-text files into [`LineSequence`]s.
pub struct LineSource;

impl LineSource {
    /// Load `path`, failing with [`MergeError::NotFound`] when it is missing
    /// or not a regular file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LineSequence> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MergeError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => MergeError::NotFound {
                path: path.to_path_buf(),
            },
            _ => MergeError::io(path, err),
        })?;

        let sequence = decode(path, &bytes);
        tracing::debug!("Loaded {} lines from {}", sequence.len(), path.display());
        Ok(sequence)
    }

    /// Async variant of [`LineSource::load`] for use inside a tokio runtime.
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<LineSequence> {
        let path = path.as_ref();
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(MergeError::NotFound {
                    path: path.to_path_buf(),
                })
            }
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| MergeError::io(path, err))?;
        Ok(decode(path, &bytes))
    }
}

fn decode(path: &Path, bytes: &[u8]) -> LineSequence {
    if std::str::from_utf8(bytes).is_err() {
        tracing::warn!(
            "{} is not valid UTF-8; undecodable bytes were replaced with U+FFFD",
            path.display()
        );
    }
    LineSequence::from_bytes(bytes)
}
