use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::MergedOutput;
use crate::error::{MergeError, Result};
use crate::source::LineSource;

/// Platform line terminator used when writing output.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Write `output` to `destination` atomically: the content goes to a
/// temporary file in the same directory, which then replaces the target.
/// On failure the destination is left untouched.
pub fn persist<P: AsRef<Path>>(output: &MergedOutput, destination: P) -> Result<()> {
    let destination = destination.as_ref();
    let io_err = |err: std::io::Error| MergeError::io(destination, err);

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(output.to_text().as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    // Keep the permissions of a file being replaced.
    if let Ok(metadata) = fs::metadata(destination) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(io_err)?;
    }

    tmp.persist(destination).map_err(|err| io_err(err.error))?;

    tracing::info!("Wrote {} lines to {}", output.len(), destination.display());
    Ok(())
}

/// Replace line `line_number` (1-based) of an existing file with `content`.
pub fn amend_line<P: AsRef<Path>>(path: P, line_number: usize, content: &str) -> Result<()> {
    let path = path.as_ref();
    let mut lines = LineSource::load(path)?.into_lines();

    if line_number == 0 || line_number > lines.len() {
        return Err(MergeError::LineOutOfRange {
            path: path.to_path_buf(),
            line_number,
            len: lines.len(),
        });
    }

    lines[line_number - 1] = content.to_string();
    persist(&MergedOutput::new(lines), path)?;

    tracing::info!("Amended line {} of {}", line_number, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persist_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let output = MergedOutput::new(vec!["a".into(), "x".into(), "c".into(), "".into()]);

        persist(&output, &path).unwrap();

        let read_back = LineSource::load(&path).unwrap();
        assert_eq!(read_back.lines(), output.lines());
    }

    #[test]
    fn test_persist_empty_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");

        persist(&MergedOutput::default(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_persist_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old content\nmore\n").unwrap();

        persist(&MergedOutput::new(vec!["new".into()]), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), format!("new{}", LINE_ENDING));
    }

    #[test]
    fn test_persist_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("out.txt");

        let err = persist(&MergedOutput::new(vec!["a".into()]), &path).unwrap_err();
        assert!(matches!(err, MergeError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        persist(&MergedOutput::new(vec!["a".into()]), &path).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_amend_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();

        amend_line(&path, 2, "TWO").unwrap();

        let lines = LineSource::load(&path).unwrap();
        assert_eq!(lines.lines(), &["one", "TWO", "three"]);
    }

    #[test]
    fn test_amend_line_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "one\n").unwrap();

        let err = amend_line(&path, 5, "x").unwrap_err();
        assert!(matches!(err, MergeError::LineOutOfRange { line_number: 5, len: 1, .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\n");
    }
}
