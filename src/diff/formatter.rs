use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use super::Difference;

/// Output formats for a difference report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// One readable line per difference (default)
    #[default]
    Text,
    /// JSON document for scripting
    Json,
    /// Tab-separated `line<TAB>left<TAB>right`
    Compact,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    left: &'a Path,
    right: &'a Path,
    generated_at: String,
    differences: &'a [Difference],
}

/// Formats difference lists into text representations
pub struct DiffFormatter;

impl DiffFormatter {
    /// `Line N: File1 -> <left>, File2 -> <right>` per difference
    pub fn format_text(differences: &[Difference]) -> String {
        differences
            .iter()
            .map(|diff| {
                format!(
                    "Line {}: File1 -> {}, File2 -> {}",
                    diff.line_number(),
                    diff.left(),
                    diff.right()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_compact(differences: &[Difference]) -> String {
        differences
            .iter()
            .map(|diff| format!("{}\t{}\t{}", diff.line_number(), diff.left(), diff.right()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_json<P: AsRef<Path>>(
        differences: &[Difference],
        left_path: P,
        right_path: P,
    ) -> serde_json::Result<String> {
        let report = JsonReport {
            left: left_path.as_ref(),
            right: right_path.as_ref(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            differences,
        };
        serde_json::to_string_pretty(&report)
    }

    /// Summary such as `2 differing lines`
    pub fn format_stats(differences: &[Difference]) -> String {
        match differences.len() {
            0 => "No differences".to_string(),
            1 => "1 differing line".to_string(),
            n => format!("{} differing lines", n),
        }
    }

    /// Format with a header naming both inputs
    pub fn format<P: AsRef<Path>>(
        differences: &[Difference],
        format: ReportFormat,
        left_path: P,
        right_path: P,
    ) -> serde_json::Result<String> {
        let left_path = left_path.as_ref();
        let right_path = right_path.as_ref();

        Ok(match format {
            ReportFormat::Json => Self::format_json(differences, left_path, right_path)?,
            ReportFormat::Compact => Self::format_compact(differences),
            ReportFormat::Text => {
                let mut output = vec![
                    format!("--- {}", left_path.display()),
                    format!("+++ {}", right_path.display()),
                    format!(
                        "Compared at {}: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        Self::format_stats(differences)
                    ),
                ];
                if !differences.is_empty() {
                    output.push(Self::format_text(differences));
                }
                output.join("\n")
            }
        })
    }
}
