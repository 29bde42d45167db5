use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::diagnostics::ConversionWarning;

/// Reporter for rendering batch reports in various formats
pub struct BatchReporter {
    output_format: ReportFormat,
}

/// Available output formats for batch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Yaml,
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted { warnings: Vec<ConversionWarning> },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Outcome of a whole batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, outcome: FileOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::new(path, FileOutcome::Failed { error: error.to_string() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchReport {
    pub fn new(files: Vec<FileReport>, dry_run: bool) -> Self {
        let mut summary = BatchSummary {
            total: files.len(),
            ..BatchSummary::default()
        };

        for file in &files {
            match &file.outcome {
                FileOutcome::Converted { warnings } => {
                    summary.converted += 1;
                    summary.warnings += warnings.len();
                }
                FileOutcome::Skipped { .. } => summary.skipped += 1,
                FileOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        Self { dry_run, files, summary }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

impl BatchReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &BatchReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => Ok(self.format_console_report(report)),
            ReportFormat::Json => self.format_json_report(report),
            ReportFormat::Yaml => self.format_yaml_report(report),
        }
    }

    fn format_console_report(&self, report: &BatchReport) -> String {
        let mut output = String::new();

        output.push_str("=== Swagger 2.0 → OpenAPI 3.0.0 ===\n\n");
        output.push_str(&format!("Found {} document(s)\n", report.summary.total));

        for file in &report.files {
            let path = file.path.display();
            match &file.outcome {
                FileOutcome::Converted { warnings } if warnings.is_empty() => {
                    output.push_str(&format!("  ✓ Converted {}\n", path));
                }
                FileOutcome::Converted { warnings } => {
                    output.push_str(&format!("  ✓ Converted {} ({} warning(s))\n", path, warnings.len()));
                    for warning in warnings {
                        output.push_str(&format!("     ⚠ {}\n", warning));
                    }
                }
                FileOutcome::Skipped { reason } => {
                    output.push_str(&format!("  ℹ Skipping {} - {}\n", path, reason));
                }
                FileOutcome::Failed { error } => {
                    output.push_str(&format!("  ❌ Error converting {}: {}\n", path, error));
                }
            }
        }

        output.push_str("\n=== Conversion Complete ===\n");
        output.push_str(&format!("Converted: {}\n", report.summary.converted));
        output.push_str(&format!("Skipped: {}\n", report.summary.skipped));
        output.push_str(&format!("Failed: {}\n", report.summary.failed));
        output.push_str(&format!("Warnings: {}\n", report.summary.warnings));

        if report.dry_run {
            output.push_str("\nThis was a dry run. Use without --dry-run to actually convert files.\n");
        }

        output
    }

    fn format_json_report(&self, report: &BatchReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report)
            .map(|json| json + "\n")
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format_yaml_report(&self, report: &BatchReport) -> Result<String, ReportError> {
        serde_yaml::to_string(report)
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for BatchReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
