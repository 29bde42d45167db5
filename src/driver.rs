//! Batch driver: finds documents on disk, converts each one and writes it back.
//!
//! Every document is independent. Failures are recorded per file and never
//! stop the rest of the batch.

use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::{
    conversion_engine::{ConversionEngine, ConversionError, ConversionStatus},
    reporter::{BatchReport, FileOutcome, FileReport},
};

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub root: PathBuf,
    /// Lowercase extensions, without the dot
    pub extensions: Vec<String>,
    pub exclude: Vec<Regex>,
    pub jobs: usize,
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Directory {} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Unsupported extension '{0}' (expected json, yaml or yml)")]
    UnsupportedExtension(String),
}

/// Errors that fail a single document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("No document format for {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Text format of a document on disk, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    pub fn parse(self, text: &str) -> Result<Value, DocumentError> {
        let document = match self {
            DocumentFormat::Json => serde_json::from_str(text)?,
            DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(document)
    }

    /// Serialize with a trailing newline; key order is the tree's order.
    pub fn render(self, document: &Value) -> Result<String, DocumentError> {
        let mut text = match self {
            DocumentFormat::Json => serde_json::to_string_pretty(document)?,
            DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

impl DriverConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["json".to_string()],
            exclude: Vec::new(),
            jobs: default_jobs(),
            dry_run: false,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = Vec::new();
        for extension in extensions {
            let extension = extension.as_ref().trim_start_matches('.').to_ascii_lowercase();
            if DocumentFormat::from_extension(&extension).is_none() {
                return Err(ConfigError::UnsupportedExtension(extension));
            }
            accepted.push(extension);
        }
        self.extensions = accepted;
        Ok(self)
    }

    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.exclude.push(regex);
        }
        Ok(self)
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Patterns see the path relative to the root, never the root itself.
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path).to_string_lossy();
        self.exclude.iter().any(|pattern| pattern.is_match(&relative))
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase())
            .is_some_and(|extension| self.extensions.contains(&extension))
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(1)
}

/// Find candidate documents under the configured root, in file-name order.
pub fn discover(config: &DriverConfig) -> Result<Vec<PathBuf>, ConfigError> {
    if !config.root.is_dir() {
        return Err(ConfigError::MissingRoot(config.root.clone()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(&config.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !config.is_excluded(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && config.accepts(entry.path()) {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

/// Convert one document on disk. Never fails: errors become a `Failed` outcome.
pub fn convert_file(engine: &ConversionEngine, path: &Path, dry_run: bool) -> FileReport {
    match try_convert_file(engine, path, dry_run) {
        Ok(outcome) => FileReport::new(path, outcome),
        Err(err) => {
            error!(path = %path.display(), error = %err, "conversion failed");
            FileReport::failed(path, err)
        }
    }
}

fn try_convert_file(engine: &ConversionEngine, path: &Path, dry_run: bool) -> Result<FileOutcome, DocumentError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let result = engine.convert(format.parse(&text)?)?;

    if let ConversionStatus::Skipped(reason) = &result.status {
        info!(path = %path.display(), dialect = %result.source_dialect, %reason, "skipping");
        return Ok(FileOutcome::Skipped { reason: reason.to_string() });
    }

    let rendered = format.render(&result.document)?;

    if dry_run {
        info!(path = %path.display(), warnings = result.warnings.len(), "would convert (dry run)");
    } else {
        write_replacing(path, &rendered)?;
        info!(path = %path.display(), warnings = result.warnings.len(), "converted");
    }

    Ok(FileOutcome::Converted { warnings: result.warnings })
}

/// Write next to the target, then rename over it, so a failed write never
/// leaves a half-written document behind.
fn write_replacing(path: &Path, contents: &str) -> Result<(), DocumentError> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".converting");
    let staging = PathBuf::from(staging);

    let write_error = |source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Err(source) = fs::write(&staging, contents) {
        let _ = fs::remove_file(&staging);
        return Err(write_error(source));
    }
    fs::rename(&staging, path).map_err(|source| {
        let _ = fs::remove_file(&staging);
        write_error(source)
    })
}

/// Convert every discovered document, at most `config.jobs` at a time.
///
/// The report lists files in path order regardless of completion order.
pub async fn run_batch(config: &DriverConfig, engine: Arc<ConversionEngine>) -> Result<BatchReport, ConfigError> {
    let files = discover(config)?;
    info!(count = files.len(), root = %config.root.display(), "found documents");

    let permits = Arc::new(Semaphore::new(config.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for path in files {
        let engine = Arc::clone(&engine);
        let permits = Arc::clone(&permits);
        let dry_run = config.dry_run;

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let task_path = path.clone();
            match tokio::task::spawn_blocking(move || convert_file(&engine, &task_path, dry_run)).await {
                Ok(report) => report,
                Err(join_error) => {
                    error!(path = %path.display(), error = %join_error, "conversion task aborted");
                    FileReport::failed(path, join_error)
                }
            }
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(join_error) => error!(error = %join_error, "batch task aborted"),
        }
    }
    reports.sort_by(|a, b| a.path().cmp(b.path()));

    Ok(BatchReport::new(reports, config.dry_run))
}
