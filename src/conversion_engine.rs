use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::{
    dialect::{Dialect, SchemaVersion},
    diagnostics::{ConversionWarning, Diagnostics},
    document::convert_document,
    fields::node_kind,
    refs::rewrite_references,
};

/// Converts Swagger 2.0 documents to OpenAPI 3.0.0.
///
/// Holds no per-document state, so one engine can be shared by every worker
/// of a batch.
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    _private: (),
}

/// Result of converting one document
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub document: Value,
    pub status: ConversionStatus,
    pub source_dialect: Dialect,
    pub warnings: Vec<ConversionWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Converted,
    /// The document was returned unchanged
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyConverted(SchemaVersion),
    NotSwagger2,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyConverted(version) => write!(f, "already OpenAPI {}", version),
            SkipReason::NotSwagger2 => write!(f, "not a Swagger 2.0 file"),
        }
    }
}

/// Errors that can occur during conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Document root must be a mapping, found a {0}")]
    RootNotMapping(&'static str),
}

impl ConversionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a parsed document.
    ///
    /// Documents that are not Swagger 2.0 come back unchanged with a
    /// `Skipped` status, which makes the conversion idempotent.
    pub fn convert(&self, document: Value) -> Result<ConversionResult, ConversionError> {
        if !document.is_object() {
            return Err(ConversionError::RootNotMapping(node_kind(&document)));
        }

        let source_dialect = Dialect::detect(&document);
        let skip_reason = match &source_dialect {
            Dialect::Swagger2 => None,
            Dialect::OpenApi3(version) => Some(SkipReason::AlreadyConverted(version.clone())),
            Dialect::Unknown => Some(SkipReason::NotSwagger2),
        };

        if let Some(reason) = skip_reason {
            debug!(%reason, "skipping document");
            return Ok(ConversionResult {
                document,
                status: ConversionStatus::Skipped(reason),
                source_dialect,
                warnings: Vec::new(),
            });
        }

        let mut diagnostics = Diagnostics::new();
        let restructured = convert_document(document, &mut diagnostics);
        let document = rewrite_references(restructured);
        let warnings = diagnostics.into_warnings();
        debug!(warnings = warnings.len(), "converted document");

        Ok(ConversionResult {
            document,
            status: ConversionStatus::Converted,
            source_dialect,
            warnings,
        })
    }
}

impl ConversionResult {
    pub fn is_converted(&self) -> bool {
        self.status == ConversionStatus::Converted
    }
}
