use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A lossy or unusual decision taken while converting a document.
///
/// Warnings never change the produced tree; they only explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    pub message: String,
    pub field_path: Option<String>,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// More than one body parameter on an operation; only the first is used
    ExtraBodyParameter,
    /// Form-data parameters ignored because a body parameter built the request body
    FormDataShadowedByBody,
    /// Response examples without a schema have no content entry to land in
    ExamplesDropped,
    /// Body or form-data parameter outside an operation has no request body to move to
    RelocatedParameterDropped,
    UnnamedFormField,
    /// Node of an unexpected type, copied verbatim
    UnexpectedShape,
}

impl ConversionWarning {
    pub fn new(message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            message: message.into(),
            field_path: None,
            kind,
        }
    }

    pub fn with_field_path(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field_path {
            Some(path) => write!(f, "[{}] {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Collects warnings for one document conversion.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<ConversionWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, field_path: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        let warning = ConversionWarning::new(message, kind).with_field_path(field_path);
        debug!(kind = ?warning.kind, "{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ConversionWarning> {
        self.warnings
    }
}

/// Join a child key onto a dotted field path.
pub(crate) fn child_path(parent: &str, key: impl fmt::Display) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
