// Swagger 2.0 → OpenAPI 3.0.0 document conversion
pub mod conversion_engine;
pub mod diagnostics;
pub mod dialect;
pub mod document;
pub mod driver;
pub mod fields;
pub mod operation;
pub mod parameter;
pub mod refs;
pub mod reporter;
pub mod response;

// Re-export core types for convenience
pub use conversion_engine::{
    ConversionEngine, ConversionError, ConversionResult, ConversionStatus, SkipReason,
};
pub use diagnostics::{ConversionWarning, WarningKind};
pub use dialect::{Dialect, SchemaVersion};
pub use document::convert_document;
pub use driver::{run_batch, ConfigError, DriverConfig};
pub use operation::convert_operation;
pub use parameter::{convert_parameter, resolve_shared_parameter, ParameterOutcome, Relocation};
pub use refs::rewrite_references;
pub use reporter::{BatchReport, BatchReporter, FileOutcome, FileReport, ReportFormat};
pub use response::convert_response;
