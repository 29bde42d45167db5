use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marker field of the old dialect.
pub const SWAGGER_KEY: &str = "swagger";
/// Marker field of the new dialect.
pub const OPENAPI_KEY: &str = "openapi";
/// The only old-dialect marker value that is converted.
pub const SWAGGER_MARKER: &str = "2.0";
/// Marker value emitted on every converted document.
pub const OPENAPI_MARKER: &str = "3.0.0";

/// Version carried by a dialect marker, e.g. `2.0` or `3.0.3`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaVersionError;

    /// Accepts `major.minor` and `major.minor.patch`; a missing patch is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(SchemaVersionError::InvalidFormat(s.to_string()));
        }

        let component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| SchemaVersionError::InvalidFormat(s.to_string()))
        };

        let major = component(parts[0])?;
        let minor = component(parts[1])?;
        let patch = match parts.get(2) {
            Some(part) => component(part)?,
            None => 0,
        };

        Ok(SchemaVersion::new(major, minor, patch))
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.major.cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
    }
}

#[derive(Debug, Error)]
pub enum SchemaVersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
}

/// Which API description dialect a document is written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// `swagger: "2.0"`, the only input that gets converted
    Swagger2,
    /// Any `openapi: "3.x.y"` document
    OpenApi3(SchemaVersion),
    Unknown,
}

impl Dialect {
    /// Detect the dialect from the root marker fields.
    ///
    /// YAML sources may carry an unquoted `swagger: 2.0`, which parses as a
    /// float; it is accepted alongside the string form. An integer `2` is not.
    pub fn detect(document: &Value) -> Self {
        match document.get(SWAGGER_KEY) {
            Some(Value::String(marker)) if marker == SWAGGER_MARKER => return Dialect::Swagger2,
            Some(Value::Number(marker)) if marker.is_f64() && marker.as_f64() == Some(2.0) => return Dialect::Swagger2,
            _ => {}
        }

        document
            .get(OPENAPI_KEY)
            .and_then(Value::as_str)
            .and_then(|marker| marker.parse::<SchemaVersion>().ok())
            .filter(|version| version.major == 3)
            .map_or(Dialect::Unknown, Dialect::OpenApi3)
    }

    pub fn is_convertible(&self) -> bool {
        matches!(self, Dialect::Swagger2)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Swagger2 => write!(f, "Swagger {}", SWAGGER_MARKER),
            Dialect::OpenApi3(version) => write!(f, "OpenAPI {}", version),
            Dialect::Unknown => write!(f, "unknown dialect"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_version_display() {
        let version = SchemaVersion::new(3, 0, 3);
        assert_eq!(version.to_string(), "3.0.3");
    }

    #[test]
    fn test_schema_version_from_str() {
        let version: SchemaVersion = "3.0.0".parse().unwrap();
        assert_eq!(version, SchemaVersion::new(3, 0, 0));

        let two_part: SchemaVersion = "2.0".parse().unwrap();
        assert_eq!(two_part, SchemaVersion::new(2, 0, 0));
    }

    #[test]
    fn test_schema_version_ordering() {
        let v1 = SchemaVersion::new(2, 0, 0);
        let v2 = SchemaVersion::new(3, 0, 0);
        let v3 = SchemaVersion::new(3, 1, 0);

        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn test_invalid_version_format() {
        assert!("invalid".parse::<SchemaVersion>().is_err());
        assert!("3".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
        assert!("3.x.0".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_detect_swagger2() {
        assert_eq!(Dialect::detect(&json!({"swagger": "2.0"})), Dialect::Swagger2);
        assert_eq!(Dialect::detect(&json!({"swagger": 2.0})), Dialect::Swagger2);
    }

    #[test]
    fn test_detect_other_swagger_markers_are_unknown() {
        assert_eq!(Dialect::detect(&json!({"swagger": "1.2"})), Dialect::Unknown);
        assert_eq!(Dialect::detect(&json!({"swagger": "2.0.0"})), Dialect::Unknown);
        assert_eq!(Dialect::detect(&json!({"swagger": 2})), Dialect::Unknown);
        assert_eq!(Dialect::detect(&json!({"swagger": 2.5})), Dialect::Unknown);
    }

    #[test]
    fn test_detect_openapi3() {
        assert_eq!(
            Dialect::detect(&json!({"openapi": "3.0.0"})),
            Dialect::OpenApi3(SchemaVersion::new(3, 0, 0))
        );
        assert_eq!(
            Dialect::detect(&json!({"openapi": "3.1.0"})),
            Dialect::OpenApi3(SchemaVersion::new(3, 1, 0))
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(Dialect::detect(&json!({"info": {}})), Dialect::Unknown);
        assert_eq!(Dialect::detect(&json!([1, 2])), Dialect::Unknown);
        assert!(!Dialect::Unknown.is_convertible());
        assert!(Dialect::Swagger2.is_convertible());
    }
}
