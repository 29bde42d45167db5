use serde_json::Value;
use std::fmt;

use crate::fields::{
    copy_fields, copy_vendor_extensions, is_reference, Mapping, REF_KEY, X_EXAMPLE_KEY,
};

pub const LOCATION_KEY: &str = "in";

/// Fragment prefix of a reference into the document's own `parameters`.
const SHARED_PARAMETER_PREFIX: &str = "#/parameters/";

/// Fields copied verbatim onto the converted parameter.
const IDENTITY_FIELDS: [&str; 6] = [
    "name",
    "in",
    "description",
    "required",
    "deprecated",
    "allowEmptyValue",
];

/// Type-shape fields moved into the nested `schema` of the converted parameter.
const SCHEMA_FIELDS: [&str; 15] = [
    "type",
    "format",
    "items",
    "collectionFormat",
    "default",
    "maximum",
    "minimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
];

/// Value of a parameter's `in` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
    Other(String),
}

impl ParameterLocation {
    /// Location of a parameter, `None` when `in` is missing or not a string.
    pub fn of(parameter: &Mapping) -> Option<Self> {
        parameter.get(LOCATION_KEY).and_then(Value::as_str).map(Self::from)
    }

    /// Where a parameter in this location ends up, if it leaves the parameter list.
    pub fn relocation(&self) -> Option<Relocation> {
        match self {
            ParameterLocation::Body => Some(Relocation::Body),
            ParameterLocation::FormData => Some(Relocation::FormData),
            _ => None,
        }
    }
}

impl From<&str> for ParameterLocation {
    fn from(location: &str) -> Self {
        match location {
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "path" => ParameterLocation::Path,
            "cookie" => ParameterLocation::Cookie,
            "body" => ParameterLocation::Body,
            "formData" => ParameterLocation::FormData,
            other => ParameterLocation::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
            ParameterLocation::Other(other) => other.as_str(),
        };
        f.write_str(name)
    }
}

/// Request-body source a relocated parameter feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    Body,
    FormData,
}

/// Result of converting one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterOutcome {
    /// The parameter in its new shape. May be empty when the source had no known fields.
    Rendered(Mapping),
    /// The parameter belongs in a request body and produces nothing in a parameter list.
    Relocated(Relocation),
}

impl ParameterOutcome {
    /// The rendered parameter, unless it is relocated or empty.
    pub fn into_rendered(self) -> Option<Mapping> {
        match self {
            ParameterOutcome::Rendered(parameter) if !parameter.is_empty() => Some(parameter),
            _ => None,
        }
    }
}

/// Convert a parameter to the schema-wrapped form.
///
/// Reference objects are returned unchanged; their targets are relocated by
/// the reference rewriter.
pub fn convert_parameter(parameter: &Mapping) -> ParameterOutcome {
    if is_reference(parameter) {
        return ParameterOutcome::Rendered(parameter.clone());
    }

    if let Some(relocation) = ParameterLocation::of(parameter).and_then(|location| location.relocation()) {
        return ParameterOutcome::Relocated(relocation);
    }

    let mut rendered = Mapping::new();
    copy_fields(parameter, &mut rendered, &IDENTITY_FIELDS);

    let mut schema = Mapping::new();
    copy_fields(parameter, &mut schema, &SCHEMA_FIELDS);
    if !schema.is_empty() {
        rendered.insert("schema".to_string(), Value::Object(schema));
    }

    if let Some(example) = parameter.get(X_EXAMPLE_KEY) {
        rendered.insert("example".to_string(), example.clone());
    }

    copy_vendor_extensions(parameter, &mut rendered, &[X_EXAMPLE_KEY]);

    ParameterOutcome::Rendered(rendered)
}

/// Look up the shared parameter a local `#/parameters/<name>` reference points at.
///
/// Returns `None` for anything else: inline parameters, external references,
/// and names missing from `shared`.
pub fn resolve_shared_parameter<'a>(parameter: &Mapping, shared: &'a Mapping) -> Option<&'a Mapping> {
    let name = parameter
        .get(REF_KEY)?
        .as_str()?
        .strip_prefix(SHARED_PARAMETER_PREFIX)?
        .replace("~1", "/")
        .replace("~0", "~");
    shared.get(&name)?.as_object()
}
