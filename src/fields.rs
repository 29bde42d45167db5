//! Shared field names and copy helpers for the mapping nodes of a document.

use serde_json::{Map, Value};

pub type Mapping = Map<String, Value>;

pub const REF_KEY: &str = "$ref";
pub const VENDOR_PREFIX: &str = "x-";
pub const X_EXAMPLE_KEY: &str = "x-example";

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const FORM_URLENCODED_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

pub fn is_vendor_extension(key: &str) -> bool {
    key.starts_with(VENDOR_PREFIX)
}

/// A mapping that only points elsewhere, e.g. `{"$ref": "#/parameters/limit"}`.
pub fn is_reference(node: &Mapping) -> bool {
    node.contains_key(REF_KEY)
}

/// Copy the listed fields that are present in `source`, in list order.
pub fn copy_fields(source: &Mapping, target: &mut Mapping, fields: &[&str]) {
    for field in fields {
        if let Some(value) = source.get(*field) {
            target.insert((*field).to_string(), value.clone());
        }
    }
}

/// Copy every vendor-extension key of `source` except those in `skip`.
pub fn copy_vendor_extensions(source: &Mapping, target: &mut Mapping, skip: &[&str]) {
    for (key, value) in source {
        if is_vendor_extension(key) && !skip.contains(&key.as_str()) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Human name of a node's variant, for warnings and errors.
pub fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Object(_) => "mapping",
        Value::Array(_) => "sequence",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}
