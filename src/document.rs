use serde_json::{json, Value};
use tracing::debug;

use crate::dialect::{Dialect, OPENAPI_KEY, OPENAPI_MARKER};
use crate::diagnostics::{child_path, Diagnostics, WarningKind};
use crate::fields::{copy_fields, copy_vendor_extensions, is_reference, node_kind, Mapping};
use crate::operation::{convert_operation, HTTP_METHODS};
use crate::parameter::{convert_parameter, resolve_shared_parameter, ParameterOutcome};
use crate::response::convert_response;

/// Root metadata copied verbatim, ahead of the synthesized servers.
const METADATA_FIELDS: [&str; 3] = ["info", "externalDocs", "tags"];

const DEFAULT_SCHEME: &str = "https";

/// Restructure a whole document.
///
/// Anything that is not a `swagger: "2.0"` document is returned untouched:
/// already converted documents and unrelated files are not errors. The result
/// still carries old-dialect `$ref` strings; run
/// [`rewrite_references`](crate::refs::rewrite_references) over it afterwards.
pub fn convert_document(document: Value, diagnostics: &mut Diagnostics) -> Value {
    if !Dialect::detect(&document).is_convertible() {
        return document;
    }

    match document {
        Value::Object(root) => Value::Object(convert_root(&root, diagnostics)),
        other => other,
    }
}

fn convert_root(root: &Mapping, diagnostics: &mut Diagnostics) -> Mapping {
    let mut converted = Mapping::new();
    converted.insert(OPENAPI_KEY.to_string(), json!(OPENAPI_MARKER));
    copy_fields(root, &mut converted, &METADATA_FIELDS);

    if let Some(servers) = synthesize_servers(root) {
        converted.insert("servers".to_string(), servers);
    }

    let no_shared_parameters = Mapping::new();
    let shared_parameters = root
        .get("parameters")
        .and_then(Value::as_object)
        .unwrap_or(&no_shared_parameters);

    if let Some(paths) = root.get("paths") {
        converted.insert(
            "paths".to_string(),
            convert_paths(paths, shared_parameters, diagnostics),
        );
    }

    let components = convert_components(root, diagnostics);
    if components.values().any(is_non_empty) {
        converted.insert("components".to_string(), Value::Object(components));
    }

    copy_fields(root, &mut converted, &["security"]);
    copy_vendor_extensions(root, &mut converted, &[]);
    copy_fields(root, &mut converted, &["id"]);

    converted
}

/// Build `servers` from `host`, `basePath` and `schemes`.
///
/// `host` gates the whole list: without it there is nothing to put before
/// the base path, so no servers are emitted even when schemes are declared.
pub fn synthesize_servers(root: &Mapping) -> Option<Value> {
    let host = root
        .get("host")
        .and_then(Value::as_str)
        .filter(|host| !host.is_empty())?;
    let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");

    let mut schemes: Vec<&str> = root
        .get("schemes")
        .and_then(Value::as_array)
        .map(|schemes| schemes.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if schemes.is_empty() {
        schemes.push(DEFAULT_SCHEME);
    }

    let servers = schemes
        .into_iter()
        .map(|scheme| json!({ "url": format!("{}://{}{}", scheme, host, base_path) }))
        .collect();

    Some(Value::Array(servers))
}

fn convert_paths(paths: &Value, shared: &Mapping, diagnostics: &mut Diagnostics) -> Value {
    let Value::Object(paths) = paths else {
        diagnostics.warn(
            "paths",
            WarningKind::UnexpectedShape,
            format!("paths is a {}, expected a mapping; copied as is", node_kind(paths)),
        );
        return paths.clone();
    };

    let mut converted = Mapping::new();
    for (path, item) in paths {
        let item = match item {
            Value::Object(item) if !is_reference(item) => {
                Value::Object(convert_path_item(item, shared, &child_path("paths", path), diagnostics))
            }
            other => other.clone(),
        };
        converted.insert(path.clone(), item);
    }

    Value::Object(converted)
}

fn convert_path_item(
    item: &Mapping,
    shared: &Mapping,
    at: &str,
    diagnostics: &mut Diagnostics,
) -> Mapping {
    let mut converted = Mapping::new();

    if let Some(parameters) = item.get("parameters") {
        let parameters_path = child_path(at, "parameters");
        match parameters {
            Value::Array(parameters) => {
                let mut kept = Vec::new();
                for parameter in parameters {
                    match parameter {
                        Value::Object(fields) => {
                            if let Some(rendered) =
                                convert_shared_parameter(fields, shared, &parameters_path, diagnostics)
                            {
                                kept.push(Value::Object(rendered));
                            }
                        }
                        other => kept.push(other.clone()),
                    }
                }
                if !kept.is_empty() {
                    converted.insert("parameters".to_string(), Value::Array(kept));
                }
            }
            other => {
                diagnostics.warn(
                    parameters_path,
                    WarningKind::UnexpectedShape,
                    format!("parameters is a {}, expected a sequence; copied as is", node_kind(other)),
                );
                converted.insert("parameters".to_string(), other.clone());
            }
        }
    }

    for method in HTTP_METHODS {
        let Some(operation) = item.get(method) else {
            continue;
        };
        let operation_path = child_path(at, method);
        let operation = match operation {
            Value::Object(operation) => {
                Value::Object(convert_operation(operation, shared, &operation_path, diagnostics))
            }
            other => {
                diagnostics.warn(
                    operation_path,
                    WarningKind::UnexpectedShape,
                    format!("operation is a {}, expected a mapping; copied as is", node_kind(other)),
                );
                other.clone()
            }
        };
        converted.insert(method.to_string(), operation);
    }

    copy_vendor_extensions(item, &mut converted, &[]);

    converted
}

/// Convert a parameter that lives outside an operation. Body and form-data
/// parameters have no request body to move into there, so they are dropped,
/// and so are references to them.
fn convert_shared_parameter(
    parameter: &Mapping,
    shared: &Mapping,
    at: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Mapping> {
    let target = resolve_shared_parameter(parameter, shared);
    match convert_parameter(target.unwrap_or(parameter)) {
        ParameterOutcome::Relocated(relocation) => {
            let name = target
                .unwrap_or(parameter)
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>");
            diagnostics.warn(
                at,
                WarningKind::RelocatedParameterDropped,
                format!("{:?} parameter '{}' cannot become a request body here; dropped", relocation, name),
            );
            None
        }
        _ if target.is_some() => Some(parameter.clone()),
        rendered => rendered.into_rendered(),
    }
}

/// Relocate the four shared collections under `components`.
///
/// Sub-collections are listed in output order; the caller decides whether
/// the whole structure is worth emitting.
fn convert_components(root: &Mapping, diagnostics: &mut Diagnostics) -> Mapping {
    let mut components = Mapping::new();

    if let Some(definitions) = root.get("definitions") {
        debug!("relocating definitions to components.schemas");
        components.insert("schemas".to_string(), definitions.clone());
    }

    match root.get("parameters") {
        Some(Value::Object(parameters)) => {
            let mut converted = Mapping::new();
            for (name, parameter) in parameters {
                let at = child_path("parameters", name);
                match parameter {
                    Value::Object(fields) => {
                        if let Some(rendered) =
                            convert_shared_parameter(fields, parameters, &at, diagnostics)
                        {
                            converted.insert(name.clone(), Value::Object(rendered));
                        }
                    }
                    other => {
                        converted.insert(name.clone(), other.clone());
                    }
                }
            }
            if !converted.is_empty() {
                components.insert("parameters".to_string(), Value::Object(converted));
            }
        }
        Some(other) => relocate_verbatim(&mut components, "parameters", other, diagnostics),
        None => {}
    }

    match root.get("responses") {
        Some(Value::Object(responses)) => {
            let mut converted = Mapping::new();
            for (name, response) in responses {
                let response = match response {
                    Value::Object(response) => Value::Object(convert_response(
                        response,
                        &child_path("responses", name),
                        diagnostics,
                    )),
                    other => other.clone(),
                };
                converted.insert(name.clone(), response);
            }
            if !converted.is_empty() {
                components.insert("responses".to_string(), Value::Object(converted));
            }
        }
        Some(other) => relocate_verbatim(&mut components, "responses", other, diagnostics),
        None => {}
    }

    if let Some(security_definitions) = root.get("securityDefinitions") {
        debug!("relocating securityDefinitions to components.securitySchemes");
        components.insert("securitySchemes".to_string(), security_definitions.clone());
    }

    components
}

fn relocate_verbatim(components: &mut Mapping, key: &str, collection: &Value, diagnostics: &mut Diagnostics) {
    diagnostics.warn(
        key,
        WarningKind::UnexpectedShape,
        format!("{} is a {}, expected a mapping; copied as is", key, node_kind(collection)),
    );
    components.insert(key.to_string(), collection.clone());
}

fn is_non_empty(collection: &Value) -> bool {
    match collection {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Null => false,
        _ => true,
    }
}
