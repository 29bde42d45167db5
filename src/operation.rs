use serde_json::{json, Value};
use tracing::debug;

use crate::diagnostics::{child_path, Diagnostics, WarningKind};
use crate::fields::{
    copy_fields, copy_vendor_extensions, node_kind, Mapping, FORM_URLENCODED_MEDIA_TYPE,
    JSON_MEDIA_TYPE, MULTIPART_MEDIA_TYPE,
};
use crate::parameter::{convert_parameter, resolve_shared_parameter, ParameterOutcome, Relocation};
use crate::response::convert_response;

/// Operation keys of a path item, in output order.
pub const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Metadata copied verbatim from the old operation.
const OPERATION_FIELDS: [&str; 7] = [
    "tags",
    "summary",
    "description",
    "operationId",
    "deprecated",
    "security",
    "externalDocs",
];

/// Fields a form-data parameter carries over onto its schema property.
const FORM_PROPERTY_FIELDS: [&str; 3] = ["description", "default", "enum"];

/// Parameter list of an operation, split by where each entry ends up.
#[derive(Debug, Default)]
struct PartitionedParameters<'a> {
    listed: Vec<Value>,
    body: Vec<&'a Mapping>,
    form_data: Vec<&'a Mapping>,
}

impl<'a> PartitionedParameters<'a> {
    fn partition(parameters: &'a [Value], shared: &'a Mapping) -> Self {
        let mut partitioned = Self::default();

        for parameter in parameters {
            let Value::Object(fields) = parameter else {
                partitioned.listed.push(parameter.clone());
                continue;
            };

            let target = resolve_shared_parameter(fields, shared);
            let source = target.unwrap_or(fields);
            match convert_parameter(source) {
                ParameterOutcome::Relocated(Relocation::Body) => partitioned.body.push(source),
                ParameterOutcome::Relocated(Relocation::FormData) => partitioned.form_data.push(source),
                // A reference to an ordinary shared parameter stays a reference.
                _ if target.is_some() => partitioned.listed.push(parameter.clone()),
                rendered => {
                    if let Some(converted) = rendered.into_rendered() {
                        partitioned.listed.push(Value::Object(converted));
                    }
                }
            }
        }

        partitioned
    }
}

/// Convert one operation: parameters, request body and responses.
///
/// A request body comes from the first body parameter when there is one,
/// otherwise from the form-data parameters. When both kinds are present the
/// form-data parameters are dropped and a warning is recorded.
///
/// `shared_parameters` is the document's top-level `parameters` collection.
/// References into it that name body or form-data parameters are resolved
/// and folded into the request body, since their targets do not survive
/// under `components.parameters`.
pub fn convert_operation(
    operation: &Mapping,
    shared_parameters: &Mapping,
    at: &str,
    diagnostics: &mut Diagnostics,
) -> Mapping {
    let mut converted = Mapping::new();
    copy_fields(operation, &mut converted, &OPERATION_FIELDS);

    match operation.get("parameters") {
        Some(Value::Array(parameters)) => {
            convert_parameters(
                parameters,
                shared_parameters,
                &mut converted,
                &child_path(at, "parameters"),
                diagnostics,
            );
        }
        Some(other) => {
            diagnostics.warn(
                child_path(at, "parameters"),
                WarningKind::UnexpectedShape,
                format!("parameters is a {}, expected a sequence; copied as is", node_kind(other)),
            );
            converted.insert("parameters".to_string(), other.clone());
        }
        None => {}
    }

    match operation.get("responses") {
        Some(Value::Object(responses)) => {
            let responses_path = child_path(at, "responses");
            let mut converted_responses = Mapping::new();
            for (status, response) in responses {
                let response = match response {
                    Value::Object(response) => Value::Object(convert_response(
                        response,
                        &child_path(&responses_path, status),
                        diagnostics,
                    )),
                    other => other.clone(),
                };
                converted_responses.insert(status.clone(), response);
            }
            converted.insert("responses".to_string(), Value::Object(converted_responses));
        }
        Some(other) => {
            diagnostics.warn(
                child_path(at, "responses"),
                WarningKind::UnexpectedShape,
                format!("responses is a {}, expected a mapping; copied as is", node_kind(other)),
            );
            converted.insert("responses".to_string(), other.clone());
        }
        None => {}
    }

    copy_vendor_extensions(operation, &mut converted, &[]);

    converted
}

fn convert_parameters(
    parameters: &[Value],
    shared: &Mapping,
    converted: &mut Mapping,
    at: &str,
    diagnostics: &mut Diagnostics,
) {
    let partitioned = PartitionedParameters::partition(parameters, shared);

    if !partitioned.listed.is_empty() {
        converted.insert("parameters".to_string(), Value::Array(partitioned.listed));
    }

    let request_body = if let Some((first, extra)) = partitioned.body.split_first() {
        if !extra.is_empty() {
            diagnostics.warn(
                at,
                WarningKind::ExtraBodyParameter,
                format!("{} additional body parameter(s) ignored; only the first is used", extra.len()),
            );
        }
        if !partitioned.form_data.is_empty() {
            diagnostics.warn(
                at,
                WarningKind::FormDataShadowedByBody,
                format!(
                    "{} form-data parameter(s) dropped: a body parameter defines the request body",
                    partitioned.form_data.len()
                ),
            );
        }
        debug!(at, "relocating body parameter to requestBody");
        Some(request_body_from_body(first))
    } else if !partitioned.form_data.is_empty() {
        debug!(at, fields = partitioned.form_data.len(), "relocating form-data parameters to requestBody");
        Some(request_body_from_form_data(&partitioned.form_data, at, diagnostics))
    } else {
        None
    };

    if let Some(request_body) = request_body {
        converted.insert("requestBody".to_string(), Value::Object(request_body));
    }
}

fn request_body_from_body(parameter: &Mapping) -> Mapping {
    let schema = parameter.get("schema").cloned().unwrap_or_else(|| json!({}));

    let mut request_body = Mapping::new();
    request_body.insert(
        "required".to_string(),
        parameter.get("required").cloned().unwrap_or(Value::Bool(false)),
    );
    request_body.insert(
        "content".to_string(),
        json!({ JSON_MEDIA_TYPE: { "schema": schema } }),
    );
    copy_fields(parameter, &mut request_body, &["description"]);

    request_body
}

/// Fold form fields into one object schema. A `file` field switches the
/// encoding to multipart, the only one that can carry binary parts.
fn request_body_from_form_data(fields: &[&Mapping], at: &str, diagnostics: &mut Diagnostics) -> Mapping {
    let mut properties = Mapping::new();
    let mut required = Vec::new();
    let mut carries_file = false;

    for field in fields {
        let Some(name) = field.get("name").and_then(Value::as_str) else {
            diagnostics.warn(
                at,
                WarningKind::UnnamedFormField,
                "form-data parameter without a name skipped",
            );
            continue;
        };

        let mut property = Mapping::new();
        match field.get("type") {
            Some(Value::String(primitive)) if primitive == "file" => {
                carries_file = true;
                property.insert("type".to_string(), json!("string"));
                property.insert("format".to_string(), json!("binary"));
            }
            primitive => {
                property.insert(
                    "type".to_string(),
                    primitive.cloned().unwrap_or_else(|| json!("string")),
                );
                copy_fields(field, &mut property, &["format"]);
            }
        }
        copy_fields(field, &mut property, &FORM_PROPERTY_FIELDS);
        properties.insert(name.to_string(), Value::Object(property));

        if field.get("required").and_then(Value::as_bool).unwrap_or(false) {
            required.push(json!(name));
        }
    }

    let mut schema = Mapping::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    let has_required = !required.is_empty();
    if has_required {
        schema.insert("required".to_string(), Value::Array(required));
    }

    let media_type = if carries_file {
        MULTIPART_MEDIA_TYPE
    } else {
        FORM_URLENCODED_MEDIA_TYPE
    };

    let mut request_body = Mapping::new();
    request_body.insert("required".to_string(), Value::Bool(has_required));
    request_body.insert(
        "content".to_string(),
        json!({ media_type: { "schema": schema } }),
    );

    request_body
}
