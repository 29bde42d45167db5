use serde_json::{json, Value};

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::fields::{copy_vendor_extensions, is_reference, node_kind, Mapping, JSON_MEDIA_TYPE};

/// Name given to the single example carried over from the old `examples` map.
pub const EXAMPLE_NAME: &str = "example";

/// Convert a response to the content-typed form.
///
/// The inline schema lands under `content["application/json"]`. Examples are
/// merged into content entries by media type, but only when a schema produced
/// a content structure; otherwise they are dropped with a warning.
pub fn convert_response(response: &Mapping, at: &str, diagnostics: &mut Diagnostics) -> Mapping {
    if is_reference(response) {
        return response.clone();
    }

    let mut converted = Mapping::new();
    converted.insert(
        "description".to_string(),
        response.get("description").cloned().unwrap_or_else(|| json!("")),
    );

    let mut content = response.get("schema").map(|schema| {
        let mut content = Mapping::new();
        content.insert(JSON_MEDIA_TYPE.to_string(), json!({ "schema": schema }));
        content
    });

    match (response.get("examples"), content.as_mut()) {
        (Some(Value::Object(examples)), Some(content)) => merge_examples(content, examples),
        (Some(Value::Object(examples)), None) if !examples.is_empty() => {
            diagnostics.warn(
                at,
                WarningKind::ExamplesDropped,
                format!("{} example(s) dropped: response has no schema", examples.len()),
            );
        }
        (Some(Value::Object(_)), None) | (None, _) => {}
        (Some(other), _) => {
            diagnostics.warn(
                at,
                WarningKind::UnexpectedShape,
                format!("examples is a {}, expected a mapping; dropped", node_kind(other)),
            );
        }
    }

    if let Some(content) = content {
        converted.insert("content".to_string(), Value::Object(content));
    }

    if let Some(headers) = response.get("headers") {
        converted.insert("headers".to_string(), headers.clone());
    }

    copy_vendor_extensions(response, &mut converted, &[]);

    converted
}

/// Put each example under `content[media].examples.example.value`, creating
/// media entries that the schema did not.
fn merge_examples(content: &mut Mapping, examples: &Mapping) {
    for (media_type, example) in examples {
        if !content.contains_key(media_type) {
            content.insert(media_type.clone(), json!({}));
        }

        if let Some(Value::Object(media)) = content.get_mut(media_type) {
            let named = media
                .entry("examples")
                .or_insert_with(|| json!({}));
            if let Value::Object(named) = named {
                named.insert(EXAMPLE_NAME.to_string(), json!({ "value": example }));
            }
        }
    }
}
