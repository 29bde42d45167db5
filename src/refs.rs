use serde_json::Value;
use tracing::trace;

use crate::fields::REF_KEY;

/// Old fragment prefix → new fragment prefix, one per relocated collection.
pub const REFERENCE_PREFIXES: [(&str, &str); 4] = [
    ("#/definitions/", "#/components/schemas/"),
    ("#/parameters/", "#/components/parameters/"),
    ("#/responses/", "#/components/responses/"),
    ("#/securityDefinitions/", "#/components/securitySchemes/"),
];

/// Rewrite every `$ref` string in the tree to the relocated collections.
///
/// Must run after the document has been restructured: it only touches
/// reference strings, never the collections they point at.
pub fn rewrite_references(node: Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(target) if key == REF_KEY => {
                            Value::String(rewrite_reference(&target))
                        }
                        other => rewrite_references(other),
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_references).collect()),
        scalar => scalar,
    }
}

/// Rewrite a single reference string.
///
/// The prefix rules apply to the fragment, so references into other files
/// (`common.json#/definitions/Error`) follow the same relocation.
pub fn rewrite_reference(reference: &str) -> String {
    let Some(fragment_start) = reference.find('#') else {
        return reference.to_string();
    };
    let (document, fragment) = reference.split_at(fragment_start);

    for (old, new) in REFERENCE_PREFIXES {
        if let Some(name) = fragment.strip_prefix(old) {
            let rewritten = format!("{}{}{}", document, new, name);
            trace!(from = reference, to = %rewritten, "rewrote reference");
            return rewritten;
        }
    }

    reference.to_string()
}
