//! End-to-end conversion of whole documents through the public API.

use serde_json::{json, Value};
use swagger_upgrade::{ConversionEngine, ConversionStatus, SkipReason, WarningKind};

fn convert(document: Value) -> Value {
    ConversionEngine::new()
        .convert(document)
        .expect("conversion should succeed")
        .document
}

fn petstore() -> Value {
    json!({
        "swagger": "2.0",
        "info": {"title": "Swagger Petstore", "version": "1.0.0"},
        "host": "petstore.swagger.io",
        "basePath": "/v2",
        "schemes": ["https", "http"],
        "consumes": ["application/json"],
        "produces": ["application/json"],
        "tags": [{"name": "pet"}],
        "paths": {
            "/pet": {
                "post": {
                    "tags": ["pet"],
                    "summary": "Add a new pet to the store",
                    "operationId": "addPet",
                    "consumes": ["application/json", "application/xml"],
                    "parameters": [{
                        "in": "body",
                        "name": "body",
                        "description": "Pet object that needs to be added to the store",
                        "required": true,
                        "schema": {"$ref": "#/definitions/Pet"}
                    }],
                    "responses": {"405": {"description": "Invalid input"}},
                    "security": [{"petstore_auth": ["write:pets"]}]
                }
            },
            "/pet/{petId}": {
                "parameters": [{"$ref": "#/parameters/petId"}],
                "get": {
                    "operationId": "getPetById",
                    "responses": {
                        "200": {
                            "description": "successful operation",
                            "schema": {"$ref": "#/definitions/Pet"},
                            "examples": {"application/json": {"id": 1, "name": "doggie"}}
                        },
                        "404": {"$ref": "#/responses/NotFound"}
                    }
                },
                "post": {
                    "operationId": "updatePetWithForm",
                    "parameters": [
                        {"name": "name", "in": "formData", "type": "string", "required": true},
                        {"name": "status", "in": "formData", "type": "string"}
                    ],
                    "responses": {"405": {"description": "Invalid input"}}
                }
            }
        },
        "parameters": {
            "petId": {"name": "petId", "in": "path", "required": true, "type": "integer", "format": "int64"}
        },
        "responses": {
            "NotFound": {"description": "Pet not found", "schema": {"$ref": "#/definitions/ApiResponse"}}
        },
        "securityDefinitions": {
            "petstore_auth": {
                "type": "oauth2",
                "authorizationUrl": "https://petstore.swagger.io/oauth/dialog",
                "flow": "implicit",
                "scopes": {"write:pets": "modify pets in your account"}
            }
        },
        "definitions": {
            "Pet": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "name": {"type": "string"},
                    "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}
                }
            },
            "Tag": {"type": "object", "properties": {"name": {"type": "string"}}},
            "ApiResponse": {"type": "object"}
        },
        "x-generated-by": "hand"
    })
}

#[test]
fn converts_petstore() {
    let converted = convert(petstore());

    let expected = json!({
        "openapi": "3.0.0",
        "info": {"title": "Swagger Petstore", "version": "1.0.0"},
        "tags": [{"name": "pet"}],
        "servers": [
            {"url": "https://petstore.swagger.io/v2"},
            {"url": "http://petstore.swagger.io/v2"}
        ],
        "paths": {
            "/pet": {
                "post": {
                    "tags": ["pet"],
                    "summary": "Add a new pet to the store",
                    "operationId": "addPet",
                    "security": [{"petstore_auth": ["write:pets"]}],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}
                        },
                        "description": "Pet object that needs to be added to the store"
                    },
                    "responses": {"405": {"description": "Invalid input"}}
                }
            },
            "/pet/{petId}": {
                "parameters": [{"$ref": "#/components/parameters/petId"}],
                "get": {
                    "operationId": "getPetById",
                    "responses": {
                        "200": {
                            "description": "successful operation",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/Pet"},
                                    "examples": {"example": {"value": {"id": 1, "name": "doggie"}}}
                                }
                            }
                        },
                        "404": {"$ref": "#/components/responses/NotFound"}
                    }
                },
                "post": {
                    "operationId": "updatePetWithForm",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/x-www-form-urlencoded": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "name": {"type": "string"},
                                        "status": {"type": "string"}
                                    },
                                    "required": ["name"]
                                }
                            }
                        }
                    },
                    "responses": {"405": {"description": "Invalid input"}}
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "id": {"type": "integer", "format": "int64"},
                        "name": {"type": "string"},
                        "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
                    }
                },
                "Tag": {"type": "object", "properties": {"name": {"type": "string"}}},
                "ApiResponse": {"type": "object"}
            },
            "parameters": {
                "petId": {
                    "name": "petId",
                    "in": "path",
                    "required": true,
                    "schema": {"type": "integer", "format": "int64"}
                }
            },
            "responses": {
                "NotFound": {
                    "description": "Pet not found",
                    "content": {
                        "application/json": {"schema": {"$ref": "#/components/schemas/ApiResponse"}}
                    }
                }
            },
            "securitySchemes": {
                "petstore_auth": {
                    "type": "oauth2",
                    "authorizationUrl": "https://petstore.swagger.io/oauth/dialog",
                    "flow": "implicit",
                    "scopes": {"write:pets": "modify pets in your account"}
                }
            }
        },
        "x-generated-by": "hand"
    });

    assert_eq!(converted, expected);
}

#[test]
fn already_converted_document_is_returned_unchanged() {
    let document = convert(petstore());

    let result = ConversionEngine::new().convert(document.clone()).unwrap();

    assert_eq!(result.document, document);
    assert!(matches!(
        result.status,
        ConversionStatus::Skipped(SkipReason::AlreadyConverted(_))
    ));
}

#[test]
fn unrecognized_document_is_returned_unchanged() {
    let document = json!({"name": "not an api", "definitions": {"A": {"$ref": "#/definitions/B"}}});

    assert_eq!(convert(document.clone()), document);
}

#[test]
fn converting_twice_matches_converting_once() {
    let once = convert(petstore());
    let twice = convert(once.clone());

    assert_eq!(once, twice);
}

#[test]
fn synthesizes_servers_from_host_base_path_and_schemes() {
    let converted = convert(json!({
        "swagger": "2.0",
        "host": "api.example.com",
        "basePath": "/v1",
        "schemes": ["https", "http"]
    }));

    assert_eq!(
        converted["servers"],
        json!([{"url": "https://api.example.com/v1"}, {"url": "http://api.example.com/v1"}])
    );
}

#[test]
fn omits_servers_without_host() {
    let converted = convert(json!({"swagger": "2.0", "basePath": "/v1", "schemes": ["http"]}));

    assert!(converted.get("servers").is_none());
}

#[test]
fn relocates_body_parameter_to_request_body() {
    let converted = convert(json!({
        "swagger": "2.0",
        "paths": {"/items": {"post": {"parameters": [
            {"in": "body", "name": "payload", "required": true, "schema": {"type": "object"}}
        ]}}}
    }));

    let operation = &converted["paths"]["/items"]["post"];
    assert_eq!(operation["requestBody"]["required"], json!(true));
    assert_eq!(
        operation["requestBody"]["content"]["application/json"]["schema"],
        json!({"type": "object"})
    );
    assert!(operation.get("parameters").is_none());
}

#[test]
fn aggregates_form_data_parameters() {
    let converted = convert(json!({
        "swagger": "2.0",
        "paths": {"/login": {"post": {"parameters": [
            {"in": "formData", "name": "user", "type": "string", "required": true},
            {"in": "formData", "name": "remember", "type": "boolean"}
        ]}}}
    }));

    let request_body = &converted["paths"]["/login"]["post"]["requestBody"];
    let schema = &request_body["content"]["application/x-www-form-urlencoded"]["schema"];
    assert_eq!(request_body["required"], json!(true));
    assert_eq!(schema["required"], json!(["user"]));
    assert_eq!(
        schema["properties"],
        json!({"user": {"type": "string"}, "remember": {"type": "boolean"}})
    );
}

#[test]
fn body_parameter_wins_over_form_data() {
    let result = ConversionEngine::new()
        .convert(json!({
            "swagger": "2.0",
            "paths": {"/mixed": {"put": {"parameters": [
                {"in": "formData", "name": "field", "type": "string", "required": true},
                {"in": "body", "name": "payload", "schema": {"$ref": "#/definitions/Thing"}}
            ]}}}
        }))
        .unwrap();

    let request_body = &result.document["paths"]["/mixed"]["put"]["requestBody"];
    assert_eq!(
        request_body["content"],
        json!({"application/json": {"schema": {"$ref": "#/components/schemas/Thing"}}})
    );
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::FormDataShadowedByBody);
    assert_eq!(result.warnings[0].field_path.as_deref(), Some("paths./mixed.put.parameters"));
}

#[test]
fn wraps_response_schema_and_examples() {
    let converted = convert(json!({
        "swagger": "2.0",
        "paths": {"/hello": {"get": {"responses": {"200": {
            "description": "ok",
            "schema": {"type": "string"},
            "examples": {"application/json": "hi"}
        }}}}}
    }));

    let response = &converted["paths"]["/hello"]["get"]["responses"]["200"];
    assert_eq!(response["description"], json!("ok"));
    assert_eq!(response["content"]["application/json"]["schema"], json!({"type": "string"}));
    assert_eq!(
        response["content"]["application/json"]["examples"]["example"]["value"],
        json!("hi")
    );
}

#[test]
fn drops_examples_without_schema_with_a_warning() {
    let result = ConversionEngine::new()
        .convert(json!({
            "swagger": "2.0",
            "paths": {"/hello": {"get": {"responses": {"200": {
                "description": "ok",
                "examples": {"application/json": "hi"}
            }}}}}
        }))
        .unwrap();

    assert_eq!(
        result.document["paths"]["/hello"]["get"]["responses"]["200"],
        json!({"description": "ok"})
    );
    assert_eq!(result.warnings[0].kind, WarningKind::ExamplesDropped);
}

#[test]
fn rewrites_references_at_any_depth() {
    let converted = convert(json!({
        "swagger": "2.0",
        "definitions": {
            "Deep": {"properties": {"a": {"properties": {"b": {"items": {"allOf": [
                {"$ref": "#/definitions/Pet"},
                {"$ref": "#/somewhere/else"}
            ]}}}}}}
        }
    }));

    let all_of = &converted["components"]["schemas"]["Deep"]["properties"]["a"]["properties"]["b"]
        ["items"]["allOf"];
    assert_eq!(all_of[0]["$ref"], json!("#/components/schemas/Pet"));
    assert_eq!(all_of[1]["$ref"], json!("#/somewhere/else"));
}

#[test]
fn keeps_path_order() {
    let converted = convert(json!({
        "swagger": "2.0",
        "paths": {"/c": {}, "/a": {}, "/b": {}}
    }));

    let order: Vec<&str> = converted["paths"]
        .as_object()
        .map(|paths| paths.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(order, vec!["/c", "/a", "/b"]);
}

#[test]
fn referenced_body_parameter_becomes_request_body() {
    let result = ConversionEngine::new()
        .convert(json!({
            "swagger": "2.0",
            "paths": {"/pets": {"post": {
                "parameters": [{"$ref": "#/parameters/PetBody"}],
                "responses": {"201": {"description": "created"}}
            }}},
            "parameters": {
                "PetBody": {"name": "pet", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}}
            },
            "definitions": {"Pet": {"type": "object"}}
        }))
        .unwrap();

    let operation = &result.document["paths"]["/pets"]["post"];
    assert!(operation.get("parameters").is_none());
    assert_eq!(
        operation["requestBody"],
        json!({
            "required": true,
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
        })
    );
    assert!(result.document["components"].get("parameters").is_none());
}
