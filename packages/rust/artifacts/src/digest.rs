//! Flattening of OpenAPI operations into endpoint digests.
//!
//! Only the first level of a schema is flattened: nested objects and arrays
//! show up as a single field whose example carries the nested value.

use std::collections::HashSet;

use serde_yaml::Value;
use tracing::warn;

use docspec_shared::{DigestField, EndpointDigest, is_http_method, key_text};

use crate::naming::FileNamer;

/// An endpoint digest together with the filename it will be written to.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDigest {
    pub file_name: String,
    pub digest: EndpointDigest,
}

/// Digest every operation of `spec`, in document order.
///
/// Filenames are assigned in the same order, so colliding paths get their
/// numeric suffix deterministically. Method keys differing only in case
/// (`get` and `GET`) name one operation; the first one wins.
pub fn build_digests(spec: &Value) -> Vec<NamedDigest> {
    let mut namer = FileNamer::new();
    let mut out = Vec::new();

    let Some(paths) = spec.get("paths").and_then(Value::as_mapping) else {
        return out;
    };

    for (path_key, item) in paths {
        let Some(path) = key_text(path_key) else {
            continue;
        };
        let Some(item) = item.as_mapping() else {
            continue;
        };

        let mut seen: HashSet<String> = HashSet::new();
        for (method_key, op) in item {
            let Some(method) = method_key.as_str().filter(|m| is_http_method(m)) else {
                continue;
            };
            if !seen.insert(method.to_lowercase()) {
                warn!(%path, method, "duplicate method key ignored");
                continue;
            }
            out.push(NamedDigest {
                file_name: namer.assign(method, &path),
                digest: digest_operation(&path, method, op),
            });
        }
    }

    out
}

/// Summarize one operation.
pub fn digest_operation(path: &str, method: &str, op: &Value) -> EndpointDigest {
    let body = op.get("requestBody").and_then(json_content);
    let body_schema = body.and_then(|c| c.get("schema"));
    let parameters = op.get("parameters");

    let request_fields = match body_schema {
        Some(schema) if schema.get("properties").is_some() => flatten_schema(schema),
        _ => parameters.map(flatten_parameters).unwrap_or_default(),
    };

    let example_request = match body.and_then(|c| c.get("example")) {
        Some(example) => compact_json(example),
        None => compose_example(body_schema, parameters),
    };

    let response = [200, 201]
        .into_iter()
        .filter_map(|code| response_for(op, code).and_then(json_content))
        .find(|c| c.get("schema").is_some() || c.get("example").is_some());

    EndpointDigest {
        path: path.to_string(),
        method: method.to_uppercase(),
        summary: text_or_empty(op.get("summary")),
        request_fields,
        response_fields: response
            .and_then(|c| c.get("schema"))
            .map(flatten_schema)
            .unwrap_or_default(),
        example_request,
        example_response: response
            .and_then(|c| c.get("example"))
            .map(compact_json)
            .unwrap_or_default(),
    }
}

/// Flatten the top-level properties of an object schema.
pub fn flatten_schema(schema: &Value) -> Vec<DigestField> {
    let Some(properties) = schema.get("properties").and_then(Value::as_mapping) else {
        return Vec::new();
    };
    let required = required_names(schema);

    properties
        .iter()
        .filter_map(|(key, prop)| {
            let name = key_text(key)?;
            Some(DigestField {
                required: required.contains(&name.as_str()),
                description: text_or_empty(prop.get("description")),
                field_type: field_type(prop),
                example: prop.get("example").map(compact_json).unwrap_or_default(),
                name,
            })
        })
        .collect()
}

/// Flatten an operation's `parameters` list.
fn flatten_parameters(parameters: &Value) -> Vec<DigestField> {
    let Some(list) = parameters.as_sequence() else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|param| {
            let name = param.get("name").and_then(Value::as_str)?;
            let schema = param.get("schema").unwrap_or(param);
            let example = param.get("example").or_else(|| schema.get("example"));
            Some(DigestField {
                name: name.to_string(),
                description: text_or_empty(param.get("description")),
                field_type: field_type(schema),
                required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
                example: example.map(compact_json).unwrap_or_default(),
            })
        })
        .collect()
}

/// Build a request example out of per-field examples, or `""` when none exist.
fn compose_example(schema: Option<&Value>, parameters: Option<&Value>) -> String {
    let mut composed = serde_json::Map::new();

    if let Some(properties) = schema
        .and_then(|s| s.get("properties"))
        .and_then(Value::as_mapping)
    {
        for (key, prop) in properties {
            if let (Some(name), Some(example)) = (key_text(key), prop.get("example").and_then(to_json)) {
                composed.insert(name, example);
            }
        }
    } else if let Some(list) = parameters.and_then(Value::as_sequence) {
        for param in list {
            let name = param.get("name").and_then(Value::as_str);
            let example = param.get("example").and_then(to_json);
            if let (Some(name), Some(example)) = (name, example) {
                composed.insert(name.to_string(), example);
            }
        }
    }

    if composed.is_empty() {
        String::new()
    } else {
        serde_json::Value::Object(composed).to_string()
    }
}

/// `type` of a property; arrays render as `array[<item type>]`.
fn field_type(prop: &Value) -> String {
    let kind = prop.get("type").and_then(Value::as_str).unwrap_or("object");
    if kind == "array" {
        let item = prop
            .get("items")
            .and_then(|items| items.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("object");
        format!("array[{item}]")
    } else {
        kind.to_string()
    }
}

fn required_names(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_sequence)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// The `application/json` entry of a `content` map, or its first entry.
fn json_content(container: &Value) -> Option<&Value> {
    let content = container.get("content")?.as_mapping()?;
    content
        .get("application/json")
        .or_else(|| content.values().next())
}

/// A response by status code, whether the key was written as `200` or `"200"`.
fn response_for(op: &Value, code: u64) -> Option<&Value> {
    op.get("responses")?
        .as_mapping()?
        .iter()
        .find(|(key, _)| match key {
            Value::Number(n) => n.as_u64() == Some(code),
            Value::String(s) => s.trim().parse::<u64>().ok() == Some(code),
            _ => false,
        })
        .map(|(_, response)| response)
}

fn text_or_empty(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn to_json(value: &Value) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

/// Compact JSON text of a YAML value; `""` if it has no JSON form.
fn compact_json(value: &Value) -> String {
    to_json(value).map(|v| v.to_string()).unwrap_or_default()
}
