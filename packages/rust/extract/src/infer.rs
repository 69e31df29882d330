//! Type inference from free-text labels and from example values.
//!
//! Neither direction can fail: unknown labels and unusual values fall back
//! to `string`.

use serde_json::{Map, Value, json};

use docspec_shared::{DocSpecError, Result, TypeLabel};

/// The schema types docspec emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    String,
    Integer,
    Boolean,
    Array,
    Number,
    Object,
}

impl SchemaType {
    /// OpenAPI spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Number => "number",
            SchemaType::Object => "object",
        }
    }
}

impl std::str::FromStr for SchemaType {
    type Err = DocSpecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(SchemaType::String),
            "integer" => Ok(SchemaType::Integer),
            "boolean" => Ok(SchemaType::Boolean),
            "array" => Ok(SchemaType::Array),
            "number" => Ok(SchemaType::Number),
            "object" => Ok(SchemaType::Object),
            other => Err(DocSpecError::config(format!("unknown schema type `{other}`"))),
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// From text
// ---------------------------------------------------------------------------

/// Ordered label table with labels lower-cased once.
#[derive(Debug, Clone)]
pub struct TypeVocabulary {
    entries: Vec<(String, SchemaType)>,
}

impl TypeVocabulary {
    /// Build the lookup table, rejecting unknown target types.
    pub fn compile(labels: &[TypeLabel]) -> Result<Self> {
        let entries = labels
            .iter()
            .map(|l| -> Result<(String, SchemaType)> {
                Ok((l.label.to_lowercase(), l.schema_type.parse()?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Map a type label from a documentation table to a schema type.
    ///
    /// Case-insensitive substring match, first entry wins, `string` otherwise.
    pub fn infer(&self, text: &str) -> SchemaType {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(label, _)| text.contains(label.as_str()))
            .map(|(_, ty)| *ty)
            .unwrap_or(SchemaType::String)
    }
}

// ---------------------------------------------------------------------------
// From example values
// ---------------------------------------------------------------------------

/// Kind of a single example value (no recursion).
pub fn type_of_value(value: &Value) -> SchemaType {
    match value {
        Value::Object(_) => SchemaType::Object,
        Value::Array(_) => SchemaType::Array,
        // Booleans before numbers: a bool is never an integer here.
        Value::Bool(_) => SchemaType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => SchemaType::Integer,
        Value::Number(_) => SchemaType::Number,
        Value::String(_) | Value::Null => SchemaType::String,
    }
}

/// Build a schema describing `value`.
///
/// Objects recurse per key; arrays take their item schema from the first
/// element only, and empty arrays carry no `items`.
pub fn schema_from_example(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let properties: Map<String, Value> = map
                .iter()
                .map(|(key, v)| (key.clone(), schema_from_example(v)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
        Value::Array(items) => match items.first() {
            Some(first) => json!({ "type": "array", "items": schema_from_example(first) }),
            None => json!({ "type": "array" }),
        },
        other => json!({ "type": type_of_value(other).as_str() }),
    }
}
