//! Field descriptors extracted from documentation and their schema form.

use serde_json::{Map, Value, json};

use crate::infer::{SchemaType, type_of_value};

/// One request field as read from a documentation table or example.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub field_type: SchemaType,
    pub required: bool,
    pub example: Option<Value>,
}

impl FieldDescriptor {
    /// Descriptor for a key only seen in an example payload.
    pub fn from_example(name: &str, value: &Value) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            field_type: type_of_value(value),
            required: false,
            example: Some(value.clone()),
        }
    }

    /// Property schema: `type`, then `description` and `example` when present.
    pub fn to_property_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), self.field_type.as_str().into());
        if let Some(description) = &self.description {
            schema.insert("description".into(), description.clone().into());
        }
        if let Some(example) = &self.example {
            schema.insert("example".into(), example.clone());
        }
        Value::Object(schema)
    }
}

/// Ordered field list with unique names.
///
/// Inserting a name that already exists replaces the earlier descriptor in
/// place, so the last write wins and the first position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<FieldDescriptor>,
}

impl FieldSet {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Insert or replace a descriptor by name.
    pub fn upsert(&mut self, field: FieldDescriptor) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Names of required fields, in field order.
    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Fold a request example into the descriptors.
    ///
    /// Every top-level key of an object example sets that field's example.
    /// The type is only taken from the example for fields the table did not
    /// describe. Non-object examples leave the set untouched.
    pub fn merge_example(&mut self, example: &Value) {
        let Value::Object(map) = example else {
            return;
        };

        for (key, value) in map {
            match self.fields.iter_mut().find(|f| &f.name == key) {
                Some(field) => field.example = Some(value.clone()),
                None => self.fields.push(FieldDescriptor::from_example(key, value)),
            }
        }
    }

    /// Object schema with `properties` and, when any, `required`.
    pub fn to_object_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_property_schema()))
            .collect();

        let mut schema = json!({ "type": "object", "properties": properties });
        let required = self.required();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}
