//! Versioned extraction rule table.
//!
//! Documentation pages are located by marker phrases in headings and read
//! through fixed column positions. All of it lives here as data so a change
//! in the source site's layout is a `[rules]` edit in `docspec.toml`.

use serde::{Deserialize, Serialize};

/// Version of the built-in rule table.
pub const RULES_VERSION: u32 = 1;

/// Marker phrases, selectors and column layout used by the extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Rule table version, bumped whenever the defaults change shape.
    pub version: u32,
    /// Elements whose text is matched against the marker phrases.
    pub heading_selector: String,
    /// Element holding the request field rows.
    pub table_selector: String,
    /// Row element inside the field table.
    pub row_selector: String,
    /// Data cell element inside a row.
    pub cell_selector: String,
    /// Element holding a JSON example.
    pub code_selector: String,
    /// Heading phrases announcing the request field table.
    pub request_fields_markers: Vec<String>,
    /// Heading phrases announcing the example request.
    pub request_example_markers: Vec<String>,
    /// Heading phrases announcing the example response.
    pub response_example_markers: Vec<String>,
    /// Text in the required cell that marks the field as required.
    pub required_markers: Vec<String>,
    /// Cell positions within a field row.
    pub columns: ColumnMap,
    /// Ordered label → type table; the first label found in the text wins.
    pub type_vocabulary: Vec<TypeLabel>,
}

/// Zero-based cell index of each field attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub name: usize,
    pub description: usize,
    pub type_label: usize,
    pub required: usize,
    pub example: usize,
}

impl ColumnMap {
    /// Rows with fewer cells than this are not field rows.
    pub fn min_cells(&self) -> usize {
        [
            self.name,
            self.description,
            self.type_label,
            self.required,
            self.example,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: 0,
            description: 1,
            type_label: 2,
            required: 3,
            example: 4,
        }
    }
}

/// One entry of the type vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLabel {
    /// Lowercase substring looked for in the type cell.
    pub label: String,
    /// Schema type name it maps to.
    #[serde(rename = "type")]
    pub schema_type: String,
}

impl TypeLabel {
    fn new(label: &str, schema_type: &str) -> Self {
        Self {
            label: label.into(),
            schema_type: schema_type.into(),
        }
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            heading_selector: "h4".into(),
            table_selector: "table".into(),
            row_selector: "tr".into(),
            cell_selector: "td".into(),
            code_selector: "code".into(),
            request_fields_markers: strings(&["Поля запроса", "Request Fields"]),
            request_example_markers: strings(&["Пример запроса", "Example Request"]),
            response_example_markers: strings(&[
                "Пример ответа",
                "Ответ сервера",
                "Example Response",
            ]),
            required_markers: strings(&["Да", "Yes"]),
            columns: ColumnMap::default(),
            type_vocabulary: vec![
                TypeLabel::new("строка", "string"),
                TypeLabel::new("string", "string"),
                TypeLabel::new("integer", "integer"),
                TypeLabel::new("int", "integer"),
                TypeLabel::new("boolean", "boolean"),
                TypeLabel::new("bool", "boolean"),
                TypeLabel::new("массив", "array"),
                TypeLabel::new("array", "array"),
            ],
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_need_five_cells() {
        assert_eq!(ColumnMap::default().min_cells(), 5);
    }

    #[test]
    fn reordered_columns_widen_rows() {
        let columns = ColumnMap {
            name: 1,
            description: 6,
            type_label: 2,
            required: 3,
            example: 4,
        };
        assert_eq!(columns.min_cells(), 7);
    }

    #[test]
    fn partial_rules_fall_back_to_defaults() {
        let rules: ExtractionRules = toml::from_str(
            r#"
version = 2
request_fields_markers = ["Request Body"]
"#,
        )
        .expect("parse rules");
        assert_eq!(rules.version, 2);
        assert_eq!(rules.request_fields_markers, vec!["Request Body".to_string()]);
        assert_eq!(rules.heading_selector, "h4");
        assert_eq!(rules.type_vocabulary.len(), 8);
    }

    #[test]
    fn vocabulary_uses_type_key_in_toml() {
        let rules: ExtractionRules = toml::from_str(
            r#"
[[type_vocabulary]]
label = "число"
type = "number"
"#,
        )
        .expect("parse rules");
        assert_eq!(rules.type_vocabulary, vec![TypeLabel::new("число", "number")]);
    }
}
