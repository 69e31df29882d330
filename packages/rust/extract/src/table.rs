//! Request field tables.

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::dom::{find_heading, joined_text, next_matching};
use crate::fields::{FieldDescriptor, FieldSet};
use crate::CompiledRules;

/// Read the request field table that follows the request-fields heading.
///
/// Rows narrower than the column layout are skipped. A missing heading or
/// table yields an empty set.
pub fn extract_request_fields(doc: &Html, rules: &CompiledRules) -> FieldSet {
    let mut fields = FieldSet::default();

    let Some(heading) = find_heading(doc, &rules.heading, &rules.raw.request_fields_markers)
    else {
        debug!("request fields heading not found");
        return fields;
    };
    let Some(table) = next_matching(doc, heading, &rules.table) else {
        debug!("request fields heading has no table after it");
        return fields;
    };

    let columns = rules.raw.columns;
    let min_cells = columns.min_cells();
    let mut skipped = 0usize;

    for row in table.select(&rules.row) {
        let cells: Vec<_> = row.select(&rules.cell).collect();
        if cells.len() < min_cells {
            skipped += 1;
            continue;
        }

        let name = joined_text(cells[columns.name], "");
        let description = joined_text(cells[columns.description], " ");
        let type_label = joined_text(cells[columns.type_label], " ");
        let required_text: String = cells[columns.required].text().collect();
        let example = joined_text(cells[columns.example], "");

        let required = rules
            .raw
            .required_markers
            .iter()
            .any(|m| required_text.contains(m.as_str()));

        fields.upsert(FieldDescriptor {
            name,
            description: (!description.is_empty()).then_some(description),
            field_type: rules.vocabulary.infer(&type_label),
            required,
            example: (!example.is_empty()).then(|| Value::String(example)),
        });
    }

    debug!(fields = fields.len(), skipped, "request field table read");
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::SchemaType;
    use docspec_shared::ExtractionRules;

    fn rules() -> CompiledRules {
        CompiledRules::compile(&ExtractionRules::default()).unwrap()
    }

    fn row(name: &str, ty: &str, required: &str, example: &str) -> String {
        format!(
            "<tr><td>{name}</td><td>Описание {name}</td><td>{ty}</td><td>{required}</td><td>{example}</td></tr>"
        )
    }

    #[test]
    fn reads_well_formed_rows_in_order() {
        let html = format!(
            "<h4>Поля запроса</h4><table>
               <tr><th>Поле</th><th>Описание</th><th>Тип</th><th>Обязательное</th><th>Пример</th></tr>
               {}{}{}
             </table>",
            row("phone", "Строка", "Да", "79991234567"),
            row("count", "Integer", "Нет", "2"),
            row("paid", "bool", "", ""),
        );
        let doc = Html::parse_document(&html);
        let fields = extract_request_fields(&doc, &rules());

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "count", "paid"]);

        let phone = fields.get("phone").unwrap();
        assert_eq!(phone.field_type, SchemaType::String);
        assert!(phone.required);
        assert_eq!(phone.example, Some(Value::String("79991234567".into())));
        assert_eq!(phone.description.as_deref(), Some("Описание phone"));

        let count = fields.get("count").unwrap();
        assert_eq!(count.field_type, SchemaType::Integer);
        assert!(!count.required);
        // Table examples stay text.
        assert_eq!(count.example, Some(Value::String("2".into())));

        let paid = fields.get("paid").unwrap();
        assert_eq!(paid.field_type, SchemaType::Boolean);
        assert!(paid.example.is_none());
        assert_eq!(fields.required(), vec!["phone"]);
    }

    #[test]
    fn malformed_rows_are_ignored() {
        let good = ["a", "b", "c", "d"];
        let mut body = String::new();
        for (i, name) in good.iter().enumerate() {
            body.push_str(&row(name, "string", "Нет", ""));
            // Interleave rows with 1..=4 cells.
            body.push_str(&format!("<tr>{}</tr>", "<td>short</td>".repeat(i + 1)));
        }
        let doc = Html::parse_document(&format!("<h4>Поля запроса</h4><table>{body}</table>"));
        let fields = extract_request_fields(&doc, &rules());

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, good.to_vec());
    }

    #[test]
    fn duplicate_names_last_write_wins() {
        let html = format!(
            "<h4>Поля запроса</h4><table>{}{}</table>",
            row("id", "string", "Нет", "first"),
            row("id", "integer", "Да", "second"),
        );
        let doc = Html::parse_document(&html);
        let fields = extract_request_fields(&doc, &rules());

        assert_eq!(fields.len(), 1);
        let id = fields.get("id").unwrap();
        assert_eq!(id.field_type, SchemaType::Integer);
        assert!(id.required);
        assert_eq!(id.example, Some(Value::String("second".into())));
    }

    #[test]
    fn missing_heading_or_table_is_empty() {
        let no_heading = Html::parse_document(&format!(
            "<h4>Описание</h4><table>{}</table>",
            row("a", "string", "Да", "")
        ));
        assert!(extract_request_fields(&no_heading, &rules()).is_empty());

        let no_table = Html::parse_document("<h4>Поля запроса</h4><p>Нет полей</p>");
        assert!(extract_request_fields(&no_table, &rules()).is_empty());
    }

    #[test]
    fn english_markers_work_too() {
        let html = format!(
            "<h4>Request Fields</h4><table>{}</table>",
            row("token", "String", "Yes", "abc")
        );
        let doc = Html::parse_document(&html);
        let fields = extract_request_fields(&doc, &rules());
        assert!(fields.get("token").unwrap().required);
    }
}
