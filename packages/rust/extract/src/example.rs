//! JSON example blocks.

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::dom::{find_heading, next_matching};
use crate::CompiledRules;

/// Parse the code block that follows the first heading matching `markers`.
///
/// A missing heading, a missing code block, invalid JSON or a bare `null`
/// all mean "no example".
pub fn extract_example(doc: &Html, rules: &CompiledRules, markers: &[String]) -> Option<Value> {
    let heading = find_heading(doc, &rules.heading, markers)?;
    let code = next_matching(doc, heading, &rules.code)?;
    let text: String = code.text().collect();

    match serde_json::from_str(&text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "example block is not valid JSON");
            None
        }
    }
}
