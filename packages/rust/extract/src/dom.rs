//! Small document helpers over `scraper`.

use scraper::{ElementRef, Html, Selector};

/// First element matching `heading` whose text contains any of `markers`.
pub(crate) fn find_heading<'a>(
    doc: &'a Html,
    heading: &Selector,
    markers: &[String],
) -> Option<ElementRef<'a>> {
    doc.select(heading).find(|el| {
        let text: String = el.text().collect();
        markers.iter().any(|m| text.contains(m.as_str()))
    })
}

/// First element after `anchor` in document order that matches `target`.
///
/// Follows the anchor's own subtree first, then everything after it, so a
/// table wrapped in a sibling `<div>` is found as well as a direct sibling.
pub(crate) fn next_matching<'a>(
    doc: &'a Html,
    anchor: ElementRef<'a>,
    target: &Selector,
) -> Option<ElementRef<'a>> {
    let anchor_id = anchor.id();
    doc.tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| target.matches(el))
}

/// Text of an element with each text node trimmed, blanks dropped and the
/// pieces joined by `sep`.
pub(crate) fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}
