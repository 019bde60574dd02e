use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
pub static CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#content").unwrap());
pub static HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#content h2").unwrap());
pub static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
pub static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Every text fragment trimmed, empties dropped, joined without separator.
pub fn stripped_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Raw text with `<br>` rendered as a newline, trimmed at both ends.
pub fn text_with_breaks(el: ElementRef) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Decoded text of a markup fragment: entities resolved, tags dropped.
pub fn fragment_text(markup: &str) -> String {
    Html::parse_fragment(markup)
        .root_element()
        .text()
        .collect()
}

/// Element children only, skipping text and comments.
pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}
