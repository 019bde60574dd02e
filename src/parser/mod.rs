pub mod diagnostics;
pub mod dom;
pub mod field_name;
pub mod handlers;
pub mod header;
pub mod navigator;
pub mod person;

use scraper::Html;

use crate::record::Record;
use diagnostics::{Diagnostic, Diagnostics};

pub struct Extraction {
    pub record: Option<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One pass over one page: title id, heading citation, then the feature
/// table. Only a missing or unreadable id loses the record.
pub fn extract_record(html: &str, context: &str) -> Extraction {
    let doc = Html::parse_document(html);
    let mut diagnostics = Diagnostics::new(context);
    let record = extract_from_document(&doc, &mut diagnostics);
    Extraction {
        record,
        diagnostics: diagnostics.into_entries(),
    }
}

pub fn extract_from_document(doc: &Html, diagnostics: &mut Diagnostics) -> Option<Record> {
    let oath_id = oath_id(doc, diagnostics)?;
    let mut record = Record::new(oath_id);

    if let Some(h2) = doc.select(&dom::HEADER).next() {
        for (key, value) in header::parse_header(h2, diagnostics).into_entries() {
            record.insert(key, value);
        }
    }

    for row in navigator::feature_rows(doc, diagnostics) {
        let key = field_name::field_name_from_cell(row.label);
        for (key, value) in handlers::dispatch(&key, row.value, diagnostics) {
            record.insert(key, value);
        }
    }

    Some(record)
}

/// `<title> Oath 2595 results - ... </title>` -> 2595
fn oath_id(doc: &Html, diagnostics: &mut Diagnostics) -> Option<i64> {
    let Some(title) = doc.select(&dom::TITLE).next() else {
        diagnostics.report("page has no title", "");
        return None;
    };
    let text = dom::stripped_text(title);
    match oath_id_from_title(&text) {
        Some(id) => Some(id),
        None => {
            diagnostics.report("title has no oath id", &text);
            None
        }
    }
}

pub fn oath_id_from_title(title: &str) -> Option<i64> {
    title.split_whitespace().nth(1)?.parse().ok()
}
