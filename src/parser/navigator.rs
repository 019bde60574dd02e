use scraper::{ElementRef, Html};

use super::diagnostics::Diagnostics;
use super::dom::{child_elements, stripped_text, CELL, CONTENT, ROW, TABLE};

/// A label cell and the value cell that follows it.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    pub label: ElementRef<'a>,
    pub value: ElementRef<'a>,
}

/// Label/value pairs of the record's feature table.
///
/// The walk is scoped to the `#content` container, not to its first table,
/// so rows of nested tables are visited too; they never look like labels.
pub fn feature_rows<'a>(doc: &'a Html, diagnostics: &mut Diagnostics) -> Vec<FeatureRow<'a>> {
    let Some(content) = doc.select(&CONTENT).next() else {
        return Vec::new();
    };
    if content.select(&TABLE).next().is_none() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    for row in content.select(&ROW) {
        let cells: Vec<ElementRef> = row.select(&CELL).collect();
        if cells.len() < 2 || !is_label(cells[1]) {
            continue;
        }
        match cells.get(2) {
            Some(&value) => rows.push(FeatureRow {
                label: cells[1],
                value,
            }),
            None => diagnostics.report("label without a value cell", &stripped_text(cells[1])),
        }
        secondary_pairs(row, &mut rows, diagnostics);
    }
    rows
}

fn is_label(cell: ElementRef) -> bool {
    stripped_text(cell).ends_with(':')
}

// "State: X  Location: Y" rows carry a second pair in their own cells.
fn secondary_pairs<'a>(row: ElementRef<'a>, rows: &mut Vec<FeatureRow<'a>>, diagnostics: &mut Diagnostics) {
    let direct: Vec<ElementRef> = child_elements(row)
        .filter(|e| e.value().name() == "td")
        .collect();
    let mut i = 3;
    while i < direct.len() {
        if !is_label(direct[i]) {
            i += 1;
            continue;
        }
        match direct.get(i + 1) {
            Some(&value) => rows.push(FeatureRow {
                label: direct[i],
                value,
            }),
            None => diagnostics.report("label without a value cell", &stripped_text(direct[i])),
        }
        i += 2;
    }
}
