use scraper::ElementRef;

use super::diagnostics::Diagnostics;
use super::dom::{stripped_text, text_with_breaks, ROW};
use super::person::parse_person;
use crate::record::FieldValue;

/// How a value cell is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Cell text, `<br>` as newline.
    Text,
    /// One item per nested row.
    List,
    /// One `Person` per nested row.
    People,
}

const HANDLERS: &[(&str, Strategy)] = &[
    ("title", Strategy::Text),
    ("date", Strategy::Text),
    ("reference_type", Strategy::Text),
    ("state", Strategy::Text),
    ("location", Strategy::Text),
    ("swearer", Strategy::People),
    ("swearee", Strategy::People),
    ("proposed_by", Strategy::List),
    ("if_taken", Strategy::Text),
    ("if_refused", Strategy::Text),
    ("if_kept", Strategy::Text),
    ("if_broken", Strategy::Text),
    ("taken", Strategy::Text),
    ("true", Strategy::Text),
    ("impact", Strategy::Text),
    ("consequences_of_breach", Strategy::Text),
    ("statement", Strategy::Text),
    ("linguistic", Strategy::Text),
    ("gods_invoked", Strategy::List),
    ("remarks", Strategy::Text),
];

pub fn strategy_for(key: &str) -> Option<Strategy> {
    HANDLERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, s)| *s)
}

/// Run the handler registered for `key`. Unknown keys are read as text and
/// reported so new labels surface for triage.
pub fn dispatch(
    key: &str,
    value: ElementRef,
    diagnostics: &mut Diagnostics,
) -> Vec<(String, FieldValue)> {
    let strategy = strategy_for(key).unwrap_or_else(|| {
        diagnostics.report("no handler for field", key);
        Strategy::Text
    });

    let value = match strategy {
        Strategy::Text => FieldValue::Text(text_with_breaks(value)),
        Strategy::List => FieldValue::List(list_rows(value)),
        Strategy::People => FieldValue::People(
            value
                .select(&ROW)
                .filter_map(|row| parse_person(&stripped_text(row), diagnostics))
                .collect(),
        ),
    };
    vec![(key.to_string(), value)]
}

/// Each nested row's text verbatim, empty rows included.
pub fn list_rows(cell: ElementRef) -> Vec<String> {
    cell.select(&ROW).map(stripped_text).collect()
}
