use scraper::ElementRef;

use super::dom::stripped_text;

pub fn field_name_from_cell(cell: ElementRef) -> String {
    normalize_label(&stripped_text(cell))
}

/// "God(s) invoked:" -> "gods_invoked". Total and idempotent.
pub fn normalize_label(label: &str) -> String {
    // parens go first: removing them can expose a trailing colon
    let lowered = label.to_lowercase().replace(['(', ')'], "");
    lowered
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels() {
        assert_eq!(normalize_label("Swearer:"), "swearer");
        assert_eq!(normalize_label("God(s) invoked:"), "gods_invoked");
        assert_eq!(normalize_label("Consequences of breach:"), "consequences_of_breach");
        assert_eq!(normalize_label("  Reference   type: "), "reference_type");
    }

    #[test]
    fn degenerate_input_still_yields_a_key() {
        assert_eq!(normalize_label(""), "");
        assert_eq!(normalize_label(":"), "");
        assert_eq!(normalize_label("():"), "");
    }

    #[test]
    fn colon_behind_parens_is_dropped() {
        assert_eq!(normalize_label("x (:)"), "x");
        assert_eq!(normalize_label("Note:("), "note");
    }

    #[test]
    fn idempotent() {
        let labels = [
            "God(s) invoked:",
            "If taken:",
            "Proposed by:",
            "X",
            "a  b\tc:",
            "a : :",
            "x (:)",
            "Note:(",
            ": (a) :",
        ];
        for label in labels {
            let once = normalize_label(label);
            assert_eq!(normalize_label(&once), once, "{:?}", label);
        }
    }
}
