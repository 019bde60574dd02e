use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::diagnostics::Diagnostics;
use super::dom::fragment_text;
use crate::record::FieldValue;

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Oath ID\s*\d+\s*:(.*?)<em>").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<em>(.*?)</em>").unwrap());
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</em>(.*?),\s*</strong>").unwrap());

/// Work citation from the page heading, e.g.
/// `<strong>Oath ID 2: Aristophanes, <em>Clouds</em>, 82-83,</strong> (literary, Comic., )`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkHeader {
    pub author: Option<String>,
    pub title: Option<String>,
    pub reference: Option<String>,
    pub work_type: Option<String>,
    pub genre: Option<String>,
    pub work_date: Option<String>,
}

impl WorkHeader {
    pub fn into_entries(self) -> Vec<(String, FieldValue)> {
        [
            ("author", self.author),
            ("title", self.title),
            ("reference", self.reference),
            ("work_type", self.work_type),
            ("genre", self.genre),
            ("work_date", self.work_date),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), FieldValue::Text(v))))
        .collect()
    }
}

pub fn parse_header(h2: ElementRef, diagnostics: &mut Diagnostics) -> WorkHeader {
    parse_header_markup(&h2.inner_html(), diagnostics)
}

/// Each part is matched independently; a miss is reported and leaves only
/// that part empty.
pub fn parse_header_markup(markup: &str, diagnostics: &mut Diagnostics) -> WorkHeader {
    let mut header = WorkHeader::default();

    match AUTHOR_RE.captures(markup) {
        Some(caps) => header.author = Some(clean(&caps[1])),
        None => diagnostics.report("header: no author before the work title", markup),
    }

    match TITLE_RE.captures(markup) {
        Some(caps) => {
            let title = clean(&caps[1]);
            if !title.is_empty() {
                header.title = Some(title);
            }
        }
        None => diagnostics.report("header: no emphasized work title", markup),
    }

    match REFERENCE_RE.captures(markup) {
        Some(caps) => header.reference = Some(clean(&caps[1])),
        None => diagnostics.report("header: no reference after the work title", markup),
    }

    let Some(end) = markup.rfind("</strong>") else {
        diagnostics.report("header: no work metadata after the citation", markup);
        return header;
    };
    let meta = fragment_text(&markup[end + "</strong>".len()..]);
    let meta = meta.trim();
    let Some(inner) = meta.strip_prefix('(').and_then(|m| m.strip_suffix(')')) else {
        diagnostics.report("header: work metadata is not parenthesized", meta);
        return header;
    };
    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 3 {
        diagnostics.report(
            format!("header: work metadata has {} parts, expected 3", parts.len()),
            inner,
        );
        return header;
    }
    header.work_type = Some(strip_commas(parts[0]));
    header.genre = Some(strip_commas(parts[1]));
    header.work_date = Some(strip_commas(parts[2]));
    header
}

fn clean(fragment: &str) -> String {
    strip_commas(&fragment_text(fragment))
}

pub fn strip_commas(text: &str) -> String {
    text.trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markup: &str) -> (WorkHeader, usize) {
        let mut d = Diagnostics::new("test");
        let h = parse_header_markup(markup, &mut d);
        (h, d.entries().len())
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn iphigenia() {
        let (h, diags) = parse(
            "Oath ID 3885: Euripides, <em>Iphigenia Aulidensis</em>, 1006-7,</strong> (literary, Trag., 405)",
        );
        assert_eq!(diags, 0);
        assert_eq!(
            h,
            WorkHeader {
                author: some("Euripides"),
                title: some("Iphigenia Aulidensis"),
                reference: some("1006-7"),
                work_type: some("literary"),
                genre: some("Trag."),
                work_date: some("405"),
            }
        );
    }

    #[test]
    fn empty_date_is_kept() {
        let (h, diags) = parse(
            "<strong>Oath ID 2: Aristophanes, <em>Clouds</em>, 82-83,</strong> (literary, Comic., )",
        );
        assert_eq!(diags, 0);
        assert_eq!(h.reference, some("82-83"));
        assert_eq!(h.genre, some("Comic."));
        assert_eq!(h.work_date, some(""));
    }

    #[test]
    fn entities_in_author_are_decoded() {
        let (h, _) = parse(
            "<strong>Oath ID 9: Smith &amp; Jones, <em>Fragments</em>, fr. 3,</strong> (literary, Hist., 4th c.)",
        );
        assert_eq!(h.author, some("Smith & Jones"));
        assert_eq!(h.reference, some("fr. 3"));
    }

    #[test]
    fn wrong_meta_count_keeps_citation() {
        let (h, diags) = parse(
            "<strong>Oath ID 4: Homer, <em>Iliad</em>, 3.276,</strong> (literary, Epic)",
        );
        assert_eq!(diags, 1);
        assert_eq!(h.author, some("Homer"));
        assert_eq!(h.title, some("Iliad"));
        assert_eq!(h.work_type, None);
        assert_eq!(h.work_date, None);
    }

    #[test]
    fn missing_title_is_reported_per_step() {
        let (h, diags) = parse("<strong>Oath ID 5: Anonymous,</strong> (epigraphic, Decree, 350)");
        // author, title and reference all hinge on <em>
        assert_eq!(diags, 3);
        assert_eq!(h.author, None);
        assert_eq!(h.genre, some("Decree"));
    }

    #[test]
    fn entries_skip_missing_parts() {
        let h = WorkHeader {
            author: some("Homer"),
            work_date: some(""),
            ..Default::default()
        };
        let keys: Vec<String> = h.into_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["author", "work_date"]);
    }
}
