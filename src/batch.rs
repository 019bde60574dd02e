use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::error::{OathError, Result};
use crate::parser::diagnostics::{Diagnostic, Diagnostics};
use crate::parser::{extract_record, field_name, handlers, navigator};
use crate::record::Record;

const CHUNK: usize = 500;

/// Error and rate-limit pages the site serves with a 200 status.
pub fn page_is_invalid(html: &str) -> bool {
    html.contains("Error - unable to retrieve work") || html.contains("You have been timed out")
}

/// Cached pages are not always valid UTF-8; bad bytes are replaced.
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| OathError::read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// A single file, or every `*.html` in a directory sorted by name.
pub fn collect_pages(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| OathError::read(path, e))? {
        let p = entry.map_err(|e| OathError::read(path, e))?.path();
        if p.extension().is_some_and(|ext| ext == "html") {
            pages.push(p);
        }
    }
    pages.sort();
    Ok(pages)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub diagnostics: usize,
}

enum Outcome {
    Extracted(Record, Vec<Diagnostic>),
    Skipped(String, Vec<Diagnostic>),
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn process_page(path: &Path) -> Outcome {
    let html = match read_document(path) {
        Ok(h) => h,
        Err(e) => return Outcome::Skipped(e.to_string(), Vec::new()),
    };
    if page_is_invalid(&html) {
        return Outcome::Skipped("site error or timeout page".into(), Vec::new());
    }
    let ex = extract_record(&html, &file_label(path));
    match ex.record {
        Some(record) => Outcome::Extracted(record, ex.diagnostics),
        None => Outcome::Skipped("no oath id".into(), ex.diagnostics),
    }
}

/// Extract every page in parallel. Records come back in input order; a page
/// that cannot be read or has no id is logged and skipped.
pub fn extract_pages(paths: &[PathBuf]) -> (Vec<Record>, BatchSummary) {
    let pb = progress_bar(paths.len() as u64);
    let mut records = Vec::with_capacity(paths.len());
    let mut summary = BatchSummary {
        total: paths.len(),
        ..Default::default()
    };

    for chunk in paths.chunks(CHUNK) {
        let outcomes: Vec<_> = chunk.par_iter().map(|p| process_page(p)).collect();

        for (path, outcome) in chunk.iter().zip(outcomes) {
            let file = file_label(path);
            let diagnostics = match outcome {
                Outcome::Extracted(record, diagnostics) => {
                    debug!(file = %file, oath_id = record.oath_id, fields = record.len(), "extracted");
                    records.push(record);
                    summary.extracted += 1;
                    diagnostics
                }
                Outcome::Skipped(reason, diagnostics) => {
                    warn!(file = %file, "skipped: {}", reason);
                    summary.skipped += 1;
                    diagnostics
                }
            };
            for d in &diagnostics {
                warn!(file = %d.context, text = %d.offending_text, "{}", d.message);
            }
            summary.diagnostics += diagnostics.len();
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        "Extracted {} of {} pages ({} skipped, {} diagnostics)",
        summary.extracted, summary.total, summary.skipped, summary.diagnostics
    );
    (records, summary)
}

/// Every canonical key seen across the pages, with the number of pages it
/// appears on and whether a handler is registered for it.
pub fn field_census(paths: &[PathBuf]) -> Vec<(String, usize, bool)> {
    let keys: Vec<BTreeSet<String>> = paths
        .par_iter()
        .map(|path| match read_document(path) {
            Ok(html) => page_keys(&html),
            Err(e) => {
                warn!("{}", e);
                BTreeSet::new()
            }
        })
        .collect();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys.into_iter().flatten() {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, n)| {
            let known = handlers::strategy_for(&key).is_some();
            (key, n, known)
        })
        .collect()
}

fn page_keys(html: &str) -> BTreeSet<String> {
    let doc = Html::parse_document(html);
    let mut scratch = Diagnostics::default();
    navigator::feature_rows(&doc, &mut scratch)
        .into_iter()
        .map(|row| field_name::field_name_from_cell(row.label))
        .collect()
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        PathBuf::from("tests/fixtures")
    }

    #[test]
    fn invalid_pages() {
        assert!(page_is_invalid("<p>You have been timed out</p>"));
        assert!(page_is_invalid("Error - unable to retrieve work 12"));
        assert!(!page_is_invalid("<title> Oath 12 results </title>"));
    }

    #[test]
    fn directory_is_sorted_html_only() {
        let pages = collect_pages(&fixtures()).unwrap();
        let names: Vec<String> = pages.iter().map(|p| file_label(p)).collect();
        assert_eq!(names, vec!["oath_3885.html", "oath_malformed.html"]);
    }

    #[test]
    fn single_file_is_its_own_batch() {
        let file = fixtures().join("oath_3885.html");
        assert_eq!(collect_pages(&file).unwrap(), vec![file]);
    }

    #[test]
    fn batch_keeps_going_past_bad_pages() {
        let mut paths = collect_pages(&fixtures()).unwrap();
        paths.insert(1, fixtures().join("missing.html"));

        let (records, summary) = extract_pages(&paths);
        assert_eq!(records.iter().map(|r| r.oath_id).collect::<Vec<_>>(), vec![3885, 12]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.diagnostics, 3);
    }

    #[test]
    fn census_flags_unknown_labels() {
        let census = field_census(&collect_pages(&fixtures()).unwrap());
        let find = |k: &str| census.iter().find(|(key, _, _)| key == k).cloned();
        assert_eq!(find("swearer"), Some(("swearer".to_string(), 2, true)));
        assert_eq!(find("unknown_field"), Some(("unknown_field".to_string(), 1, false)));
        assert_eq!(find("location"), Some(("location".to_string(), 1, true)));
    }

    #[test]
    fn repeated_label_counts_once_per_page() {
        let html = r#"<title> Oath 9 results </title><div id="content"><table>
            <tr><td>&nbsp;</td><td>Date:</td><td>first</td></tr>
            <tr><td>&nbsp;</td><td>Date:</td><td>second</td></tr>
        </table></div>"#;
        assert_eq!(page_keys(html).into_iter().collect::<Vec<_>>(), vec!["date"]);
    }
}
