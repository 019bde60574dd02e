use std::sync::LazyLock;

use regex::Regex;

use super::diagnostics::Diagnostics;
use crate::record::{Gender, Person};

static DESCRIPTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?:male|female|n/a)\s*,").unwrap());
static PERSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.*)\(((?:male|female|n/a)\s*,[^()]*)\)\s*$").unwrap()
});

/// Parse `"Achilles (male, adolescent, power-holder, Phthian)"`.
///
/// The name may carry its own annotation, as in
/// `"Chorus (male) (n/a, mature, free, n/a)"`; only the final group is the
/// descriptor. Anything that does not fit is reported and degrades to a
/// name-only person. Empty rows yield nothing.
pub fn parse_person(text: &str, diagnostics: &mut Diagnostics) -> Option<Person> {
    let text = text.trim();
    if text.is_empty() {
        diagnostics.report("person: empty row", text);
        return None;
    }

    match DESCRIPTOR_RE.find_iter(text).count() {
        1 => {}
        0 => {
            diagnostics.report("person: no (gender, age, status, origin) group", text);
            return Some(Person::name_only(text));
        }
        n => {
            diagnostics.report(format!("person: {} descriptor groups, expected 1", n), text);
            return Some(Person::name_only(text));
        }
    }

    let Some(caps) = PERSON_RE.captures(text) else {
        diagnostics.report("person: descriptor group does not close the row", text);
        return Some(Person::name_only(text));
    };
    let agent = caps[1].trim();
    let parts: Vec<&str> = caps[2].split(',').map(str::trim).collect();
    if parts.len() != 4 {
        diagnostics.report(
            format!("person: descriptor has {} parts, expected 4", parts.len()),
            text,
        );
        return Some(Person::name_only(agent));
    }

    let Some(mut gender) = Gender::from_token(parts[0]) else {
        diagnostics.report("person: unknown gender", text);
        return Some(Person::name_only(agent));
    };
    if gender == Gender::NotApplicable {
        if agent.contains("(female)") {
            gender = Gender::Female;
        } else if agent.contains("(male)") {
            gender = Gender::Male;
        }
    }

    Some(Person {
        agent: agent.to_string(),
        gender: Some(gender),
        age: parts[1].to_string(),
        status: parts[2].to_string(),
        origin: parts[3].to_string(),
    })
}
