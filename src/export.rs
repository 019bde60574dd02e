use std::collections::HashSet;
use std::io::{BufRead, Write};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{OathError, Result};
use crate::record::Record;

pub type JsonObject = Map<String, Value>;

const JOINED_PEOPLE: &[&str] = &["swearer", "swearee"];
const JOINED_LISTS: &[&str] = &["gods_invoked", "proposed_by"];
const SEPARATOR: &str = "; ";

pub fn write_ndjson<W: Write>(records: &[Record], mut out: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// One JSON object per line; blank lines are ignored.
pub fn read_ndjson<R: BufRead>(input: R) -> Result<Vec<JsonObject>> {
    let mut objects = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|e| OathError::JsonLine {
            line: i + 1,
            reason: e.to_string(),
        })?;
        match value {
            Value::Object(obj) => objects.push(obj),
            other => {
                return Err(OathError::JsonLine {
                    line: i + 1,
                    reason: format!("expected an object, got {}", other),
                })
            }
        }
    }
    Ok(objects)
}

pub fn to_object(record: &Record) -> Result<JsonObject> {
    match serde_json::to_value(record)? {
        Value::Object(obj) => Ok(obj),
        _ => unreachable!("Record always serializes to an object"),
    }
}

/// One flat CSV row per oath: people reduced to their names, lists joined.
pub fn flatten_oath(oath: &JsonObject) -> Vec<(String, String)> {
    oath.iter()
        .map(|(key, value)| {
            let cell = if JOINED_PEOPLE.contains(&key.as_str()) {
                join_agents(value)
            } else if JOINED_LISTS.contains(&key.as_str()) {
                join_items(value)
            } else {
                scalar(value)
            };
            (key.clone(), cell)
        })
        .collect()
}

fn join_agents(value: &Value) -> String {
    match value {
        Value::Array(people) => people
            .iter()
            .map(|p| p.get("agent").map(scalar).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(SEPARATOR),
        other => scalar(other),
    }
}

fn join_items(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(SEPARATOR),
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header from the first row's keys; later rows follow that order.
pub fn write_csv<W: Write>(rows: &[Vec<(String, String)>], out: W) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let header: Vec<&str> = first.iter().map(|(k, _)| k.as_str()).collect();
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&header)?;

    for row in rows {
        let extra: Vec<&str> = row
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| !header.contains(k))
            .collect();
        if !extra.is_empty() {
            let id = row
                .iter()
                .find(|(k, _)| k == "oath_id")
                .map(|(_, v)| v.as_str())
                .unwrap_or("?");
            warn!(oath_id = id, "dropping fields not in the header: {}", extra.join(", "));
        }
        let cells = header.iter().map(|h| {
            row.iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| v.as_str())
                .unwrap_or("")
        });
        writer.write_record(cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Every swearer and swearee, first occurrence of each agent name kept.
pub fn collect_agents(oaths: &[JsonObject]) -> Vec<JsonObject> {
    let mut seen = HashSet::new();
    let mut agents = Vec::new();

    for oath in oaths {
        let Some(oath_id) = oath.get("oath_id").filter(|v| !is_falsy(v)) else {
            continue;
        };
        for role in JOINED_PEOPLE {
            let people = oath.get(*role).and_then(Value::as_array);
            if people.map_or(true, |p| p.is_empty()) {
                warn!(oath_id = %oath_id, "no {}s", role);
                continue;
            }
            for person in people.into_iter().flatten() {
                let Value::Object(person) = person else {
                    continue;
                };
                let name = person.get("agent").map(scalar).unwrap_or_default();
                if seen.insert(name) {
                    agents.push(person.clone());
                }
            }
        }
    }
    agents
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// CSV rows straight from JSON objects, values rendered as scalars.
pub fn object_rows(objects: &[JsonObject]) -> Vec<Vec<(String, String)>> {
    objects
        .iter()
        .map(|o| o.iter().map(|(k, v)| (k.clone(), scalar(v))).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Gender, Person};

    fn person(agent: &str) -> Person {
        Person {
            agent: agent.into(),
            gender: Some(Gender::Female),
            age: "mature".into(),
            status: "free".into(),
            origin: "Argive".into(),
        }
    }

    fn record() -> Record {
        let mut r = Record::new(3885);
        r.insert("author".into(), FieldValue::Text("Euripides".into()));
        r.insert(
            "swearee".into(),
            FieldValue::People(vec![person("Clytemnestra"), person("Female chorus")]),
        );
        r.insert("gods_invoked".into(), FieldValue::List(vec!["Zeus".into(), "Hera".into()]));
        r
    }

    fn csv_string(rows: &[Vec<(String, String)>]) -> String {
        let mut buf = Vec::new();
        write_csv(rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn ndjson_lines_read_back_in_order() {
        let mut buf = Vec::new();
        write_ndjson(&[record(), Record::new(2)], &mut buf).unwrap();
        let objects = read_ndjson(buf.as_slice()).unwrap();

        assert_eq!(objects.len(), 2);
        let keys: Vec<&String> = objects[0].keys().collect();
        assert_eq!(keys, ["oath_id", "author", "swearee", "gods_invoked"]);
        assert_eq!(objects[1]["oath_id"], 2);
    }

    #[test]
    fn non_object_line_names_its_line() {
        let err = read_ndjson("{\"oath_id\": 1}\n\n[1, 2]\n".as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn flattening_joins_names_and_lists() {
        let flat = flatten_oath(&to_object(&record()).unwrap());
        assert_eq!(
            flat,
            vec![
                ("oath_id".to_string(), "3885".to_string()),
                ("author".to_string(), "Euripides".to_string()),
                ("swearee".to_string(), "Clytemnestra; Female chorus".to_string()),
                ("gods_invoked".to_string(), "Zeus; Hera".to_string()),
            ]
        );
    }

    #[test]
    fn csv_header_follows_first_row() {
        let rows = vec![
            vec![("oath_id".to_string(), "1".to_string()), ("date".to_string(), "x, y".to_string())],
            vec![("date".to_string(), "z".to_string()), ("remarks".to_string(), "dropped".to_string())],
        ];
        assert_eq!(csv_string(&rows), "oath_id,date\n1,\"x, y\"\n,z\n");
        assert_eq!(csv_string(&[]), "");
    }

    #[test]
    fn agents_are_unique_by_name() {
        let mut other = Record::new(4);
        other.insert("swearer".into(), FieldValue::People(vec![person("Clytemnestra"), person("Orestes")]));
        let oaths = vec![
            to_object(&record()).unwrap(),
            to_object(&other).unwrap(),
            read_ndjson(r#"{"swearer": [{"agent": "Nobody"}]}"#.as_bytes()).unwrap().remove(0),
        ];

        let agents = collect_agents(&oaths);
        let names: Vec<String> = agents.iter().map(|a| scalar(&a["agent"])).collect();
        assert_eq!(names, vec!["Clytemnestra", "Female chorus", "Orestes"]);
        assert_eq!(agents[0]["gender"], "female");
    }
}
