use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Gender {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "n/a" => Some(Gender::NotApplicable),
            _ => None,
        }
    }
}

/// One swearer or swearee. `gender` is `None` when the descriptor group
/// could not be parsed and only the name survived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub agent: String,
    pub gender: Option<Gender>,
    pub age: String,
    pub status: String,
    pub origin: String,
}

impl Person {
    pub fn name_only(agent: &str) -> Self {
        Person {
            agent: agent.to_string(),
            gender: None,
            age: String::new(),
            status: String::new(),
            origin: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    People(Vec<Person>),
}

#[allow(dead_code)]
impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_people(&self) -> Option<&[Person]> {
        match self {
            FieldValue::People(people) => Some(people),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(t) => serializer.serialize_str(t),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::People(people) => people.serialize(serializer),
        }
    }
}

/// One extracted oath page: the id plus every field in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub oath_id: i64,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(oath_id: i64) -> Self {
        Record {
            oath_id,
            fields: Vec::new(),
        }
    }

    /// Last write wins, but the key keeps the slot of its first insertion.
    pub fn insert(&mut self, key: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[allow(dead_code)]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("oath_id", &self.oath_id)?;
        for (key, value) in &self.fields {
            // a table row labelled "Oath ID:" must not shadow the real id
            if key != "oath_id" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let mut r = Record::new(7);
        r.insert("date".into(), FieldValue::Text("first".into()));
        r.insert("state".into(), FieldValue::Text("Athens".into()));
        r.insert("date".into(), FieldValue::Text("second".into()));

        assert_eq!(r.len(), 2);
        assert_eq!(r.text("date"), Some("second"));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["date", "state"]);
    }

    #[test]
    fn serializes_id_first_then_fields_in_order() {
        let mut r = Record::new(3885);
        r.insert("remarks".into(), FieldValue::Text("none".into()));
        r.insert("gods_invoked".into(), FieldValue::List(vec!["Zeus".into()]));
        r.insert(
            "swearer".into(),
            FieldValue::People(vec![Person {
                agent: "Achilles".into(),
                gender: Some(Gender::Male),
                age: "adolescent".into(),
                status: "power-holder".into(),
                origin: "Phthian".into(),
            }]),
        );

        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"oath_id":3885,"remarks":"none","gods_invoked":["Zeus"],"swearer":[{"agent":"Achilles","gender":"male","age":"adolescent","status":"power-holder","origin":"Phthian"}]}"#
        );
    }

    #[test]
    fn name_only_person_has_null_gender() {
        let json = serde_json::to_string(&Person::name_only("Chorus")).unwrap();
        assert_eq!(
            json,
            r#"{"agent":"Chorus","gender":null,"age":"","status":"","origin":""}"#
        );
    }
}
