use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// A single typed property value, serialized into the store's property shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Select(String),
    MultiSelect(Vec<String>),
    Relation(Vec<String>),
    Url(String),
    /// Calendar date (`YYYY-MM-DD`) or ISO timestamp.
    Date(String),
}

fn text_runs(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

impl PropertyValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(content) => json!({ "title": text_runs(content) }),
            Self::RichText(content) => json!({ "rich_text": text_runs(content) }),
            Self::Select(name) => json!({ "select": { "name": name } }),
            Self::MultiSelect(names) => {
                let options: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
                json!({ "multi_select": options })
            }
            Self::Relation(ids) => {
                let targets: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
                json!({ "relation": targets })
            }
            Self::Url(url) => json!({ "url": url }),
            Self::Date(start) => json!({ "date": { "start": start } }),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Named property set submitted with a create call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Copy of this set with the named properties removed.
    pub fn without(&self, names: &[&str]) -> Self {
        let mut reduced = self.clone();
        for name in names {
            reduced.0.remove(*name);
        }
        reduced
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_serialize_into_store_shape() {
        let properties = Properties::new()
            .with("Name", PropertyValue::Title("Jane Doe".into()))
            .with("Status", PropertyValue::Select("Inbox".into()))
            .with(
                "Entities",
                PropertyValue::Relation(vec!["a".into(), "b".into()]),
            )
            .with("Adding Date", PropertyValue::Date("2024-05-01".into()));

        let value = serde_json::to_value(&properties).expect("serializes");

        assert_eq!(
            value["Name"],
            json!({ "title": [{ "text": { "content": "Jane Doe" } }] })
        );
        assert_eq!(value["Status"], json!({ "select": { "name": "Inbox" } }));
        assert_eq!(
            value["Entities"],
            json!({ "relation": [{ "id": "a" }, { "id": "b" }] })
        );
        assert_eq!(value["Adding Date"], json!({ "date": { "start": "2024-05-01" } }));
    }

    #[test]
    fn without_drops_only_named_properties() {
        let properties = Properties::new()
            .with("Context", PropertyValue::Title("fact".into()))
            .with("Start Date", PropertyValue::Date("2020-01-01".into()))
            .with("End Date", PropertyValue::Date("2020-12-31".into()));

        let reduced = properties.without(&["Start Date", "End Date", "Missing"]);

        assert_eq!(reduced.len(), 1);
        assert!(reduced.contains("Context"));
        assert_eq!(properties.len(), 3, "original set is untouched");
    }
}
