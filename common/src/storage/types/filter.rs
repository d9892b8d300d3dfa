use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use super::property::{Properties, PropertyValue};

/// Query filter over a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    TitleEquals { property: String, value: String },
    MultiSelectContains { property: String, value: String },
    Or(Vec<Filter>),
}

impl Filter {
    pub fn title_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TitleEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn multi_select_contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MultiSelectContains {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::TitleEquals { property, value } => {
                json!({ "property": property, "title": { "equals": value } })
            }
            Self::MultiSelectContains { property, value } => {
                json!({ "property": property, "multi_select": { "contains": value } })
            }
            Self::Or(filters) => {
                let clauses: Vec<Value> = filters.iter().map(Self::to_json).collect();
                json!({ "or": clauses })
            }
        }
    }

    /// Evaluates the filter against a typed property set, mirroring the store's semantics.
    pub fn matches(&self, properties: &Properties) -> bool {
        match self {
            Self::TitleEquals { property, value } => matches!(
                properties.get(property),
                Some(PropertyValue::Title(title)) if title == value
            ),
            Self::MultiSelectContains { property, value } => matches!(
                properties.get(property),
                Some(PropertyValue::MultiSelect(options)) if options.iter().any(|o| o == value)
            ),
            Self::Or(filters) => filters.iter().any(|filter| filter.matches(properties)),
        }
    }
}

impl Serialize for Filter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
