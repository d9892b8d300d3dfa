//! In-memory record store for tests.
//!
//! Records every call it receives and can be scripted to fail, so callers can
//! assert on store traffic without a network.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    store::{RecordStore, StoreError},
    types::{block::Block, filter::Filter, property::Properties, ParentRef, StoredRecord},
};

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: String,
    pub data_source_id: String,
    pub properties: Properties,
    pub children: Vec<Block>,
}

impl MemoryRecord {
    fn to_stored(&self) -> StoredRecord {
        StoredRecord {
            id: self.id.clone(),
            properties: serde_json::to_value(&self.properties).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Query { data_source_id: String },
    Create { data_source_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Rejected request shape (HTTP 400).
    Validation,
    /// Server-side failure (HTTP 500).
    Server,
}

impl ScriptedFailure {
    fn into_error(self) -> StoreError {
        match self {
            Self::Validation => StoreError::from_status(400, "scripted validation failure"),
            Self::Server => StoreError::from_status(500, "scripted server failure"),
        }
    }
}

#[derive(Default)]
struct Inner {
    records: Vec<MemoryRecord>,
    calls: Vec<StoreCall>,
    query_failures: HashMap<String, VecDeque<ScriptedFailure>>,
    create_failures: HashMap<String, VecDeque<ScriptedFailure>>,
    rejected_properties: HashMap<String, HashSet<String>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a record directly, bypassing call tracking. Returns its id.
    pub fn seed(&self, data_source_id: &str, properties: Properties) -> String {
        let id = Uuid::new_v4().to_string();
        self.lock().records.push(MemoryRecord {
            id: id.clone(),
            data_source_id: data_source_id.to_string(),
            properties,
            children: Vec::new(),
        });
        id
    }

    pub fn fail_next_query(&self, data_source_id: &str, failure: ScriptedFailure) {
        self.lock()
            .query_failures
            .entry(data_source_id.to_string())
            .or_default()
            .push_back(failure);
    }

    pub fn fail_next_create(&self, data_source_id: &str, failure: ScriptedFailure) {
        self.lock()
            .create_failures
            .entry(data_source_id.to_string())
            .or_default()
            .push_back(failure);
    }

    /// Any create in `data_source_id` carrying `property` is rejected as a validation error.
    pub fn reject_property(&self, data_source_id: &str, property: &str) {
        self.lock()
            .rejected_properties
            .entry(data_source_id.to_string())
            .or_default()
            .insert(property.to_string());
    }

    /// Records of one data source in creation order.
    pub fn records(&self, data_source_id: &str) -> Vec<MemoryRecord> {
        self.lock()
            .records
            .iter()
            .filter(|record| record.data_source_id == data_source_id)
            .cloned()
            .collect()
    }

    pub fn record(&self, id: &str) -> Option<MemoryRecord> {
        self.lock().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn query_count(&self, data_source_id: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Query { data_source_id: ds } if ds == data_source_id))
            .count()
    }

    pub fn create_count(&self, data_source_id: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Create { data_source_id: ds } if ds == data_source_id))
            .count()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(
        &self,
        data_source_id: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Query {
            data_source_id: data_source_id.to_string(),
        });

        if let Some(failure) = inner
            .query_failures
            .get_mut(data_source_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(failure.into_error());
        }

        Ok(inner
            .records
            .iter()
            .filter(|record| record.data_source_id == data_source_id)
            .filter(|record| filter.matches(&record.properties))
            .map(MemoryRecord::to_stored)
            .collect())
    }

    async fn create_record(
        &self,
        parent: &ParentRef,
        properties: &Properties,
        children: &[Block],
    ) -> Result<StoredRecord, StoreError> {
        let data_source_id = parent.data_source_id.as_str();
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Create {
            data_source_id: data_source_id.to_string(),
        });

        if let Some(failure) = inner
            .create_failures
            .get_mut(data_source_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(failure.into_error());
        }

        if let Some(rejected) = inner.rejected_properties.get(data_source_id) {
            if let Some(name) = properties.names().find(|name| rejected.contains(*name)) {
                return Err(StoreError::from_status(
                    400,
                    format!("{name} failed validation"),
                ));
            }
        }

        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            data_source_id: data_source_id.to_string(),
            properties: properties.clone(),
            children: children.to_vec(),
        };
        let stored = record.to_stored();
        inner.records.push(record);

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::property::PropertyValue;

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let store = MemoryStore::new();
        store.fail_next_create("db", ScriptedFailure::Validation);
        let parent = ParentRef::data_source("db");
        let properties = Properties::new().with("Name", PropertyValue::Title("x".into()));

        let first = store.create_record(&parent, &properties, &[]).await;
        assert!(matches!(first, Err(ref e) if e.is_validation()));

        let second = store.create_record(&parent, &properties, &[]).await;
        assert!(second.is_ok());
        assert_eq!(store.records("db").len(), 1);
        assert_eq!(store.create_count("db"), 2);
    }

    #[tokio::test]
    async fn query_only_returns_matching_records_of_the_data_source() {
        let store = MemoryStore::new();
        store.seed(
            "entities",
            Properties::new().with("Name", PropertyValue::Title("Ada".into())),
        );
        store.seed(
            "other",
            Properties::new().with("Name", PropertyValue::Title("Ada".into())),
        );

        let found = store
            .query("entities", &Filter::title_equals("Name", "Ada"))
            .await
            .expect("query succeeds");

        assert_eq!(found.len(), 1);
        assert_eq!(store.query_count("entities"), 1);
        assert_eq!(store.query_count("other"), 0);
    }
}
