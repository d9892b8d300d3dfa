use std::sync::Arc;

use common::storage::{
    store::{RecordStore, StoreError},
    types::{block::Block, property::Properties, ParentRef, StoredRecord},
};
use thiserror::Error;
use tracing::warn;

/// A record that made it into the store.
#[derive(Debug, Clone)]
pub struct Written {
    pub record: StoredRecord,
    /// True when the record only went through with the degradable properties stripped.
    pub degraded: bool,
}

#[derive(Error, Debug)]
#[error("record write failed after {attempts} attempt(s): {source}")]
pub struct WriteFailed {
    pub attempts: u8,
    #[source]
    pub source: StoreError,
}

/// Two-phase record creation.
///
/// The full property set is submitted first. Only a validation rejection
/// triggers the second attempt, with the `degradable` properties removed.
#[derive(Clone)]
pub struct RecordWriter {
    store: Arc<dyn RecordStore>,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn write(
        &self,
        parent: &ParentRef,
        properties: &Properties,
        children: &[Block],
        degradable: &[&str],
    ) -> Result<Written, WriteFailed> {
        let err = match self.store.create_record(parent, properties, children).await {
            Ok(record) => {
                return Ok(Written {
                    record,
                    degraded: false,
                })
            }
            Err(err) => err,
        };

        if !err.is_validation() || degradable.is_empty() {
            return Err(WriteFailed {
                attempts: 1,
                source: err,
            });
        }

        warn!(
            data_source_id = %parent.data_source_id,
            dropped = ?degradable,
            error = %err,
            "record rejected; retrying without optional properties"
        );

        let reduced = properties.without(degradable);
        match self.store.create_record(parent, &reduced, children).await {
            Ok(record) => Ok(Written {
                record,
                degraded: true,
            }),
            Err(source) => Err(WriteFailed {
                attempts: 2,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::{
        memory::{MemoryStore, ScriptedFailure},
        types::property::PropertyValue,
    };

    const DB: &str = "snippets-db";
    const DEGRADABLE: &[&str] = &["Start Date", "End Date"];

    fn properties() -> Properties {
        Properties::new()
            .with("Context", PropertyValue::Title("fact".into()))
            .with("Start Date", PropertyValue::Date("2020-01-01".into()))
    }

    #[tokio::test]
    async fn first_attempt_success_is_not_degraded() {
        let store = Arc::new(MemoryStore::new());
        let writer = RecordWriter::new(store.clone());

        let written = writer
            .write(&ParentRef::data_source(DB), &properties(), &[], DEGRADABLE)
            .await
            .expect("write succeeds");

        assert!(!written.degraded);
        assert_eq!(store.create_count(DB), 1);
    }

    #[tokio::test]
    async fn validation_rejection_retries_without_degradable_properties() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_create(DB, ScriptedFailure::Validation);
        let writer = RecordWriter::new(store.clone());

        let written = writer
            .write(&ParentRef::data_source(DB), &properties(), &[], DEGRADABLE)
            .await
            .expect("retry succeeds");

        assert!(written.degraded);
        let stored = store.record(&written.record.id).expect("stored");
        assert!(stored.properties.contains("Context"));
        assert!(!stored.properties.contains("Start Date"));
        assert_eq!(store.create_count(DB), 2);
    }

    #[tokio::test]
    async fn second_rejection_gives_up() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_create(DB, ScriptedFailure::Validation);
        store.fail_next_create(DB, ScriptedFailure::Validation);
        let writer = RecordWriter::new(store.clone());

        let failed = writer
            .write(&ParentRef::data_source(DB), &properties(), &[], DEGRADABLE)
            .await
            .expect_err("both attempts rejected");

        assert_eq!(failed.attempts, 2);
        assert!(failed.source.is_validation());
        assert!(store.records(DB).is_empty());
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_create(DB, ScriptedFailure::Server);
        let writer = RecordWriter::new(store.clone());

        let failed = writer
            .write(&ParentRef::data_source(DB), &properties(), &[], DEGRADABLE)
            .await
            .expect_err("server failure");

        assert_eq!(failed.attempts, 1);
        assert_eq!(store.create_count(DB), 1);
    }

    #[tokio::test]
    async fn nothing_degradable_means_single_attempt() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_create(DB, ScriptedFailure::Validation);
        let writer = RecordWriter::new(store.clone());

        let failed = writer
            .write(&ParentRef::data_source(DB), &properties(), &[], &[])
            .await
            .expect_err("no retry without degradable properties");

        assert_eq!(failed.attempts, 1);
        assert_eq!(store.create_count(DB), 1);
    }
}
