use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use common::storage::{
    store::{RecordStore, StoreError},
    types::{
        filter::Filter,
        property::{Properties, PropertyValue},
        ParentRef,
    },
};
use tracing::{debug, error, info};

use super::schema::{entity, INBOX, STATUS};

/// Name → entity id memo shared by every resolver of one batch run.
///
/// Failed resolutions are remembered too and are not retried.
#[derive(Debug, Default)]
pub struct ResolverCache {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// `None` on a miss, `Some(None)` for a remembered failure.
    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: String, resolved: Option<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, resolved);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finds or creates the entity record for a name.
///
/// Resolving is not a pure lookup: an unknown name creates a new entity.
pub struct EntityResolver {
    store: Arc<dyn RecordStore>,
    entities_db: String,
    cache: Arc<ResolverCache>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn RecordStore>, entities_db: &str, cache: Arc<ResolverCache>) -> Self {
        Self {
            store,
            entities_db: entities_db.to_string(),
            cache,
        }
    }

    /// Returns the entity id for `name`, or `None` for blank names and store failures.
    pub async fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let key = ResolverCache::normalize(name);
        if let Some(cached) = self.cache.get(&key) {
            debug!(entity = name, resolved = cached.is_some(), "entity cache hit");
            return cached;
        }

        info!(entity = name, "resolving entity");
        let resolved = match self.find_or_create(name).await {
            Ok(id) => Some(id),
            Err(err) => {
                error!(entity = name, error = %err, "failed to resolve entity");
                None
            }
        };

        self.cache.insert(key, resolved.clone());
        resolved
    }

    async fn find_or_create(&self, name: &str) -> Result<String, StoreError> {
        let filter = Filter::Or(vec![
            Filter::multi_select_contains(entity::ALIASES, name),
            Filter::title_equals(entity::NAME, name),
        ]);

        let existing = self.store.query(&self.entities_db, &filter).await?;
        if let Some(record) = existing.into_iter().next() {
            info!(entity = name, entity_id = %record.id, "found existing entity");
            return Ok(record.id);
        }

        info!(entity = name, "entity not found; creating");
        let properties = Properties::new()
            .with(entity::NAME, PropertyValue::Title(name.to_string()))
            .with(STATUS, PropertyValue::Select(INBOX.to_string()));

        let created = self
            .store
            .create_record(&ParentRef::data_source(&self.entities_db), &properties, &[])
            .await?;

        info!(entity = name, entity_id = %created.id, "created entity");
        Ok(created.id)
    }
}
