use std::sync::Arc;

use common::storage::types::{
    property::{Properties, PropertyValue},
    ParentRef,
};
use tracing::{error, info, warn};

use super::{
    resolver::EntityResolver,
    schema::{snippet, ADDING_DATE, INBOX, STATUS},
    writer::RecordWriter,
};
use crate::{
    types::ExtractedSnippet,
    utils::dates::{is_iso_calendar_date, present_value, today_iso},
};

/// Persists extracted snippets under their media record, linked to the entities they mention.
pub struct SnippetLinker {
    resolver: Arc<EntityResolver>,
    writer: RecordWriter,
    snippets_db: String,
}

impl SnippetLinker {
    pub fn new(resolver: Arc<EntityResolver>, writer: RecordWriter, snippets_db: &str) -> Self {
        Self {
            resolver,
            writer,
            snippets_db: snippets_db.to_string(),
        }
    }

    /// Writes one snippet; failures are logged and reported as `None`.
    pub async fn write_snippet(&self, item: &ExtractedSnippet, media_id: &str) -> Option<String> {
        let entity_ids = self.resolve_entities(&item.entities).await;
        let properties = snippet_properties(item, media_id, entity_ids, &today_iso());

        match self
            .writer
            .write(
                &ParentRef::data_source(&self.snippets_db),
                &properties,
                &[],
                snippet::DEGRADABLE,
            )
            .await
        {
            Ok(written) => {
                info!(
                    media_id,
                    snippet_id = %written.record.id,
                    degraded = written.degraded,
                    "created snippet"
                );
                Some(written.record.id)
            }
            Err(err) => {
                error!(media_id, error = %err, "failed to create snippet");
                None
            }
        }
    }

    /// Resolves names in order, skipping the ones that fail and repeated ids.
    async fn resolve_entities(&self, names: &[String]) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            match self.resolver.resolve(name).await {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => warn!(entity = %name, "skipping unresolved entity link"),
            }
        }
        ids
    }
}

pub fn snippet_properties(
    item: &ExtractedSnippet,
    media_id: &str,
    entity_ids: Vec<String>,
    today: &str,
) -> Properties {
    let mut properties = Properties::new()
        .with(snippet::CONTEXT, PropertyValue::Title(item.context.clone()))
        .with(
            snippet::SOURCE,
            PropertyValue::Relation(vec![media_id.to_string()]),
        )
        .with(snippet::ENTITIES, PropertyValue::Relation(entity_ids))
        .with(
            snippet::NOTE_TYPE,
            PropertyValue::Select(snippet::AUTOMATED_NOTE.to_string()),
        )
        .with(STATUS, PropertyValue::Select(INBOX.to_string()))
        .with(ADDING_DATE, PropertyValue::Date(today.to_string()));

    let event_date = &item.event_date;
    if let Some(human_readable) = event_date
        .human_readable
        .as_deref()
        .filter(|value| !value.is_empty() && *value != "null")
    {
        properties.insert(
            snippet::EVENT_DATE,
            PropertyValue::RichText(human_readable.to_string()),
        );
    }

    let date_columns = [
        (event_date.date_start_iso.as_deref(), snippet::START_DATE),
        (event_date.date_end_iso.as_deref(), snippet::END_DATE),
    ];
    for (value, column) in date_columns {
        let Some(value) = present_value(value) else {
            continue;
        };
        if is_iso_calendar_date(value) {
            properties.insert(column, PropertyValue::Date(value.to_string()));
        } else {
            warn!(column, value, "skipping invalid date in snippet");
        }
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::resolver::ResolverCache, types::EventDate};
    use common::storage::memory::{MemoryStore, ScriptedFailure};
    use std::{
        fmt,
        sync::{Mutex, PoisonError},
    };
    use tracing::{
        field::{Field, Visit},
        instrument::WithSubscriber,
        Event, Level, Subscriber,
    };
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    /// Keeps the level and message of every event emitted while installed.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

    impl CapturedEvents {
        fn warnings(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|(level, _)| *level == Level::WARN)
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    impl<S: Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = MessageField::default();
            event.record(&mut message);
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((*event.metadata().level(), message.0));
        }
    }

    #[derive(Default)]
    struct MessageField(String);

    impl Visit for MessageField {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    const ENTITIES: &str = "entities-db";
    const SNIPPETS: &str = "snippets-db";

    fn linker(store: &Arc<MemoryStore>) -> SnippetLinker {
        let resolver = Arc::new(EntityResolver::new(
            store.clone(),
            ENTITIES,
            Arc::new(ResolverCache::new()),
        ));
        SnippetLinker::new(resolver, RecordWriter::new(store.clone()), SNIPPETS)
    }

    fn item(entities: &[&str], event_date: EventDate) -> ExtractedSnippet {
        ExtractedSnippet {
            context: "Rust 1.0 was released".into(),
            entities: entities.iter().map(ToString::to_string).collect(),
            event_date,
        }
    }

    fn dates(human: Option<&str>, start: Option<&str>, end: Option<&str>) -> EventDate {
        EventDate {
            human_readable: human.map(Into::into),
            date_start_iso: start.map(Into::into),
            date_end_iso: end.map(Into::into),
        }
    }

    #[test]
    fn builds_fixed_properties() {
        let properties = snippet_properties(
            &item(&[], EventDate::default()),
            "media-1",
            vec!["e1".into()],
            "2024-06-01",
        );

        assert_eq!(
            properties.get(snippet::CONTEXT),
            Some(&PropertyValue::Title("Rust 1.0 was released".into()))
        );
        assert_eq!(
            properties.get(snippet::SOURCE),
            Some(&PropertyValue::Relation(vec!["media-1".into()]))
        );
        assert_eq!(
            properties.get(snippet::ENTITIES),
            Some(&PropertyValue::Relation(vec!["e1".into()]))
        );
        assert_eq!(
            properties.get(snippet::NOTE_TYPE),
            Some(&PropertyValue::Select("Automated Note".into()))
        );
        assert_eq!(
            properties.get(STATUS),
            Some(&PropertyValue::Select("Inbox".into()))
        );
        assert_eq!(
            properties.get(ADDING_DATE),
            Some(&PropertyValue::Date("2024-06-01".into()))
        );
        assert!(!properties.contains(snippet::EVENT_DATE));
        assert!(!properties.contains(snippet::START_DATE));
        assert!(!properties.contains(snippet::END_DATE));
    }

    #[test]
    fn null_literal_omits_event_date() {
        let properties = snippet_properties(
            &item(&[], dates(Some("null"), Some("null"), Some("NULL"))),
            "media-1",
            Vec::new(),
            "2024-06-01",
        );

        assert!(!properties.contains(snippet::EVENT_DATE));
        assert!(!properties.contains(snippet::START_DATE));
        assert!(!properties.contains(snippet::END_DATE));
    }

    #[test]
    fn each_date_is_validated_on_its_own() {
        let properties = snippet_properties(
            &item(&[], dates(Some("spring 2015"), Some("not-a-date"), Some("2015-05-15"))),
            "media-1",
            Vec::new(),
            "2024-06-01",
        );

        assert_eq!(
            properties.get(snippet::EVENT_DATE),
            Some(&PropertyValue::RichText("spring 2015".into()))
        );
        assert!(!properties.contains(snippet::START_DATE));
        assert_eq!(
            properties.get(snippet::END_DATE),
            Some(&PropertyValue::Date("2015-05-15".into()))
        );
    }

    #[tokio::test]
    async fn snippet_with_invalid_start_date_is_still_created() {
        let store = Arc::new(MemoryStore::new());
        let linker = linker(&store);

        let captured = CapturedEvents::default();

        let id = linker
            .write_snippet(
                &item(&["Rust"], dates(None, Some("not-a-date"), None)),
                "media-1",
            )
            .with_subscriber(tracing_subscriber::registry().with(captured.clone()))
            .await
            .expect("snippet created");

        let record = store.record(&id).expect("stored");
        assert!(!record.properties.contains(snippet::START_DATE));
        assert_eq!(store.create_count(SNIPPETS), 1);
        assert_eq!(
            captured.warnings(),
            vec!["skipping invalid date in snippet".to_string()]
        );
    }

    #[tokio::test]
    async fn rejected_dates_are_dropped_on_retry() {
        let store = Arc::new(MemoryStore::new());
        store.reject_property(SNIPPETS, snippet::START_DATE);
        let linker = linker(&store);

        let id = linker
            .write_snippet(
                &item(&[], dates(Some("1815"), Some("1815-12-10"), Some("1815-12-11"))),
                "media-1",
            )
            .await
            .expect("degraded write succeeds");

        let record = store.record(&id).expect("stored");
        assert!(!record.properties.contains(snippet::START_DATE));
        assert!(!record.properties.contains(snippet::END_DATE));
        assert!(record.properties.contains(snippet::EVENT_DATE));
        assert_eq!(store.create_count(SNIPPETS), 2);
    }

    #[tokio::test]
    async fn second_rejection_returns_none() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_create(SNIPPETS, ScriptedFailure::Validation);
        store.fail_next_create(SNIPPETS, ScriptedFailure::Validation);
        let linker = linker(&store);

        let result = linker
            .write_snippet(&item(&[], EventDate::default()), "media-1")
            .await;

        assert_eq!(result, None);
        assert!(store.records(SNIPPETS).is_empty());
    }

    #[tokio::test]
    async fn unresolvable_entities_are_left_out_of_the_links() {
        let store = Arc::new(MemoryStore::new());
        let linker = linker(&store);
        let rust_id = linker.resolver.resolve("Rust").await.expect("resolved");
        store.fail_next_query(ENTITIES, ScriptedFailure::Server);
        let captured = CapturedEvents::default();

        let id = linker
            .write_snippet(
                &item(&["Broken", "Rust", "  ", "rust"], EventDate::default()),
                "media-1",
            )
            .with_subscriber(tracing_subscriber::registry().with(captured.clone()))
            .await
            .expect("snippet created");

        let record = store.record(&id).expect("stored");
        assert_eq!(
            record.properties.get(snippet::ENTITIES),
            Some(&PropertyValue::Relation(vec![rust_id]))
        );
        let warnings = captured.warnings();
        assert_eq!(
            warnings
                .iter()
                .filter(|m| *m == "skipping unresolved entity link")
                .count(),
            2,
            "the failed lookup and the blank name are both reported"
        );
    }
}
