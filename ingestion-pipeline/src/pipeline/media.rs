use std::{fmt, sync::Arc};

use common::{
    error::AppError,
    storage::{
        store::RecordStore,
        types::{
            property::{Properties, PropertyValue},
            ParentRef,
        },
    },
};
use state_machines::core::GuardError;
use tracing::{error, info, instrument, warn};

use super::{
    config::{DataSources, IngestionConfig},
    resolver::EntityResolver,
    schema::{media, ADDING_DATE, INBOX, STATUS},
    snippets::SnippetLinker,
    state::pending,
    writer::RecordWriter,
};
use crate::{types::VideoRecord, utils::chunking::summary_blocks, utils::dates::today_iso};

/// Terminal state of one media ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Done,
    AuthorResolutionFailed,
    MediaCreationFailed,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Done => "done",
            Self::AuthorResolutionFailed => "author resolution failed",
            Self::MediaCreationFailed => "media creation failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaIngest {
    pub state: IngestState,
    pub media_id: Option<String>,
    pub snippets_created: usize,
    pub snippets_failed: usize,
}

impl MediaIngest {
    fn failed(state: IngestState) -> Self {
        Self {
            state,
            media_id: None,
            snippets_created: 0,
            snippets_failed: 0,
        }
    }
}

/// Writes one video as an author-linked media record followed by its snippets.
pub struct MediaIngestor {
    resolver: Arc<EntityResolver>,
    writer: RecordWriter,
    linker: SnippetLinker,
    media_db: String,
    summary_chunk_chars: usize,
}

impl MediaIngestor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        resolver: Arc<EntityResolver>,
        sources: &DataSources,
        config: &IngestionConfig,
    ) -> Self {
        let writer = RecordWriter::new(store);
        let linker = SnippetLinker::new(Arc::clone(&resolver), writer.clone(), &sources.snippets);
        Self {
            resolver,
            writer,
            linker,
            media_db: sources.media.clone(),
            summary_chunk_chars: config.summary_chunk_chars,
        }
    }

    /// Returns the media record id, or `None` when the author or the media record could not be written.
    pub async fn create_media(&self, record: &VideoRecord) -> Option<String> {
        match self.ingest(record).await {
            Ok(outcome) => outcome.media_id,
            Err(err) => {
                error!(video_id = %record.video_id(), error = %err, "media ingestion aborted");
                None
            }
        }
    }

    #[instrument(skip_all, fields(video_id = %record.video_id()))]
    pub async fn ingest(&self, record: &VideoRecord) -> Result<MediaIngest, AppError> {
        info!(title = %record.title(), "creating media record");
        let machine = pending();

        let Some(author_id) = self.resolver.resolve(record.channel_title()).await else {
            error!(
                author = %record.channel_title(),
                "could not resolve author entity; aborting media creation"
            );
            let _failed = machine
                .author_failed()
                .map_err(|(_, guard)| map_guard_error("author_failed", &guard))?;
            return Ok(MediaIngest::failed(IngestState::AuthorResolutionFailed));
        };
        let machine = machine
            .author_resolved()
            .map_err(|(_, guard)| map_guard_error("author_resolved", &guard))?;

        let properties = media_properties(record, &author_id);
        let blocks = summary_blocks(record.full_summary(), self.summary_chunk_chars);

        let media_id = match self
            .writer
            .write(
                &ParentRef::data_source(&self.media_db),
                &properties,
                &blocks,
                &[],
            )
            .await
        {
            Ok(written) => written.record.id,
            Err(err) => {
                error!(error = %err, "failed to create media record");
                let _failed = machine
                    .media_failed()
                    .map_err(|(_, guard)| map_guard_error("media_failed", &guard))?;
                return Ok(MediaIngest::failed(IngestState::MediaCreationFailed));
            }
        };
        info!(%media_id, blocks = blocks.len(), "created media record");

        let machine = machine
            .media_created()
            .map_err(|(_, guard)| map_guard_error("media_created", &guard))?;
        let machine = machine
            .persist_snippets()
            .map_err(|(_, guard)| map_guard_error("persist_snippets", &guard))?;

        let snippets = record.extracted_snippets();
        info!(%media_id, count = snippets.len(), "processing snippets");

        let mut snippets_created = 0usize;
        let mut snippets_failed = 0usize;
        // Oldest-appearing fact is written first.
        for item in snippets.iter().rev() {
            match self.linker.write_snippet(item, &media_id).await {
                Some(_) => snippets_created = snippets_created.saturating_add(1),
                None => snippets_failed = snippets_failed.saturating_add(1),
            }
        }

        if snippets_failed > 0 {
            warn!(%media_id, snippets_failed, "some snippets were not created");
        }

        let _machine = machine
            .finish()
            .map_err(|(_, guard)| map_guard_error("finish", &guard))?;

        Ok(MediaIngest {
            state: IngestState::Done,
            media_id: Some(media_id),
            snippets_created,
            snippets_failed,
        })
    }
}

fn media_properties(record: &VideoRecord, author_id: &str) -> Properties {
    let mut properties = Properties::new()
        .with(media::TITLE, PropertyValue::Title(record.title().to_string()))
        .with(
            media::MEDIA_TYPE,
            PropertyValue::Select(media::VIDEO.to_string()),
        )
        .with(
            media::AUTHOR,
            PropertyValue::Relation(vec![author_id.to_string()]),
        )
        .with(media::URL, PropertyValue::Url(record.url().to_string()))
        .with(ADDING_DATE, PropertyValue::Date(today_iso()))
        .with(STATUS, PropertyValue::Select(INBOX.to_string()));

    if record.published_at().is_empty() {
        warn!(video_id = %record.video_id(), "video has no publishing date");
    } else {
        properties.insert(
            media::PUBLISHING_DATE,
            PropertyValue::Date(record.published_at().to_string()),
        );
    }

    properties
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid media ingestion transition during {event}: {guard:?}"
    ))
}
