mod config;
mod media;
mod report;
mod resolver;
pub mod schema;
mod services;
mod snippets;
mod state;
mod writer;

pub use config::{DataSources, IngestionConfig};
pub use media::{IngestState, MediaIngest, MediaIngestor};
pub use report::{BatchReport, VideoOutcome};
pub use resolver::{EntityResolver, ResolverCache};
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultPipelineServices, PipelineServices};
pub use snippets::{snippet_properties, SnippetLinker};
pub use writer::{RecordWriter, WriteFailed, Written};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use common::storage::store::RecordStore;
use tracing::{error, info, warn};

use crate::{types::VideoRecord, utils::backup};

/// Drives fetch, summary, backup and store writes for a batch of videos, one at a time.
///
/// One entity cache lives as long as the pipeline, so every video of the
/// batch links to the same entity records.
pub struct BatchPipeline {
    services: Arc<dyn PipelineServices>,
    ingestor: MediaIngestor,
    cache: Arc<ResolverCache>,
    backup_dir: PathBuf,
}

impl BatchPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        services: Arc<dyn PipelineServices>,
        sources: &DataSources,
        config: &IngestionConfig,
    ) -> Self {
        let cache = Arc::new(ResolverCache::new());
        let resolver = Arc::new(EntityResolver::new(
            Arc::clone(&store),
            &sources.entities,
            Arc::clone(&cache),
        ));
        let ingestor = MediaIngestor::new(store, resolver, sources, config);

        Self {
            services,
            ingestor,
            cache,
            backup_dir: config.backup_dir.clone(),
        }
    }

    pub fn cached_entities(&self) -> usize {
        self.cache.len()
    }

    fn duration_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Processes `video_ids` in order; a failing video never stops the batch.
    pub async fn run(&self, video_ids: &[String]) -> BatchReport {
        info!(videos = video_ids.len(), "starting media import batch");
        let mut report = BatchReport::default();

        for video_id in video_ids {
            let outcome = self.process_video(video_id).await;
            report.outcomes.push(outcome);
        }

        Self::log_summary(&report);
        report
    }

    /// Re-ingests records from backup files without fetching or summarizing again.
    pub async fn run_from_backups(&self, paths: &[PathBuf]) -> BatchReport {
        info!(backups = paths.len(), "starting import from backups");
        let mut report = BatchReport::default();

        for path in paths {
            let outcome = match backup::read_backup(path).await {
                Ok(record) => self.ingest_record(&record).await,
                Err(err) => {
                    error!(path = %path.display(), error = %err, "could not load backup");
                    VideoOutcome::Skipped {
                        video_id: backup_label(path),
                        reason: err.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        Self::log_summary(&report);
        report
    }

    #[tracing::instrument(skip(self))]
    pub async fn process_video(&self, video_id: &str) -> VideoOutcome {
        let started = Instant::now();
        let video_id = video_id.trim();
        if video_id.is_empty() {
            warn!("skipping blank video id");
            return VideoOutcome::Skipped {
                video_id: String::new(),
                reason: "blank video id".into(),
            };
        }
        if !backup::is_safe_video_id(video_id) {
            warn!("skipping malformed video id");
            return VideoOutcome::Skipped {
                video_id: video_id.to_string(),
                reason: "malformed video id".into(),
            };
        }

        let video = match self.services.extract_video(video_id).await {
            Ok(video) => video,
            Err(err) => {
                error!(error = %err, "video extraction failed; skipping");
                return VideoOutcome::Skipped {
                    video_id: video_id.to_string(),
                    reason: format!("extraction failed: {err}"),
                };
            }
        };

        let summary = match self.services.summarize(&video).await {
            Ok(summary) => summary,
            Err(err) => {
                error!(error = %err, "summarization failed; skipping");
                return VideoOutcome::Skipped {
                    video_id: video_id.to_string(),
                    reason: format!("summarization failed: {err}"),
                };
            }
        };

        let record = VideoRecord::new(video, summary);
        if let Err(err) = backup::write_backup(&self.backup_dir, &record).await {
            warn!(error = %err, "could not back up video record; continuing with import");
        }

        let outcome = self.ingest_record(&record).await;
        info!(
            elapsed_ms = Self::duration_millis(started.elapsed()),
            imported = outcome.media_id().is_some(),
            "video processed"
        );
        outcome
    }

    pub async fn ingest_record(&self, record: &VideoRecord) -> VideoOutcome {
        let video_id = record.video_id().to_string();
        match self.ingestor.ingest(record).await {
            Ok(MediaIngest {
                state: IngestState::Done,
                media_id: Some(media_id),
                snippets_created,
                snippets_failed,
            }) => {
                info!(%video_id, %media_id, "media import finished");
                VideoOutcome::Imported {
                    video_id,
                    media_id,
                    snippets_created,
                    snippets_failed,
                }
            }
            Ok(ingest) => {
                error!(%video_id, state = %ingest.state, "media record was not created");
                VideoOutcome::Failed {
                    video_id,
                    state: Some(ingest.state),
                    reason: ingest.state.to_string(),
                }
            }
            Err(err) => {
                error!(%video_id, error = %err, "media import failed");
                VideoOutcome::Failed {
                    video_id,
                    state: None,
                    reason: err.to_string(),
                }
            }
        }
    }

    fn log_summary(report: &BatchReport) {
        info!(
            imported = report.imported(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch finished"
        );
    }
}

fn backup_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().trim_end_matches("-full").to_string())
        .unwrap_or_default()
}
