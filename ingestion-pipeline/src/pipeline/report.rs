use super::media::IngestState;

/// What happened to one video of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOutcome {
    Imported {
        video_id: String,
        media_id: String,
        snippets_created: usize,
        snippets_failed: usize,
    },
    /// Nothing reached the record store (fetch or summary unavailable).
    Skipped { video_id: String, reason: String },
    Failed {
        video_id: String,
        state: Option<IngestState>,
        reason: String,
    },
}

impl VideoOutcome {
    pub fn video_id(&self) -> &str {
        match self {
            Self::Imported { video_id, .. }
            | Self::Skipped { video_id, .. }
            | Self::Failed { video_id, .. } => video_id,
        }
    }

    pub fn media_id(&self) -> Option<&str> {
        match self {
            Self::Imported { media_id, .. } => Some(media_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<VideoOutcome>,
}

impl BatchReport {
    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Imported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&VideoOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}
