use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;

/// Imports video summaries into the knowledge base.
#[derive(Debug, Parser)]
#[command(name = "main", version)]
pub struct Cli {
    /// JSON array of video ids; defaults to the configured `video_ids_file`
    #[arg(long)]
    pub ids_file: Option<PathBuf>,

    /// Re-import previously backed up records instead of fetching videos
    #[arg(long = "from-backup", num_args = 1.., value_name = "FILE")]
    pub from_backup: Vec<PathBuf>,

    /// Video ids to import; takes precedence over the ids file
    #[arg(value_name = "VIDEO_ID")]
    pub video_ids: Vec<String>,
}

/// What the batch should run on.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchInput {
    Videos(Vec<String>),
    Backups(Vec<PathBuf>),
}

impl Cli {
    pub fn batch_input(&self, default_ids_file: &Path) -> Result<BatchInput> {
        if !self.from_backup.is_empty() {
            return Ok(BatchInput::Backups(self.from_backup.clone()));
        }

        let ids = if self.video_ids.is_empty() {
            let path = self.ids_file.as_deref().unwrap_or(default_ids_file);
            load_video_ids(path)?
        } else {
            self.video_ids.clone()
        };

        Ok(BatchInput::Videos(without_blank_ids(ids)))
    }
}

pub fn load_video_ids(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading video ids from {}", path.display()))?;
    let ids: Vec<String> = serde_json::from_str(&raw).with_context(|| {
        format!(
            "{} must contain a JSON array of video id strings",
            path.display()
        )
    })?;
    if ids.is_empty() {
        bail!("{} contains no video ids", path.display());
    }
    Ok(ids)
}

fn without_blank_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .filter_map(|id| {
            let trimmed = id.trim();
            if trimmed.is_empty() {
                warn!("ignoring blank video id in batch input");
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
