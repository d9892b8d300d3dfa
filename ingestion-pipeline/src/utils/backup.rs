use std::path::{Path, PathBuf};

use common::error::AppError;
use tracing::info;

use crate::types::VideoRecord;

/// Video ids end up in file names, so only the platform's id alphabet is accepted.
pub fn is_safe_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn backup_path(dir: &Path, video_id: &str) -> PathBuf {
    dir.join(format!("{video_id}-full.json"))
}

/// Writes the merged record as pretty JSON, one file per video id.
pub async fn write_backup(dir: &Path, record: &VideoRecord) -> Result<PathBuf, AppError> {
    if !is_safe_video_id(record.video_id()) {
        return Err(AppError::Validation(format!(
            "refusing to back up video id {:?}",
            record.video_id()
        )));
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = backup_path(dir, record.video_id());
    let json = serde_json::to_vec_pretty(record)?;
    tokio::fs::write(&path, json).await?;

    info!(video_id = %record.video_id(), path = %path.display(), "video record backed up");
    Ok(path)
}

pub async fn read_backup(path: &Path) -> Result<VideoRecord, AppError> {
    let raw = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&raw)?)
}
