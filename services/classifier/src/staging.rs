//! Per-request upload staging.
//!
//! Every upload gets its own directory `<root>/_<id>` holding a single file
//! `<root>/_<id>/<id>`. The directory is removed by the cleanup middleware
//! once the response has been produced.

use adc_utils::AdcResult;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub id: String,
    pub dir: PathBuf,
    pub path: PathBuf,
}

/// Response extension naming the directory the cleanup middleware must remove.
#[derive(Debug, Clone)]
pub struct StagingDir(pub PathBuf);

pub async fn stage_upload(root: &Path, data: &[u8]) -> AdcResult<StagedUpload> {
    let id = Uuid::new_v4().simple().to_string();
    let dir = root.join(format!("_{}", id));
    let path = dir.join(&id);

    tokio::fs::create_dir_all(root).await?;
    tokio::fs::create_dir(&dir).await?;

    if let Err(e) = tokio::fs::write(&path, data).await {
        if let Err(cleanup) = tokio::fs::remove_dir_all(&dir).await {
            warn!(error = %cleanup, dir = %dir.display(), "Failed to remove partial staging directory");
        }
        return Err(e.into());
    }

    debug!(dir = %dir.display(), bytes = data.len(), "Upload staged");

    Ok(StagedUpload { id, dir, path })
}

pub async fn remove_staging_dir(dir: &Path) -> AdcResult<()> {
    tokio::fs::remove_dir_all(dir).await?;
    debug!(dir = %dir.display(), "Staging directory removed");
    Ok(())
}
