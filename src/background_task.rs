use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::time::interval;

/// Periodically deletes uploads older than `ttl`.
///
/// Requests remove their own files; this only catches files left behind
/// when the process died between writing and removing an upload.
pub async fn start_stale_upload_sweep(upload_dir: PathBuf, ttl: Duration) {
    let mut interval = interval(ttl.max(Duration::from_secs(60)));

    loop {
        interval.tick().await;

        match sweep_stale_uploads(&upload_dir, ttl).await {
            Ok(0) => tracing::debug!("No stale uploads found"),
            Ok(count) => tracing::info!("Removed {} stale uploads", count),
            Err(e) => tracing::error!("Stale upload sweep failed: {}", e),
        }
    }
}

/// Removes regular files in `upload_dir` last modified more than `ttl` ago.
pub async fn sweep_stale_uploads(upload_dir: &Path, ttl: Duration) -> anyhow::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(upload_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        let age = now
            .duration_since(metadata.modified()?)
            .unwrap_or(Duration::ZERO);

        if age > ttl {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "Could not remove stale upload"),
            }
        }
    }

    Ok(removed)
}
