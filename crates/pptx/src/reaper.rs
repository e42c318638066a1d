//! Removal of stale working directories.
//!
//! A process killed mid-generation leaves its working directory behind.
//! The reaper deletes UUID-named directories under the work root that are
//! older than a grace period; anything else in the root is left alone.

use deck_core::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Remove working directories last modified more than `grace` ago.
///
/// Returns how many were removed. A missing work root counts as empty.
pub async fn reap_stale_workdirs(work_root: &Path, grace: Duration) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(work_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let is_workdir = name
            .to_str()
            .map(|n| Uuid::parse_str(n).is_ok())
            .unwrap_or(false);
        if !is_workdir {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(m) if m.is_dir() => m,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < grace {
            continue;
        }

        match tokio::fs::remove_dir_all(entry.path()).await {
            Ok(()) => {
                log::info!("Reaped stale working directory {}", entry.path().display());
                removed += 1;
            }
            Err(e) => log::error!("Failed to reap {}: {}", entry.path().display(), e),
        }
    }

    Ok(removed)
}

/// Run [`reap_stale_workdirs`] every `every` on the current runtime.
pub fn spawn_reaper(work_root: PathBuf, every: Duration, grace: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = reap_stale_workdirs(&work_root, grace).await {
                log::warn!("Working directory sweep failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reaps_only_stale_uuid_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let stale = tmp.path().join(Uuid::new_v4().to_string());
        let unrelated = tmp.path().join("keep-me");
        std::fs::create_dir_all(stale.join("ppt")).unwrap();
        std::fs::create_dir_all(&unrelated).unwrap();

        let removed = reap_stale_workdirs(tmp.path(), Duration::ZERO).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!stale.exists());
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn test_fresh_dirs_survive_grace_period() {
        let tmp = tempfile::tempdir().unwrap();
        let fresh = tmp.path().join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&fresh).unwrap();

        let removed = reap_stale_workdirs(tmp.path(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(removed, 0);
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let removed = reap_stale_workdirs(&tmp.path().join("absent"), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
