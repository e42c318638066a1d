//! Campaign brief persistence.

use async_trait::async_trait;
use chrono::Utc;
use deck_core::{CampaignBrief, NewCampaignBrief};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors from a brief store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt brief record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Create / find / list access to campaign briefs.
#[async_trait]
pub trait BriefStore: Send + Sync {
    /// Persist a validated brief and return the stored record.
    async fn create(&self, brief: NewCampaignBrief) -> Result<CampaignBrief, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CampaignBrief>, StoreError>;

    /// Newest first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<CampaignBrief>, StoreError>;
}

pub type SharedStore = Arc<dyn BriefStore>;

fn newest_first(mut briefs: Vec<CampaignBrief>, limit: usize) -> Vec<CampaignBrief> {
    briefs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    briefs.truncate(limit);
    briefs
}

/// Process-local store, lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    briefs: RwLock<HashMap<Uuid, CampaignBrief>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BriefStore for MemoryStore {
    async fn create(&self, brief: NewCampaignBrief) -> Result<CampaignBrief, StoreError> {
        let brief = brief.into_brief(Uuid::new_v4(), Utc::now());
        self.briefs.write().await.insert(brief.id, brief.clone());
        Ok(brief)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CampaignBrief>, StoreError> {
        Ok(self.briefs.read().await.get(&id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<CampaignBrief>, StoreError> {
        let briefs = self.briefs.read().await.values().cloned().collect();
        Ok(newest_first(briefs, limit))
    }
}

/// One JSON document per brief under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl BriefStore for FileStore {
    async fn create(&self, brief: NewCampaignBrief) -> Result<CampaignBrief, StoreError> {
        let brief = brief.into_brief(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_vec_pretty(&brief)?;

        // Write-then-rename so readers never see a half-written record.
        let path = self.record_path(brief.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(brief)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CampaignBrief>, StoreError> {
        match tokio::fs::read(self.record_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, limit: usize) -> Result<Vec<CampaignBrief>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut briefs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<CampaignBrief>(&bytes) {
                Ok(brief) => briefs.push(brief),
                Err(e) => log::warn!("Skipping unreadable brief {}: {}", path.display(), e),
            }
        }

        Ok(newest_first(briefs, limit))
    }
}
