//! JSON file storage implementation.
//!
//! Stores one JSON file per recommendation under `<root>/recommendations/`.

use std::path::Path;
use sri_core::{Recommendation, RecommendationId};
use super::trait_::{finish_listing, RecommendationFilter};
use super::{Storage, Result};
use tokio::fs;
use tracing::{debug, warn};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: std::path::PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the `recommendations/` directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("recommendations")).await?;
        Ok(Self { root })
    }

    fn recommendation_path(&self, id: RecommendationId) -> std::path::PathBuf {
        self.root.join("recommendations").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_recommendation(&mut self, record: &Recommendation) -> Result<()> {
        let path = self.recommendation_path(record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json.as_bytes()).await?;
        debug!("Saved recommendation {} to {}", record.id, path.display());
        Ok(())
    }

    async fn load_recommendation(&self, id: RecommendationId) -> Result<Option<Recommendation>> {
        read_json(&self.recommendation_path(id)).await
    }

    async fn list_recommendations(&self, filter: &RecommendationFilter) -> Result<Vec<Recommendation>> {
        let all: Vec<Recommendation> = list_dir(&self.root.join("recommendations")).await?;
        let matching = all.into_iter().filter(|r| filter.matches(r)).collect();
        Ok(finish_listing(matching, filter))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &std::path::Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable record {}: {}", entry.path().display(), e),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sri_core::{Decision, HitlStatus, Judgment, Profile};

    fn record(confidence: f64) -> Recommendation {
        let profile = Profile::new("Claire", 45, "Finance", "analyse de données de marché");
        let decision = Decision::from_judgment(Judgment::new("S-2024-PRO", "ok", confidence), 0.75);
        Recommendation::new(profile, decision, 0.75)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let rec = record(0.95);
        storage.save_recommendation(&rec).await.unwrap();

        let loaded = storage.load_recommendation(rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, rec.id);
        assert_eq!(loaded.decision.status(), HitlStatus::AutoApproved);
        assert_eq!(loaded.profile.sector, "Finance");
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        assert!(storage.load_recommendation(RecommendationId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_recommendation(&record(0.95)).await.unwrap();
        storage.save_recommendation(&record(0.40)).await.unwrap();
        storage.save_recommendation(&record(0.10)).await.unwrap();
        fs::write(dir.path().join("recommendations").join("notes.txt"), b"x").await.unwrap();
        fs::write(dir.path().join("recommendations").join("broken.json"), b"{").await.unwrap();

        let all = storage.list_recommendations(&RecommendationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let pending = storage
            .list_recommendations(&RecommendationFilter {
                status: Some(HitlStatus::NeedsReview),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn test_tampered_status_refused_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let rec = record(0.30);
        storage.save_recommendation(&rec).await.unwrap();

        let path = dir.path().join("recommendations").join(format!("{}.json", rec.id));
        let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        json["decision"]["hitl_status"] = "VALIDÉ_AUTO".into();
        fs::write(&path, serde_json::to_vec(&json).unwrap()).await.unwrap();

        assert!(storage.load_recommendation(rec.id).await.is_err());
        let all = storage.list_recommendations(&RecommendationFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }
}
