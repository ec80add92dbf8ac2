//! In-memory storage implementation.

use std::collections::HashMap;
use sri_core::{Recommendation, RecommendationId};
use super::trait_::{finish_listing, RecommendationFilter};
use super::{Storage, Result};
use tracing::debug;

/// Records kept in memory before the oldest are dropped.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Process-local storage; contents are lost on restart.
///
/// Holds at most `max_records` records, dropping the oldest first.
#[derive(Debug)]
pub struct MemoryStorage {
    recommendations: HashMap<RecommendationId, Recommendation>,
    max_records: usize,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self {
            recommendations: HashMap::new(),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Keep at most `max_records` records.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    fn evict_oldest(&mut self) {
        while self.recommendations.len() > self.max_records {
            let Some(oldest) = self
                .recommendations
                .values()
                .min_by_key(|r| (r.created_at, r.id))
                .map(|r| r.id)
            else {
                break;
            };
            self.recommendations.remove(&oldest);
            debug!("Dropped recommendation {}", oldest);
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save_recommendation(&mut self, record: &Recommendation) -> Result<()> {
        self.recommendations.insert(record.id, record.clone());
        self.evict_oldest();
        Ok(())
    }

    async fn load_recommendation(&self, id: RecommendationId) -> Result<Option<Recommendation>> {
        Ok(self.recommendations.get(&id).cloned())
    }

    async fn list_recommendations(&self, filter: &RecommendationFilter) -> Result<Vec<Recommendation>> {
        let matching = self
            .recommendations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(finish_listing(matching, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sri_core::{Decision, Judgment, Profile};

    #[tokio::test]
    async fn test_list_most_recent_first_with_limit() {
        let mut storage = MemoryStorage::new();
        let profile = Profile::new("A", 30, "Retail", "gestion");

        let mut older = Recommendation::new(
            profile.clone(),
            Decision::from_judgment(Judgment::new("B-2024-ESS", "", 0.9), 0.75),
            0.75,
        );
        older.created_at = older.created_at - chrono::Duration::minutes(5);
        let newer = Recommendation::new(
            profile,
            Decision::from_judgment(Judgment::new("C-2024-MIG", "", 0.9), 0.75),
            0.75,
        );

        storage.save_recommendation(&older).await.unwrap();
        storage.save_recommendation(&newer).await.unwrap();

        let listed = storage
            .list_recommendations(&RecommendationFilter { status: None, limit: Some(1) })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, newer.id);
    }

    #[tokio::test]
    async fn test_oldest_records_dropped_past_cap() {
        let mut storage = MemoryStorage::new().with_max_records(2);
        let profile = Profile::new("A", 30, "Retail", "gestion");
        let base = chrono::Utc::now();

        let mut ids = Vec::new();
        for minutes in [30, 20, 10] {
            let mut rec = Recommendation::new(
                profile.clone(),
                Decision::from_judgment(Judgment::new("B-2024-ESS", "", 0.9), 0.75),
                0.75,
            );
            rec.created_at = base - chrono::Duration::minutes(minutes);
            storage.save_recommendation(&rec).await.unwrap();
            ids.push(rec.id);
        }

        assert!(storage.load_recommendation(ids[0]).await.unwrap().is_none());
        assert!(storage.load_recommendation(ids[1]).await.unwrap().is_some());
        assert!(storage.load_recommendation(ids[2]).await.unwrap().is_some());
        let all = storage.list_recommendations(&RecommendationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
