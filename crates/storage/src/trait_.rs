//! Storage trait abstraction.

use async_trait::async_trait;
use sri_core::{HitlStatus, Recommendation, RecommendationId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filter for listing recommendations.
#[derive(Debug, Clone, Default)]
pub struct RecommendationFilter {
    /// Only recommendations with this routing status
    pub status: Option<HitlStatus>,

    /// Maximum results (most recent first)
    pub limit: Option<usize>,
}

impl RecommendationFilter {
    /// Whether a record passes the filter (limit not applied).
    pub fn matches(&self, record: &Recommendation) -> bool {
        self.status.map_or(true, |s| record.decision.status() == s)
    }
}

/// Storage abstraction for the recommendation log.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Save a recommendation (create or update).
    async fn save_recommendation(&mut self, record: &Recommendation) -> Result<()>;

    /// Load a recommendation by ID.
    async fn load_recommendation(&self, id: RecommendationId) -> Result<Option<Recommendation>>;

    /// List recommendations matching the filter, most recent first.
    async fn list_recommendations(&self, filter: &RecommendationFilter) -> Result<Vec<Recommendation>>;
}

/// Sort most recent first and apply the filter's limit.
pub(crate) fn finish_listing(mut records: Vec<Recommendation>, filter: &RecommendationFilter) -> Vec<Recommendation> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(limit) = filter.limit {
        records.truncate(limit);
    }
    records
}
