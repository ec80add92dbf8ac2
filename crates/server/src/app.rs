//! Application state and the recommendation flow shared by API, form and CLI.

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use sri_core::{Decision, Profile, Recommendation, RecommendationId, ReviewId};
use sri_gate::{DecisionGate, InMemoryReviewQueue, ReviewQueue};
use sri_storage::{JsonStorage, MemoryStorage, Storage};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::{api, form};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    gate: DecisionGate,
    reviews: Arc<dyn ReviewQueue>,
    storage: Arc<Mutex<dyn Storage>>,
}

/// Result of running a profile through the gate.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Gate decision
    #[serde(flatten)]
    pub decision: Decision,

    /// Review ticket, set when the decision needs review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<ReviewId>,

    /// Logged record
    #[serde(skip)]
    pub recommendation_id: RecommendationId,
}

impl AppState {
    /// Assemble state from parts.
    pub fn new(
        gate: DecisionGate,
        reviews: Arc<dyn ReviewQueue>,
        storage: Arc<Mutex<dyn Storage>>,
    ) -> Self {
        Self { gate, reviews, storage }
    }

    /// Build state from configuration.
    pub async fn from_config(config: &ServiceConfig, api_key: Option<&str>) -> anyhow::Result<Self> {
        let producer = config.producer.build(api_key)?;
        let gate = DecisionGate::new(config.gate, producer)?;
        let reviews: Arc<dyn ReviewQueue> = Arc::new(
            InMemoryReviewQueue::new(config.review.channel())
                .with_max_resolved(config.review.max_resolved),
        );
        let storage: Arc<Mutex<dyn Storage>> = match &config.storage.path {
            Some(path) => Arc::new(Mutex::new(JsonStorage::new(path).await?)),
            None => Arc::new(Mutex::new(
                MemoryStorage::new().with_max_records(config.storage.max_records),
            )),
        };
        Ok(Self::new(gate, reviews, storage))
    }

    /// Decision gate.
    pub fn gate(&self) -> &DecisionGate {
        &self.gate
    }

    /// Review queue.
    pub fn reviews(&self) -> &Arc<dyn ReviewQueue> {
        &self.reviews
    }

    /// Recommendation log.
    pub fn storage(&self) -> &Arc<Mutex<dyn Storage>> {
        &self.storage
    }

    /// Run a validated profile through the gate, open a review ticket when
    /// needed, and log the result.
    pub async fn recommend(&self, profile: Profile) -> Result<Outcome, ApiError> {
        let decision = self.gate.decide(&profile).await;

        let review_id = if decision.status().needs_review() {
            let ticket = self.reviews.submit(profile.clone(), decision.clone()).await;
            Some(ticket.id)
        } else {
            None
        };

        let mut record = Recommendation::new(profile, decision.clone(), self.gate.config().threshold);
        if let Some(id) = review_id {
            record = record.with_review(id);
        }
        self.storage.lock().await.save_recommendation(&record).await?;
        debug!("Logged recommendation {}", record.id);

        Ok(Outcome {
            decision,
            review_id,
            recommendation_id: record.id,
        })
    }
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form::show_form).post(form::submit_form))
        .route("/healthz", get(healthz))
        .route("/api/analyze", post(api::analyze))
        .route("/api/analyze/", post(api::analyze))
        .route("/api/reviews/", get(api::list_reviews))
        .route("/api/reviews/{id}", get(api::get_review))
        .route("/api/reviews/{id}/resolve", post(api::resolve_review))
        .route("/api/recommendations/", get(api::list_recommendations))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
