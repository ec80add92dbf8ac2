//! JSON API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sri_core::{HitlStatus, ProfileInput, Recommendation, ReviewId};
use sri_gate::{transport_status, Resolution, ReviewError, ReviewFilter, ReviewState, ReviewTicket};
use sri_storage::RecommendationFilter;

use crate::app::{AppState, Outcome};
use crate::error::ApiError;

/// `POST /api/analyze/` - validate a profile and route its recommendation.
///
/// 200 when auto-approved, 202 when pending human review.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome>), ApiError> {
    let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let profile = input.validate()?;

    let outcome = state.recommend(profile).await?;
    let status = StatusCode::from_u16(transport_status(outcome.decision.status()))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((status, Json(outcome)))
}

/// Query parameters for listing reviews.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    /// `pending`, `approved` or `rejected`
    pub state: Option<String>,
    /// Maximum results
    pub limit: Option<usize>,
}

/// `GET /api/reviews/` - list review tickets.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<ReviewTicket>>, ApiError> {
    let state_filter = query
        .state
        .as_deref()
        .map(str::parse::<ReviewState>)
        .transpose()?;

    let tickets = state
        .reviews()
        .list(ReviewFilter {
            state: state_filter,
            limit: query.limit,
        })
        .await;
    Ok(Json(tickets))
}

/// `GET /api/reviews/{id}`
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewTicket>, ApiError> {
    let id = parse_review_id(&id)?;
    state
        .reviews()
        .get(id)
        .await
        .map(Json)
        .ok_or(ApiError::Review(ReviewError::NotFound(id)))
}

/// `POST /api/reviews/{id}/resolve` - record a reviewer's verdict.
pub async fn resolve_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Resolution>, JsonRejection>,
) -> Result<Json<ReviewTicket>, ApiError> {
    let id = parse_review_id(&id)?;
    let Json(resolution) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if resolution.reviewer.trim().is_empty() {
        return Err(ApiError::BadRequest("reviewer is required".to_string()));
    }

    let ticket = state.reviews().resolve(id, resolution).await?;
    Ok(Json(ticket))
}

/// Query parameters for listing logged recommendations.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    /// Only auto-approved (`auto`) or pending (`review`) decisions
    pub status: Option<String>,
    /// Maximum results
    pub limit: Option<usize>,
}

/// `GET /api/recommendations/` - most recent logged recommendations.
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let status = match query.status.as_deref() {
        None => None,
        Some("auto") => Some(HitlStatus::AutoApproved),
        Some("review") => Some(HitlStatus::NeedsReview),
        Some(other) => return Err(ApiError::BadRequest(format!("unknown status filter: {}", other))),
    };

    let filter = RecommendationFilter {
        status,
        limit: query.limit,
    };
    let records = state.storage().lock().await.list_recommendations(&filter).await?;
    Ok(Json(records))
}

fn parse_review_id(raw: &str) -> Result<ReviewId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid review id: {}", raw)))
}
