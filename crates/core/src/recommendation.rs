//! Recommendation record - a profile and the decision made for it.

use serde::{Deserialize, Serialize};

use crate::decision::Decision;
use crate::id::{RecommendationId, ReviewId};
use crate::profile::Profile;
use crate::Time;

/// A logged recommendation.
///
/// Carries the threshold the decision was made against so that a stored
/// record can be checked on load: a record whose status disagrees with its
/// confidence and threshold is refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecommendationFields")]
pub struct Recommendation {
    /// Unique identifier
    pub id: RecommendationId,

    /// Profile the recommendation was made for
    pub profile: Profile,

    /// Gate outcome
    pub decision: Decision,

    /// Confidence threshold in force when the decision was made
    pub threshold: f64,

    /// Review ticket, when the decision was routed to a human
    pub review_id: Option<ReviewId>,

    /// When the recommendation was made
    pub created_at: Time,
}

impl Recommendation {
    /// Create a new record stamped now.
    pub fn new(profile: Profile, decision: Decision, threshold: f64) -> Self {
        Self {
            id: RecommendationId::new(),
            profile,
            decision,
            threshold,
            review_id: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Attach the review ticket opened for this recommendation.
    pub fn with_review(mut self, review_id: ReviewId) -> Self {
        self.review_id = Some(review_id);
        self
    }
}

#[derive(Deserialize)]
struct RecommendationFields {
    id: RecommendationId,
    profile: Profile,
    decision: Decision,
    threshold: f64,
    #[serde(default)]
    review_id: Option<ReviewId>,
    created_at: Time,
}

impl TryFrom<RecommendationFields> for Recommendation {
    type Error = String;

    fn try_from(fields: RecommendationFields) -> Result<Self, Self::Error> {
        if !fields.threshold.is_finite() || !(0.0..=1.0).contains(&fields.threshold) {
            return Err(format!("threshold out of range: {}", fields.threshold));
        }

        let expected = Decision::from_judgment(fields.decision.judgment().clone(), fields.threshold);
        if expected.status() != fields.decision.status() {
            return Err(format!(
                "status {} contradicts confidence {} at threshold {}",
                fields.decision.status(),
                fields.decision.judgment().confidence(),
                fields.threshold
            ));
        }

        Ok(Self {
            id: fields.id,
            profile: fields.profile,
            decision: expected,
            threshold: fields.threshold,
            review_id: fields.review_id,
            created_at: fields.created_at,
        })
    }
}
