//! Decision model - a judgment routed to auto-approval or human review.

use serde::{Deserialize, Serialize};

use crate::judgment::Judgment;

/// Routing outcome of the decision gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitlStatus {
    /// Confidence met the threshold; no human needed
    #[serde(rename = "VALIDÉ_AUTO")]
    AutoApproved,
    /// Confidence below threshold; withheld for human review
    #[serde(rename = "À_VALIDER_MANUEL")]
    NeedsReview,
}

impl HitlStatus {
    /// Label used in API payloads.
    pub fn api_label(self) -> &'static str {
        match self {
            HitlStatus::AutoApproved => "VALIDÉ_AUTO",
            HitlStatus::NeedsReview => "À_VALIDER_MANUEL",
        }
    }

    /// Label shown to people in the form UI.
    pub fn ui_label(self) -> &'static str {
        match self {
            HitlStatus::AutoApproved => "VALIDÉ AUTOMATIQUEMENT",
            HitlStatus::NeedsReview => "À VALIDER MANUELLEMENT",
        }
    }

    /// Whether a human must act before the recommendation is final.
    pub fn needs_review(self) -> bool {
        matches!(self, HitlStatus::NeedsReview)
    }
}

impl std::fmt::Display for HitlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_label())
    }
}

/// A classified judgment.
///
/// Serializes to the outbound payload shape:
/// `{product_id, justification_courte, score_confiance, hitl_status}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(flatten)]
    judgment: Judgment,

    #[serde(rename = "hitl_status")]
    status: HitlStatus,
}

impl Decision {
    /// Classify a judgment against a confidence threshold.
    ///
    /// `NeedsReview` iff `confidence < threshold`.
    pub fn from_judgment(judgment: Judgment, threshold: f64) -> Self {
        let status = if judgment.confidence() < threshold {
            HitlStatus::NeedsReview
        } else {
            HitlStatus::AutoApproved
        };

        Self { judgment, status }
    }

    /// The underlying judgment.
    pub fn judgment(&self) -> &Judgment {
        &self.judgment
    }

    /// Routing status.
    pub fn status(&self) -> HitlStatus {
        self.status
    }

    /// Whether the judgment behind this decision is the producer-failure sentinel.
    ///
    /// Failures share the `NeedsReview` status with low-confidence judgments;
    /// this tells them apart.
    pub fn is_producer_failure(&self) -> bool {
        self.judgment.is_producer_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        let at = Decision::from_judgment(Judgment::new("S-2024-PRO", "", 0.75), 0.75);
        assert_eq!(at.status(), HitlStatus::AutoApproved);

        let below = Decision::from_judgment(Judgment::new("S-2024-PRO", "", 0.7499), 0.75);
        assert_eq!(below.status(), HitlStatus::NeedsReview);
    }

    #[test]
    fn test_payload_shape() {
        let decision = Decision::from_judgment(Judgment::new("B-2024-ESS", "simple", 0.6), 0.75);
        let json = serde_json::to_value(&decision).unwrap();

        assert_eq!(json["product_id"], "B-2024-ESS");
        assert_eq!(json["justification_courte"], "simple");
        assert_eq!(json["score_confiance"], 0.6);
        assert_eq!(json["hitl_status"], "À_VALIDER_MANUEL");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_labels() {
        assert_eq!(HitlStatus::AutoApproved.api_label(), "VALIDÉ_AUTO");
        assert_eq!(HitlStatus::NeedsReview.ui_label(), "À VALIDER MANUELLEMENT");
        assert!(HitlStatus::NeedsReview.needs_review());
        assert!(!HitlStatus::AutoApproved.needs_review());
    }
}
