//! Confidence-gated decision gate.

use serde::{Deserialize, Serialize};
use sri_agent::JudgmentProducer;
use sri_core::{Decision, HitlStatus, Judgment, Profile};
use std::sync::Arc;
use tracing::{info, warn};

/// Reference confidence threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Errors raised while setting up a gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Threshold outside `[0.0, 1.0]` or not finite
    #[error("invalid confidence threshold: {0}")]
    InvalidThreshold(f64),
}

/// Gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Judgments below this confidence go to human review
    pub threshold: f64,
}

impl GateConfig {
    /// Config with the given threshold, validated.
    pub fn new(threshold: f64) -> Result<Self, GateError> {
        let config = Self { threshold };
        config.validate()?;
        Ok(config)
    }

    /// Check the threshold is usable.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.threshold.is_finite() && (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(GateError::InvalidThreshold(self.threshold))
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Routes producer judgments to auto-approval or human review.
///
/// Producer failures never escape: they become the failure sentinel
/// judgment (confidence `0.0`) and are classified like any other.
#[derive(Clone)]
pub struct DecisionGate {
    config: GateConfig,
    producer: Arc<dyn JudgmentProducer>,
}

impl DecisionGate {
    /// Create a gate.
    pub fn new(config: GateConfig, producer: Arc<dyn JudgmentProducer>) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self { config, producer })
    }

    /// Gate configuration.
    pub fn config(&self) -> GateConfig {
        self.config
    }

    /// Name of the producer backend.
    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    /// Classify a judgment. Pure: same judgment, same decision.
    pub fn classify(&self, judgment: &Judgment) -> Decision {
        Decision::from_judgment(judgment.clone(), self.config.threshold)
    }

    /// Obtain a judgment for the profile and classify it.
    pub async fn decide(&self, profile: &Profile) -> Decision {
        let judgment = match self.producer.produce_judgment(profile).await {
            Ok(judgment) => judgment,
            Err(e) => {
                warn!("Judgment producer '{}' failed: {}", self.producer.name(), e);
                Judgment::producer_failure(e)
            }
        };

        let decision = self.classify(&judgment);
        info!(
            product_id = judgment.product_id(),
            confidence = judgment.confidence(),
            status = %decision.status(),
            "Recommendation classified"
        );
        decision
    }
}

/// HTTP status a caller should surface for a routing outcome.
///
/// 200 for auto-approved, 202 (accepted, pending) for review.
pub fn transport_status(status: HitlStatus) -> u16 {
    match status {
        HitlStatus::AutoApproved => 200,
        HitlStatus::NeedsReview => 202,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sri_agent::ProducerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProducer {
        confidence: f64,
        calls: AtomicUsize,
    }

    impl FixedProducer {
        fn new(confidence: f64) -> Self {
            Self { confidence, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl JudgmentProducer for FixedProducer {
        async fn produce_judgment(&self, _profile: &Profile) -> sri_agent::producer::Result<Judgment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Judgment::new("S-2024-PRO", "Analyse de données", self.confidence))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingProducer;

    #[async_trait]
    impl JudgmentProducer for FailingProducer {
        async fn produce_judgment(&self, _profile: &Profile) -> sri_agent::producer::Result<Judgment> {
            Err(ProducerError::Timeout("deadline exceeded".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn gate_with(producer: Arc<dyn JudgmentProducer>) -> DecisionGate {
        DecisionGate::new(GateConfig::default(), producer).unwrap()
    }

    fn scenario_profile() -> Profile {
        Profile::new("Claire", 45, "Finance", "analyse de données de marché")
    }

    #[test]
    fn test_threshold_validation() {
        assert!(GateConfig::new(0.0).is_ok());
        assert!(GateConfig::new(1.0).is_ok());
        assert!(matches!(GateConfig::new(1.01), Err(GateError::InvalidThreshold(_))));
        assert!(matches!(GateConfig::new(f64::NAN), Err(GateError::InvalidThreshold(_))));
    }

    #[test]
    fn test_classification_is_total_and_split_at_threshold() {
        let gate = gate_with(Arc::new(FixedProducer::new(1.0)));
        for step in 0..=100 {
            let confidence = step as f64 / 100.0;
            let decision = gate.classify(&Judgment::new("B-2024-ESS", "", confidence));
            let expected = if confidence < DEFAULT_THRESHOLD {
                HitlStatus::NeedsReview
            } else {
                HitlStatus::AutoApproved
            };
            assert_eq!(decision.status(), expected, "confidence {}", confidence);
        }
    }

    #[test]
    fn test_boundary_values() {
        let gate = gate_with(Arc::new(FixedProducer::new(1.0)));
        let at = gate.classify(&Judgment::new("S-2024-PRO", "", 0.75));
        let below = gate.classify(&Judgment::new("S-2024-PRO", "", 0.7499));
        assert_eq!(at.status(), HitlStatus::AutoApproved);
        assert_eq!(below.status(), HitlStatus::NeedsReview);
    }

    #[test]
    fn test_classify_idempotent() {
        let gate = gate_with(Arc::new(FixedProducer::new(1.0)));
        let judgment = Judgment::new("C-2024-MIG", "Cloud", 0.74);
        assert_eq!(gate.classify(&judgment), gate.classify(&judgment));
    }

    #[tokio::test]
    async fn test_high_confidence_auto_approved() {
        let producer = Arc::new(FixedProducer::new(0.95));
        let gate = gate_with(producer.clone());

        let decision = gate.decide(&scenario_profile()).await;
        assert_eq!(decision.status(), HitlStatus::AutoApproved);
        assert_eq!(transport_status(decision.status()), 200);
        assert_eq!(producer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_low_confidence_needs_review() {
        let gate = gate_with(Arc::new(FixedProducer::new(0.60)));

        let decision = gate.decide(&scenario_profile()).await;
        assert_eq!(decision.status(), HitlStatus::NeedsReview);
        assert_eq!(transport_status(decision.status()), 202);
        assert!(!decision.is_producer_failure());
    }

    #[tokio::test]
    async fn test_producer_failure_becomes_review() {
        let gate = gate_with(Arc::new(FailingProducer));

        for profile in [scenario_profile(), Profile::new("B", 99, "", "")] {
            let decision = gate.decide(&profile).await;
            assert_eq!(decision.status(), HitlStatus::NeedsReview);
            assert_eq!(decision.judgment().product_id(), "API_FAIL");
            assert_eq!(decision.judgment().confidence(), 0.0);
            assert!(decision.judgment().justification().contains("deadline exceeded"));
            assert!(decision.is_producer_failure());
        }
    }

    #[tokio::test]
    async fn test_zero_threshold_approves_failures() {
        let gate = DecisionGate::new(GateConfig::new(0.0).unwrap(), Arc::new(FailingProducer)).unwrap();
        let decision = gate.decide(&scenario_profile()).await;
        assert_eq!(decision.status(), HitlStatus::AutoApproved);
    }
}
