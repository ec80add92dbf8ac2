//! Deterministic producer that never calls a model.

use async_trait::async_trait;
use sri_core::{Judgment, Product, Profile};

use crate::producer::{JudgmentProducer, Result};

/// Justification attached to every simulated judgment.
pub const SIMULATED_JUSTIFICATION: &str =
    "Recommandation simulée. Solution basique adaptée aux besoins simples.";

/// Keyword-based producer for offline use and demos.
///
/// Picks `S-2024-PRO` for finance or analysis needs, `B-2024-ESS` otherwise.
#[derive(Debug, Clone)]
pub struct SimulatedProducer {
    confidence: f64,
}

impl SimulatedProducer {
    /// Create a simulated producer reporting the given confidence.
    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }

    fn pick(profile: &Profile) -> Product {
        if profile.sector.to_lowercase().contains("finance")
            || profile.need.to_lowercase().contains("analyse")
        {
            Product::ProData
        } else {
            Product::Essential
        }
    }
}

impl Default for SimulatedProducer {
    fn default() -> Self {
        Self::new(0.99)
    }
}

#[async_trait]
impl JudgmentProducer for SimulatedProducer {
    async fn produce_judgment(&self, profile: &Profile) -> Result<Judgment> {
        let product = Self::pick(profile);
        Ok(Judgment::new(product.id(), SIMULATED_JUSTIFICATION, self.confidence))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finance_sector_gets_pro_data() {
        let profile = Profile::new("A", 45, "FINANCE", "rien de précis");
        let judgment = SimulatedProducer::default().produce_judgment(&profile).await.unwrap();
        assert_eq!(judgment.product(), Some(Product::ProData));
        assert_eq!(judgment.confidence(), 0.99);
    }

    #[tokio::test]
    async fn test_analysis_need_gets_pro_data() {
        let profile = Profile::new("A", 30, "Retail", "Analyse des ventes");
        let judgment = SimulatedProducer::default().produce_judgment(&profile).await.unwrap();
        assert_eq!(judgment.product_id(), "S-2024-PRO");
    }

    #[tokio::test]
    async fn test_other_profiles_get_essential() {
        let profile = Profile::new("A", 30, "Boulangerie", "gérer mes factures");
        let judgment = SimulatedProducer::new(0.5).produce_judgment(&profile).await.unwrap();
        assert_eq!(judgment.product_id(), "B-2024-ESS");
        assert_eq!(judgment.confidence(), 0.5);
        assert_eq!(judgment.justification(), SIMULATED_JUSTIFICATION);
    }
}
