//! Judgment model - the structured output of a judgment producer.

use serde::{Deserialize, Serialize};

/// Product id used when no judgment could be produced.
pub const PRODUCER_FAILURE_ID: &str = "API_FAIL";

/// Maximum justification length (chars) kept on a judgment.
pub const MAX_JUSTIFICATION_LEN: usize = 300;

/// Recommendable product catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    /// Solution Pro Data
    #[serde(rename = "S-2024-PRO")]
    ProData,
    /// Basique Essentiel
    #[serde(rename = "B-2024-ESS")]
    Essential,
    /// Migration Cloud
    #[serde(rename = "C-2024-MIG")]
    CloudMigration,
}

impl Product {
    /// Full catalog, in presentation order.
    pub const ALL: [Product; 3] = [Product::ProData, Product::Essential, Product::CloudMigration];

    /// Catalog identifier.
    pub fn id(self) -> &'static str {
        match self {
            Product::ProData => "S-2024-PRO",
            Product::Essential => "B-2024-ESS",
            Product::CloudMigration => "C-2024-MIG",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Product::ProData => "Solution Pro Data",
            Product::Essential => "Basique Essentiel",
            Product::CloudMigration => "Migration Cloud",
        }
    }

    /// Who the product is for.
    pub fn description(self) -> &'static str {
        match self {
            Product::ProData => "Idéale pour les besoins complexes en analyse de données.",
            Product::Essential => "Pour les petites entreprises ayant des besoins simples en gestion.",
            Product::CloudMigration => "Pour les clients cherchant à moderniser leur infrastructure.",
        }
    }

    /// Look up a product by catalog identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A structured recommendation judgment.
///
/// Immutable once built: the constructor normalizes the confidence into
/// `[0.0, 1.0]` (NaN becomes `0.0`) and bounds the justification.
/// Deserialization goes through the same constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JudgmentFields")]
pub struct Judgment {
    #[serde(rename = "product_id")]
    product_id: String,

    #[serde(rename = "justification_courte")]
    justification: String,

    #[serde(rename = "score_confiance")]
    confidence: f64,
}

impl Judgment {
    /// Build a judgment.
    pub fn new(product_id: impl Into<String>, justification: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            product_id: product_id.into(),
            justification: bound_justification(justification.into()),
            confidence,
        }
    }

    /// Sentinel judgment standing in for a failed producer call.
    pub fn producer_failure(error: impl std::fmt::Display) -> Self {
        Self::new(PRODUCER_FAILURE_ID, format!("Erreur API: {}", error), 0.0)
    }

    /// Recommended product id (catalog id or the failure sentinel).
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Catalog product, if the id is a known one.
    pub fn product(&self) -> Option<Product> {
        Product::from_id(&self.product_id)
    }

    /// Short justification.
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Confidence in `[0.0, 1.0]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether this judgment is the producer-failure sentinel.
    pub fn is_producer_failure(&self) -> bool {
        self.product_id == PRODUCER_FAILURE_ID
    }
}

#[derive(Deserialize)]
struct JudgmentFields {
    product_id: String,
    justification_courte: String,
    score_confiance: f64,
}

impl From<JudgmentFields> for Judgment {
    fn from(fields: JudgmentFields) -> Self {
        Judgment::new(fields.product_id, fields.justification_courte, fields.score_confiance)
    }
}

fn bound_justification(text: String) -> String {
    match text.char_indices().nth(MAX_JUSTIFICATION_LEN) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
