//! Unique identifiers for SRI entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a logged recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecommendationId(Ulid);

impl RecommendationId {
    /// Generate a new RecommendationId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecommendationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RecommendationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a human review ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewId(Ulid);

impl ReviewId {
    /// Generate a new ReviewId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ReviewId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_id_round_trips_through_display() {
        let id = ReviewId::new();
        let parsed: ReviewId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!("not-a-ulid".parse::<RecommendationId>().is_err());
    }
}
