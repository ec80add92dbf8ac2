//! SRI core data models.
//!
//! This crate defines the data structures shared by the recommendation
//! service: client profiles, judgments, gate decisions and their records.

#![warn(missing_docs)]

// Core identities
mod id;

// Request input
mod profile;

// Judgment and routing
mod judgment;
mod decision;
mod recommendation;

// Re-exports
pub use id::*;

pub use profile::{
    Profile, ProfileInput, ValidationErrors, MIN_AGE, MAX_NAME_LEN, MAX_SECTOR_LEN, MAX_NEED_LEN,
};
pub use judgment::{Judgment, Product, PRODUCER_FAILURE_ID, MAX_JUSTIFICATION_LEN};
pub use decision::{Decision, HitlStatus};
pub use recommendation::Recommendation;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
