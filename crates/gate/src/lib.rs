//! Decision gate (HITL routing)
//!
//! Confidence-gated classification of judgments and the human review
//! queue that receives what the gate does not auto-approve.

#![warn(missing_docs)]

pub mod gate;
pub mod review;

pub use gate::{DecisionGate, GateConfig, GateError, DEFAULT_THRESHOLD, transport_status};
pub use review::{
    InMemoryReviewQueue, NotificationChannel, Resolution, ReviewError, ReviewFilter,
    ReviewNotifier, ReviewQueue, ReviewState, ReviewTicket, DEFAULT_MAX_RESOLVED,
};
