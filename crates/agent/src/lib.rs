//! Judgment producers
//!
//! Backends that turn a client profile into a recommendation judgment.

#![warn(missing_docs)]

pub mod producer;
pub mod prompt;
pub mod simulated;
pub mod groq;

pub use producer::{JudgmentProducer, ProducerError};
pub use simulated::SimulatedProducer;
pub use groq::{GroqConfig, GroqProducer};
