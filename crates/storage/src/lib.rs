//! Storage abstraction and implementations for the recommendation log.
//!
//! This crate provides a trait-based storage interface with in-memory and
//! JSON file implementations.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory_storage;

pub use trait_::{Storage, StorageError, Result, RecommendationFilter};
pub use json_storage::JsonStorage;
pub use memory_storage::{MemoryStorage, DEFAULT_MAX_RECORDS};
