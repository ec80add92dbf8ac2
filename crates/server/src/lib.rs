//! SRI server - HTTP API, HTML form and configuration for the
//! recommendation service.

#![warn(missing_docs)]

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;

pub use app::{router, AppState, Outcome};
pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
