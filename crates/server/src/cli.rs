//! One-shot command-line operations.

use anyhow::Result;
use sri_core::{Product, ProfileInput};

use crate::app::{AppState, Outcome};
use crate::config::ServiceConfig;

/// Validate a profile, run it through the gate and return the outcome.
///
/// Validation failures come back as [`sri_core::ValidationErrors`] inside
/// the error, before any producer is built.
pub async fn analyze(config: &ServiceConfig, api_key: Option<&str>, input: ProfileInput) -> Result<Outcome> {
    let profile = input.validate()?;
    let state = AppState::from_config(config, api_key).await?;
    Ok(state.recommend(profile).await?)
}

/// Version, effective configuration and catalog as printable text.
pub fn info(config: &ServiceConfig) -> Result<String> {
    let mut out = format!("SRI v{}\n\nConfiguration:\n", env!("CARGO_PKG_VERSION"));
    out.push_str(&toml::to_string_pretty(config)?);
    out.push_str("\nCatalog:\n");
    for product in Product::ALL {
        out.push_str(&format!(
            "  - {} {}: {}\n",
            product.id(),
            product.label(),
            product.description()
        ));
    }
    Ok(out)
}
