//! Service configuration.
//!
//! Loaded from an optional TOML file; every section has defaults so an
//! absent file yields a runnable simulated setup.

use serde::{Deserialize, Serialize};
use sri_agent::{GroqConfig, GroqProducer, JudgmentProducer, SimulatedProducer};
use sri_gate::{GateConfig, NotificationChannel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are out of range or inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener
    pub server: ServerSection,
    /// Decision gate
    pub gate: GateConfig,
    /// Judgment producer backend
    pub producer: ProducerSection,
    /// Human review queue
    pub review: ReviewSection,
    /// Recommendation log
    pub storage: StorageSection,
    /// Logging
    pub logging: LoggingSection,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Which producer backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerBackend {
    /// Keyword-based, no network
    #[default]
    Simulated,
    /// Groq chat-completions API
    Groq,
}

/// Producer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerSection {
    /// Backend
    pub backend: ProducerBackend,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Confidence reported by the simulated backend
    pub simulated_confidence: f64,
}

impl Default for ProducerSection {
    fn default() -> Self {
        Self {
            backend: ProducerBackend::default(),
            base_url: sri_agent::groq::DEFAULT_BASE_URL.to_string(),
            model: sri_agent::groq::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout_secs: 30,
            simulated_confidence: 0.99,
        }
    }
}

impl ProducerSection {
    /// Build the configured producer.
    ///
    /// The API key is never read from the file; it comes from the
    /// environment or the command line.
    pub fn build(&self, api_key: Option<&str>) -> Result<Arc<dyn JudgmentProducer>, ConfigError> {
        match self.backend {
            ProducerBackend::Simulated => Ok(Arc::new(SimulatedProducer::new(self.simulated_confidence))),
            ProducerBackend::Groq => {
                let api_key = api_key.ok_or_else(|| {
                    ConfigError::Invalid("groq backend requires GROQ_API_KEY".to_string())
                })?;
                let config = GroqConfig {
                    base_url: self.base_url.clone(),
                    api_key: api_key.to_string(),
                    model: self.model.clone(),
                    temperature: self.temperature,
                    timeout: Duration::from_secs(self.timeout_secs),
                };
                let producer = GroqProducer::new(config)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                Ok(Arc::new(producer))
            }
        }
    }
}

/// Review queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSection {
    /// POST new tickets here; log only when unset
    pub webhook_url: Option<String>,
    /// Resolved tickets kept in memory; pending tickets are never dropped
    pub max_resolved: usize,
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            max_resolved: sri_gate::DEFAULT_MAX_RESOLVED,
        }
    }
}

impl ReviewSection {
    /// Notification channel for new tickets.
    pub fn channel(&self) -> NotificationChannel {
        match &self.webhook_url {
            Some(url) => NotificationChannel::Webhook { url: url.clone() },
            None => NotificationChannel::Log,
        }
    }
}

/// Recommendation log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory for JSON records; in-memory when unset
    pub path: Option<PathBuf>,
    /// Records kept by the in-memory log
    pub max_records: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: None,
            max_records: sri_storage::DEFAULT_MAX_RECORDS,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };

        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config must be utf-8".to_string()))?;

        Self::from_toml(content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gate
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind is required".to_string()));
        }
        if self.producer.timeout_secs == 0 {
            return Err(ConfigError::Invalid("producer.timeout_secs must be positive".to_string()));
        }
        if !self.producer.temperature.is_finite() || !(0.0..=2.0).contains(&self.producer.temperature) {
            return Err(ConfigError::Invalid(
                "producer.temperature must be within [0, 2]".to_string(),
            ));
        }
        if self.storage.max_records == 0 {
            return Err(ConfigError::Invalid("storage.max_records must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.producer.simulated_confidence) {
            return Err(ConfigError::Invalid(
                "producer.simulated_confidence must be within [0, 1]".to_string(),
            ));
        }
        if let Some(url) = &self.review.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid("review.webhook_url must be http(s)".to_string()));
            }
        }
        Ok(())
    }
}
