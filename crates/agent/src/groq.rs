//! Groq chat-completions producer.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; Groq is the
//! default deployment target.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use sri_core::{Judgment, Profile};
use std::time::Duration;
use tracing::debug;

use crate::producer::{JudgmentProducer, ProducerError, Result};
use crate::prompt;

/// Default Groq API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Connection settings for the model API.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API base URL (without trailing `/chat/completions`)
    pub base_url: String,

    /// Bearer API key
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Sampling temperature; low keeps the JSON format stable
    pub temperature: f32,

    /// Whole-request timeout
    pub timeout: Duration,
}

impl GroqConfig {
    /// Settings with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Producer backed by a chat-completions model.
#[derive(Clone)]
pub struct GroqProducer {
    /// HTTP client
    client: Client,

    /// Endpoint URL
    url: String,

    /// Connection settings
    config: GroqConfig,
}

impl GroqProducer {
    /// Create a producer.
    ///
    /// Fails when the API key is empty or the HTTP client cannot be built.
    pub fn new(config: GroqConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProducerError::Config("GROQ_API_KEY is not set".to_string()));
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProducerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            config,
        })
    }

    /// Model in use.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl JudgmentProducer for GroqProducer {
    async fn produce_judgment(&self, profile: &Profile) -> Result<Judgment> {
        let payload = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "user", "content": prompt::render(profile) }
            ],
        });

        debug!("Requesting judgment from {} ({})", self.url, self.config.model);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProducerError::Upstream { status, body });
        }

        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(serde::Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(serde::Deserialize)]
        struct Message {
            #[serde(default)]
            content: Option<String>,
        }

        let response_data: Response = response
            .json()
            .await
            .map_err(|e| ProducerError::Malformed(e.to_string()))?;

        let content = response_data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProducerError::EmptyReply)?;

        prompt::parse_reply(&content)
    }

    fn name(&self) -> &str {
        "groq"
    }
}
