//! HTTP client for the chat inference endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, RETRY_AFTER},
};

use crate::{
    error::{Error, Result},
    retry::RetryConfig,
    types::{ChatRequest, ChatResponse},
};

/// Default chat endpoint
pub const DEFAULT_ENDPOINT: &str =
    "http://guanaco-submitter.guanaco-backend.k2.chaiverse.com/endpoints/onsite/chat";

/// Environment variable holding the endpoint credential
pub const API_KEY_ENV_VAR: &str = "CHAI_API_BEARER_TOKEN";

/// Anything that can produce the next utterance for a character.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Generate the next message for `request.bot_name`, trimmed of surrounding whitespace.
    async fn invoke(&self, request: &ChatRequest) -> Result<String>;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the chat endpoint
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Backoff policy for 429 responses
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(60),
            retry: RetryConfig::default(),
        }
    }
}

/// Client for the chaiverse chat endpoint
pub struct ChaiClient {
    client: reqwest::Client,
    endpoint: String,
    authorization: String,
    retry_config: RetryConfig,
}

impl ChaiClient {
    /// Create a client. Fails fast when the credential is missing or blank.
    pub fn new(config: ClientConfig, api_key: Option<String>) -> Result<Self> {
        let authorization = api_key
            .as_deref()
            .and_then(bearer_value)
            .ok_or_else(|| Error::MissingCredential(API_KEY_ENV_VAR.to_string()))?;

        if config.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("inference endpoint is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        tracing::info!(endpoint = %config.endpoint, "Chat inference client initialized");

        Ok(Self {
            client,
            endpoint: config.endpoint,
            authorization,
            retry_config: config.retry,
        })
    }

    /// Create from the `CHAI_API_BEARER_TOKEN` environment variable
    pub fn from_env(config: ClientConfig) -> Result<Self> {
        Self::new(config, std::env::var(API_KEY_ENV_VAR).ok())
    }

    /// Single request, no retries.
    async fn send_once(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(Error::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body));
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::UnexpectedResponse(format!("{}: {}", e, body)))?;

        Ok(parsed.model_output.trim().to_string())
    }
}

#[async_trait]
impl InferenceClient for ChaiClient {
    async fn invoke(&self, request: &ChatRequest) -> Result<String> {
        tracing::debug!(
            bot_name = %request.bot_name,
            user_name = %request.user_name,
            history_len = request.chat_history.len(),
            "Sending chat request"
        );

        let mut attempt = 0u32;
        loop {
            match self.send_once(request).await {
                Ok(output) => {
                    tracing::debug!("Chat response: {}", output);
                    return Ok(output);
                }
                Err(e) if e.is_retryable() && attempt < self.retry_config.max_retries => {
                    let delay = self.retry_config.delay_for_attempt(attempt);
                    tracing::warn!(
                        "Rate limited (attempt {}/{}). Retrying in {:?}...",
                        attempt + 1,
                        self.retry_config.max_retries + 1,
                        delay
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Error invoking chat endpoint: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

/// The endpoint expects `Bearer <token>`; accept tokens stored with or without the prefix.
///
/// Returns `None` when no token is left once the prefix is removed.
fn bearer_value(api_key: &str) -> Option<String> {
    let key = api_key.trim();
    let token = match key.strip_prefix("Bearer") {
        Some("") => "",
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => key,
    };

    if token.is_empty() {
        None
    } else {
        Some(format!("Bearer {}", token))
    }
}
