use crate::config::UpstreamConfig;
use crate::error::AppError;
use crate::modes::ModeTemplate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

// Sampling is tuned for faithful rewrites, not creative variance.
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;
pub const FREQUENCY_PENALTY: f32 = 0.1;
pub const PRESENCE_PENALTY: f32 = 0.1;

// Chat Completion Request Structs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionRequest {
    pub fn new(model_id: &str, template: &ModeTemplate, user_prompt: &str) -> Self {
        Self {
            model: model_id.to_string(),
            messages: vec![
                CompletionMessage {
                    role: "system".to_string(),
                    content: template.system_instruction.to_string(),
                },
                CompletionMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: template.max_tokens,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
        }
    }
}

// Chat Completion Response Structs
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponseMessage {
    pub content: Option<String>,
}

/// Text and usage of one successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCompletion {
    pub text: String,
    pub usage: Option<Value>,
}

impl CompletionResponse {
    fn into_completion(self) -> Result<UpstreamCompletion, UpstreamFailure> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                UpstreamFailure::Other("Upstream response contained no completion text".to_string())
            })?;

        Ok(UpstreamCompletion {
            text,
            usage: self.usage,
        })
    }
}

/// Raw failure signal, left uninterpreted for the error classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamFailure {
    #[error("upstream API key is not configured")]
    MissingCredential,
    #[error("upstream responded with HTTP {status}")]
    Status { status: u16, body: String },
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("cannot connect to upstream: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

impl UpstreamFailure {
    fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            UpstreamFailure::Timeout(timeout)
        } else if error.is_connect() {
            UpstreamFailure::Connect(error.to_string())
        } else if error.is_decode() {
            UpstreamFailure::Other(format!("Upstream response could not be parsed: {}", error))
        } else {
            UpstreamFailure::Other(format!("Upstream request failed: {}", error))
        }
    }
}

/// Client for the upstream chat-completion API. One network call per `complete`, never retried.
pub struct UpstreamClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model_id: String,
    timeout_override: Option<Duration>,
    referer: String,
    title: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, AppError> {
        let client = crate::utils::http_client::new_api_client()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model_id: config.model_id.clone(),
            timeout_override: config.timeout,
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn timeout_for(&self, template: &ModeTemplate) -> Duration {
        self.timeout_override.unwrap_or(template.timeout)
    }

    #[instrument(skip(self, template, user_prompt), fields(mode = %template.mode, model = %self.model_id))]
    pub async fn complete(
        &self,
        template: &ModeTemplate,
        user_prompt: &str,
        request_id: &str,
    ) -> Result<UpstreamCompletion, UpstreamFailure> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Upstream API key not configured, refusing to call upstream");
            return Err(UpstreamFailure::MissingCredential);
        };

        let timeout = self.timeout_for(template);
        let request = CompletionRequest::new(&self.model_id, template, user_prompt);

        // The transport timeout alone does not cover every stage of the call.
        match tokio::time::timeout(timeout, self.send(api_key, &request, request_id, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamFailure::Timeout(timeout)),
        }
    }

    async fn send(
        &self,
        api_key: &str,
        request: &CompletionRequest,
        request_id: &str,
        timeout: Duration,
    ) -> Result<UpstreamCompletion, UpstreamFailure> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, max_tokens = request.max_tokens, "Sending completion request");

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .header("Content-Type", "application/json")
            .header("X-Request-ID", request_id)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamFailure::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await
                .unwrap_or_else(|_| "Failed to get error response".to_string());
            return Err(UpstreamFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result = response.json::<CompletionResponse>().await
            .map_err(|e| UpstreamFailure::from_transport(e, timeout))?;

        result.into_completion()
    }
}
