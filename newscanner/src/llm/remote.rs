use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use crate::error::{Result, ScannerError};

const PROVIDER: &str = "LLM";

/// Remote LLM provider using an OpenAI-compatible chat-completions API behind a gateway.
///
/// The gateway key travels as `x-portkey-api-key`, the upstream provider key as
/// `x-portkey-virtual-key`. The key is checked per call so a server without one can
/// still start and serve news.
pub struct RemoteLlmProvider {
    base_url: String,
    api_key: Option<String>,
    virtual_key: Option<String>,
    model: String,
    default_timeout: Duration,
    default_max_tokens: usize,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            virtual_key: None,
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 500,
            default_temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_virtual_key(mut self, virtual_key: Option<String>) -> Self {
        self.virtual_key = virtual_key;
        self
    }

    pub fn with_defaults(mut self, timeout_secs: u64, max_tokens: usize, temperature: f32) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScannerError::Auth("LLM API key is not configured".to_string()))?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(Message {
                role: "system".to_string(),
                content: Some(system),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: Some(request.prompt),
        });

        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(request.max_tokens.unwrap_or(self.default_max_tokens)),
            temperature: Some(request.temperature.unwrap_or(self.default_temperature)),
            stream: false,
        };

        let mut http = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("x-portkey-api-key", api_key)
            .header("Content-Type", "application/json");
        if let Some(virtual_key) = &self.virtual_key {
            http = http.header("x-portkey-virtual-key", virtual_key);
        }

        // The timeout covers the whole exchange, body included.
        let exchange = async {
            let response = http.json(&req_body).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.default_timeout, exchange)
            .await
            .map_err(|_| ScannerError::Upstream("LLM request timed out".to_string()))?
            .map_err(|e| ScannerError::transport(PROVIDER, e))?;

        if !status.is_success() {
            return Err(ScannerError::from_status(PROVIDER, status.as_u16(), &body));
        }

        let resp_body: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            ScannerError::MalformedResponse(format!("Failed to parse LLM response: {}", e))
        })?;

        let content = resp_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ScannerError::Upstream("No response from LLM".to_string()))?;

        let usage = resp_body.usage.unwrap_or_default();
        let usage = UsageMetadata {
            prompt_tokens: usage.prompt_tokens.unwrap_or(0),
            completion_tokens: usage.completion_tokens.unwrap_or(0),
            total_tokens: usage.total_tokens.unwrap_or(0),
        };
        debug!(total_tokens = usage.total_tokens, "llm completion received");

        Ok(LlmResponse {
            content,
            usage,
            model: resp_body.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<usize>,
    #[serde(default)]
    completion_tokens: Option<usize>,
    #[serde(default)]
    total_tokens: Option<usize>,
}
