// Summary + violation extraction for article descriptions
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{strip_code_fence, LlmProvider, LlmRequest};
use crate::error::{Result, ScannerError};

pub const SUMMARY_FALLBACK: &str = "Unable to generate summary";
pub const VIOLATION_FALLBACK: &str = "Unable to identify violation";
pub const INVALID_DESCRIPTION: &str = "'description' must be a non-empty string";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes news articles and provides \
summaries in JSON format. Always respond with valid JSON only, no markdown formatting.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSummary {
    pub summary: String,
    pub violation: String,
}

/// Sends one fixed prompt per description and normalizes the reply into an [`AiSummary`].
pub struct SummaryNormalizer {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl SummaryNormalizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    pub fn with_limits(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub async fn summarize(&self, description: &str) -> Result<AiSummary> {
        if description.trim().is_empty() {
            return Err(ScannerError::Validation(INVALID_DESCRIPTION.to_string()));
        }

        let request = LlmRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: build_prompt(description),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let response = self.provider.generate(request).await?;
        info!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "ai summary completion received"
        );

        parse_summary(&response.content)
    }
}

fn build_prompt(description: &str) -> String {
    format!(
        r#"Please analyze the following article description and provide:
1. A 3-line summary of the article
2. A 1-line description of the violation the article refers to

Article description: "{}"

IMPORTANT: Respond with ONLY valid JSON. Do not use markdown formatting, code blocks, or any other text. Return only the raw JSON object in this exact format:
{{"summary": "<3 lines of summary>", "violation": "<1 line of the specified violation in this article>"}}"#,
        description
    )
}

/// Strip fences, parse, then read each field independently with its fallback.
pub fn parse_summary(content: &str) -> Result<AiSummary> {
    let cleaned = strip_code_fence(content);
    if cleaned.len() != content.trim().len() {
        info!("stripped code fence from ai summary reply");
    }

    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        warn!(error = %e, reply = %cleaned, "ai summary reply is not valid JSON");
        ScannerError::MalformedResponse("AI returned invalid JSON format".to_string())
    })?;

    let object = value.as_object().ok_or_else(|| {
        warn!(reply = %cleaned, "ai summary reply is not a JSON object");
        ScannerError::MalformedResponse("AI returned invalid JSON format".to_string())
    })?;

    Ok(AiSummary {
        summary: string_field(object, "summary", SUMMARY_FALLBACK),
        violation: string_field(object, "violation", VIOLATION_FALLBACK),
    })
}

fn string_field(
    object: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    fallback: &str,
) -> String {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
