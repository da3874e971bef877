//! Generative-text client.
//!
//! Calls Gemini's `generateContent` endpoint with a JSON response MIME type
//! and hands back the parsed JSON value. One request per call; failures are
//! returned to the caller unchanged.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::GenerationError;

/// Anything that can turn a prompt into a JSON document.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, GenerationError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client with timeout: {e}");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerationError::ConfigurationMissing("GEMINI_API_KEY"));
        };

        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::ServiceCall(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::ServiceCall(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| text.chars().take(200).collect());
            return Err(GenerationError::ServiceCall(format!("HTTP {}: {detail}", status.as_u16())));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Parse(e.to_string()))?;
        let answer = response_text(&parsed);
        if answer.trim().is_empty() {
            return Err(GenerationError::Parse("empty response".to_string()));
        }
        parse_json_text(&answer)
    }
}

fn response_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default()
}

/// Parse model output as JSON, tolerating a surrounding markdown code fence.
pub fn parse_json_text(text: &str) -> Result<serde_json::Value, GenerationError> {
    let stripped = strip_code_fence(text);
    serde_json::from_str(stripped).map_err(|e| GenerationError::Parse(format!("invalid JSON: {e}")))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        let v = parse_json_text("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);
        let v = parse_json_text("  [1, 2] ").unwrap();
        assert_eq!(v[1], 2);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(parse_json_text("Sure! Here is"), Err(GenerationError::Parse(_))));
    }

    #[test]
    fn joins_candidate_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"sl"},{"text":"ides\":[]}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(&response), r#"{"slides":[]}"#);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(&AppConfig {
            gemini_base_url: "http://127.0.0.1:9".into(),
            ..AppConfig::default()
        });
        let err = client.generate_json("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::ConfigurationMissing(_)));
    }
}
