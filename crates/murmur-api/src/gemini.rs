use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use murmur_types::genai::{GenAiError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, GenAiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenAiError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| GenAiError::Transport(e.to_string()))?;
        debug!("Gemini returned {} candidate(s)", reply.candidates.len());

        first_text(reply).ok_or(GenAiError::EmptyReply)
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>> {
        Box::pin(self.generate_content(prompt))
    }
}

/// Stand-in used when no API key is configured; every call fails.
pub struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>> {
        Box::pin(async { Err(GenAiError::NotConfigured) })
    }
}

// -- Wire types --

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn first_text(reply: GenerateResponse) -> Option<String> {
    reply
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<String> {
        first_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn extracts_first_candidate_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"APPROPRIATE"}],"role":"model"},"finishReason":"STOP"}]}"#;
        assert_eq!(parse(json).as_deref(), Some("APPROPRIATE"));
    }

    #[test]
    fn missing_or_blank_text_is_none() {
        assert_eq!(parse(r#"{"candidates":[]}"#), None);
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#), None);
    }
}
