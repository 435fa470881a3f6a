//! Gemini API client for image generation.
//!
//! This module provides the wire types for the Gemini `generateContent`
//! endpoint, the [`GeminiClient`] that calls it, and the [`ImageGenerator`]
//! trait the rest of the server depends on so the vendor can be swapped for a
//! test double.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Error;

/// Production base URL for the Gemini Developer API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Abstraction over the image-producing backend.
///
/// The server and handler only see this trait; production wires in
/// [`GeminiClient`], tests wire in a scripted double.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate images for a text prompt.
    ///
    /// Returns all images the backend produced. An empty image list is not an
    /// error; the output carries the backend's explanation when one exists.
    async fn generate(&self, prompt: &str) -> Result<GenerationOutput, Error>;
}

/// A single generated image, already decoded from the wire encoding.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// MIME type reported by the backend (e.g. "image/png")
    pub mime_type: String,
}

/// Everything a generation call produced.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// Decoded images, in response order
    pub images: Vec<GeneratedImage>,
    /// Backend explanation (block reason, text part, or finish reason)
    pub feedback: Option<String>,
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    /// Base URL for the Gemini API (configurable for testing)
    base_url: String,
}

impl GeminiClient {
    /// Create a new client from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: GEMINI_API_BASE_URL.to_string(),
        }
    }

    /// Create a new client with a custom base URL (for testing).
    #[cfg(test)]
    pub fn with_base_url(config: &Config, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
        }
    }

    /// Get the generateContent endpoint for the configured model.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Decode every inline-data part in the response, across all candidates.
    fn extract_images(
        &self,
        endpoint: &str,
        response: GeminiResponse,
    ) -> Result<GenerationOutput, Error> {
        let feedback = describe_feedback(&response);

        let mut images = Vec::new();
        for candidate in response.candidates {
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts {
                if let GeminiResponsePart::InlineData { inline_data } = part {
                    let bytes = BASE64.decode(inline_data.data.as_bytes()).map_err(|e| {
                        Error::api(endpoint, 200, format!("Invalid base64 image data: {}", e))
                    })?;
                    images.push(GeneratedImage {
                        bytes,
                        mime_type: inline_data.mime_type,
                    });
                }
            }
        }

        Ok(GenerationOutput { images, feedback })
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    #[instrument(level = "info", name = "gemini_generate", skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<GenerationOutput, Error> {
        if prompt.trim().is_empty() {
            return Err(Error::validation("prompt cannot be empty"));
        }

        // Build the API request
        let request = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::Text {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        };

        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, "Calling Gemini API for image generation");

        // Single attempt, no retries: the caller sees the first failure as-is
        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(
                &endpoint,
                status.as_u16(),
                describe_api_failure(status.as_u16(), &body),
            ));
        }

        let response_text = response.text().await.map_err(|e| {
            Error::api(&endpoint, status.as_u16(), format!("Failed to read response: {}", e))
        })?;

        let api_response: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            let snippet: String = response_text.chars().take(1000).collect();
            Error::api(
                &endpoint,
                status.as_u16(),
                format!("Failed to parse response: {}. Raw: {}", e, snippet),
            )
        })?;

        self.extract_images(&endpoint, api_response)
    }
}

/// Summarize why a response may carry no image: a blocked prompt, an
/// explanatory text part, or an abnormal finish reason.
fn describe_feedback(response: &GeminiResponse) -> Option<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Some(format!("prompt blocked: {}", reason));
        }
    }

    for candidate in &response.candidates {
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                if let GeminiResponsePart::Text { text } = part {
                    if !text.trim().is_empty() {
                        return Some(text.trim().to_string());
                    }
                }
            }
        }
    }

    response
        .candidates
        .iter()
        .filter_map(|c| c.finish_reason.as_deref())
        .find(|reason| *reason != "STOP")
        .map(|reason| format!("generation stopped: {}", reason))
}

/// Turn a non-2xx response into a message that names the failure class and
/// carries the API's own detail when the body follows the standard Google
/// error envelope.
fn describe_api_failure(status_code: u16, body: &str) -> String {
    let classification = match status_code {
        400 => "invalid request",
        401 | 403 => "authentication failed",
        429 => "quota exhausted",
        500..=599 => "server error",
        _ => "request failed",
    };

    let detail = serde_json::from_str::<GeminiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| match (error.status, error.message) {
            (Some(status), Some(message)) => Some(format!("{}: {}", status, message)),
            (None, Some(message)) => Some(message),
            (Some(status), None) => Some(status),
            (None, None) => None,
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        });

    format!("{}: {}", classification, detail)
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Gemini API request for image generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerateRequest {
    /// Content parts
    pub contents: Vec<GeminiContent>,
    /// Generation configuration
    pub generation_config: GeminiGenerationConfig,
}

/// Gemini content structure.
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Role (user or model)
    pub role: String,
    /// Content parts
    pub parts: Vec<GeminiPart>,
}

/// Gemini content part (request).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    /// Text content
    Text { text: String },
}

/// Gemini generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Response modalities (IMAGE)
    pub response_modalities: Vec<String>,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Response candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Feedback on the prompt itself (set when the prompt was blocked)
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

/// Gemini response candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Content
    pub content: Option<GeminiResponseContent>,
    /// Finish reason (e.g. STOP, IMAGE_SAFETY)
    pub finish_reason: Option<String>,
}

/// Gemini response content.
#[derive(Debug, Deserialize)]
pub struct GeminiResponseContent {
    /// Content parts
    pub parts: Vec<GeminiResponsePart>,
}

/// Gemini response part.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GeminiResponsePart {
    /// Inline data (image)
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    /// Text content
    Text { text: String },
}

/// Gemini inline data (base64 encoded).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    /// MIME type
    pub mime_type: String,
    /// Base64-encoded data
    pub data: String,
}

/// Gemini prompt feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    /// Why the prompt was blocked, when it was
    pub block_reason: Option<String>,
}

/// Standard Google API error envelope.
#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_with_camel_case_keys() {
        let request = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::Text {
                    text: "A red bicycle".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "A red bicycle");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_response_with_inline_data_parses() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}]
                },
                "finishReason": "STOP"
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        let content = response.candidates[0].content.as_ref().unwrap();
        match &content.parts[0] {
            GeminiResponsePart::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, "aGVsbG8=");
            }
            other => panic!("Expected inline data part, got {:?}", other),
        }
    }

    #[test]
    fn test_response_with_text_part_parses() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I cannot draw that."}]},
                "finishReason": "STOP"
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let content = response.candidates[0].content.as_ref().unwrap();
        assert!(matches!(
            &content.parts[0],
            GeminiResponsePart::Text { text } if text == "I cannot draw that."
        ));
    }

    #[test]
    fn test_response_without_candidates_defaults_to_empty() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
        assert!(response.prompt_feedback.is_none());
    }

    #[test]
    fn test_prompt_feedback_parses() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let feedback = response.prompt_feedback.unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_feedback_prefers_block_reason() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "blocked"}]}, "finishReason": "STOP"}],
            "promptFeedback": {"blockReason": "SAFETY"}
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let feedback = describe_feedback(&response).unwrap();
        assert!(feedback.contains("SAFETY"));
    }

    #[test]
    fn test_feedback_uses_text_part_when_not_blocked() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "Try a different prompt."}]}}]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            describe_feedback(&response).as_deref(),
            Some("Try a different prompt.")
        );
    }

    #[test]
    fn test_feedback_reports_abnormal_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let feedback = describe_feedback(&response).unwrap();
        assert!(feedback.contains("IMAGE_SAFETY"));
    }

    #[test]
    fn test_feedback_ignores_normal_stop() {
        let json = r#"{"candidates": [{"finishReason": "STOP"}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(describe_feedback(&response).is_none());
    }

    #[test]
    fn test_api_failure_classifies_quota() {
        let body = r#"{"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let message = describe_api_failure(429, body);
        assert!(message.starts_with("quota exhausted"));
        assert!(message.contains("RESOURCE_EXHAUSTED"));
        assert!(message.contains("Resource exhausted"));
    }

    #[test]
    fn test_api_failure_classifies_auth() {
        let message = describe_api_failure(403, r#"{"error": {"message": "API key invalid"}}"#);
        assert!(message.starts_with("authentication failed"));
        assert!(message.contains("API key invalid"));
    }

    #[test]
    fn test_api_failure_classifies_server_error() {
        let message = describe_api_failure(503, "");
        assert!(message.starts_with("server error"));
        assert!(message.contains("no response body"));
    }

    #[test]
    fn test_api_failure_falls_back_to_raw_body() {
        let message = describe_api_failure(400, "not json at all");
        assert!(message.starts_with("invalid request"));
        assert!(message.contains("not json at all"));
    }
}
