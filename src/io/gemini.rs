//! Gemini REST backend for the [`Gateway`] trait.
//!
//! One `generateContent` round trip per call. Audio goes inline as base64;
//! structured output is requested through `generationConfig.responseSchema`.

use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::io::gateway::{Gateway, ModelRequest, TransportError};

/// Gateway calling the Gemini `generateContent` endpoint over HTTP.
pub struct GeminiGateway {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiGateway {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build a gateway with the API key read from `api_key_env`.
    ///
    /// The key never appears in config files or logs.
    pub fn from_env(endpoint: &str, api_key_env: &str) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .with_context(|| format!("read API key: set the {api_key_env} environment variable"))?;
        if api_key.trim().is_empty() {
            return Err(anyhow!("API key in {api_key_env} is empty"));
        }
        Self::new(endpoint, api_key)
    }
}

impl Gateway for GeminiGateway {
    #[instrument(
        skip_all,
        fields(
            model = %request.model,
            multimodal = request.audio.is_some(),
            timeout_secs = request.timeout.as_secs(),
        )
    )]
    fn generate(&self, request: &ModelRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            request.model
        );
        let body = build_body(request);

        debug!("sending generate request");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .map_err(|err| TransportError(err.to_string()))
            .context("send generate request")?
            .error_for_status()
            .map_err(|err| TransportError(err.to_string()))
            .context("generate request failed")?;

        let reply: GenerateResponse = response.json().context("decode generate response")?;
        let text = reply_text(&reply).ok_or_else(|| anyhow!("reply contains no text candidate"))?;
        debug!(reply_bytes = text.len(), "model reply received");
        Ok(text)
    }
}

/// Assemble the wire body. The audio part, when present, precedes the prompt.
fn build_body(request: &ModelRequest) -> GenerateRequest {
    let mut parts = Vec::new();
    if let Some(clip) = &request.audio {
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: clip.mime.clone(),
                data: BASE64.encode(&clip.bytes),
            }),
        });
    }
    parts.push(Part {
        text: Some(request.prompt.clone()),
        inline_data: None,
    });

    GenerateRequest {
        contents: vec![Content { parts }],
        generation_config: request.response_schema.clone().map(|schema| GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        }),
    }
}

/// Concatenate the text parts of the first candidate, if any.
fn reply_text(reply: &GenerateResponse) -> Option<String> {
    let content = reply.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
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
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AudioClip;
    use std::time::Duration;

    fn request(audio: Option<AudioClip>, schema: Option<serde_json::Value>) -> ModelRequest {
        ModelRequest {
            model: "gemini-2.5-flash".to_string(),
            prompt: "Judge this.".to_string(),
            audio,
            response_schema: schema,
            timeout: Duration::from_secs(60),
        }
    }

    /// Multimodal bodies carry the base64 audio part before the prompt text.
    #[test]
    fn body_includes_inline_audio_first() {
        let clip = AudioClip::new(vec![1, 2, 3], "audio/wav");
        let body = build_body(&request(Some(clip), None));
        let json = serde_json::to_value(&body).expect("serialize body");

        let parts = json["contents"][0]["parts"].as_array().expect("parts");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(parts[0]["inlineData"]["data"], "AQID");
        assert_eq!(parts[1]["text"], "Judge this.");
        assert!(json.get("generationConfig").is_none());
    }

    /// A response schema turns into camelCase generationConfig fields.
    #[test]
    fn body_carries_response_schema() {
        let schema = serde_json::json!({"type": "object"});
        let body = build_body(&request(None, Some(schema.clone())));
        let json = serde_json::to_value(&body).expect("serialize body");

        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], schema);
        let parts = json["contents"][0]["parts"].as_array().expect("parts");
        assert_eq!(parts.len(), 1);
        assert!(parts[0].get("inlineData").is_none());
    }

    #[test]
    fn reply_text_concatenates_candidate_parts() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .expect("parse reply");
        assert_eq!(reply_text(&reply).expect("text"), "{\"a\":1}");
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let reply: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).expect("parse reply");
        assert!(reply_text(&reply).is_none());

        let reply: GenerateResponse = serde_json::from_str(r#"{}"#).expect("parse reply");
        assert!(reply_text(&reply).is_none());
    }
}
