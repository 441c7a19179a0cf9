//! Gatekeeper agent: judges whether the voice clip passes initiation.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::types::{AudioClip, Verdict};
use crate::io::gateway::{Gateway, ModelRequest};
use crate::io::prompt::PromptEngine;

use super::parse_reply;

const VERDICT_SCHEMA: &str = include_str!("../../schemas/verdict.schema.json");

static SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(VERDICT_SCHEMA).expect("verdict schema should be valid JSON")
});

/// Gatekeeper wrapper that owns model choice, prompt, and reply schema.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    model: String,
    timeout: Duration,
}

impl Gatekeeper {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
        }
    }

    /// One multimodal round trip: clip plus judgment prompt in, verdict out.
    ///
    /// The reply is schema-validated locally; the model gets no response
    /// schema because the prompt already states the shape.
    pub fn run<G: Gateway>(&self, gateway: &G, clip: &AudioClip) -> Result<Verdict> {
        let prompt = PromptEngine::new().render_gatekeeper()?;
        let request = ModelRequest {
            model: self.model.clone(),
            prompt,
            audio: Some(clip.clone()),
            response_schema: None,
            timeout: self.timeout,
        };
        let raw = gateway.generate(&request).context("audio analysis call")?;
        parse_reply(&raw, &SCHEMA).context("audio analysis reply")
    }
}
