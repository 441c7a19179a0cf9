//! Gateway abstraction for remote model calls.
//!
//! The [`Gateway`] trait is the seam between the analysis pipeline and the
//! actual backend. Production wires in the Gemini REST client; tests wire in
//! scripted gateways that return canned replies without touching the network.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::core::types::AudioClip;

/// Parameters for one remote model call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,

    /// Instruction prompt.
    pub prompt: String,

    /// Inline audio attachment for multimodal calls.
    pub audio: Option<AudioClip>,

    /// Schema forwarded to the model to constrain its output. The reply is
    /// still validated locally; this only improves the odds.
    pub response_schema: Option<Value>,

    /// Hard cap on the round trip.
    pub timeout: Duration,
}

/// Abstraction over remote model backends.
pub trait Gateway {
    /// Perform one round trip and return the raw reply text.
    fn generate(&self, request: &ModelRequest) -> Result<String>;
}

/// Network-level failure of a remote call: connect, timeout, or an HTTP
/// error status. Kept as a distinct type so the flow can tell transport
/// problems from malformed replies when picking a failure message.
#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport failure: {}", self.0)
    }
}

impl std::error::Error for TransportError {}
