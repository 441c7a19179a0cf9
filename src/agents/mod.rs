//! Agent wrappers for the two remote AI operations.
//!
//! Each agent owns its model choice, prompt, and reply schema. Replies from
//! both calls pass through the same strict pipeline: strip code fences,
//! validate against the schema, then parse into the typed struct. Neither
//! call is trusted more than the other.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod arbiter;
pub mod gatekeeper;

/// Strip the Markdown code fences some models wrap around JSON replies.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"```(?:json)?").expect("fence regex should be valid"));
    FENCE_RE.replace_all(raw.trim(), "").trim().to_string()
}

/// Parse a raw model reply into `T`: fences stripped, schema-checked, typed.
pub(crate) fn parse_reply<T: DeserializeOwned>(raw: &str, schema: &Value) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    let instance: Value = serde_json::from_str(&cleaned).context("reply is not valid JSON")?;
    validate_schema(&instance, schema)?;
    serde_json::from_value(instance).context("reply does not match the expected shape")
}

/// Validate a JSON instance against a JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .context("compile reply schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("reply failed schema validation:\n- {}", messages.join("\n- "));
    }
    Ok(())
}
