//! Terminal configuration stored in `recruiter.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Recruiter configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecruiterConfig {
    /// Seconds on the decryption countdown.
    pub countdown_secs: u32,

    /// Wall-clock budget per remote model call, in seconds.
    pub request_timeout_secs: u64,

    /// Path to the role catalog JSON.
    pub roles_path: PathBuf,

    /// Path to the questionnaire JSON.
    pub questions_path: PathBuf,

    /// Environment variable the API key is read from. The key itself never
    /// goes in this file.
    pub api_key_env: String,

    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used for the multimodal audio analysis.
    pub gatekeeper: String,

    /// Model used for the role assignment.
    pub arbiter: String,

    /// Base URL of the generative language API.
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gatekeeper: "gemini-2.5-pro".to_string(),
            arbiter: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for RecruiterConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 90,
            request_timeout_secs: 60,
            roles_path: PathBuf::from("catalog/roles.json"),
            questions_path: PathBuf::from("catalog/questions.json"),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: ModelConfig::default(),
        }
    }
}

impl RecruiterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.countdown_secs == 0 {
            return Err(anyhow!("countdown_secs must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.roles_path.as_os_str().is_empty() {
            return Err(anyhow!("roles_path must not be empty"));
        }
        if self.questions_path.as_os_str().is_empty() {
            return Err(anyhow!("questions_path must not be empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(anyhow!("api_key_env must not be empty"));
        }
        if self.model.gatekeeper.trim().is_empty() || self.model.arbiter.trim().is_empty() {
            return Err(anyhow!("model names must not be empty"));
        }
        if self.model.endpoint.trim().is_empty() {
            return Err(anyhow!("model.endpoint must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RecruiterConfig::default()`.
pub fn load_config(path: &Path) -> Result<RecruiterConfig> {
    if !path.exists() {
        let cfg = RecruiterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RecruiterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RecruiterConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    // parent() is Some("") for bare filenames in the working directory.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
