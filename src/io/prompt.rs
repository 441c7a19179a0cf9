//! Prompt rendering for the two remote calls.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::types::{Application, Role};

const GATEKEEPER_TEMPLATE: &str = include_str!("prompts/gatekeeper.md");
const ARBITER_TEMPLATE: &str = include_str!("prompts/arbiter.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("gatekeeper", GATEKEEPER_TEMPLATE)
            .expect("gatekeeper template should be valid");
        env.add_template("arbiter", ARBITER_TEMPLATE)
            .expect("arbiter template should be valid");
        Self { env }
    }

    /// Instruction prompt for the audio-analysis call. Static: the judgment
    /// criteria never depend on the applicant.
    pub fn render_gatekeeper(&self) -> Result<String> {
        let template = self.env.get_template("gatekeeper")?;
        let rendered = template.render(context! {})?;
        Ok(rendered)
    }

    /// Prompt for the role-assignment call: profile, voice justification, and
    /// the full role catalog as pretty JSON.
    pub fn render_arbiter(
        &self,
        application: &Application,
        voice_justification: &str,
        roles: &[Role],
    ) -> Result<String> {
        let answers = application
            .answers
            .iter()
            .map(|a| format!("Q: {}\nA: {}", a.question, a.answer))
            .collect::<Vec<_>>()
            .join("\n\n");
        let roles_json = serde_json::to_string_pretty(roles)?;

        let template = self.env.get_template("arbiter")?;
        let rendered = template.render(context! {
            handle => application.handle.as_str(),
            voice_justification => voice_justification,
            answers => answers,
            roles_json => roles_json,
        })?;
        Ok(rendered)
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}
