//! Arbiter agent: assigns the recruit one role from the catalog.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::core::types::{Application, Assignment, Role};
use crate::io::gateway::{Gateway, ModelRequest};
use crate::io::prompt::PromptEngine;

use super::parse_reply;

const ASSIGNMENT_SCHEMA: &str = include_str!("../../schemas/assignment.schema.json");

static SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(ASSIGNMENT_SCHEMA).expect("assignment schema should be valid JSON")
});

/// Arbiter wrapper that owns model choice, prompt, and reply schema.
#[derive(Debug, Clone)]
pub struct Arbiter {
    model: String,
    timeout: Duration,
}

impl Arbiter {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
        }
    }

    /// One structured-output round trip. Runs only after a passing verdict;
    /// the verdict's justification feeds into the prompt.
    ///
    /// The returned role name is still a claim. The caller resolves it
    /// against the catalog; the response schema only nudges the model.
    pub fn run<G: Gateway>(
        &self,
        gateway: &G,
        application: &Application,
        voice_justification: &str,
        roles: &[Role],
    ) -> Result<Assignment> {
        let prompt = PromptEngine::new().render_arbiter(application, voice_justification, roles)?;
        let request = ModelRequest {
            model: self.model.clone(),
            prompt,
            audio: None,
            response_schema: Some(response_schema(roles)),
            timeout: self.timeout,
        };
        let raw = gateway.generate(&request).context("role assignment call")?;
        parse_reply(&raw, &SCHEMA).context("role assignment reply")
    }
}

/// Schema sent with the request. The `roleName` description enumerates the
/// valid names so the model picks from the loaded catalog, not its training
/// data.
fn response_schema(roles: &[Role]) -> Value {
    let names = roles
        .iter()
        .map(|role| format!("'{}'", role.name))
        .collect::<Vec<_>>()
        .join(", ");
    json!({
        "type": "object",
        "properties": {
            "roleName": {
                "type": "string",
                "description": format!("The name of the assigned gang role. MUST be one of: {names}"),
            },
            "justification": {
                "type": "string",
                "description": "Justification for the role assignment based on the profile.",
            },
            "mission": {
                "type": "string",
                "description": "The recruit's first mission.",
            },
        },
        "required": ["roleName", "justification", "mission"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedGateway, assignment_json, sample_application, sample_roles};

    fn arbiter() -> Arbiter {
        Arbiter::new("gemini-2.5-flash", Duration::from_secs(60))
    }

    #[test]
    fn sends_schema_and_profile_with_the_request() {
        let gateway = ScriptedGateway::replies(vec![Ok(assignment_json(
            "Netrunner",
            "Sharp and quiet.",
            "Crack the Dynacorp uplink.",
        ))]);
        let application = sample_application();
        let roles = sample_roles();

        let assignment = arbiter()
            .run(&gateway, &application, "menacing enough", &roles)
            .expect("assignment");
        assert_eq!(assignment.role_name, "Netrunner");

        let requests = gateway.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert!(requests[0].audio.is_none());

        let schema = requests[0].response_schema.as_ref().expect("schema");
        let description = schema["properties"]["roleName"]["description"]
            .as_str()
            .expect("description");
        assert!(description.contains("MUST be one of:"));
        for role in &roles {
            assert!(description.contains(&format!("'{}'", role.name)));
        }
    }

    #[test]
    fn camel_case_reply_parses_into_assignment() {
        let raw = r#"{"roleName": "Fixer", "justification": "j", "mission": "m"}"#.to_string();
        let gateway = ScriptedGateway::replies(vec![Ok(raw)]);
        let assignment = arbiter()
            .run(&gateway, &sample_application(), "ok", &sample_roles())
            .expect("assignment");
        assert_eq!(assignment.role_name, "Fixer");
    }

    #[test]
    fn missing_mission_is_an_error() {
        let raw = r#"{"roleName": "Fixer", "justification": "j"}"#.to_string();
        let gateway = ScriptedGateway::replies(vec![Ok(raw)]);
        let err = arbiter()
            .run(&gateway, &sample_application(), "ok", &sample_roles())
            .expect_err("missing field");
        assert!(format!("{err:#}").contains("role assignment reply"));
    }
}
