//! Shared deterministic types for the recruitment flow.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use serde::{Deserialize, Serialize};

/// An assignable gang role from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub position: String,
    pub description: String,
    pub traits: Vec<String>,
}

/// Presentation kind of a questionnaire entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Mcq,
    Paragraph,
}

/// A questionnaire entry from the catalog.
///
/// `options` is only meaningful for `Mcq` questions; catalog validation
/// rejects any other combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// The two static datasets the flow runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub roles: Vec<Role>,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Look up a role by its exact name.
    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.name == name)
    }
}

/// One answered questionnaire entry, kept in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// The applicant's submitted profile. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub handle: String,
    pub answers: Vec<Answer>,
}

/// A recorded voice clip, payload plus declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Verdict returned by the audio-analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passes_initiation: bool,
    pub justification: String,
}

/// Role assignment returned by the second call. `role_name` is only a claim
/// until it has been resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub role_name: String,
    pub justification: String,
    pub mission: String,
}

/// A successful initiation: the resolved role plus the model's reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enlistment {
    pub role: Role,
    pub mission: String,
    pub justification: String,
}

/// Category of a terminal failure. Drives which message the failed screen
/// shows and lets tests assert on causes without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A startup resource (catalog, config) could not be loaded.
    Bootstrap,
    /// The decryption countdown ran out.
    Timeout,
    /// The audio verdict came back negative.
    Rejection,
    /// A remote reply did not parse or validate.
    Malformed,
    /// The assigned role does not exist in the catalog.
    InvalidAssignment,
    /// Network or remote failure of either call.
    Transport,
}

/// A terminal failure, with the themed message shown to the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn bootstrap(detail: &str) -> Self {
        Self {
            kind: FailureKind::Bootstrap,
            message: format!("// CRITICAL BOOTSTRAP ERROR: {detail}. CANNOT INITIALIZE. //"),
        }
    }

    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: "// COGNITIVE ANALYSIS FAILED. You're too slow for this world. \
                      Connection terminated. //"
                .to_string(),
        }
    }

    /// Rejection carries the verdict's justification verbatim.
    pub fn rejection(justification: &str) -> Self {
        Self {
            kind: FailureKind::Rejection,
            message: format!(
                "// REJECTION PROTOCOL INITIATED: {justification}. You sound like one of the \
                 corporate drones we despise. Connection terminated. //"
            ),
        }
    }

    /// Malformed replies get a generic message; the detail goes to the log.
    pub fn malformed() -> Self {
        Self {
            kind: FailureKind::Malformed,
            message: "// CRITICAL SYSTEM ERROR: Received malformed data from neural network. \
                      CONNECTION SEVERED. //"
                .to_string(),
        }
    }

    /// The claimed role name is shown so the operator can spot catalog drift.
    pub fn invalid_assignment(role_name: &str) -> Self {
        Self {
            kind: FailureKind::InvalidAssignment,
            message: format!(
                "// CRITICAL SYSTEM ERROR: AI assigned an invalid role: {role_name}. \
                 CONNECTION SEVERED. //"
            ),
        }
    }

    /// Transport problems get a generic message; the detail goes to the log.
    pub fn transport() -> Self {
        Self {
            kind: FailureKind::Transport,
            message: "// CRITICAL SYSTEM ERROR: Neural link unreachable. CONNECTION SEVERED. //"
                .to_string(),
        }
    }
}

/// Terminal disposition of a session. A session ends with exactly one of
/// these; never both, never neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Enlisted(Enlistment),
    Refused(Failure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_serializes_lowercase() {
        let json = serde_json::to_string(&QuestionKind::Paragraph).expect("serialize");
        assert_eq!(json, "\"paragraph\"");
    }

    #[test]
    fn question_type_field_round_trips() {
        let json = r#"{"id":"q1","type":"mcq","text":"Pick one.","options":["a","b"]}"#;
        let question: Question = serde_json::from_str(json).expect("parse question");
        assert_eq!(question.kind, QuestionKind::Mcq);
        assert_eq!(question.options.len(), 2);
    }

    #[test]
    fn question_options_default_to_empty() {
        let json = r#"{"id":"q3","type":"paragraph","text":"Tell us."}"#;
        let question: Question = serde_json::from_str(json).expect("parse question");
        assert!(question.options.is_empty());
    }

    /// The wire format for assignments uses camelCase keys.
    #[test]
    fn assignment_parses_camel_case() {
        let json = r#"{"roleName":"Netrunner","justification":"j","mission":"m"}"#;
        let assignment: Assignment = serde_json::from_str(json).expect("parse assignment");
        assert_eq!(assignment.role_name, "Netrunner");
    }

    #[test]
    fn role_lookup_is_exact() {
        let catalog = Catalog {
            roles: vec![Role {
                name: "Netrunner".to_string(),
                position: "Intrusion".to_string(),
                description: "d".to_string(),
                traits: vec![],
            }],
            questions: vec![],
        };
        assert!(catalog.role_by_name("Netrunner").is_some());
        assert!(catalog.role_by_name("netrunner").is_none());
        assert!(catalog.role_by_name("Fixer").is_none());
    }

    #[test]
    fn rejection_message_embeds_justification() {
        let failure = Failure::rejection("Too polite");
        assert_eq!(failure.kind, FailureKind::Rejection);
        assert!(failure.message.contains("Too polite"));
        assert!(failure.message.contains("corporate drones"));
    }

    #[test]
    fn invalid_assignment_message_names_the_role() {
        let failure = Failure::invalid_assignment("Street Samurai");
        assert_eq!(failure.kind, FailureKind::InvalidAssignment);
        assert!(failure.message.contains("Street Samurai"));
    }
}
