//! Test-only helpers: sample data, fixture directories, and a scripted
//! gateway.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::core::types::{
    Answer, Application, AudioClip, Catalog, Enlistment, Question, QuestionKind, Role,
};
use crate::io::catalog::{DEFAULT_QUESTIONS, DEFAULT_ROLES};
use crate::io::gateway::{Gateway, ModelRequest};

/// Write the shipped catalogs into a fresh temporary directory.
///
/// Returns the directory guard plus the two file paths; the files disappear
/// when the guard drops.
pub fn seeded_catalog_dir() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let roles_path = dir.path().join("roles.json");
    let questions_path = dir.path().join("questions.json");
    fs::write(&roles_path, DEFAULT_ROLES).expect("write roles fixture");
    fs::write(&questions_path, DEFAULT_QUESTIONS).expect("write questions fixture");
    (dir, roles_path, questions_path)
}

/// Three roles covering the lookup cases tests care about.
pub fn sample_roles() -> Vec<Role> {
    vec![
        Role {
            name: "Netrunner".to_string(),
            position: "Intrusion Specialist".to_string(),
            description: "Ghosts through black ICE.".to_string(),
            traits: vec!["analytical".to_string(), "patient".to_string()],
        },
        Role {
            name: "Enforcer".to_string(),
            position: "Street Muscle".to_string(),
            description: "Chrome-armed and short-fused.".to_string(),
            traits: vec!["intimidating".to_string(), "loyal".to_string()],
        },
        Role {
            name: "Fixer".to_string(),
            position: "Deals and Contraband".to_string(),
            description: "Knows a guy who knows a guy.".to_string(),
            traits: vec!["connected".to_string(), "smooth".to_string()],
        },
    ]
}

/// One mcq and one paragraph question.
pub fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            kind: QuestionKind::Mcq,
            text: "A courier drops a cred-chip. What do you do?".to_string(),
            options: vec![
                "Lift it".to_string(),
                "Tail the courier".to_string(),
                "Sell the sighting".to_string(),
            ],
        },
        Question {
            id: "q2".to_string(),
            kind: QuestionKind::Paragraph,
            text: "Why the Vipers?".to_string(),
            options: vec![],
        },
    ]
}

pub fn sample_catalog() -> Catalog {
    Catalog {
        roles: sample_roles(),
        questions: sample_questions(),
    }
}

/// An application consistent with [`sample_questions`].
pub fn sample_application() -> Application {
    let questions = sample_questions();
    Application {
        handle: "Raze".to_string(),
        answers: vec![
            Answer {
                question: questions[0].text.clone(),
                answer: "Lift it".to_string(),
            },
            Answer {
                question: questions[1].text.clone(),
                answer: "Because the corps burned my block.".to_string(),
            },
        ],
    }
}

/// A tiny but non-empty clip.
pub fn sample_clip() -> AudioClip {
    AudioClip::new(vec![0x52, 0x49, 0x46, 0x46], "audio/wav")
}

/// An enlistment into a named role with fixed reasoning text.
pub fn sample_enlistment(role_name: &str) -> Enlistment {
    let role = sample_roles()
        .into_iter()
        .find(|role| role.name == role_name)
        .unwrap_or(Role {
            name: role_name.to_string(),
            position: "Unknown".to_string(),
            description: String::new(),
            traits: vec![],
        });
    Enlistment {
        role,
        mission: "Crack the Dynacorp uplink.".to_string(),
        justification: "Sharp and quiet.".to_string(),
    }
}

/// A wire-shaped verdict reply.
pub fn verdict_json(passes: bool, justification: &str) -> String {
    serde_json::json!({
        "passes_initiation": passes,
        "justification": justification,
    })
    .to_string()
}

/// A wire-shaped assignment reply.
pub fn assignment_json(role_name: &str, justification: &str, mission: &str) -> String {
    serde_json::json!({
        "roleName": role_name,
        "justification": justification,
        "mission": mission,
    })
    .to_string()
}

/// Gateway double that replays scripted replies in order and records every
/// request it receives.
pub struct ScriptedGateway {
    replies: RefCell<VecDeque<Result<String>>>,
    pub requests: RefCell<Vec<ModelRequest>>,
}

impl ScriptedGateway {
    pub fn replies(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Gateway for ScriptedGateway {
    fn generate(&self, request: &ModelRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
    }
}
