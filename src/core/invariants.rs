//! Semantic invariants not expressible via serde parsing alone.

use std::collections::HashSet;

use crate::core::session::{Phase, Session};
use crate::core::types::{Catalog, Outcome, QuestionKind};

/// Check catalog invariants that a successful JSON parse does not enforce:
/// - At least one role and one question
/// - No duplicate role names or question ids
/// - No blank role names or question texts
/// - `mcq` questions carry at least two options; `paragraph` questions carry none
pub fn catalog_violations(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();

    if catalog.roles.is_empty() {
        errors.push("catalog has no roles".to_string());
    }
    let mut role_names = HashSet::new();
    for role in &catalog.roles {
        if role.name.trim().is_empty() {
            errors.push("role with blank name".to_string());
        }
        if !role_names.insert(role.name.as_str()) {
            errors.push(format!("duplicate role name '{}'", role.name));
        }
    }

    if catalog.questions.is_empty() {
        errors.push("catalog has no questions".to_string());
    }
    let mut question_ids = HashSet::new();
    for question in &catalog.questions {
        if !question_ids.insert(question.id.as_str()) {
            errors.push(format!("duplicate question id '{}'", question.id));
        }
        if question.text.trim().is_empty() {
            errors.push(format!("question '{}' has blank text", question.id));
        }
        match question.kind {
            QuestionKind::Mcq => {
                if question.options.len() < 2 {
                    errors.push(format!(
                        "question '{}' is mcq but has {} options",
                        question.id,
                        question.options.len()
                    ));
                }
            }
            QuestionKind::Paragraph => {
                if !question.options.is_empty() {
                    errors.push(format!(
                        "question '{}' is paragraph but carries options",
                        question.id
                    ));
                }
            }
        }
    }

    errors
}

/// Check session invariants:
/// - `Result` holds an enlistment, `Failed` holds a failure, and no other
///   phase holds an outcome (result and error are mutually exclusive)
/// - Phases past profile submission hold an application; earlier ones don't
pub fn session_violations(session: &Session) -> Vec<String> {
    let mut errors = Vec::new();
    let phase = session.phase();

    match (phase, session.outcome()) {
        (Phase::Result, Some(Outcome::Enlisted(_))) => {}
        (Phase::Result, other) => {
            errors.push(format!("result phase without an enlistment: {other:?}"));
        }
        (Phase::Failed, Some(Outcome::Refused(_))) => {}
        (Phase::Failed, other) => {
            errors.push(format!("failed phase without a failure: {other:?}"));
        }
        (_, None) => {}
        (_, Some(_)) => {
            errors.push(format!("outcome present in non-terminal phase '{phase}'"));
        }
    }

    let has_application = session.application().is_some();
    match phase {
        Phase::Home | Phase::Apply => {
            if has_application {
                errors.push(format!("application present in phase '{phase}'"));
            }
        }
        Phase::Decryption | Phase::Challenge | Phase::Analyzing | Phase::Result => {
            if !has_application {
                errors.push(format!("application missing in phase '{phase}'"));
            }
        }
        // Failed is reachable both before (bootstrap, timeout) and after an
        // application exists, so either is fine.
        Phase::Failed => {}
    }

    errors
}
