//! Loading and seeding of the two static catalogs (roles, questionnaire).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::invariants::catalog_violations;
use crate::core::types::{Catalog, Question, Role};

/// Shipped role catalog, written by `recruiter init`.
pub const DEFAULT_ROLES: &str = include_str!("../../catalog/roles.json");

/// Shipped questionnaire, written by `recruiter init`.
pub const DEFAULT_QUESTIONS: &str = include_str!("../../catalog/questions.json");

/// Load both datasets and check catalog invariants.
///
/// Any problem here is a bootstrap failure: the flow reads the catalog once
/// at startup and never retries.
pub fn load_catalog(roles_path: &Path, questions_path: &Path) -> Result<Catalog> {
    let roles: Vec<Role> = read_json(roles_path).context("load role catalog")?;
    let questions: Vec<Question> = read_json(questions_path).context("load questionnaire")?;
    let catalog = Catalog { roles, questions };

    let errors = catalog_violations(&catalog);
    if !errors.is_empty() {
        bail!("catalog violations:\n- {}", errors.join("\n- "));
    }

    debug!(
        roles = catalog.roles.len(),
        questions = catalog.questions.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
