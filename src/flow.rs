//! Orchestration of the two-step initiation analysis.
//!
//! Call order is fixed: the gatekeeper judges the voice clip first, and the
//! arbiter is only consulted after a passing verdict. Every failure becomes a
//! [`Failure`] from the taxonomy; callers always get a usable [`Outcome`].

use std::time::Duration;

use tracing::{info, warn};

use crate::agents::arbiter::Arbiter;
use crate::agents::gatekeeper::Gatekeeper;
use crate::core::types::{Application, AudioClip, Catalog, Enlistment, Failure, Outcome};
use crate::io::config::RecruiterConfig;
use crate::io::gateway::{Gateway, TransportError};

/// Run the full analysis pipeline on a recorded clip.
pub fn run_initiation<G: Gateway>(
    gateway: &G,
    config: &RecruiterConfig,
    application: &Application,
    catalog: &Catalog,
    clip: &AudioClip,
) -> Outcome {
    match analyze(gateway, config, application, catalog, clip) {
        Ok(enlistment) => {
            info!(role = %enlistment.role.name, "initiation passed");
            Outcome::Enlisted(enlistment)
        }
        Err(failure) => {
            info!(kind = ?failure.kind, "initiation refused");
            Outcome::Refused(failure)
        }
    }
}

fn analyze<G: Gateway>(
    gateway: &G,
    config: &RecruiterConfig,
    application: &Application,
    catalog: &Catalog,
    clip: &AudioClip,
) -> Result<Enlistment, Failure> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let gatekeeper = Gatekeeper::new(&config.model.gatekeeper, timeout);
    let verdict = gatekeeper
        .run(gateway, clip)
        .map_err(|err| remote_failure("audio analysis", &err))?;

    if !verdict.passes_initiation {
        info!(justification = %verdict.justification, "verdict negative");
        return Err(Failure::rejection(&verdict.justification));
    }

    let arbiter = Arbiter::new(&config.model.arbiter, timeout);
    let assignment = arbiter
        .run(gateway, application, &verdict.justification, &catalog.roles)
        .map_err(|err| remote_failure("role assignment", &err))?;

    let Some(role) = catalog.role_by_name(&assignment.role_name) else {
        warn!(role_name = %assignment.role_name, "assigned role not in catalog");
        return Err(Failure::invalid_assignment(&assignment.role_name));
    };

    Ok(Enlistment {
        role: role.clone(),
        mission: assignment.mission,
        justification: assignment.justification,
    })
}

/// Map a failed remote call onto the taxonomy: transport problems keep a
/// generic message, everything else counts as a malformed reply. The full
/// error chain goes to the log either way.
fn remote_failure(stage: &str, err: &anyhow::Error) -> Failure {
    warn!(stage, err = format!("{err:#}"), "remote call failed");
    if err.chain().any(|cause| cause.is::<TransportError>()) {
        Failure::transport()
    } else {
        Failure::malformed()
    }
}
