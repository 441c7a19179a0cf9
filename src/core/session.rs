//! Session state machine for the recruitment flow.
//!
//! A [`Session`] owns the current phase, the accepted application, and the
//! terminal outcome. All transitions go through methods here; rejected
//! transitions leave the session untouched so callers can simply drop them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{Answer, Application, AudioClip, Enlistment, Failure, Outcome, Question};

/// Screen the session is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Home,
    Apply,
    Decryption,
    Challenge,
    Analyzing,
    Result,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Home => "home",
            Phase::Apply => "apply",
            Phase::Decryption => "decryption",
            Phase::Challenge => "challenge",
            Phase::Analyzing => "analyzing",
            Phase::Result => "result",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A transition that is not legal from the current phase. The session state
/// is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub phase: Phase,
    pub action: &'static str,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} while in phase '{}'", self.action, self.phase)
    }
}

impl std::error::Error for TransitionError {}

/// Result of a profile submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Profile stored; the session moved on to the decryption test.
    Accepted,
    /// Submission ignored; the session did not change.
    Incomplete(String),
}

/// Handed out when analysis starts. A completion is only applied if its token
/// matches the generation it was issued for, so results of an abandoned
/// session can never leak into a restarted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisToken {
    generation: u64,
}

/// What happened to a delivered analysis outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied; the session is now in `Result` or `Failed`.
    Applied,
    /// Token was stale; the outcome was dropped without side effects.
    Stale,
}

/// Single owner of all mutable flow state.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    application: Option<Application>,
    outcome: Option<Outcome>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Home,
            application: None,
            outcome: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The enlistment, if the session ended in `Result`.
    pub fn enlistment(&self) -> Option<&Enlistment> {
        match &self.outcome {
            Some(Outcome::Enlisted(enlistment)) => Some(enlistment),
            _ => None,
        }
    }

    /// The failure, if the session ended in `Failed`.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Some(Outcome::Refused(failure)) => Some(failure),
            _ => None,
        }
    }

    /// Leave the home screen and start the questionnaire.
    pub fn begin_application(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Home, "begin application")?;
        self.phase = Phase::Apply;
        Ok(())
    }

    /// Validate and store the applicant's profile.
    ///
    /// An incomplete profile (blank handle, missing or blank answers) is
    /// reported but changes nothing; the caller re-prompts. Responses must be
    /// in catalog order and are paired with the question text they answer.
    pub fn submit_profile(
        &mut self,
        handle: &str,
        responses: &[String],
        questions: &[Question],
    ) -> Result<SubmitOutcome, TransitionError> {
        self.expect_phase(Phase::Apply, "submit profile")?;

        if handle.trim().is_empty() {
            return Ok(SubmitOutcome::Incomplete("handle is blank".to_string()));
        }
        if responses.len() != questions.len() {
            return Ok(SubmitOutcome::Incomplete(format!(
                "expected {} answers, got {}",
                questions.len(),
                responses.len()
            )));
        }
        for (question, response) in questions.iter().zip(responses) {
            if response.trim().is_empty() {
                return Ok(SubmitOutcome::Incomplete(format!(
                    "question '{}' is unanswered",
                    question.id
                )));
            }
        }

        let answers = questions
            .iter()
            .zip(responses)
            .map(|(question, response)| Answer {
                question: question.text.clone(),
                answer: response.clone(),
            })
            .collect();
        self.application = Some(Application {
            handle: handle.to_string(),
            answers,
        });
        self.phase = Phase::Decryption;
        Ok(SubmitOutcome::Accepted)
    }

    /// The transmission was decrypted in time.
    pub fn pass_decryption(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Decryption, "pass decryption")?;
        self.phase = Phase::Challenge;
        Ok(())
    }

    /// The countdown ran out. Calling this again after the session has moved
    /// to `Failed` is rejected, so a racing second expiry cannot double-fire.
    pub fn fail_decryption(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Decryption, "fail decryption")?;
        self.outcome = Some(Outcome::Refused(Failure::timeout()));
        self.phase = Phase::Failed;
        Ok(())
    }

    /// A startup resource failed to load; the session ends before it starts.
    pub fn fail_bootstrap(&mut self, failure: Failure) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Home, "fail bootstrap")?;
        self.outcome = Some(Outcome::Refused(failure));
        self.phase = Phase::Failed;
        Ok(())
    }

    /// Hand the recorded clip over for analysis.
    ///
    /// Submitting without usable audio is rejected and the session stays on
    /// the challenge screen.
    pub fn begin_analysis(&mut self, clip: &AudioClip) -> Result<AnalysisToken, TransitionError> {
        self.expect_phase(Phase::Challenge, "begin analysis")?;
        if clip.is_empty() {
            return Err(TransitionError {
                phase: self.phase,
                action: "begin analysis without audio",
            });
        }
        self.phase = Phase::Analyzing;
        Ok(AnalysisToken {
            generation: self.generation,
        })
    }

    /// Deliver the outcome of the analysis pipeline.
    ///
    /// The outcome is applied only when the token's generation is current and
    /// the session is still analyzing; anything else is reported as stale and
    /// dropped.
    pub fn complete_analysis(&mut self, token: AnalysisToken, outcome: Outcome) -> Completion {
        if token.generation != self.generation || self.phase != Phase::Analyzing {
            return Completion::Stale;
        }
        self.phase = match outcome {
            Outcome::Enlisted(_) => Phase::Result,
            Outcome::Refused(_) => Phase::Failed,
        };
        self.outcome = Some(outcome);
        Completion::Applied
    }

    /// Reset to a fresh home screen. Only legal from a terminal phase.
    ///
    /// Bumps the generation so tokens issued before the restart go stale.
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Result | Phase::Failed => {
                self.phase = Phase::Home;
                self.application = None;
                self.outcome = None;
                self.generation += 1;
                Ok(())
            }
            _ => Err(TransitionError {
                phase: self.phase,
                action: "restart",
            }),
        }
    }

    fn expect_phase(&self, want: Phase, action: &'static str) -> Result<(), TransitionError> {
        if self.phase == want {
            Ok(())
        } else {
            Err(TransitionError {
                phase: self.phase,
                action,
            })
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FailureKind;
    use crate::test_support::{sample_clip, sample_enlistment, sample_questions};

    fn session_at_challenge() -> Session {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();
        let responses: Vec<String> = questions.iter().map(|_| "answer".to_string()).collect();
        session
            .submit_profile("Raze", &responses, &questions)
            .expect("submit");
        session.pass_decryption().expect("pass decryption");
        session
    }

    #[test]
    fn new_session_starts_at_home_with_nothing_set() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Home);
        assert!(session.application().is_none());
        assert!(session.outcome().is_none());
    }

    /// Happy path walks home -> apply -> decryption -> challenge -> analyzing -> result.
    #[test]
    fn full_walk_to_result() {
        let mut session = session_at_challenge();
        assert_eq!(session.phase(), Phase::Challenge);

        let token = session.begin_analysis(&sample_clip()).expect("begin analysis");
        assert_eq!(session.phase(), Phase::Analyzing);

        let applied =
            session.complete_analysis(token, Outcome::Enlisted(sample_enlistment("Netrunner")));
        assert_eq!(applied, Completion::Applied);
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(
            session.enlistment().expect("enlistment").role.name,
            "Netrunner"
        );
        assert!(session.failure().is_none());
    }

    #[test]
    fn begin_application_rejected_outside_home() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let err = session.begin_application().expect_err("second begin");
        assert_eq!(err.phase, Phase::Apply);
        assert_eq!(session.phase(), Phase::Apply);
    }

    /// A blank handle is reported as incomplete and nothing changes.
    #[test]
    fn submit_profile_rejects_blank_handle() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();
        let responses: Vec<String> = questions.iter().map(|_| "answer".to_string()).collect();

        let outcome = session
            .submit_profile("   ", &responses, &questions)
            .expect("submit");
        assert_eq!(
            outcome,
            SubmitOutcome::Incomplete("handle is blank".to_string())
        );
        assert_eq!(session.phase(), Phase::Apply);
        assert!(session.application().is_none());
    }

    #[test]
    fn submit_profile_rejects_missing_answers() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();

        let outcome = session
            .submit_profile("Raze", &["only one".to_string()], &questions)
            .expect("submit");
        let SubmitOutcome::Incomplete(reason) = outcome else {
            panic!("expected incomplete");
        };
        assert!(reason.contains("expected"));
        assert_eq!(session.phase(), Phase::Apply);
    }

    #[test]
    fn submit_profile_rejects_blank_answer() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();
        let mut responses: Vec<String> = questions.iter().map(|_| "answer".to_string()).collect();
        responses[1] = "  ".to_string();

        let outcome = session
            .submit_profile("Raze", &responses, &questions)
            .expect("submit");
        let SubmitOutcome::Incomplete(reason) = outcome else {
            panic!("expected incomplete");
        };
        assert!(reason.contains(&questions[1].id));
    }

    /// Accepted profiles pair each answer with its question text, in order.
    #[test]
    fn submit_profile_stores_answers_in_catalog_order() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();
        let responses: Vec<String> = (0..questions.len()).map(|i| format!("answer {i}")).collect();

        let outcome = session
            .submit_profile("Raze", &responses, &questions)
            .expect("submit");
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(session.phase(), Phase::Decryption);

        let application = session.application().expect("application");
        assert_eq!(application.handle, "Raze");
        assert_eq!(application.answers.len(), questions.len());
        assert_eq!(application.answers[0].question, questions[0].text);
        assert_eq!(application.answers[0].answer, "answer 0");
    }

    #[test]
    fn fail_decryption_records_timeout_once() {
        let mut session = Session::new();
        session.begin_application().expect("begin");
        let questions = sample_questions();
        let responses: Vec<String> = questions.iter().map(|_| "answer".to_string()).collect();
        session
            .submit_profile("Raze", &responses, &questions)
            .expect("submit");

        session.fail_decryption().expect("fail decryption");
        assert_eq!(session.phase(), Phase::Failed);
        let failure = session.failure().expect("failure");
        assert_eq!(failure.kind, FailureKind::Timeout);

        // A second expiry arriving late is rejected, not double-applied.
        assert!(session.fail_decryption().is_err());
        assert_eq!(session.failure().expect("failure").kind, FailureKind::Timeout);
    }

    #[test]
    fn begin_analysis_rejects_empty_clip() {
        let mut session = session_at_challenge();
        let empty = AudioClip::new(Vec::new(), "audio/wav");
        let err = session.begin_analysis(&empty).expect_err("empty clip");
        assert_eq!(err.action, "begin analysis without audio");
        assert_eq!(session.phase(), Phase::Challenge);
    }

    /// A completion for a previous generation is dropped without touching state.
    #[test]
    fn stale_completion_is_dropped_after_restart() {
        let mut session = session_at_challenge();
        let token = session.begin_analysis(&sample_clip()).expect("begin analysis");

        // Abandon this run: force a terminal state, then restart.
        let applied = session.complete_analysis(
            token,
            Outcome::Refused(Failure::rejection("too polite")),
        );
        assert_eq!(applied, Completion::Applied);
        session.restart().expect("restart");

        // The stale token must not resurrect the old outcome.
        let stale = session.complete_analysis(token, Outcome::Enlisted(sample_enlistment("Fixer")));
        assert_eq!(stale, Completion::Stale);
        assert_eq!(session.phase(), Phase::Home);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn completion_outside_analyzing_is_stale() {
        let mut session = session_at_challenge();
        let token = session.begin_analysis(&sample_clip()).expect("begin analysis");
        session.complete_analysis(token, Outcome::Refused(Failure::malformed()));

        let again = session.complete_analysis(token, Outcome::Enlisted(sample_enlistment("Fixer")));
        assert_eq!(again, Completion::Stale);
        assert_eq!(session.failure().expect("failure").kind, FailureKind::Malformed);
    }

    #[test]
    fn restart_only_from_terminal_phases() {
        let mut session = Session::new();
        assert!(session.restart().is_err());
        session.begin_application().expect("begin");
        assert!(session.restart().is_err());
    }

    /// Restart clears everything and the flow is fully reusable.
    #[test]
    fn restart_resets_to_fresh_home() {
        let mut session = session_at_challenge();
        let token = session.begin_analysis(&sample_clip()).expect("begin analysis");
        session.complete_analysis(token, Outcome::Enlisted(sample_enlistment("Netrunner")));
        session.restart().expect("restart");

        assert_eq!(session.phase(), Phase::Home);
        assert!(session.application().is_none());
        assert!(session.outcome().is_none());

        // The machine accepts a whole new run.
        session.begin_application().expect("begin again");
        assert_eq!(session.phase(), Phase::Apply);
    }

    #[test]
    fn fail_bootstrap_only_from_home() {
        let mut session = Session::new();
        session
            .fail_bootstrap(Failure::bootstrap("roles.json unreadable"))
            .expect("bootstrap failure");
        assert_eq!(session.phase(), Phase::Failed);
        let failure = session.failure().expect("failure");
        assert_eq!(failure.kind, FailureKind::Bootstrap);
        assert!(failure.message.contains("roles.json unreadable"));

        let mut started = Session::new();
        started.begin_application().expect("begin");
        assert!(started.fail_bootstrap(Failure::bootstrap("x")).is_err());
    }

    #[test]
    fn transition_error_names_action_and_phase() {
        let mut session = Session::new();
        let err = session.pass_decryption().expect_err("wrong phase");
        let message = err.to_string();
        assert!(message.contains("pass decryption"));
        assert!(message.contains("home"));
    }
}
