//! Sequencing of the assessment pipeline and the participant context that
//! travels with it.

use crate::engine::{SCORES, TimedTest};
use crate::{AssessmentError, ArithmeticTest, RotationTest, StroopTest};
use cogex_core::{Intake, ParticipantProfile, ScoreSummary, Stage};
use cogex_store::{Namespace, SessionStore, load, save};
use tracing::{info, warn};

/// Keys shared by every stage: the current stage and the registered profile.
pub const SESSION: Namespace = Namespace::new("session", &["stage", "profile"]);

/// Working namespace owned by the engine of `stage`, if it has one.
pub fn working_namespace(stage: Stage) -> Option<Namespace> {
    match stage {
        Stage::Arithmetic => Some(ArithmeticTest::NAMESPACE),
        Stage::Stroop => Some(StroopTest::NAMESPACE),
        Stage::MentalRotation => Some(RotationTest::NAMESPACE),
        Stage::Consent | Stage::Instructions | Stage::Final => None,
    }
}

pub fn current_stage<S: SessionStore + ?Sized>(store: &S) -> Result<Stage, AssessmentError> {
    Ok(load(store, &SESSION.key("stage"))?.unwrap_or_default())
}

pub fn profile<S: SessionStore + ?Sized>(
    store: &S,
) -> Result<Option<ParticipantProfile>, AssessmentError> {
    Ok(load(store, &SESSION.key("profile"))?)
}

/// Every persisted summary, in pipeline order.
pub fn summaries<S: SessionStore + ?Sized>(store: &S) -> Result<Vec<ScoreSummary>, AssessmentError> {
    let mut summaries = Vec::new();
    for key in SCORES.keys() {
        if let Some(summary) = load(store, &key)? {
            summaries.push(summary);
        }
    }
    Ok(summaries)
}

/// Reads and advances the current stage in a session store.
///
/// Holds no state of its own, so it can be rebuilt around the store on
/// every invocation.
pub struct StageController<S> {
    store: S,
}

impl<S: SessionStore> StageController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn current_stage(&self) -> Result<Stage, AssessmentError> {
        current_stage(&self.store)
    }

    pub fn profile(&self) -> Result<Option<ParticipantProfile>, AssessmentError> {
        profile(&self.store)
    }

    /// Validates the intake and stores the profile. Only possible once,
    /// while the session is still at [`Stage::Consent`].
    pub fn register(&mut self, intake: Intake) -> Result<ParticipantProfile, AssessmentError> {
        if self.profile()?.is_some() {
            return Err(AssessmentError::ProfileAlreadySet);
        }
        let stage = self.current_stage()?;
        if stage != Stage::Consent {
            return Err(AssessmentError::InvalidTransition {
                from: stage,
                to: Stage::Consent,
            });
        }
        let profile = intake.validate()?;
        save(&mut self.store, &SESSION.key("profile"), &profile)?;
        info!(participant = %profile.name, "participant registered");
        Ok(profile)
    }

    /// Moves to `to`, which must be the fixed successor of the current
    /// stage. Advancing to the stage already current is a no-op.
    pub fn advance(&mut self, to: Stage) -> Result<(), AssessmentError> {
        let from = self.current_stage()?;
        if from == to {
            return Ok(());
        }
        if from.next() != Some(to) {
            warn!(%from, %to, "rejected out-of-sequence stage transition");
            return Err(AssessmentError::InvalidTransition { from, to });
        }
        if from == Stage::Consent && self.profile()?.is_none() {
            return Err(AssessmentError::ProfileMissing);
        }
        if let Some(namespace) = working_namespace(from) {
            namespace.clear(&mut self.store);
        }
        save(&mut self.store, &SESSION.key("stage"), &to)?;
        info!(%from, %to, "stage advanced");
        Ok(())
    }

    pub fn summaries(&self) -> Result<Vec<ScoreSummary>, AssessmentError> {
        summaries(&self.store)
    }
}
