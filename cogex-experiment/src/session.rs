//! Per-invocation entry point: one `poll` per host re-invocation.

use crate::controller::{self, StageController};
use crate::engine::{Directive, TimedTest, TimedTrialEngine, View};
use crate::{
    ArithmeticTest, AssessmentConfig, AssessmentError, Input, RotationTest, StroopTest, export,
};
use cogex_core::{
    ArithmeticQuestion, IntakeError, ParticipantProfile, RotationTrial, ScoreSummary, Stage,
    StroopStimulus,
};
use cogex_store::SessionStore;
use cogex_timing::Clock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// What the host should present after a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Consent { error: Option<IntakeError> },
    Instructions,
    Arithmetic(View<ArithmeticQuestion>),
    Stroop(View<StroopStimulus>),
    MentalRotation(View<RotationTrial>),
    Final {
        profile: Option<ParticipantProfile>,
        summaries: Vec<ScoreSummary>,
    },
    /// State moved on; poll again immediately with [`Input::Idle`].
    Rerun,
}

impl Screen {
    pub fn stage(&self) -> Option<Stage> {
        Some(match self {
            Self::Consent { .. } => Stage::Consent,
            Self::Instructions => Stage::Instructions,
            Self::Arithmetic(_) => Stage::Arithmetic,
            Self::Stroop(_) => Stage::Stroop,
            Self::MentalRotation(_) => Stage::MentalRotation,
            Self::Final { .. } => Stage::Final,
            Self::Rerun => return None,
        })
    }
}

pub struct Assessment<St, C, R>
where
    St: SessionStore,
    C: Clock,
    R: Rng,
{
    store: St,
    arithmetic: TimedTrialEngine<ArithmeticTest, C, R>,
    stroop: TimedTrialEngine<StroopTest, C, R>,
    rotation: TimedTrialEngine<RotationTest, C, R>,
}

impl<St, C> Assessment<St, C, StdRng>
where
    St: SessionStore,
    C: Clock,
{
    /// Seeds from `config.seed`, or from the OS when unset.
    pub fn from_config(config: AssessmentConfig, store: St, clock: C) -> Result<Self, AssessmentError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, store, clock, rng)
    }
}

impl<St, C, R> Assessment<St, C, R>
where
    St: SessionStore,
    C: Clock,
    R: Rng + SeedableRng,
{
    /// Each engine gets its own generator derived from `rng`, so one test's
    /// draws never shift another's.
    pub fn new(config: AssessmentConfig, store: St, clock: C, mut rng: R) -> Result<Self, AssessmentError> {
        config.validate()?;
        Ok(Self {
            store,
            arithmetic: TimedTrialEngine::new(
                ArithmeticTest::new(config.arithmetic)?,
                clock.clone(),
                R::from_rng(&mut rng),
            ),
            stroop: TimedTrialEngine::new(
                StroopTest::new(config.stroop),
                clock.clone(),
                R::from_rng(&mut rng),
            ),
            rotation: TimedTrialEngine::new(
                RotationTest::new(config.rotation),
                clock,
                R::from_rng(&mut rng),
            ),
        })
    }
}

impl<St, C, R> Assessment<St, C, R>
where
    St: SessionStore,
    C: Clock,
    R: Rng,
{
    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn into_store(self) -> St {
        self.store
    }

    fn controller(&mut self) -> StageController<&mut St> {
        StageController::new(&mut self.store)
    }

    pub fn current_stage(&self) -> Result<Stage, AssessmentError> {
        controller::current_stage(&self.store)
    }

    pub fn profile(&self) -> Result<Option<ParticipantProfile>, AssessmentError> {
        controller::profile(&self.store)
    }

    pub fn summaries(&self) -> Result<Vec<ScoreSummary>, AssessmentError> {
        controller::summaries(&self.store)
    }

    /// Applies `input` to whatever stage is current and describes the
    /// resulting screen. Inputs that make no sense for the current stage
    /// are treated as [`Input::Idle`].
    pub fn poll(&mut self, input: &Input) -> Result<Screen, AssessmentError> {
        match self.current_stage()? {
            Stage::Consent => {
                let Input::Register(intake) = input else {
                    return Ok(Screen::Consent { error: None });
                };
                match self.controller().register(intake.clone()) {
                    Ok(_) => self.finish_stage(Stage::Consent),
                    Err(AssessmentError::Intake(error)) => Ok(Screen::Consent { error: Some(error) }),
                    Err(other) => Err(other),
                }
            }
            Stage::Instructions => match input {
                Input::Continue => self.finish_stage(Stage::Instructions),
                _ => Ok(Screen::Instructions),
            },
            Stage::Arithmetic => match self.arithmetic.poll(&mut self.store, input)? {
                Directive::Render(view) => Ok(Screen::Arithmetic(view)),
                Directive::Rerun => Ok(Screen::Rerun),
                Directive::Finished => self.finish_stage(Stage::Arithmetic),
            },
            Stage::Stroop => match self.stroop.poll(&mut self.store, input)? {
                Directive::Render(view) => Ok(Screen::Stroop(view)),
                Directive::Rerun => Ok(Screen::Rerun),
                Directive::Finished => self.finish_stage(Stage::Stroop),
            },
            Stage::MentalRotation => match self.rotation.poll(&mut self.store, input)? {
                Directive::Render(view) => Ok(Screen::MentalRotation(view)),
                Directive::Rerun => Ok(Screen::Rerun),
                Directive::Finished => self.finish_stage(Stage::MentalRotation),
            },
            Stage::Final => Ok(Screen::Final {
                profile: self.profile()?,
                summaries: self.summaries()?,
            }),
        }
    }

    fn finish_stage(&mut self, from: Stage) -> Result<Screen, AssessmentError> {
        let Some(to) = from.next() else {
            return self.poll(&Input::Idle);
        };
        self.controller().advance(to)?;
        if to == Stage::Final {
            info!("assessment complete");
        }
        self.poll(&Input::Idle)
    }

    /// CSV of the test's trial log. Available from the test's start until
    /// the stage advances and its working state is cleared.
    pub fn trial_log_csv(&self, stage: Stage) -> Result<Option<String>, AssessmentError> {
        Ok(match stage {
            Stage::Arithmetic => csv_of(&self.arithmetic, &self.store)?,
            Stage::Stroop => csv_of(&self.stroop, &self.store)?,
            Stage::MentalRotation => csv_of(&self.rotation, &self.store)?,
            Stage::Consent | Stage::Instructions | Stage::Final => None,
        })
    }

    pub fn results_json(&self) -> Result<String, AssessmentError> {
        let profile = self.profile()?;
        export::to_json(profile.as_ref(), &self.summaries()?).map_err(AssessmentError::Export)
    }
}

fn csv_of<T, C, R, St>(
    engine: &TimedTrialEngine<T, C, R>,
    store: &St,
) -> Result<Option<String>, AssessmentError>
where
    T: TimedTest,
    C: Clock,
    R: Rng,
    St: SessionStore,
{
    if !store.contains(&TimedTrialEngine::<T, C, R>::state_key()) {
        return Ok(None);
    }
    Ok(Some(export::to_csv(&engine.log(store)?)))
}
