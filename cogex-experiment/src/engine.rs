//! The timed trial state machine shared by all three tests.
//!
//! The host has no timer thread to offer, so the engine never waits. Every
//! call to [`TimedTrialEngine::poll`] reloads the test's state from the
//! session store, re-derives elapsed time from the clock and the recorded
//! start timestamps, applies at most one transition, and returns what to
//! display. Randomness is persisted too: the engine's own generator only
//! draws the plan and the seed at start. How often `poll` runs is up to
//! the host; a timeout is recorded on the first poll that observes it.

use crate::state::TestState;
use crate::trial::{Deadline, Judgement};
use crate::{AssessmentError, Input, Response};
use cogex_core::{ScoreSummary, Stage, Stimulus, TestPhase, TrialLog, TrialRecord};
use cogex_store::{Namespace, SessionStore, load, save};
use cogex_timing::Clock;
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Field under which each test keeps its [`TestState`].
pub const STATE_FIELD: &str = "state";

/// Score summaries outlive the working namespaces they were computed from.
pub const SCORES: Namespace = Namespace::new("scores", &["arithmetic", "stroop", "mental_rotation"]);

pub fn summary_key(stage: Stage) -> String {
    SCORES.key(stage.as_str())
}

/// One concrete test: its stimuli, timing policy, judging and scoring.
pub trait TimedTest {
    type Stimulus: Stimulus + Serialize + DeserializeOwned;
    /// Material fixed when the test starts (question pool, trial order).
    type Plan: Serialize + DeserializeOwned + Default;

    const STAGE: Stage;
    const NAMESPACE: Namespace;

    fn deadline(&self) -> Deadline;

    fn trial_count(&self) -> usize;

    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self::Plan, AssessmentError>;

    /// Stimulus for trial `index`. Called once per trial; the result is
    /// cached in the test state until the trial resolves. `rng` is derived
    /// from the persisted seed and `index`, never from the engine.
    fn stimulus<R: Rng + ?Sized>(
        &self,
        plan: &Self::Plan,
        index: usize,
        rng: &mut R,
    ) -> Result<Self::Stimulus, AssessmentError>;

    fn judge(&self, stimulus: &Self::Stimulus, response: Response<'_>) -> Judgement;

    fn summarize(&self, log: &TrialLog<Self::Stimulus>) -> ScoreSummary;
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum View<S> {
    Start {
        stage: Stage,
        trials: usize,
        deadline: Deadline,
    },
    Trial {
        index: usize,
        total: usize,
        stimulus: S,
        remaining: Duration,
        /// The last submission was malformed and the trial is still open.
        rejected: bool,
    },
    Completed(ScoreSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive<S> {
    Render(View<S>),
    /// State moved on without anything worth showing; poll again now.
    Rerun,
    /// The participant acknowledged the results; the stage may advance.
    Finished,
}

enum Effect {
    Unchanged,
    Changed,
    Completed(ScoreSummary),
}

impl Effect {
    fn or_changed(self) -> Self {
        match self {
            Self::Unchanged => Self::Changed,
            other => other,
        }
    }
}

pub type StateOf<T> = TestState<<T as TimedTest>::Stimulus, <T as TimedTest>::Plan>;
type Step<T> = (Directive<<T as TimedTest>::Stimulus>, Effect);

pub struct TimedTrialEngine<T, C, R>
where
    T: TimedTest,
    C: Clock,
    R: Rng,
{
    pub test: T,
    pub clock: C,
    pub rng: R,
}

impl<T, C, R> TimedTrialEngine<T, C, R>
where
    T: TimedTest,
    C: Clock,
    R: Rng,
{
    pub fn new(test: T, clock: C, rng: R) -> Self {
        Self { test, clock, rng }
    }

    pub fn state_key() -> String {
        T::NAMESPACE.key(STATE_FIELD)
    }

    /// Current persisted state, or a fresh `NotStarted` one.
    pub fn state<S: SessionStore + ?Sized>(&self, store: &S) -> Result<StateOf<T>, AssessmentError> {
        Ok(load(store, &Self::state_key())?.unwrap_or_default())
    }

    pub fn log<S: SessionStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<TrialLog<T::Stimulus>, AssessmentError> {
        Ok(self.state(store)?.log)
    }

    /// Runs one re-invocation. The store is written only when the state
    /// actually changed, so polling with no new input and no elapsed
    /// deadline is free of side effects.
    pub fn poll<S: SessionStore + ?Sized>(
        &mut self,
        store: &mut S,
        input: &Input,
    ) -> Result<Directive<T::Stimulus>, AssessmentError> {
        let mut state = self.state(store)?;
        let now = self.clock.now();
        let (directive, effect) = self.step(&mut state, input, now)?;
        match effect {
            Effect::Unchanged => {}
            Effect::Changed => save(store, &Self::state_key(), &state)?,
            Effect::Completed(summary) => {
                save(store, &Self::state_key(), &state)?;
                save(store, &summary_key(T::STAGE), &summary)?;
            }
        }
        Ok(directive)
    }

    fn step(&mut self, state: &mut StateOf<T>, input: &Input, now: u64) -> Result<Step<T>, AssessmentError> {
        match state.phase {
            TestPhase::NotStarted => {
                if *input != Input::Start {
                    let view = View::Start {
                        stage: T::STAGE,
                        trials: self.test.trial_count(),
                        deadline: self.test.deadline(),
                    };
                    return Ok((Directive::Render(view), Effect::Unchanged));
                }
                let seed = self.rng.random();
                let plan = self.test.plan(&mut self.rng)?;
                state.begin(now, seed, plan);
                info!(
                    stage = T::STAGE.as_str(),
                    trials = self.test.trial_count(),
                    "test started"
                );
                let (directive, effect) = self.run(state, &Input::Idle, now)?;
                Ok((directive, effect.or_changed()))
            }
            TestPhase::Running => self.run(state, input, now),
            TestPhase::Completed => {
                let directive = if *input == Input::Continue {
                    Directive::Finished
                } else {
                    Directive::Render(View::Completed(self.test.summarize(&state.log)))
                };
                Ok((directive, Effect::Unchanged))
            }
        }
    }

    fn run(&mut self, state: &mut StateOf<T>, input: &Input, now: u64) -> Result<Step<T>, AssessmentError> {
        let count = self.test.trial_count();
        let deadline = self.test.deadline();
        let mut effect = Effect::Unchanged;

        if state.trial_index >= count {
            return Ok(self.complete(state));
        }

        // Deadlines are checked before any pending response, so a response
        // that arrives after expiry loses to the timeout.
        match deadline {
            Deadline::WholeTest(limit) => {
                if elapsed(now, state.test_started_ns) >= limit {
                    return Ok(self.complete(state));
                }
            }
            Deadline::PerTrial(limit) => {
                if elapsed(now, state.trial_started_ns) >= limit {
                    let stimulus = match state.current.take() {
                        Some(stimulus) => stimulus,
                        None => self.open_stimulus(state)?,
                    };
                    debug!(
                        stage = T::STAGE.as_str(),
                        trial = state.trial_index,
                        "trial timed out"
                    );
                    state.resolve(TrialRecord::timeout(state.trial_index, stimulus), now);
                    return Ok((Directive::Rerun, Effect::Changed));
                }
            }
        }

        if state.current.is_none() {
            state.current = Some(self.open_stimulus(state)?);
            effect = Effect::Changed;
        }

        let mut rejected = false;
        if let Some((trial, response)) = input.response() {
            let judgement = match &state.current {
                Some(stimulus) if trial == state.trial_index => self.test.judge(stimulus, response),
                _ => {
                    debug!(
                        stage = T::STAGE.as_str(),
                        trial,
                        open = state.trial_index,
                        "ignoring response for a resolved trial"
                    );
                    Judgement::Ignored
                }
            };
            match judgement {
                Judgement::Accepted { correct, response } => {
                    if let Some(stimulus) = state.current.take() {
                        let rt_ns = now.saturating_sub(state.trial_started_ns);
                        debug!(
                            stage = T::STAGE.as_str(),
                            trial,
                            correct,
                            rt_ms = rt_ns as f64 / 1e6,
                            "response recorded"
                        );
                        state.resolve(TrialRecord::answered(trial, stimulus, response, rt_ns, correct), now);
                        if state.trial_index >= count {
                            return Ok(self.complete(state));
                        }
                        state.current = Some(self.open_stimulus(state)?);
                        effect = Effect::Changed;
                    }
                }
                Judgement::Rejected => {
                    debug!(stage = T::STAGE.as_str(), trial, "response rejected");
                    rejected = true;
                }
                Judgement::Ignored => {}
            }
        }

        let window_start = match deadline {
            Deadline::WholeTest(_) => state.test_started_ns,
            Deadline::PerTrial(_) => state.trial_started_ns,
        };
        let Some(stimulus) = state.current.clone() else {
            return Ok((Directive::Rerun, effect));
        };
        let view = View::Trial {
            index: state.trial_index,
            total: count,
            stimulus,
            remaining: deadline.remaining(elapsed(now, window_start)),
            rejected,
        };
        Ok((Directive::Render(view), effect))
    }

    fn open_stimulus(&self, state: &StateOf<T>) -> Result<T::Stimulus, AssessmentError> {
        self.test
            .stimulus(&state.plan, state.trial_index, &mut state.trial_rng())
    }

    fn complete(&self, state: &mut StateOf<T>) -> Step<T> {
        state.finish();
        let summary = self.test.summarize(&state.log);
        info!(
            stage = T::STAGE.as_str(),
            trials = state.log.len(),
            correct = state.log.correct_count(),
            "test completed"
        );
        (
            Directive::Render(View::Completed(summary.clone())),
            Effect::Completed(summary),
        )
    }
}

fn elapsed(now: u64, since: u64) -> Duration {
    Duration::from_nanos(now.saturating_sub(since))
}
