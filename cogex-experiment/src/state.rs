use cogex_core::{Stimulus, TestPhase, TrialLog, TrialRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Working state of one test, persisted in the test's namespace between
/// polls and dropped when the stage advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestState<S, P> {
    pub phase: TestPhase,
    pub test_started_ns: u64,
    pub trial_started_ns: u64,
    pub trial_index: usize,
    /// Drawn once at start. Every trial's generator is derived from it, so
    /// stimuli do not depend on the engine instance that draws them.
    pub seed: u64,
    /// Stimulus of the open trial, cached so re-renders show the same one.
    pub current: Option<S>,
    pub plan: P,
    pub log: TrialLog<S>,
}

impl<S, P: Default> Default for TestState<S, P> {
    fn default() -> Self {
        Self {
            phase: TestPhase::NotStarted,
            test_started_ns: 0,
            trial_started_ns: 0,
            trial_index: 0,
            seed: 0,
            current: None,
            plan: P::default(),
            log: TrialLog::new(),
        }
    }
}

impl<S, P> TestState<S, P> {
    /// Generator for the open trial. `seed_from_u64` scrambles its input,
    /// so neighbouring trial indices give unrelated streams.
    pub fn trial_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(self.trial_index as u64))
    }
}

impl<S: Stimulus, P> TestState<S, P> {
    pub fn begin(&mut self, now_ns: u64, seed: u64, plan: P) {
        self.phase = TestPhase::Running;
        self.test_started_ns = now_ns;
        self.trial_started_ns = now_ns;
        self.trial_index = 0;
        self.seed = seed;
        self.current = None;
        self.plan = plan;
        self.log = TrialLog::new();
    }

    /// Appends the resolved trial and opens the next one at `now_ns`.
    pub fn resolve(&mut self, record: TrialRecord<S>, now_ns: u64) {
        self.log.push(record);
        self.trial_index += 1;
        self.current = None;
        self.trial_started_ns = now_ns;
    }

    pub fn finish(&mut self) {
        self.phase = TestPhase::Completed;
        self.current = None;
    }
}
