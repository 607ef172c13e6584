use crate::config::RotationConfig;
use crate::engine::{STATE_FIELD, TimedTest};
use crate::trial::{Deadline, Judgement};
use crate::{AssessmentError, Response};
use cogex_core::{RotationSummary, RotationTrial, ScoreSummary, Side, Stage, TrialLog, mean};
use cogex_store::Namespace;
use rand::Rng;
use rand::seq::index;

pub struct RotationTest {
    config: RotationConfig,
}

impl RotationTest {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }
}

impl TimedTest for RotationTest {
    type Stimulus = RotationTrial;
    /// Indices into the image pool, in presentation order.
    type Plan = Vec<usize>;

    const STAGE: Stage = Stage::MentalRotation;
    const NAMESPACE: Namespace = Namespace::new("mental_rotation", &[STATE_FIELD]);

    fn deadline(&self) -> Deadline {
        Deadline::PerTrial(self.config.deadline())
    }

    fn trial_count(&self) -> usize {
        self.config.trials
    }

    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>, AssessmentError> {
        let pool = self.config.image_sets.len();
        if pool < self.config.trials {
            return Err(AssessmentError::Config(format!(
                "{} image sets cannot fill {} trials",
                pool, self.config.trials
            )));
        }
        // `sample` returns the picks in random order, which doubles as the
        // presentation order.
        Ok(index::sample(rng, pool, self.config.trials).into_vec())
    }

    /// Placement of the match is drawn here, once per trial; the engine
    /// caches the result until the trial resolves.
    fn stimulus<R: Rng + ?Sized>(
        &self,
        plan: &Vec<usize>,
        index: usize,
        rng: &mut R,
    ) -> Result<RotationTrial, AssessmentError> {
        let set = *plan.get(index).ok_or(AssessmentError::PlanExhausted(index))?;
        let triple = self
            .config
            .image_sets
            .get(set)
            .ok_or(AssessmentError::PlanExhausted(index))?;
        let side = if rng.random_bool(0.5) { Side::Left } else { Side::Right };
        Ok(RotationTrial::new(set + 1, triple, side))
    }

    fn judge(&self, trial: &RotationTrial, response: Response<'_>) -> Judgement {
        let Response::Select(choice) = response else {
            return Judgement::Ignored;
        };
        match choice.parse::<Side>() {
            Ok(side) => Judgement::Accepted {
                correct: trial.option(side).is_match,
                response: side.label().to_string(),
            },
            Err(_) => Judgement::Ignored,
        }
    }

    fn summarize(&self, log: &TrialLog<RotationTrial>) -> ScoreSummary {
        let trials = log.len();
        let correct = log.correct_count();
        let limit = self.config.deadline().as_secs_f64();
        let times = log
            .iter()
            .map(|r| r.reaction_time_secs().unwrap_or(limit));

        ScoreSummary::MentalRotation(RotationSummary {
            trials,
            correct,
            timed_out: log.timed_out_count(),
            accuracy: (trials > 0).then(|| correct as f64 / trials as f64 * 100.0),
            avg_reaction_time_secs: mean(times),
        })
    }
}
