use crate::config::StroopConfig;
use crate::engine::{STATE_FIELD, TimedTest};
use crate::trial::{Deadline, Judgement};
use crate::{AssessmentError, Response};
use cogex_core::{
    Condition, InkColor, NEUTRAL_WORDS, ScoreSummary, Stage, StroopStimulus, StroopSummary,
    TrialLog, TrialRecord, mean,
};
use cogex_store::Namespace;
use rand::Rng;

pub struct StroopTest {
    config: StroopConfig,
}

impl StroopTest {
    pub fn new(config: StroopConfig) -> Self {
        Self { config }
    }
}

/// Draws one stimulus: condition uniformly, then word and ink for it.
pub fn generate_stimulus<R: Rng + ?Sized>(rng: &mut R) -> StroopStimulus {
    let color = |rng: &mut R| InkColor::ALL[rng.random_range(0..InkColor::ALL.len())];
    match Condition::ALL[rng.random_range(0..Condition::ALL.len())] {
        Condition::Congruent => StroopStimulus::congruent(color(rng)),
        Condition::Incongruent => {
            // Offset of 1..n from the word's colour: uniform over the others.
            let n = InkColor::ALL.len();
            let word = rng.random_range(0..n);
            let ink = (word + rng.random_range(1..n)) % n;
            StroopStimulus::incongruent(InkColor::ALL[word], InkColor::ALL[ink])
        }
        Condition::Neutral => {
            let word = NEUTRAL_WORDS[rng.random_range(0..NEUTRAL_WORDS.len())];
            StroopStimulus::neutral(word, color(rng))
        }
    }
}

fn correct_rts<'a>(
    log: &'a TrialLog<StroopStimulus>,
    condition: Option<Condition>,
) -> impl Iterator<Item = f64> + 'a {
    log.iter()
        .filter(move |r| r.correct() && condition.is_none_or(|c| r.stimulus.condition == c))
        .filter_map(TrialRecord::reaction_time_secs)
}

impl TimedTest for StroopTest {
    type Stimulus = StroopStimulus;
    type Plan = ();

    const STAGE: Stage = Stage::Stroop;
    const NAMESPACE: Namespace = Namespace::new("stroop", &[STATE_FIELD]);

    fn deadline(&self) -> Deadline {
        Deadline::PerTrial(self.config.deadline())
    }

    fn trial_count(&self) -> usize {
        self.config.trials
    }

    fn plan<R: Rng + ?Sized>(&self, _rng: &mut R) -> Result<(), AssessmentError> {
        Ok(())
    }

    fn stimulus<R: Rng + ?Sized>(
        &self,
        _plan: &(),
        _index: usize,
        rng: &mut R,
    ) -> Result<StroopStimulus, AssessmentError> {
        Ok(generate_stimulus(rng))
    }

    fn judge(&self, stimulus: &StroopStimulus, response: Response<'_>) -> Judgement {
        let Response::Select(choice) = response else {
            return Judgement::Ignored;
        };
        match InkColor::from_name(choice) {
            Some(chosen) => Judgement::Accepted {
                correct: chosen == stimulus.ink,
                response: chosen.word().to_string(),
            },
            None => Judgement::Ignored,
        }
    }

    fn summarize(&self, log: &TrialLog<StroopStimulus>) -> ScoreSummary {
        let trials = log.len();
        let correct = log.correct_count();
        let error_rate =
            (trials > 0).then(|| (trials - correct) as f64 / trials as f64 * 100.0);
        let congruent_rt_secs = mean(correct_rts(log, Some(Condition::Congruent)));
        let incongruent_rt_secs = mean(correct_rts(log, Some(Condition::Incongruent)));
        let interference_secs = incongruent_rt_secs
            .zip(congruent_rt_secs)
            .map(|(incongruent, congruent)| incongruent - congruent);

        ScoreSummary::Stroop(StroopSummary {
            trials,
            correct,
            error_rate,
            mean_rt_secs: mean(correct_rts(log, None)),
            congruent_rt_secs,
            incongruent_rt_secs,
            interference_secs,
        })
    }
}
