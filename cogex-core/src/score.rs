//! Per-test score summaries. Metrics that would divide by an empty subset
//! are `None` ("not available").

use crate::{Difficulty, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Metric = Option<f64>;

/// Arithmetic mean, `None` when there are no values.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Metric {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub attempted: u32,
    pub correct: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.attempted += 1;
        if correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticSummary {
    pub attempted: usize,
    pub correct: usize,
    pub tiers: BTreeMap<Difficulty, Tally>,
    pub weighted_accuracy: f64,
    pub speed_efficiency: f64,
    pub numerical_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StroopSummary {
    pub trials: usize,
    pub correct: usize,
    pub error_rate: Metric,
    pub mean_rt_secs: Metric,
    pub congruent_rt_secs: Metric,
    pub incongruent_rt_secs: Metric,
    pub interference_secs: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSummary {
    pub trials: usize,
    pub correct: usize,
    pub timed_out: usize,
    pub accuracy: Metric,
    pub avg_reaction_time_secs: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum ScoreSummary {
    Arithmetic(ArithmeticSummary),
    Stroop(StroopSummary),
    MentalRotation(RotationSummary),
}

impl ScoreSummary {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Arithmetic(_) => Stage::Arithmetic,
            Self::Stroop(_) => Stage::Stroop,
            Self::MentalRotation(_) => Stage::MentalRotation,
        }
    }

    /// The figure reported as the test's score.
    pub fn headline(&self) -> Metric {
        match self {
            Self::Arithmetic(s) => Some(s.numerical_score),
            Self::Stroop(s) => s.interference_secs,
            Self::MentalRotation(s) => s.accuracy,
        }
    }
}
