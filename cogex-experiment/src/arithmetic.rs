//! Numerical ability: as many questions as possible in one countdown.

use crate::config::ArithmeticConfig;
use crate::engine::{STATE_FIELD, TimedTest};
use crate::trial::{Deadline, Judgement};
use crate::{AssessmentError, Response};
use cogex_core::{
    ArithmeticQuestion, ArithmeticSummary, Difficulty, Expr, ExprError, ScoreSummary, Stage, Tally,
    TrialLog,
};
use cogex_store::Namespace;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub struct ArithmeticTest {
    config: ArithmeticConfig,
    tiers: WeightedIndex<f64>,
}

impl ArithmeticTest {
    pub fn new(config: ArithmeticConfig) -> Result<Self, AssessmentError> {
        let tiers = WeightedIndex::new(config.tier_weights.as_array())
            .map_err(|e| AssessmentError::Config(format!("tier weights: {e}")))?;
        Ok(Self { config, tiers })
    }

    pub fn draw_difficulty<R: Rng + ?Sized>(&self, rng: &mut R) -> Difficulty {
        Difficulty::ALL[self.tiers.sample(rng)]
    }
}

fn num<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<i64>) -> Expr {
    Expr::num(rng.random_range(range))
}

/// `divisor * quotient / divisor`, so the division is always exact.
fn exact_division<R: Rng + ?Sized>(
    rng: &mut R,
    divisors: RangeInclusive<i64>,
    quotients: RangeInclusive<i64>,
) -> Expr {
    let divisor = rng.random_range(divisors);
    let quotient = rng.random_range(quotients);
    Expr::div(Expr::num(divisor * quotient), Expr::num(divisor))
}

/// Builds one question of the given tier. Each tier has a few fixed shapes;
/// operands are drawn per shape.
pub fn generate_question<R: Rng + ?Sized>(
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<ArithmeticQuestion, ExprError> {
    let expr = match difficulty {
        Difficulty::Easy => match rng.random_range(0..4) {
            0 => Expr::add(num(rng, 1..=50), num(rng, 1..=50)),
            1 => Expr::sub(num(rng, 20..=70), num(rng, 1..=20)),
            2 => Expr::mul(num(rng, 2..=12), num(rng, 2..=12)),
            _ => exact_division(rng, 2..=12, 2..=12),
        },
        Difficulty::Moderate => match rng.random_range(0..4) {
            0 => Expr::add(
                num(rng, 1..=20),
                Expr::mul(num(rng, 1..=10), num(rng, 1..=10)),
            ),
            1 => Expr::sub(
                num(rng, 20..=50),
                Expr::mul(num(rng, 1..=10), num(rng, 1..=10)),
            ),
            2 => Expr::add(exact_division(rng, 2..=10, 2..=10), num(rng, 1..=20)),
            _ => Expr::add(num(rng, 1..=20), exact_division(rng, 2..=10, 2..=10)),
        },
        Difficulty::Hard => match rng.random_range(0..3) {
            0 => Expr::mul(
                Expr::group(Expr::sub(num(rng, 1..=20), num(rng, 1..=20))),
                num(rng, 1..=10),
            ),
            1 => Expr::add(
                Expr::group(exact_division(rng, 2..=10, 2..=10)),
                num(rng, 1..=10),
            ),
            _ => Expr::sub(
                Expr::group(Expr::add(num(rng, 1..=20), num(rng, 1..=10))),
                Expr::mul(num(rng, 2..=10), num(rng, 1..=10)),
            ),
        },
    };
    ArithmeticQuestion::new(expr, difficulty)
}

impl TimedTest for ArithmeticTest {
    type Stimulus = ArithmeticQuestion;
    type Plan = Vec<ArithmeticQuestion>;

    const STAGE: Stage = Stage::Arithmetic;
    const NAMESPACE: Namespace = Namespace::new("arithmetic", &[STATE_FIELD]);

    fn deadline(&self) -> Deadline {
        Deadline::WholeTest(self.config.duration())
    }

    fn trial_count(&self) -> usize {
        self.config.question_pool
    }

    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self::Plan, AssessmentError> {
        (0..self.config.question_pool)
            .map(|_| {
                let difficulty = self.draw_difficulty(rng);
                generate_question(difficulty, rng).map_err(AssessmentError::from)
            })
            .collect()
    }

    fn stimulus<R: Rng + ?Sized>(
        &self,
        plan: &Self::Plan,
        index: usize,
        _rng: &mut R,
    ) -> Result<Self::Stimulus, AssessmentError> {
        plan.get(index)
            .cloned()
            .ok_or(AssessmentError::PlanExhausted(index))
    }

    /// Only integers are answers. Anything else leaves the question open.
    fn judge(&self, question: &ArithmeticQuestion, response: Response<'_>) -> Judgement {
        let Response::Submit(text) = response else {
            return Judgement::Ignored;
        };
        match text.trim().parse::<i64>() {
            Ok(value) => Judgement::Accepted {
                correct: value == question.answer,
                response: value.to_string(),
            },
            Err(_) => Judgement::Rejected,
        }
    }

    fn summarize(&self, log: &TrialLog<ArithmeticQuestion>) -> ScoreSummary {
        let mut tiers: BTreeMap<Difficulty, Tally> =
            Difficulty::ALL.iter().map(|d| (*d, Tally::default())).collect();
        for record in log {
            tiers
                .entry(record.stimulus.difficulty)
                .or_default()
                .record(record.correct());
        }

        let (weighted_correct, weighted_attempted) =
            tiers.iter().fold((0.0, 0.0), |(c, a), (tier, tally)| {
                let w = tier.weight() as f64;
                (c + tally.correct as f64 * w, a + tally.attempted as f64 * w)
            });
        let weighted_accuracy = if weighted_attempted > 0.0 {
            weighted_correct / weighted_attempted
        } else {
            0.0
        };
        let attempted = log.len();
        let speed_efficiency = (attempted as f64 / self.config.question_pool as f64).min(1.0);

        ScoreSummary::Arithmetic(ArithmeticSummary {
            attempted,
            correct: log.correct_count(),
            tiers,
            weighted_accuracy,
            speed_efficiency,
            numerical_score: 0.7 * weighted_accuracy + 0.3 * speed_efficiency,
        })
    }
}
