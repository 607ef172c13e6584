pub mod arithmetic;
pub mod profile;
pub mod rotation;
pub mod score;
pub mod stage;
pub mod stimulus;
pub mod stroop;
pub mod trial;

pub use arithmetic::{ArithmeticQuestion, Difficulty, Expr, ExprError, Op};
pub use profile::{Intake, IntakeError, ParticipantProfile};
pub use rotation::{ImageTriple, RotationOption, RotationTrial, Side, UnknownSide};
pub use score::{
    ArithmeticSummary, Metric, RotationSummary, ScoreSummary, StroopSummary, Tally, mean,
};
pub use stage::{Stage, UnknownStage};
pub use stimulus::Stimulus;
pub use stroop::{Condition, InkColor, NEUTRAL_WORDS, StroopStimulus};
pub use trial::{TestPhase, TrialLog, TrialOutcome, TrialRecord};
