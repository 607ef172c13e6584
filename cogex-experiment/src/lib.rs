pub mod arithmetic;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod rotation;
pub mod session;
pub mod state;
pub mod stroop;
pub mod trial;

pub use arithmetic::ArithmeticTest;
pub use config::{ArithmeticConfig, AssessmentConfig, RotationConfig, StroopConfig, TierWeights};
pub use controller::StageController;
pub use engine::{Directive, TimedTest, TimedTrialEngine, View};
pub use error::AssessmentError;
pub use event::{Input, Response};
pub use rotation::RotationTest;
pub use session::{Assessment, Screen};
pub use state::TestState;
pub use stroop::StroopTest;
pub use trial::{Deadline, Judgement};
