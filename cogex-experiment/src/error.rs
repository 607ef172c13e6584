use cogex_core::{ExprError, IntakeError, Stage};
use cogex_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("cannot advance from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("participant profile is already registered")]
    ProfileAlreadySet,

    #[error("a participant profile must be registered before leaving consent")]
    ProfileMissing,

    #[error("intake rejected: {0}")]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("generated expression is invalid: {0}")]
    Expression(#[from] ExprError),

    #[error("no planned trial at index {0}")]
    PlanExhausted(usize),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("failed to encode results: {0}")]
    Export(#[source] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
