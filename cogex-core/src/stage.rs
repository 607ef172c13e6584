use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phases of the assessment pipeline, visited in declaration order.
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Consent,
    Instructions,
    Arithmetic,
    Stroop,
    MentalRotation,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Consent,
        Stage::Instructions,
        Stage::Arithmetic,
        Stage::Stroop,
        Stage::MentalRotation,
        Stage::Final,
    ];

    /// The only stage this one may advance to.
    pub fn next(&self) -> Option<Self> {
        use Stage::*;
        Some(match self {
            Consent => Instructions,
            Instructions => Arithmetic,
            Arithmetic => Stroop,
            Stroop => MentalRotation,
            MentalRotation => Final,
            Final => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consent => "consent",
            Self::Instructions => "instructions",
            Self::Arithmetic => "arithmetic",
            Self::Stroop => "stroop",
            Self::MentalRotation => "mental_rotation",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage `{0}`")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
