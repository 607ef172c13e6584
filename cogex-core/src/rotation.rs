use crate::Stimulus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target figure, its rotated match and a mirrored foil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTriple {
    pub target: String,
    pub matching: String,
    pub foil: String,
}

impl ImageTriple {
    /// Triple `n` of the standard `images/` asset layout (1-based).
    pub fn numbered(n: usize) -> Self {
        Self {
            target: format!("images/target{n}.png"),
            matching: format!("images/correct{n}.png"),
            foil: format!("images/wrong{n}.png"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Button label, `A` for left and `B` for right.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "A",
            Self::Right => "B",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not an option")]
pub struct UnknownSide(pub String);

impl FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "left" | "0" => Ok(Self::Left),
            "b" | "right" | "1" => Ok(Self::Right),
            _ => Err(UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOption {
    pub image: String,
    pub is_match: bool,
}

/// One trial: the target and two options, exactly one of which matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationTrial {
    pub set: usize,
    pub target: String,
    pub options: [RotationOption; 2],
}

impl RotationTrial {
    pub fn new(set: usize, triple: &ImageTriple, match_side: Side) -> Self {
        let matching = RotationOption {
            image: triple.matching.clone(),
            is_match: true,
        };
        let foil = RotationOption {
            image: triple.foil.clone(),
            is_match: false,
        };
        let options = match match_side {
            Side::Left => [matching, foil],
            Side::Right => [foil, matching],
        };
        Self {
            set,
            target: triple.target.clone(),
            options,
        }
    }

    pub fn option(&self, side: Side) -> &RotationOption {
        &self.options[side.index()]
    }

    pub fn match_side(&self) -> Side {
        if self.options[0].is_match { Side::Left } else { Side::Right }
    }
}

impl Stimulus for RotationTrial {
    const COLUMNS: &'static [&'static str] = &["set", "target", "option_a", "option_b"];

    fn label(&self) -> &'static str {
        "rotation"
    }

    fn expected(&self) -> String {
        self.match_side().label().to_string()
    }

    fn column_values(&self) -> Vec<String> {
        vec![
            self.set.to_string(),
            self.target.clone(),
            self.options[0].image.clone(),
            self.options[1].image.clone(),
        ]
    }
}
