use crate::Stimulus;
use serde::{Deserialize, Serialize};

/// Words that name no colour, shown in the neutral condition.
pub const NEUTRAL_WORDS: [&str; 4] = ["DOG", "CAR", "TREE", "HOUSE"];

/// Palette shared by colour words, ink colours and response buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl InkColor {
    pub const ALL: [InkColor; 4] = [InkColor::Red, InkColor::Green, InkColor::Blue, InkColor::Yellow];

    /// Lowercase name, as used for the display colour.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }

    /// Uppercase colour word, as shown on screen and on the buttons.
    pub fn word(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
        }
    }

    /// Case-insensitive lookup by colour name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Congruent,
    Incongruent,
    Neutral,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Congruent, Condition::Incongruent, Condition::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Congruent => "Congruent",
            Self::Incongruent => "Incongruent",
            Self::Neutral => "Neutral",
        }
    }
}

/// A word printed in an ink colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StroopStimulus {
    pub word: String,
    pub ink: InkColor,
    pub condition: Condition,
}

impl StroopStimulus {
    pub fn congruent(color: InkColor) -> Self {
        Self {
            word: color.word().to_string(),
            ink: color,
            condition: Condition::Congruent,
        }
    }

    pub fn incongruent(word: InkColor, ink: InkColor) -> Self {
        debug_assert_ne!(word, ink);
        Self {
            word: word.word().to_string(),
            ink,
            condition: Condition::Incongruent,
        }
    }

    pub fn neutral(word: &str, ink: InkColor) -> Self {
        Self {
            word: word.to_string(),
            ink,
            condition: Condition::Neutral,
        }
    }

    /// Colour named by the word itself, if it is a colour word.
    pub fn word_color(&self) -> Option<InkColor> {
        InkColor::from_name(&self.word)
    }

    /// A choice is correct iff it names the ink colour, ignoring case.
    pub fn is_correct(&self, choice: &str) -> bool {
        choice.trim().eq_ignore_ascii_case(self.ink.name())
    }
}

impl Stimulus for StroopStimulus {
    const COLUMNS: &'static [&'static str] = &["word", "font_color", "condition"];

    fn label(&self) -> &'static str {
        self.condition.as_str()
    }

    fn expected(&self) -> String {
        self.ink.name().to_string()
    }

    fn column_values(&self) -> Vec<String> {
        vec![
            self.word.clone(),
            self.ink.name().to_string(),
            self.condition.as_str().to_string(),
        ]
    }
}
