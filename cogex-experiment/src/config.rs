use crate::AssessmentError;
use cogex_core::ImageTriple;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Probabilities of drawing each difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub easy: f64,
    pub moderate: f64,
    pub hard: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            easy: 0.40,
            moderate: 0.35,
            hard: 0.25,
        }
    }
}

impl TierWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.easy, self.moderate, self.hard]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticConfig {
    pub test_duration_ms: u64,
    pub question_pool: usize,
    pub tier_weights: TierWeights,
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        Self {
            test_duration_ms: 300_000,
            question_pool: 100,
            tier_weights: TierWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub trials: usize,
    pub trial_deadline_ms: u64,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            trials: 42,
            trial_deadline_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub trials: usize,
    pub trial_deadline_ms: u64,
    pub image_sets: Vec<ImageTriple>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            trials: 15,
            trial_deadline_ms: 10_000,
            image_sets: (1..=15).map(ImageTriple::numbered).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Seed for stimulus generation; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub arithmetic: ArithmeticConfig,
    pub stroop: StroopConfig,
    pub rotation: RotationConfig,
}

impl AssessmentConfig {
    /// Parses and validates a JSON document; absent fields keep defaults.
    pub fn from_json(text: &str) -> Result<Self, AssessmentError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssessmentError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        let invalid = |msg: String| Err(AssessmentError::Config(msg));

        if self.arithmetic.test_duration_ms == 0 || self.arithmetic.question_pool == 0 {
            return invalid("arithmetic duration and question pool must be non-zero".into());
        }
        let weights = self.arithmetic.tier_weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return invalid(format!("tier weights {weights:?} must all be positive"));
        }
        if self.stroop.trials == 0 || self.stroop.trial_deadline_ms == 0 {
            return invalid("stroop trials and deadline must be non-zero".into());
        }
        if self.rotation.trials == 0 || self.rotation.trial_deadline_ms == 0 {
            return invalid("mental rotation trials and deadline must be non-zero".into());
        }
        if self.rotation.image_sets.len() < self.rotation.trials {
            return invalid(format!(
                "mental rotation needs {} image sets, only {} configured",
                self.rotation.trials,
                self.rotation.image_sets.len()
            ));
        }
        Ok(())
    }
}

impl ArithmeticConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.test_duration_ms)
    }
}

impl StroopConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.trial_deadline_ms)
    }
}

impl RotationConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.trial_deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_protocol() {
        let config = AssessmentConfig::default();
        assert_eq!(config.arithmetic.duration(), Duration::from_secs(300));
        assert_eq!(config.arithmetic.question_pool, 100);
        assert_eq!(config.stroop.trials, 42);
        assert_eq!(config.stroop.deadline(), Duration::from_secs(5));
        assert_eq!(config.rotation.trials, 15);
        assert_eq!(config.rotation.deadline(), Duration::from_secs(10));
        assert_eq!(config.rotation.image_sets.len(), 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AssessmentConfig::from_json(r#"{"seed": 7, "stroop": {"trials": 10}}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.stroop.trials, 10);
        assert_eq!(config.stroop.trial_deadline_ms, 5_000);
        assert_eq!(config.arithmetic, ArithmeticConfig::default());
    }

    #[test]
    fn rotation_pool_must_cover_trials() {
        let err = AssessmentConfig::from_json(r#"{"rotation": {"trials": 20}}"#).unwrap_err();
        assert!(matches!(err, AssessmentError::Config(_)));
    }

    #[test]
    fn every_tier_weight_must_be_positive() {
        let err = AssessmentConfig::from_json(
            r#"{"arithmetic": {"tier_weights": {"easy": 0.5, "moderate": 0.5, "hard": 0.0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AssessmentError::Config(_)));

        let mut config = AssessmentConfig::default();
        config.arithmetic.tier_weights.easy = -0.1;
        assert!(config.validate().is_err());
        config.arithmetic.tier_weights.easy = 0.1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AssessmentConfig::from_json("{").unwrap_err();
        assert!(matches!(err, AssessmentError::ConfigFormat(_)));
    }
}
