//! Participant identity and demographics, captured once at intake.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBand {
    #[default]
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "56+")]
    Over55,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qualification {
    #[default]
    #[serde(rename = "Pursuing UG")]
    PursuingUg,
    #[serde(rename = "Pursuing PG")]
    PursuingPg,
    #[serde(rename = "Completed UG")]
    CompletedUg,
    #[serde(rename = "Completed PG")]
    CompletedPg,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    #[default]
    Employed,
    #[serde(rename = "Not Employed")]
    NotEmployed,
    Retired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    #[default]
    Right,
    Left,
    Ambidextrous,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Laptop,
    Desktop,
    Mobile,
    Tablet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vision {
    #[default]
    Normal,
    #[serde(rename = "Corrected to Normal")]
    CorrectedToNormal,
}

/// Immutable after registration; read-only to every test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantProfile {
    pub name: String,
    pub age: AgeBand,
    pub gender: Gender,
    pub hometown: String,
    pub current_city: String,
    pub mother_language: String,
    pub academic: Qualification,
    pub service: ServiceStatus,
    pub handedness: Handedness,
    pub device: Device,
    pub vision: Vision,
    pub prior_exposure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("consent is required to participate")]
    ConsentRequired,
    #[error("participant name must not be empty")]
    MissingName,
}

/// What the consent form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intake {
    pub consent: bool,
    pub profile: ParticipantProfile,
}

impl Intake {
    pub fn validate(self) -> Result<ParticipantProfile, IntakeError> {
        if !self.consent {
            return Err(IntakeError::ConsentRequired);
        }
        if self.profile.name.trim().is_empty() {
            return Err(IntakeError::MissingName);
        }
        Ok(self.profile)
    }
}
