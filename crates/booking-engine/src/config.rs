//! Engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Spacing of candidate start times when listing slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SlotStep {
    #[default]
    FifteenMinutes,
    ThirtyMinutes,
}

impl SlotStep {
    pub fn minutes(self) -> u32 {
        match self {
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }
}

impl TryFrom<u32> for SlotStep {
    type Error = BookingError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            15 => Ok(Self::FifteenMinutes),
            30 => Ok(Self::ThirtyMinutes),
            other => Err(BookingError::Validation(format!(
                "slot step must be 15 or 30 minutes, got {}",
                other
            ))),
        }
    }
}

impl From<SlotStep> for u32 {
    fn from(step: SlotStep) -> Self {
        step.minutes()
    }
}

/// Tunables for a [`crate::BookingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub slot_step: SlotStep,
}
