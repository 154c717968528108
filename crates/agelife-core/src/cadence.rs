//! Step pacing for the simulation driver.
//!
//! A [`Cadence`] is configured from one of three textual forms:
//!
//! - `immediate` -- step as fast as possible
//! - `delay:D` -- wait `D` milliseconds before each step
//! - `manual` -- wait for an explicit advance signal before each step

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Millisecond delays behind the classic speed menu choices 1 to 3.
const SPEED_CHOICE_DELAYS_MS: [u64; 3] = [10, 100, 1000];

/// Errors that can occur when parsing a cadence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CadenceError {
    /// The text is not one of the recognized forms.
    #[error("unrecognized cadence {input:?} (expected immediate, delay:D or manual)")]
    Unrecognized {
        /// The rejected text.
        input: String,
    },

    /// A `delay:` form whose duration is not a non-negative integer.
    #[error("invalid delay in cadence {input:?}: milliseconds must be a non-negative integer")]
    InvalidDelay {
        /// The rejected text.
        input: String,
    },

    /// A speed menu choice outside `1..=4`.
    #[error("unknown speed choice {choice} (expected 1 to 4)")]
    UnknownSpeedChoice {
        /// The rejected choice.
        choice: u8,
    },
}

/// How the driver paces successive steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Cadence {
    /// No delay between steps.
    Immediate,
    /// Fixed delay before each step.
    Delay(Duration),
    /// Block until an explicit advance signal before each step.
    Manual,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Delay(Duration::from_millis(100))
    }
}

impl Cadence {
    /// Map the classic speed menu to a cadence.
    ///
    /// 1 = 10 ms, 2 = 100 ms, 3 = 1000 ms, 4 = manual.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::UnknownSpeedChoice`] for any other value.
    pub fn from_speed_choice(choice: u8) -> Result<Self, CadenceError> {
        if choice == 4 {
            return Ok(Self::Manual);
        }
        usize::from(choice)
            .checked_sub(1)
            .and_then(|i| SPEED_CHOICE_DELAYS_MS.get(i))
            .map(|&ms| Self::Delay(Duration::from_millis(ms)))
            .ok_or(CadenceError::UnknownSpeedChoice { choice })
    }

    /// Whether steps wait for an explicit advance signal.
    pub const fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }

    /// The fixed delay, if this is a timed cadence with one.
    pub const fn delay(&self) -> Option<Duration> {
        match self {
            Self::Delay(delay) => Some(*delay),
            Self::Immediate | Self::Manual => None,
        }
    }
}

impl FromStr for Cadence {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "immediate" => Ok(Self::Immediate),
            "manual" => Ok(Self::Manual),
            _ => {
                let Some(ms) = trimmed.strip_prefix("delay:") else {
                    return Err(CadenceError::Unrecognized {
                        input: s.to_owned(),
                    });
                };
                // `u64::from_str` accepts a leading '+'; the form is digits only.
                if ms.is_empty() || !ms.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CadenceError::InvalidDelay {
                        input: s.to_owned(),
                    });
                }
                ms.parse::<u64>()
                    .map(|ms| Self::Delay(Duration::from_millis(ms)))
                    .map_err(|_err| CadenceError::InvalidDelay {
                        input: s.to_owned(),
                    })
            }
        }
    }
}

impl TryFrom<String> for Cadence {
    type Error = CadenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Delay(delay) => write!(f, "delay:{}", delay.as_millis()),
            Self::Manual => f.write_str("manual"),
        }
    }
}
