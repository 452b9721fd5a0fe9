//! Confidence values and the automated-write threshold.
//!
//! Confidence is an integer percentage supplied by the caller alongside a
//! request. The engine never computes it; it only compares it against
//! [`CONFIDENCE_THRESHOLD`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum confidence (inclusive) for an automated write without escalation.
pub const CONFIDENCE_THRESHOLD: u8 = 75;

/// A confidence percentage in `[0, 100]`.
///
/// # Examples
///
/// ```
/// use listing_rules::Confidence;
///
/// let conf = Confidence::new(75).unwrap();
/// assert!(conf.meets_threshold());
/// assert!(!Confidence::new(74).unwrap().meets_threshold());
/// assert!(Confidence::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    /// Minimum valid confidence value.
    pub const MIN_VALUE: u8 = 0;

    /// Maximum valid confidence value.
    pub const MAX_VALUE: u8 = 100;

    /// Creates a confidence with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if the value is above 100.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        Self::try_from(i64::from(value))
    }

    /// Zero confidence.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Self::MIN_VALUE)
    }

    /// Full confidence.
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::MAX_VALUE)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// True when the value is at or above [`CONFIDENCE_THRESHOLD`].
    #[must_use]
    pub const fn meets_threshold(self) -> bool {
        self.0 >= CONFIDENCE_THRESHOLD
    }

    /// Signed distance from the threshold (negative when below).
    #[must_use]
    pub fn margin(self) -> i16 {
        i16::from(self.0) - i16::from(CONFIDENCE_THRESHOLD)
    }
}

impl TryFrom<i64> for Confidence {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX_VALUE => Ok(Self(v)),
            _ => Err(ValidationError::ConfidenceOutOfRange { value }),
        }
    }
}

impl From<Confidence> for u8 {
    fn from(conf: Confidence) -> Self {
        conf.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
