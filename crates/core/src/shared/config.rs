use thiserror::Error;

use super::constants::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_PADDING};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Minimum detection confidence, guaranteed to lie in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::ThresholdOutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Strictly-greater comparison: a score equal to the threshold is rejected.
    pub fn accepts(self, confidence: f64) -> bool {
        confidence > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// Validated, immutable settings for one session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub threshold: Threshold,
    pub padding: u32,
}

impl SessionConfig {
    pub fn new(confidence_threshold: f64, padding: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: Threshold::new(confidence_threshold)?,
            padding,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            padding: DEFAULT_PADDING,
        }
    }
}
