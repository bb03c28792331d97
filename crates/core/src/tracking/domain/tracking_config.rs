use std::time::Duration;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_DEADBAND, DEFAULT_LOSS_TIMEOUT_MS, DEFAULT_MAX_CMD, DEFAULT_SCALE,
    RECOMMENDED_SCALE_RANGE,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("deadband must be >= 0, got {0}")]
    NegativeDeadband(i32),
    #[error("max command must be > 0, got {0}")]
    NonPositiveMaxCmd(i32),
    #[error("scale must be a finite number > 0, got {0}")]
    InvalidScale(f64),
    #[error("loss timeout must be > 0")]
    ZeroLossTimeout,
}

/// How the scaled pixel error becomes an integer step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero.
    #[default]
    Nearest,
    /// Drop the fraction, biasing toward smaller steps.
    Truncate,
}

impl RoundingMode {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingMode::Nearest => value.round(),
            RoundingMode::Truncate => value.trunc(),
        }
    }
}

/// Tunables for the tracking controller. Fixed for the lifetime of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingConfig {
    pub deadband: i32,
    pub max_cmd: i32,
    pub scale: f64,
    pub rounding: RoundingMode,
    pub loss_timeout: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            deadband: DEFAULT_DEADBAND,
            max_cmd: DEFAULT_MAX_CMD,
            scale: DEFAULT_SCALE,
            rounding: RoundingMode::default(),
            loss_timeout: Duration::from_millis(DEFAULT_LOSS_TIMEOUT_MS),
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadband < 0 {
            return Err(ConfigError::NegativeDeadband(self.deadband));
        }
        if self.max_cmd <= 0 {
            return Err(ConfigError::NonPositiveMaxCmd(self.max_cmd));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if self.loss_timeout.is_zero() {
            return Err(ConfigError::ZeroLossTimeout);
        }
        let (lo, hi) = RECOMMENDED_SCALE_RANGE;
        if !(lo..=hi).contains(&self.scale) {
            log::warn!(
                "Scale {} is outside the tuned range {lo}..{hi}; expect sluggish or jerky motion",
                self.scale
            );
        }
        Ok(())
    }
}
