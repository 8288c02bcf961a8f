//! Separation thresholds and the classification policy.

use serde::{Deserialize, Serialize};

use crate::error::ProximityError;
use crate::models::ProximityStatus;

pub const DEFAULT_HORIZONTAL_THRESHOLD_M: f64 = 15.0;
pub const DEFAULT_VERTICAL_THRESHOLD_M: f64 = 5.0;

/// Separation minima for the monitored pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationThresholds {
    /// Minimum horizontal separation in meters
    pub horizontal_m: f64,
    /// Minimum vertical separation in meters
    pub vertical_m: f64,
}

impl Default for SeparationThresholds {
    fn default() -> Self {
        Self {
            horizontal_m: DEFAULT_HORIZONTAL_THRESHOLD_M,
            vertical_m: DEFAULT_VERTICAL_THRESHOLD_M,
        }
    }
}

impl SeparationThresholds {
    /// Build validated thresholds. Both values must be finite and non-negative.
    pub fn new(horizontal_m: f64, vertical_m: f64) -> Result<Self, ProximityError> {
        check_threshold("hthresh", horizontal_m)?;
        check_threshold("vthresh", vertical_m)?;
        Ok(Self {
            horizontal_m,
            vertical_m,
        })
    }

    /// Classify a pair from its (unrounded) separations.
    ///
    /// A conflict needs both axes violated at once, so a missing vertical
    /// separation can never yield `Danger`.
    pub fn classify(&self, horizontal_m: Option<f64>, vertical_m: Option<f64>) -> ProximityStatus {
        let Some(horizontal_m) = horizontal_m else {
            return ProximityStatus::NoData;
        };
        match vertical_m {
            Some(vertical_m)
                if horizontal_m < self.horizontal_m && vertical_m < self.vertical_m =>
            {
                ProximityStatus::Danger
            }
            _ => ProximityStatus::Safe,
        }
    }

    /// Horizontally inside the minimum, regardless of the vertical axis.
    pub fn is_horizontally_close(&self, horizontal_m: f64) -> bool {
        horizontal_m < self.horizontal_m
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ProximityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ProximityError::InvalidThreshold { name, value })
    }
}
