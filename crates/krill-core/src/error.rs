//! Error types for krill

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum KrillError {
    #[error("Buffer length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Requantization scale {0} outside [2^-31, 1)")]
    InvalidScale(f32),

    #[error("Fixed-point multiplier {0} outside [2^30, 2^31)")]
    InvalidMultiplier(i32),

    #[error("Shift amount {0} outside [0, 31)")]
    InvalidShift(u32),

    #[error("Invalid clamp range: min {min} > max {max}")]
    InvalidClamp { min: f32, max: f32 },
}

pub type Result<T> = std::result::Result<T, KrillError>;
