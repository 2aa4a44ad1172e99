//! Error types for the controller core.
//!
//! Only a collision aborts a tick. Missing environment data is reported as
//! [`Unavailable`] and turned into zero drive by the brain, and degenerate
//! geometry never produces an error at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cast ray found an obstacle closer than the collision threshold.
#[derive(Error, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[error("collision with obstacle {obstacle_index} at distance {distance:.4} (threshold {threshold:.4})")]
pub struct Collision {
    pub distance: f64,
    pub threshold: f64,
    /// Position of the obstacle in the slice passed to the sensor.
    pub obstacle_index: usize,
}

/// A habitat query that cannot be answered for this agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} unavailable")]
pub struct Unavailable(pub &'static str);

/// Outcome of a single perception call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SenseError {
    /// Recovered by the fusion layer as zero drive.
    #[error(transparent)]
    Unavailable(#[from] Unavailable),

    /// Propagated to the caller.
    #[error(transparent)]
    Collision(#[from] Collision),
}

/// Errors surfaced by a controller tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error(transparent)]
    Collision(#[from] Collision),
}

/// Result type alias for controller ticks.
pub type Result<T> = std::result::Result<T, ControlError>;

impl ControlError {
    /// The collision behind this error, if any.
    #[must_use]
    pub fn collision(&self) -> Option<&Collision> {
        match self {
            ControlError::Collision(c) => Some(c),
        }
    }
}
