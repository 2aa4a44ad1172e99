use serde::{Deserialize, Serialize};

/// Phase of the intermittency state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntermittencyState {
    /// Active crawling/feeding bout.
    #[default]
    Bout,
    /// Inactive pause.
    Pause,
}

impl IntermittencyState {
    #[must_use]
    pub fn is_bout(&self) -> bool {
        matches!(self, IntermittencyState::Bout)
    }
}

/// Motor output of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorCommand {
    pub linear_velocity: f64,
    pub angular_velocity: f64,
    /// `true` on ticks where a feeding motion completed.
    pub feeding: bool,
}

/// Thermal field reading relative to the preferred temperature.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThermalReading {
    pub cool: f64,
    pub warm: f64,
}

/// Body state emitted by the simulation driver every tick.
///
/// Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub tick: u64,
    pub bend: f64,
    pub front_orientation: f64,
    pub rear_orientation: f64,
    pub front_orientation_velocity: f64,
    pub turner_input: f64,
    pub x: f64,
    pub y: f64,
    /// Distance travelled during the tick.
    pub displacement: f64,
    pub velocity: f64,
    pub turner_output: f64,
    pub attenuation: f64,
}
