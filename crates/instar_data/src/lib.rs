//! Plain data shared by the controller core and its callers.

pub mod data;

pub use data::geometry::{Point, Ray, Segment};
pub use data::motor::{IntermittencyState, MotorCommand, ThermalReading, TrajectorySample};
pub use data::obstacle::{Obstacle, ObstacleKind};
