//! Core data structures for the Instar controller.

pub mod geometry;
pub mod motor;
pub mod obstacle;
