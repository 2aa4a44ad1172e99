//! Instar: a layered behavioral controller for simulated larvae.
//!
//! The controller lives in `instar_core` and its plain data types in
//! `instar_data`; this crate re-exports both under [`model`] and adds
//! configuration file loading.

pub mod model {
    pub use instar_core::{Brain, BrainInput, Modality};
    pub mod brain {
        pub use instar_core::brain::*;
    }
    pub mod config {
        pub use instar_core::config::*;
    }
    pub mod effector {
        pub use instar_core::effector::*;
        pub use instar_core::noise::*;
        pub use instar_core::oscillator::*;
    }
    pub mod error {
        pub use instar_core::error::*;
    }
    pub mod geometry {
        pub use instar_core::geometry::*;
        pub use instar_data::{Obstacle, ObstacleKind, Point, Ray, Segment};
    }
    pub mod habitat {
        pub use instar_core::habitat::*;
    }
    pub mod locomotor {
        pub use instar_core::interference::*;
        pub use instar_core::intermitter::*;
        pub use instar_core::locomotor::*;
        pub use instar_data::{IntermittencyState, MotorCommand};
    }
    pub mod sensors {
        pub use instar_core::memory::*;
        pub use instar_core::proximity::*;
        pub use instar_core::sensor::*;
    }
    pub mod simulation {
        pub use instar_core::metrics::*;
        pub use instar_core::simulation::*;
        pub use instar_data::TrajectorySample;
    }
}

use anyhow::Context;
use instar_core::config::AgentConfig;
use std::path::Path;

/// Reads and validates an agent configuration file.
pub fn try_load_config(path: impl AsRef<Path>) -> anyhow::Result<AgentConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    AgentConfig::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Loads `path`, falling back to the default configuration when the file is
/// missing or invalid.
pub fn load_config(path: impl AsRef<Path>) -> AgentConfig {
    match try_load_config(path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Using default agent config");
            AgentConfig::default()
        }
    }
}
