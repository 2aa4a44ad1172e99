//! # Instar Core
//!
//! Discrete-time behavioral controller for a simulated larva.
//!
//! This crate contains the controller logic, including:
//! - Phase clocks and the effector noise/clamp pipeline
//! - Bout/pause intermittency and crawl/turn interference
//! - Keyed-gain sensory modalities with reward-gated gain memory
//! - Ray-cast proximity and light sensing against polygonal obstacles
//! - Body kinematics and single/multi-agent runs
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! Control flows leaf to root once per tick:
//! - **Brain**: perception for every enabled modality, then the sensor gain
//!   stage, summed into one turning input
//! - **Locomotor**: intermittency gates crawler and feeder, the turner follows
//!   the input, interference damps turning over the stride
//! - **Deterministic runs**: all randomness comes from an injected seeded RNG
//!
//! ## Example
//!
//! ```
//! use instar_core::config::AgentConfig;
//! use instar_core::locomotor::Locomotor;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut locomotor = Locomotor::new(&AgentConfig::default(), &mut rng);
//!
//! // One tick without sensory drive for a 4 mm larva
//! let command = locomotor.step(0.0, false, 0.004, &mut rng);
//! assert!(command.linear_velocity >= 0.0);
//! ```

/// Modality fusion and the per-tick sense/act entry point
pub mod brain;
/// Agent configuration, TOML parsing and validation
pub mod config;
/// Single effector type with a phase-factor strategy
pub mod effector;
/// Collision and perception errors
pub mod error;
/// Segment intersection and nearest-obstacle search
pub mod geometry;
/// Environment queries used by perception
pub mod habitat;
/// Phase-dependent attenuation of turning
pub mod interference;
/// Bout/pause stochastic switching
pub mod intermitter;
/// Crawler, turner and feeder composition
pub mod locomotor;
/// Reward-gated gain adaptation
pub mod memory;
/// Run metrics and logging setup
pub mod metrics;
/// Multiplicative Gaussian noise and clamping
pub mod noise;
/// Periodic phase timer
pub mod oscillator;
/// Ray-cast proximity and light sensors
pub mod proximity;
/// Keyed-gain sensor stage
pub mod sensor;
/// Body kinematics and agent runs
pub mod simulation;

pub use brain::{Brain, BrainInput, Modality};
pub use config::AgentConfig;
pub use error::{Collision, ControlError, SenseError, Unavailable};
pub use habitat::{Habitat, StaticHabitat};
pub use locomotor::Locomotor;
pub use metrics::{init_logging, Metrics};
pub use simulation::{simulate_agent, simulate_agents, Agent, Placement, Trajectory};
