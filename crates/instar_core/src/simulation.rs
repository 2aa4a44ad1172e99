//! Body kinematics and the agent run loop.
//!
//! The body integrates each motor command into bend, front/rear orientation
//! and position. An [`Agent`] couples one brain to one body;
//! [`simulate_agent`] drives it for a fixed number of ticks and
//! [`simulate_agents`] runs independent agents, in parallel when the
//! `parallel` feature is on.

use crate::brain::{Brain, BrainInput};
use crate::config::{AgentConfig, BodyConfig};
use crate::error::Collision;
use crate::geometry::wrap_angle;
use crate::habitat::Habitat;
use crate::intermitter::IntermitterStats;
use crate::metrics::Metrics;
use instar_data::{MotorCommand, Point, TrajectorySample};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::time::Instant;
use uuid::Uuid;

/// Two-segment body: the front segment turns, the rear follows the bend.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    config: BodyConfig,
    pub position: Point,
    pub bend: f64,
    pub front_orientation: f64,
    pub rear_orientation: f64,
    pub front_orientation_velocity: f64,
    /// Ticks whose heading change exceeded π.
    pub bend_errors: u64,
}

impl Body {
    #[must_use]
    pub fn new(config: &BodyConfig, position: Point, orientation: f64) -> Self {
        Self {
            config: config.clone(),
            position,
            bend: 0.0,
            front_orientation: orientation.rem_euclid(TAU),
            rear_orientation: orientation.rem_euclid(TAU),
            front_orientation_velocity: 0.0,
            bend_errors: 0,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.config.length
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Rear-orientation change that straightens the body while moving.
    #[must_use]
    pub fn delta_rear_angle(&self, displacement: f64) -> f64 {
        let k = 2.0 * displacement * self.config.bend_correction_coef / self.config.length;
        if k < 0.0 {
            0.0
        } else if k >= 1.0 {
            self.bend
        } else {
            self.bend * k
        }
    }

    /// Integrates one tick; returns `(displacement, velocity)`.
    pub fn apply(&mut self, command: &MotorCommand, dt: f64) -> (f64, f64) {
        let c = &self.config;
        let velocity = command.linear_velocity * c.lin_vel_coef;
        self.front_orientation_velocity += (-c.ang_damping * self.front_orientation_velocity
            - c.body_spring_k * self.bend
            + command.angular_velocity * c.torque_coef)
            * dt;

        let d_or = self.front_orientation_velocity * dt;
        if d_or.abs() > PI {
            self.bend_errors += 1;
        }
        let displacement = velocity * dt;
        let d_ro = self.delta_rear_angle(displacement);

        self.bend = wrap_angle(self.bend + d_or - d_ro);
        self.front_orientation = (self.front_orientation + d_or).rem_euclid(TAU);
        self.rear_orientation = (self.rear_orientation + d_ro).rem_euclid(TAU);
        self.position = self.position.offset(self.front_orientation, displacement);
        (displacement, velocity)
    }
}

/// Initial pose of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point,
    pub orientation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: Uuid,
    pub brain: Brain,
    pub body: Body,
    dt: f64,
    tick: u64,
    /// Reach of the mouth hooks; food within it counts as contact.
    feed_reach: f64,
    bite_volume: f64,
    on_food: bool,
    pub feeding_events: u64,
    /// Ingested volume as a fraction of body volume.
    pub ingested: f64,
}

impl Agent {
    pub fn new<R: Rng + ?Sized>(config: &AgentConfig, start: Placement, rng: &mut R) -> Self {
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        let (feed_reach, bite_volume) = config.feeder.as_ref().map_or(
            (config.body.radius, 0.0),
            |f| (f.feed_radius * config.body.length, f.bite_volume),
        );
        Self {
            id,
            brain: Brain::new(config, rng),
            body: Body::new(&config.body, start.position, start.orientation),
            dt: config.dt,
            tick: 0,
            feed_reach,
            bite_volume,
            on_food: false,
            feeding_events: 0,
            ingested: 0.0,
        }
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Steps the locomotor alone on a coin flip per tick, for up to `ticks`
    /// ticks, so agents built from one config start out of phase.
    pub fn warm_up<R: Rng + ?Sized>(&mut self, ticks: u32, rng: &mut R) {
        let length = self.body.length();
        for _ in 0..ticks {
            if rng.gen_bool(0.5) {
                self.brain.locomotor.step(0.0, false, length, rng);
            }
        }
    }

    /// One sense/act/integrate tick.
    ///
    /// The reward passed to the brain is the food contact of the previous
    /// tick. On collision the agent is left unchanged.
    pub fn step<H: Habitat + ?Sized, R: Rng + ?Sized>(
        &mut self,
        habitat: &H,
        rng: &mut R,
    ) -> crate::error::Result<TrajectorySample> {
        let on_food = habitat
            .food_contact(self.body.position, self.feed_reach)
            .unwrap_or(false);
        let input = BrainInput {
            position: self.body.position,
            orientation: self.body.front_orientation,
            reward: if self.on_food { 1.0 } else { 0.0 },
            on_food,
        };
        let command = self.brain.step(&input, habitat, rng)?;
        self.on_food = on_food;
        if command.feeding {
            self.feeding_events += 1;
            self.ingested += self.bite_volume;
        }

        let (displacement, velocity) = self.body.apply(&command, self.dt);
        let locomotor = &self.brain.locomotor;
        let sample = TrajectorySample {
            tick: self.tick,
            bend: self.body.bend,
            front_orientation: self.body.front_orientation,
            rear_orientation: self.body.rear_orientation,
            front_orientation_velocity: self.body.front_orientation_velocity,
            turner_input: locomotor.turner.input,
            x: self.body.position.x,
            y: self.body.position.y,
            displacement,
            velocity,
            turner_output: locomotor.turner.output,
            attenuation: locomotor.attenuation(),
        };
        self.tick += 1;
        Ok(sample)
    }
}

/// Outcome of one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub agent_id: Uuid,
    /// Fingerprint of the behavioural configuration.
    pub fingerprint: String,
    pub samples: Vec<TrajectorySample>,
    /// Set when the run ended early on a collision.
    pub collision: Option<Collision>,
    pub intermittency: Option<IntermitterStats>,
    pub feeding_events: u64,
    pub ingested: f64,
    pub bend_errors: u64,
}

impl Trajectory {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Runs one agent for `ticks` ticks with the RNG seeded from `seed`.
pub fn simulate_agent<H: Habitat + ?Sized>(
    config: &AgentConfig,
    start: Placement,
    habitat: &H,
    ticks: usize,
    seed: u64,
    metrics: &Metrics,
) -> Trajectory {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut agent = Agent::new(config, start, &mut rng);
    agent.warm_up(config.warmup_ticks, &mut rng);

    let mut samples = Vec::with_capacity(ticks);
    let mut collision = None;
    for _ in 0..ticks {
        let started = Instant::now();
        match agent.step(habitat, &mut rng) {
            Ok(sample) => {
                samples.push(sample);
                metrics.record_tick(
                    started.elapsed(),
                    agent.brain.unavailable,
                    agent.brain.locomotor.last_command.feeding,
                );
            }
            Err(err) => {
                metrics.record_collision();
                collision = err.collision().copied();
                break;
            }
        }
    }

    metrics.increment_counter(if collision.is_some() {
        "runs_collided"
    } else {
        "runs_completed"
    });
    tracing::info!(
        agent = %agent.id,
        ticks = samples.len(),
        collided = collision.is_some(),
        feeding_events = agent.feeding_events,
        "Agent run finished"
    );

    Trajectory {
        agent_id: agent.id,
        fingerprint: config.fingerprint(),
        samples,
        collision,
        intermittency: agent.brain.locomotor.intermitter.as_ref().map(|i| i.stats),
        feeding_events: agent.feeding_events,
        ingested: agent.ingested,
        bend_errors: agent.body.bend_errors,
    }
}

/// Runs independent agents over a shared read-only habitat.
///
/// An agent without a configured seed uses `base_seed + index`.
pub fn simulate_agents<H: Habitat + Sync + ?Sized>(
    agents: &[(AgentConfig, Placement)],
    habitat: &H,
    ticks: usize,
    base_seed: u64,
    metrics: &Metrics,
) -> Vec<Trajectory> {
    let run = |(index, (config, start)): (usize, &(AgentConfig, Placement))| {
        let seed = config
            .seed
            .unwrap_or_else(|| base_seed.wrapping_add(index as u64));
        simulate_agent(config, *start, habitat, ticks, seed, metrics)
    };

    #[cfg(feature = "parallel")]
    let trajectories: Vec<Trajectory> = agents.par_iter().enumerate().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let trajectories: Vec<Trajectory> = agents.iter().enumerate().map(run).collect();

    tracing::info!(
        agents = trajectories.len(),
        ticks = metrics.tick_count(),
        collisions = metrics.collision_count(),
        elapsed_ms = metrics.elapsed().as_millis() as u64,
        "Batch finished"
    );
    trajectories
}
