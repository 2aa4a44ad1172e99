//! Sensor fusion on top of the locomotor.
//!
//! Each tick the brain:
//!
//! 1. runs perception for every enabled modality against the [`Habitat`],
//! 2. commits the readings: memory adjusts gains, the sensor stage produces
//!    the modality value `A`,
//! 3. sums the values into `A_in` and steps the [`Locomotor`].
//!
//! Step 1 completes for all modalities before step 2 touches any state, so a
//! [`Collision`](crate::error::Collision) leaves the brain exactly as it was.

use crate::config::{AgentConfig, SensorConfig};
use crate::error::{ControlError, SenseError};
use crate::habitat::Habitat;
use crate::locomotor::Locomotor;
use crate::memory::GainMemory;
use crate::proximity::{LightSensor, ProximitySensor};
use crate::sensor::{Reading, Sensor};
use instar_data::{MotorCommand, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Sensory channels, in summation order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    Olfaction,
    Touch,
    Thermosensation,
    Windsensation,
    Proximity,
    Light,
}

/// Where a modality's reading comes from.
#[derive(Debug, Clone, PartialEq)]
enum Perceiver {
    Odor,
    Touch { sensors: usize },
    Thermal,
    Wind,
    Proximity(Vec<ProximitySensor>),
    Light(Vec<LightSensor>),
}

/// Retained state of one enabled modality.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalityRecord {
    pub sensor: Sensor,
    perceiver: Perceiver,
    pub memory: Option<GainMemory>,
    /// Contribution to `A_in` on the last tick.
    pub value: f64,
}

impl ModalityRecord {
    fn new(config: &SensorConfig, perceiver: Perceiver, dt: f64) -> Self {
        Self {
            sensor: Sensor::new(config, dt),
            perceiver,
            memory: None,
            value: 0.0,
        }
    }
}

/// Per-tick input from the body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrainInput {
    /// Head position.
    pub position: Point,
    /// Heading, radians.
    pub orientation: f64,
    pub reward: f64,
    pub on_food: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    modalities: BTreeMap<Modality, ModalityRecord>,
    pub locomotor: Locomotor,
    length: f64,
    radius: f64,
    a_in: f64,
    /// Modalities that had no data on the last tick.
    pub unavailable: usize,
}

impl Brain {
    pub fn new<R: Rng + ?Sized>(config: &AgentConfig, rng: &mut R) -> Self {
        let dt = config.dt;
        let s = &config.sensors;
        let mut modalities = BTreeMap::new();

        if let Some(c) = &s.olfactor {
            modalities.insert(Modality::Olfaction, ModalityRecord::new(c, Perceiver::Odor, dt));
        }
        if let Some(t) = &s.toucher {
            let mut record = ModalityRecord::new(
                &t.sensor,
                Perceiver::Touch {
                    sensors: t.touch_sensors,
                },
                dt,
            );
            for i in 0..t.touch_sensors {
                let gain = record.sensor.initial_gain();
                record.sensor.add_novel_gain(&touch_key(i), gain);
            }
            modalities.insert(Modality::Touch, record);
        }
        if let Some(c) = &s.thermosensor {
            modalities.insert(
                Modality::Thermosensation,
                ModalityRecord::new(c, Perceiver::Thermal, dt),
            );
        }
        if let Some(c) = &s.windsensor {
            modalities.insert(
                Modality::Windsensation,
                ModalityRecord::new(c, Perceiver::Wind, dt),
            );
        }
        if let Some(p) = &s.proximity {
            let rays = p.rays.iter().map(|m| ProximitySensor::new(m, p)).collect();
            modalities.insert(
                Modality::Proximity,
                ModalityRecord::new(&p.sensor, Perceiver::Proximity(rays), dt),
            );
        }
        if let Some(l) = &s.light {
            let rays = l.rays.iter().map(|m| LightSensor::new(m, l)).collect();
            modalities.insert(
                Modality::Light,
                ModalityRecord::new(&l.sensor, Perceiver::Light(rays), dt),
            );
        }

        if let Some(mem) = &config.memory {
            match modalities.get_mut(&mem.modality) {
                Some(record) => record.memory = Some(GainMemory::new(mem)),
                None => tracing::warn!(
                    modality = ?mem.modality,
                    "Memory configured for a disabled modality; ignoring"
                ),
            }
        }

        Self {
            modalities,
            locomotor: Locomotor::new(config, rng),
            length: config.body.length,
            radius: config.body.radius,
            a_in: 0.0,
            unavailable: 0,
        }
    }

    /// Fused input of the last tick.
    #[must_use]
    pub fn a_in(&self) -> f64 {
        self.a_in
    }

    /// Value of `modality` on the last tick; 0 when it is disabled.
    #[must_use]
    pub fn modality_value(&self, modality: Modality) -> f64 {
        self.modalities.get(&modality).map_or(0.0, |r| r.value)
    }

    #[must_use]
    pub fn modality(&self, modality: Modality) -> Option<&ModalityRecord> {
        self.modalities.get(&modality)
    }

    pub fn modalities(&self) -> impl Iterator<Item = Modality> + '_ {
        self.modalities.keys().copied()
    }

    fn perceive<H: Habitat + ?Sized, R: Rng + ?Sized>(
        &self,
        perceiver: &Perceiver,
        input: &BrainInput,
        habitat: &H,
        rng: &mut R,
    ) -> Result<Reading, SenseError> {
        let pos = input.position;
        let dir = input.orientation;
        let reading = match perceiver {
            Perceiver::Odor => habitat.odor_field(pos)?,
            Perceiver::Touch { sensors } => {
                let mut reading = Reading::new();
                for i in 0..*sensors {
                    let angle = dir + TAU * i as f64 / *sensors as f64;
                    let at = pos.offset(angle, self.radius);
                    let contact = habitat.food_contact(at, self.radius)?;
                    reading.insert(touch_key(i), if contact { 1.0 } else { 0.0 });
                }
                reading
            }
            Perceiver::Thermal => {
                let t = habitat.thermal(pos)?;
                Reading::from([("cool".to_owned(), t.cool), ("warm".to_owned(), t.warm)])
            }
            Perceiver::Wind => Reading::from([("wind".to_owned(), habitat.wind(pos)?)]),
            Perceiver::Proximity(rays) => {
                let obstacles = habitat.obstacles();
                let mut reading = Reading::new();
                for ray in rays {
                    let v = ray.get_value(pos, dir, obstacles, rng)?;
                    reading.insert(ray.name.clone(), v);
                }
                reading
            }
            Perceiver::Light(rays) => {
                let obstacles = habitat.obstacles();
                rays.iter()
                    .map(|ray| (ray.name.clone(), ray.get_value(pos, dir, obstacles, rng)))
                    .collect()
            }
        };
        Ok(reading)
    }

    /// Perceives, updates every modality and returns `A_in`.
    pub fn sense<H: Habitat + ?Sized, R: Rng + ?Sized>(
        &mut self,
        input: &BrainInput,
        habitat: &H,
        rng: &mut R,
    ) -> crate::error::Result<f64> {
        let mut readings = Vec::with_capacity(self.modalities.len());
        for (&modality, record) in &self.modalities {
            match self.perceive(&record.perceiver, input, habitat, rng) {
                Ok(reading) => readings.push((modality, Some(reading))),
                Err(SenseError::Unavailable(reason)) => {
                    tracing::trace!(?modality, %reason, "Perception unavailable");
                    readings.push((modality, None));
                }
                Err(SenseError::Collision(collision)) => {
                    tracing::warn!(
                        ?modality,
                        distance = collision.distance,
                        obstacle = collision.obstacle_index,
                        "Collision detected"
                    );
                    return Err(ControlError::Collision(collision));
                }
            }
        }

        self.unavailable = 0;
        for (modality, reading) in readings {
            let Some(record) = self.modalities.get_mut(&modality) else {
                continue;
            };
            if let Some(memory) = record.memory.as_mut() {
                let gains = std::mem::take(&mut record.sensor.gains);
                record.sensor.gains = memory.update_gain(gains, input.reward);
            }
            record.value = match reading {
                Some(reading) => {
                    let value = record.sensor.step(reading, rng);
                    if let Some(memory) = record.memory.as_mut() {
                        memory.observe(&record.sensor.dx);
                    }
                    value
                }
                None => {
                    self.unavailable += 1;
                    0.0
                }
            };
        }

        self.a_in = self.modalities.values().map(|r| r.value).sum();
        Ok(self.a_in)
    }

    /// Senses, then steps the locomotor with the fused input.
    pub fn step<H: Habitat + ?Sized, R: Rng + ?Sized>(
        &mut self,
        input: &BrainInput,
        habitat: &H,
        rng: &mut R,
    ) -> crate::error::Result<MotorCommand> {
        let a_in = self.sense(input, habitat, rng)?;
        Ok(self.locomotor.step(a_in, input.on_food, self.length, rng))
    }
}

fn touch_key(i: usize) -> String {
    format!("touch_{i}")
}
