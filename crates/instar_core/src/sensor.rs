//! Keyed-gain sensor stage shared by all modalities.
//!
//! A reading is a map from stimulus key (odor id, touch sensor, `cool`/`warm`)
//! to an intensity. Each tick the stage turns the reading into a change
//! signal `dX`, weights it by the per-key gains and leaks it into a bounded
//! scalar output:
//!
//! ```text
//! output ← output·(1 − dt·decay) + dt·Σ gain[k]·dX[k]
//! ```

use crate::config::{Perception, SensorConfig};
use crate::effector::SignalConditioning;
use crate::noise::{apply_noise, clamp_to, noisy_scalar, Signal};
use rand::Rng;
use std::collections::BTreeMap;

/// Keyed stimulus intensities.
pub type Reading = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    perception: Perception,
    decay_coef: f64,
    initial_gain: f64,
    conditioning: SignalConditioning,
    dt: f64,
    pub gains: BTreeMap<String, f64>,
    /// Last reading per key.
    pub x: Reading,
    /// Last change signal per key.
    pub dx: Reading,
    pub output: f64,
}

impl Sensor {
    #[must_use]
    pub fn new(config: &SensorConfig, dt: f64) -> Self {
        Self {
            perception: config.perception,
            decay_coef: config.decay_coef,
            initial_gain: config.initial_gain,
            conditioning: config.conditioning,
            dt,
            gains: config.gains.clone(),
            x: Reading::new(),
            dx: Reading::new(),
            output: 0.0,
        }
    }

    #[must_use]
    pub fn perception(&self) -> Perception {
        self.perception
    }

    #[must_use]
    pub fn initial_gain(&self) -> f64 {
        self.initial_gain
    }

    /// Registers `key` with `gain` unless it already has one.
    pub fn add_novel_gain(&mut self, key: &str, gain: f64) {
        self.gains.entry(key.to_owned()).or_insert(gain);
    }

    /// Change signal of `reading` against the retained previous reading.
    ///
    /// The first observation of a key yields 0 under log and linear
    /// perception.
    #[must_use]
    pub fn perceive(&self, reading: &Reading) -> Reading {
        reading
            .iter()
            .map(|(key, &cur)| {
                let d = match (self.perception, self.x.get(key)) {
                    (Perception::Null, _) => cur,
                    (_, None) => 0.0,
                    (Perception::Linear, Some(&prev)) => cur - prev,
                    (Perception::Log, Some(&prev)) => {
                        if prev == 0.0 {
                            0.0
                        } else {
                            cur / prev - 1.0
                        }
                    }
                };
                (key.clone(), d)
            })
            .collect()
    }

    /// Applies input noise per key, then clamps every key to the input range.
    pub fn condition<R: Rng + ?Sized>(&self, reading: Reading, rng: &mut R) -> Reading {
        let range = self.conditioning.input_range;
        apply_noise(
            Signal::from_values(reading),
            self.conditioning.input_noise,
            None,
            rng,
        )
        .to_values()
        .into_iter()
        .map(|(key, v)| (key, clamp_to(v, range)))
        .collect()
    }

    /// Conditions and commits `reading`, then returns the new output.
    pub fn step<R: Rng + ?Sized>(&mut self, reading: Reading, rng: &mut R) -> f64 {
        let reading = self.condition(reading, rng);
        for key in reading.keys() {
            if !self.gains.contains_key(key) {
                self.gains.insert(key.clone(), self.initial_gain);
            }
        }
        self.dx = self.perceive(&reading);
        self.x = reading;

        let drive: f64 = self
            .dx
            .iter()
            .map(|(key, d)| self.gains.get(key).copied().unwrap_or(0.0) * d)
            .sum();
        let leaked = self.output * (1.0 - self.dt * self.decay_coef) + self.dt * drive;
        self.output = noisy_scalar(
            leaked,
            self.conditioning.output_noise,
            self.conditioning.output_range,
            rng,
        );
        self.output
    }
}
