//! Crawl/turn interference: phase-dependent damping of the turner output.

use crate::config::{InterferenceConfig, InterferenceWindow};
use crate::effector::interpolate_periodic;

#[derive(Debug, Clone, PartialEq)]
pub struct Interference {
    config: InterferenceConfig,
    pub cur_attenuation: f64,
}

impl Interference {
    #[must_use]
    pub fn new(config: &InterferenceConfig) -> Self {
        Self {
            config: config.clone(),
            cur_attenuation: 1.0,
        }
    }

    /// Attenuation for a stride at `phase`.
    #[must_use]
    pub fn window_value(&self, phase: f64) -> f64 {
        let value = match &self.config.window {
            InterferenceWindow::None => 1.0,
            InterferenceWindow::Square {
                phase_on,
                phase_off,
                attenuation,
            } => {
                let inside = if phase_on <= phase_off {
                    (*phase_on..=*phase_off).contains(&phase)
                } else {
                    phase >= *phase_on || phase <= *phase_off
                };
                if inside {
                    *attenuation
                } else {
                    1.0
                }
            }
            InterferenceWindow::Cosine => {
                1.0 - self.config.depth * (1.0 + (phase - self.config.center).cos()) / 2.0
            }
            InterferenceWindow::Table { values } => interpolate_periodic(values, phase),
        };
        value.clamp(0.0, 1.0)
    }

    /// Recomputes the attenuation from the oscillator currently running.
    /// The crawler takes precedence over the feeder.
    pub fn step(&mut self, crawler: Option<f64>, feeder: Option<f64>) -> f64 {
        self.cur_attenuation = match crawler.or(feeder) {
            Some(phase) => self.window_value(phase),
            None => self.config.pause_attenuation.clamp(0.0, 1.0),
        };
        self.cur_attenuation
    }
}
