//! The effector: one actuator/gain element parameterized by a phase-factor
//! strategy instead of a class hierarchy.
//!
//! Every tick runs the same pipeline:
//!
//! 1. `update_input` – input noise and `input_range` clamp
//! 2. clock advance (oscillating effectors only, and only while active)
//! 3. `act` (output = `Act`) or `inact` (output = rest value)
//! 4. `update_output` – output noise and `output_range` clamp
//!
//! `Act = amplitude × drive × phase_factor(phase)`.

use crate::noise::{noisy_scalar, Range};
use crate::oscillator::PhaseClock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// How the phase shapes the output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseFactor {
    /// Factor 1 regardless of phase.
    #[default]
    Constant,
    /// `sin(phase)`.
    Sinusoidal,
    /// Samples spread evenly over `[0, 2π)`, linearly interpolated with wrap-around.
    Table { values: Vec<f64> },
}

impl PhaseFactor {
    #[must_use]
    pub fn at(&self, phase: f64) -> f64 {
        match self {
            PhaseFactor::Constant => 1.0,
            PhaseFactor::Sinusoidal => phase.sin(),
            PhaseFactor::Table { values } => interpolate_periodic(values, phase),
        }
    }
}

/// Linear interpolation of evenly spaced samples over one period.
#[must_use]
pub fn interpolate_periodic(values: &[f64], phase: f64) -> f64 {
    match values.len() {
        0 => 1.0,
        1 => values[0],
        n => {
            let pos = phase.rem_euclid(TAU) / TAU * n as f64;
            let i = (pos.floor() as usize).min(n - 1);
            let frac = pos - i as f64;
            let a = values[i];
            let b = values[(i + 1) % n];
            a + (b - a) * frac
        }
    }
}

/// How the (conditioned) input enters `Act`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drive {
    /// Input is ignored; the effector runs on its own amplitude.
    #[default]
    Autonomous,
    /// `drive = baseline + input`.
    Input { baseline: f64 },
}

/// Noise levels and clamping ranges of an effector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConditioning {
    /// Fractional standard deviation applied to the input.
    pub input_noise: f64,
    /// Fractional standard deviation applied to the output.
    pub output_noise: f64,
    pub input_range: Option<Range>,
    pub output_range: Option<Range>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effector {
    clock: Option<PhaseClock>,
    phase_factor: PhaseFactor,
    drive: Drive,
    amplitude: f64,
    rest_value: f64,
    active: bool,
    conditioning: SignalConditioning,
    pub input: f64,
    pub output: f64,
}

impl Effector {
    /// Effector without a clock; its phase factor is evaluated at phase 0.
    #[must_use]
    pub fn stateless(amplitude: f64) -> Self {
        Self {
            clock: None,
            phase_factor: PhaseFactor::Constant,
            drive: Drive::Autonomous,
            amplitude,
            rest_value: 0.0,
            active: true,
            conditioning: SignalConditioning::default(),
            input: 0.0,
            output: 0.0,
        }
    }

    #[must_use]
    pub fn oscillating(amplitude: f64, clock: PhaseClock) -> Self {
        let active = clock.is_active();
        Self {
            clock: Some(clock),
            active,
            ..Self::stateless(amplitude)
        }
    }

    #[must_use]
    pub fn with_phase_factor(mut self, phase_factor: PhaseFactor) -> Self {
        self.phase_factor = phase_factor;
        self
    }

    #[must_use]
    pub fn with_drive(mut self, drive: Drive) -> Self {
        self.drive = drive;
        self
    }

    #[must_use]
    pub fn with_rest_value(mut self, rest_value: f64) -> Self {
        self.rest_value = rest_value;
        self
    }

    #[must_use]
    pub fn with_conditioning(mut self, conditioning: SignalConditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.set_active(true);
    }

    pub fn stop(&mut self) {
        self.set_active(false);
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if let Some(clock) = self.clock.as_mut() {
            clock.set_active(active);
        }
    }

    #[must_use]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    #[must_use]
    pub fn rest_value(&self) -> f64 {
        self.rest_value
    }

    #[must_use]
    pub fn clock(&self) -> Option<&PhaseClock> {
        self.clock.as_ref()
    }

    pub fn clock_mut(&mut self) -> Option<&mut PhaseClock> {
        self.clock.as_mut()
    }

    /// Current phase, 0 for stateless effectors.
    #[must_use]
    pub fn phase(&self) -> f64 {
        self.clock.as_ref().map_or(0.0, PhaseClock::phase)
    }

    /// Whether the clock wrapped on the last tick.
    #[must_use]
    pub fn complete_iteration(&self) -> bool {
        self.clock.as_ref().is_some_and(|c| c.complete_iteration)
    }

    #[must_use]
    pub fn act_value(&self) -> f64 {
        let drive = match self.drive {
            Drive::Autonomous => 1.0,
            Drive::Input { baseline } => baseline + self.input,
        };
        self.amplitude * drive * self.phase_factor.at(self.phase())
    }

    pub fn update_input<R: Rng + ?Sized>(&mut self, input: f64, rng: &mut R) -> f64 {
        noisy_scalar(
            input,
            self.conditioning.input_noise,
            self.conditioning.input_range,
            rng,
        )
    }

    pub fn update_output<R: Rng + ?Sized>(&mut self, output: f64, rng: &mut R) -> f64 {
        noisy_scalar(
            output,
            self.conditioning.output_noise,
            self.conditioning.output_range,
            rng,
        )
    }

    /// Runs one tick of the pipeline and returns the new output.
    pub fn step<R: Rng + ?Sized>(&mut self, input: f64, rng: &mut R) -> f64 {
        self.input = self.update_input(input, rng);
        if let Some(clock) = self.clock.as_mut() {
            clock.tick();
        }
        self.output = if self.active {
            self.act_value()
        } else {
            self.rest_value
        };
        self.output = self.update_output(self.output, rng);
        self.output
    }
}
