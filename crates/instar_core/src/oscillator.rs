//! Phase clock shared by every oscillating effector.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// What happens to the phase when the clock is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopPolicy {
    /// Phase is held and resumes from the same value.
    #[default]
    Freeze,
    /// Phase returns to its initial value.
    Reset,
}

/// Periodic timer producing a phase in `[0, 2π)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseClock {
    phase: f64,
    initial_phase: f64,
    freq: f64,
    initial_freq: f64,
    dt: f64,
    active: bool,
    stop_policy: StopPolicy,
    /// Set on the tick the phase wrapped past 2π.
    pub complete_iteration: bool,
    pub iterations: u64,
    /// Ticks spent active since construction.
    pub active_ticks: u64,
}

impl PhaseClock {
    #[must_use]
    pub fn new(freq: f64, dt: f64) -> Self {
        let freq = freq.max(0.0);
        Self {
            phase: 0.0,
            initial_phase: 0.0,
            freq,
            initial_freq: freq,
            dt,
            active: true,
            stop_policy: StopPolicy::Freeze,
            complete_iteration: false,
            iterations: 0,
            active_ticks: 0,
        }
    }

    #[must_use]
    pub fn with_phase(mut self, phase: f64) -> Self {
        let phase = phase.rem_euclid(TAU);
        self.phase = phase;
        self.initial_phase = phase;
        self
    }

    #[must_use]
    pub fn with_stop_policy(mut self, policy: StopPolicy) -> Self {
        self.stop_policy = policy;
        self
    }

    #[must_use]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[must_use]
    pub fn freq(&self) -> f64 {
        self.freq
    }

    #[must_use]
    pub fn initial_freq(&self) -> f64 {
        self.initial_freq
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.complete_iteration = false;
        if self.stop_policy == StopPolicy::Reset {
            self.phase = self.initial_phase;
        }
    }

    pub fn set_active(&mut self, active: bool) {
        if active {
            self.start();
        } else if self.active {
            self.stop();
        }
    }

    /// Negative frequencies are treated as zero; zero holds the phase.
    pub fn set_freq(&mut self, freq: f64) {
        self.freq = freq.max(0.0);
    }

    /// Advances the phase by one tick if active.
    pub fn tick(&mut self) {
        self.complete_iteration = false;
        if !self.active {
            return;
        }
        self.active_ticks += 1;
        let next = self.phase + TAU * self.freq * self.dt;
        if next >= TAU {
            self.iterations += (next / TAU).floor() as u64;
            self.complete_iteration = true;
        }
        self.phase = next.rem_euclid(TAU);
    }

    /// Whether the phase lies in `[low, high]`; a wrapped window (`low > high`)
    /// covers the phases across zero.
    #[must_use]
    pub fn phi_in_range(&self, (low, high): (f64, f64)) -> bool {
        if low <= high {
            (low..=high).contains(&self.phase)
        } else {
            self.phase >= low || self.phase <= high
        }
    }
}
