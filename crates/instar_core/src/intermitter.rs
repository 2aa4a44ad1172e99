//! Bout/pause intermittency controlling when crawling and feeding run.

use crate::config::{DurationDistribution, IntermitterConfig, IntermitterMode};
use instar_data::IntermittencyState;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Draws a duration in seconds.
pub fn sample_duration<R: Rng + ?Sized>(dist: &DurationDistribution, rng: &mut R) -> f64 {
    match dist {
        DurationDistribution::Exponential { mean } => {
            let u: f64 = rng.gen();
            -mean * (1.0 - u).ln()
        }
        DurationDistribution::Fixed { duration } => *duration,
        DurationDistribution::PowerLaw { alpha, min, max } => {
            let u: f64 = rng.gen();
            let a = 1.0 - alpha;
            if a.abs() < 1e-12 {
                min * (max / min).powf(u)
            } else {
                (min.powf(a) + u * (max.powf(a) - min.powf(a))).powf(1.0 / a)
            }
        }
        DurationDistribution::Empirical { durations, weights } => match WeightedIndex::new(weights) {
            Ok(index) => durations[index.sample(rng)],
            Err(_) => dist.mean(),
        },
    }
}

/// Running totals of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntermitterStats {
    pub bouts: u64,
    pub pauses: u64,
    /// Cycles ended by a branch decision.
    pub cycles: u64,
    pub bout_ticks: u64,
    pub pause_ticks: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intermitter {
    mode: IntermitterMode,
    bout: DurationDistribution,
    pause: DurationDistribution,
    feed_bouts: bool,
    dt: f64,
    state: IntermittencyState,
    remaining: u64,
    held: bool,
    pub stats: IntermitterStats,
}

impl Intermitter {
    /// Builds the controller and draws its initial state and duration.
    ///
    /// Without a configured initial state, BOUT is chosen with probability
    /// equal to its expected share of time.
    pub fn new<R: Rng + ?Sized>(config: &IntermitterConfig, dt: f64, rng: &mut R) -> Self {
        let state = config.initial_state.unwrap_or_else(|| {
            let bout = config.bout.mean();
            let total = bout + config.pause.mean();
            let p = if total > 0.0 { bout / total } else { 0.5 };
            if rng.gen_bool(p.clamp(0.0, 1.0)) {
                IntermittencyState::Bout
            } else {
                IntermittencyState::Pause
            }
        });
        let mut intermitter = Self {
            mode: config.mode,
            bout: config.bout.clone(),
            pause: config.pause.clone(),
            feed_bouts: config.feed_bouts,
            dt,
            state,
            remaining: 0,
            held: false,
            stats: IntermitterStats::default(),
        };
        intermitter.enter(state, rng);
        intermitter
    }

    #[must_use]
    pub fn state(&self) -> IntermittencyState {
        self.state
    }

    #[must_use]
    pub fn remaining_ticks(&self) -> u64 {
        self.remaining
    }

    #[must_use]
    pub fn feed_bouts(&self) -> bool {
        self.feed_bouts
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Pins the machine in `state` until [`Intermitter::release`].
    pub fn hold(&mut self, state: IntermittencyState) {
        self.state = state;
        self.held = true;
    }

    /// Resumes scheduling with a fresh draw for the current state.
    pub fn release<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.held = false;
        self.remaining = self.draw_ticks(self.state, rng);
    }

    fn draw_ticks<R: Rng + ?Sized>(&self, state: IntermittencyState, rng: &mut R) -> u64 {
        let dist = match state {
            IntermittencyState::Bout => &self.bout,
            IntermittencyState::Pause => &self.pause,
        };
        let seconds = sample_duration(dist, rng);
        ((seconds / self.dt).round() as u64).max(1)
    }

    fn enter<R: Rng + ?Sized>(&mut self, state: IntermittencyState, rng: &mut R) {
        self.state = state;
        self.remaining = self.draw_ticks(state, rng);
        match state {
            IntermittencyState::Bout => self.stats.bouts += 1,
            IntermittencyState::Pause => self.stats.pauses += 1,
        }
    }

    /// Advances one tick. Returns the new state when a transition happened.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<IntermittencyState> {
        match self.state {
            IntermittencyState::Bout => self.stats.bout_ticks += 1,
            IntermittencyState::Pause => self.stats.pause_ticks += 1,
        }
        if self.held {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        let next = match (self.state, self.mode) {
            (IntermittencyState::Pause, _) => IntermittencyState::Bout,
            (IntermittencyState::Bout, IntermitterMode::Alternating) => IntermittencyState::Pause,
            (
                IntermittencyState::Bout,
                IntermitterMode::Branch {
                    continuation_probability,
                },
            ) => {
                if rng.gen_bool(continuation_probability.clamp(0.0, 1.0)) {
                    IntermittencyState::Bout
                } else {
                    self.stats.cycles += 1;
                    IntermittencyState::Pause
                }
            }
        };
        self.enter(next, rng);
        tracing::debug!(
            state = ?next,
            ticks = self.remaining,
            "Intermittency transition"
        );
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixed(bout: f64, pause: f64) -> IntermitterConfig {
        IntermitterConfig {
            mode: IntermitterMode::Alternating,
            bout: DurationDistribution::Fixed { duration: bout },
            pause: DurationDistribution::Fixed { duration: pause },
            feed_bouts: true,
            initial_state: Some(IntermittencyState::Bout),
        }
    }

    #[test]
    fn test_fixed_durations_alternate() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut int = Intermitter::new(&fixed(0.3, 0.2), 0.1, &mut rng);
        let states: Vec<IntermittencyState> = (0..10)
            .map(|_| {
                int.step(&mut rng);
                int.state()
            })
            .collect();
        use IntermittencyState::{Bout, Pause};
        assert_eq!(
            states,
            vec![Bout, Bout, Pause, Pause, Bout, Bout, Bout, Pause, Pause, Bout]
        );
    }

    #[test]
    fn test_hold_pins_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut int = Intermitter::new(&fixed(0.1, 0.1), 0.1, &mut rng);
        int.hold(IntermittencyState::Pause);
        for _ in 0..100 {
            assert_eq!(int.step(&mut rng), None);
            assert_eq!(int.state(), IntermittencyState::Pause);
        }
        assert_eq!(int.stats.pause_ticks, 100);
    }

    #[test]
    fn test_branch_certain_continuation_never_pauses() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = IntermitterConfig {
            mode: IntermitterMode::Branch {
                continuation_probability: 1.0,
            },
            ..fixed(0.2, 1.0)
        };
        let mut int = Intermitter::new(&config, 0.1, &mut rng);
        for _ in 0..500 {
            int.step(&mut rng);
            assert_eq!(int.state(), IntermittencyState::Bout);
        }
        assert_eq!(int.stats.cycles, 0);
        assert!(int.stats.bouts > 1);
    }

    #[test]
    fn test_branch_zero_continuation_ends_every_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = IntermitterConfig {
            mode: IntermitterMode::Branch {
                continuation_probability: 0.0,
            },
            ..fixed(0.1, 0.1)
        };
        let mut int = Intermitter::new(&config, 0.1, &mut rng);
        for _ in 0..20 {
            int.step(&mut rng);
        }
        assert_eq!(int.stats.cycles, 10);
    }

    #[test]
    fn test_exponential_sample_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let dist = DurationDistribution::Exponential { mean: 2.0 };
        let n = 20_000;
        let mean = (0..n).map(|_| sample_duration(&dist, &mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_power_law_samples_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let dist = DurationDistribution::PowerLaw {
            alpha: 1.5,
            min: 0.4,
            max: 20.0,
        };
        for _ in 0..5000 {
            let d = sample_duration(&dist, &mut rng);
            assert!((0.4..=20.0).contains(&d), "{d}");
        }
    }

    #[test]
    fn test_empirical_only_draws_listed_durations() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let dist = DurationDistribution::Empirical {
            durations: vec![0.5, 3.0],
            weights: vec![0.0, 1.0],
        };
        for _ in 0..100 {
            assert_eq!(sample_duration(&dist, &mut rng), 3.0);
        }
    }

    #[test]
    fn test_initial_state_is_drawn_when_unset() {
        let config = IntermitterConfig {
            initial_state: None,
            ..fixed(1.0, 1.0)
        };
        let mut seen_bout = false;
        let mut seen_pause = false;
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            match Intermitter::new(&config, 0.1, &mut rng).state() {
                IntermittencyState::Bout => seen_bout = true,
                IntermittencyState::Pause => seen_pause = true,
            }
        }
        assert!(seen_bout && seen_pause);
    }
}
