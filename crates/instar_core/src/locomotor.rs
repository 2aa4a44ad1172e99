//! Composition of crawler, turner, feeder, intermittency and interference
//! into one motor command per tick.

use crate::config::AgentConfig;
use crate::effector::{Effector, PhaseFactor};
use crate::interference::Interference;
use crate::intermitter::Intermitter;
use crate::oscillator::{PhaseClock, StopPolicy};
use instar_data::{IntermittencyState, MotorCommand};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Locomotor {
    pub crawler: Effector,
    pub turner: Effector,
    pub feeder: Option<Effector>,
    pub intermitter: Option<Intermitter>,
    pub interference: Interference,
    feed_bouts: bool,
    pub last_command: MotorCommand,
}

impl Locomotor {
    pub fn new<R: Rng + ?Sized>(config: &AgentConfig, rng: &mut R) -> Self {
        let dt = config.dt;
        let c = &config.crawler;
        let crawler = Effector::oscillating(
            c.amplitude,
            PhaseClock::new(c.freq, dt)
                .with_phase(c.initial_phase)
                .with_stop_policy(c.stop_policy),
        )
        .with_phase_factor(c.phase_factor.clone())
        .with_conditioning(c.conditioning);

        let t = &config.turner;
        let turner = Effector::oscillating(
            t.amplitude,
            PhaseClock::new(t.freq, dt).with_phase(t.initial_phase),
        )
        .with_phase_factor(t.phase_factor.clone())
        .with_drive(t.drive())
        .with_conditioning(t.conditioning);

        let mut feeder = config.feeder.as_ref().map(|f| {
            Effector::oscillating(
                1.0,
                PhaseClock::new(f.freq, dt).with_stop_policy(StopPolicy::Reset),
            )
            .with_phase_factor(PhaseFactor::Sinusoidal)
        });
        if let Some(feeder) = feeder.as_mut() {
            feeder.stop();
        }

        let intermitter = config
            .intermitter
            .as_ref()
            .map(|i| Intermitter::new(i, dt, rng));
        let feed_bouts = intermitter.as_ref().map_or(true, Intermitter::feed_bouts);

        let mut locomotor = Self {
            crawler,
            turner,
            feeder,
            intermitter,
            interference: Interference::new(&config.interference),
            feed_bouts,
            last_command: MotorCommand::default(),
        };
        let initial = locomotor
            .intermitter
            .as_ref()
            .map_or(IntermittencyState::Bout, Intermitter::state);
        locomotor.apply_state(initial);
        locomotor
    }

    /// Current intermittency state; always BOUT without an intermitter.
    #[must_use]
    pub fn state(&self) -> IntermittencyState {
        self.intermitter
            .as_ref()
            .map_or(IntermittencyState::Bout, Intermitter::state)
    }

    /// Pins the intermittency state for the rest of the run.
    pub fn hold(&mut self, state: IntermittencyState) {
        if let Some(intermitter) = self.intermitter.as_mut() {
            intermitter.hold(state);
        }
        self.apply_state(state);
    }

    fn apply_state(&mut self, state: IntermittencyState) {
        let bout = state.is_bout();
        self.crawler.set_active(bout);
        if let Some(feeder) = self.feeder.as_mut() {
            feeder.set_active(bout && self.feed_bouts);
        }
    }

    /// Attenuation applied to the turner on the last tick.
    #[must_use]
    pub fn attenuation(&self) -> f64 {
        self.interference.cur_attenuation
    }

    /// One controller tick. `length` converts the crawler's scaled output into
    /// linear velocity.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        a_in: f64,
        on_food: bool,
        length: f64,
        rng: &mut R,
    ) -> MotorCommand {
        if let Some(intermitter) = self.intermitter.as_mut() {
            if let Some(state) = intermitter.step(rng) {
                self.apply_state(state);
            }
        }

        let linear_velocity = self.crawler.step(0.0, rng) * length;

        let mut feeding = false;
        if on_food {
            if let Some(feeder) = self.feeder.as_mut() {
                feeder.step(0.0, rng);
                feeding = feeder.is_active() && feeder.complete_iteration();
            }
        }

        let turn = self.turner.step(a_in, rng);
        let crawl_phase = self.crawler.is_active().then(|| self.crawler.phase());
        let feed_phase = self
            .feeder
            .as_ref()
            .filter(|f| on_food && f.is_active())
            .map(Effector::phase);
        let attenuation = self.interference.step(crawl_phase, feed_phase);

        self.last_command = MotorCommand {
            linear_velocity,
            angular_velocity: turn * attenuation,
            feeding,
        };
        self.last_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DurationDistribution, IntermitterConfig, IntermitterMode};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn always_bout() -> AgentConfig {
        AgentConfig {
            intermitter: Some(IntermitterConfig {
                mode: IntermitterMode::Alternating,
                bout: DurationDistribution::Fixed { duration: 1000.0 },
                pause: DurationDistribution::Fixed { duration: 1.0 },
                feed_bouts: true,
                initial_state: Some(IntermittencyState::Bout),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_pause_with_no_drive_is_still() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut loco = Locomotor::new(&AgentConfig::default(), &mut rng);
        loco.hold(IntermittencyState::Pause);
        for _ in 0..2000 {
            let cmd = loco.step(0.0, false, 0.004, &mut rng);
            assert_eq!(cmd.linear_velocity, 0.0);
            assert_eq!(cmd.angular_velocity, 0.0);
            assert!(!cmd.feeding);
        }
    }

    #[test]
    fn test_bout_crawls_forward() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut loco = Locomotor::new(&always_bout(), &mut rng);
        let total: f64 = (0..100)
            .map(|_| loco.step(0.0, false, 1.0, &mut rng).linear_velocity)
            .sum();
        assert!(total > 0.0);
        // Mean of the default waveform equals the amplitude.
        assert!((total / 100.0 - 0.33).abs() < 0.05);
    }

    #[test]
    fn test_length_scales_linear_velocity() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(5);
        let mut rng_b = ChaCha8Rng::seed_from_u64(5);
        let mut a = Locomotor::new(&always_bout(), &mut rng_a);
        let mut b = Locomotor::new(&always_bout(), &mut rng_b);
        for _ in 0..20 {
            let va = a.step(0.0, false, 1.0, &mut rng_a).linear_velocity;
            let vb = b.step(0.0, false, 2.0, &mut rng_b).linear_velocity;
            assert!((vb - 2.0 * va).abs() < 1e-12);
        }
    }

    #[test]
    fn test_turning_attenuated_by_stride() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut loco = Locomotor::new(&always_bout(), &mut rng);
        for _ in 0..200 {
            let cmd = loco.step(0.5, false, 1.0, &mut rng);
            let raw = loco.turner.output;
            assert!((cmd.angular_velocity - raw * loco.attenuation()).abs() < 1e-12);
            assert!(cmd.angular_velocity.abs() <= raw.abs() + 1e-12);
        }
    }

    #[test]
    fn test_feeding_only_on_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut loco = Locomotor::new(&always_bout(), &mut rng);
        let off_food = (0..100)
            .filter(|_| loco.step(0.0, false, 1.0, &mut rng).feeding)
            .count();
        assert_eq!(off_food, 0);
        let on_food = (0..100)
            .filter(|_| loco.step(0.0, true, 1.0, &mut rng).feeding)
            .count();
        // 2 Hz feeder over 10 s.
        assert!((19..=21).contains(&on_food), "{on_food}");
    }

    #[test]
    fn test_no_intermitter_keeps_crawling() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let config = AgentConfig {
            intermitter: None,
            ..Default::default()
        };
        let mut loco = Locomotor::new(&config, &mut rng);
        assert_eq!(loco.state(), IntermittencyState::Bout);
        assert!(loco.crawler.is_active());
    }
}
