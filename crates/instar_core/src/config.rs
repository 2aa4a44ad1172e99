//! Configuration of one simulated agent.
//!
//! This module provides strongly-typed configuration structures that map to
//! an `agent.toml` file. Every mode switch (crawler waveform, bout
//! distribution, interference window, sensor perception) is a serde-tagged
//! enum, so the tag read from the file selects the constructor once, when the
//! controller is built.
//!
//! ## Example `agent.toml`
//!
//! ```toml
//! dt = 0.1
//! seed = 42
//!
//! [crawler]
//! freq = 1.42
//! amplitude = 0.33
//!
//! [intermitter.bout]
//! kind = "exponential"
//! mean = 1.5
//!
//! [sensors.olfactor]
//! perception = "log"
//! initial_gain = 40.0
//! ```

use crate::brain::Modality;
use crate::effector::{Drive, PhaseFactor, SignalConditioning};
use crate::noise::Range;
use crate::oscillator::StopPolicy;
use instar_data::IntermittencyState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

/// Peristaltic crawler driving forward motion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CrawlerConfig {
    pub freq: f64,
    /// Mean scaled speed in body lengths per second.
    pub amplitude: f64,
    pub initial_phase: f64,
    pub phase_factor: PhaseFactor,
    pub stop_policy: StopPolicy,
    pub conditioning: SignalConditioning,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            freq: 1.42,
            amplitude: 0.33,
            initial_phase: 0.0,
            // 1 - cos(φ) sampled at π/4 steps; mean 1, zero at stride onset.
            phase_factor: PhaseFactor::Table {
                values: vec![0.0, 0.293, 1.0, 1.707, 2.0, 1.707, 1.0, 0.293],
            },
            stop_policy: StopPolicy::Reset,
            conditioning: SignalConditioning {
                output_range: Some((0.0, f64::MAX)),
                ..Default::default()
            },
        }
    }
}

/// Lateral bending oscillator driven by the fused sensory input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TurnerConfig {
    pub freq: f64,
    /// Angular velocity (rad/s) per unit of drive.
    pub amplitude: f64,
    /// Drive added to the sensory input; 0 keeps the turner silent without input.
    pub baseline: f64,
    pub initial_phase: f64,
    pub phase_factor: PhaseFactor,
    pub conditioning: SignalConditioning,
}

impl Default for TurnerConfig {
    fn default() -> Self {
        Self {
            freq: 0.58,
            amplitude: 1.0,
            baseline: 0.0,
            initial_phase: 0.0,
            phase_factor: PhaseFactor::Sinusoidal,
            conditioning: SignalConditioning {
                input_range: Some((-1.0, 1.0)),
                ..Default::default()
            },
        }
    }
}

impl TurnerConfig {
    #[must_use]
    pub fn drive(&self) -> Drive {
        Drive::Input {
            baseline: self.baseline,
        }
    }
}

/// Mouth-hook feeding oscillator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeederConfig {
    pub freq: f64,
    /// Reach of a feeding motion as a fraction of body length.
    pub feed_radius: f64,
    /// Volume of one feeding motion as a fraction of body volume.
    pub bite_volume: f64,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            freq: 2.0,
            feed_radius: 0.05,
            bite_volume: 0.001,
        }
    }
}

/// Duration distribution for bouts and pauses, in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationDistribution {
    Exponential { mean: f64 },
    Fixed { duration: f64 },
    /// Truncated power law `p(x) ∝ x^-alpha` on `[min, max]`.
    PowerLaw { alpha: f64, min: f64, max: f64 },
    Empirical { durations: Vec<f64>, weights: Vec<f64> },
}

impl DurationDistribution {
    /// Expected duration in seconds.
    #[must_use]
    pub fn mean(&self) -> f64 {
        match self {
            DurationDistribution::Exponential { mean } => *mean,
            DurationDistribution::Fixed { duration } => *duration,
            DurationDistribution::PowerLaw { alpha, min, max } => {
                power_law_mean(*alpha, *min, *max)
            }
            DurationDistribution::Empirical { durations, weights } => {
                let total: f64 = weights.iter().sum();
                if total <= 0.0 {
                    return 0.0;
                }
                durations
                    .iter()
                    .zip(weights)
                    .map(|(d, w)| d * w)
                    .sum::<f64>()
                    / total
            }
        }
    }

    fn validate(&self, label: &str) -> anyhow::Result<()> {
        match self {
            DurationDistribution::Exponential { mean } => {
                anyhow::ensure!(*mean > 0.0, "{label}: exponential mean must be positive");
            }
            DurationDistribution::Fixed { duration } => {
                anyhow::ensure!(*duration > 0.0, "{label}: fixed duration must be positive");
            }
            DurationDistribution::PowerLaw { alpha, min, max } => {
                anyhow::ensure!(*alpha > 0.0, "{label}: power-law alpha must be positive");
                anyhow::ensure!(
                    *min > 0.0 && min < max,
                    "{label}: power-law range must satisfy 0 < min < max"
                );
            }
            DurationDistribution::Empirical { durations, weights } => {
                anyhow::ensure!(
                    !durations.is_empty() && durations.len() == weights.len(),
                    "{label}: empirical durations and weights must be non-empty and aligned"
                );
                anyhow::ensure!(
                    weights.iter().all(|w| *w >= 0.0) && weights.iter().sum::<f64>() > 0.0,
                    "{label}: empirical weights must be non-negative with a positive sum"
                );
                anyhow::ensure!(
                    durations.iter().all(|d| *d > 0.0),
                    "{label}: empirical durations must be positive"
                );
            }
        }
        Ok(())
    }
}

fn power_law_mean(alpha: f64, min: f64, max: f64) -> f64 {
    let a = 1.0 - alpha;
    let b = 2.0 - alpha;
    let norm = if a.abs() < 1e-12 {
        (max / min).ln()
    } else {
        (max.powf(a) - min.powf(a)) / a
    };
    let first = if b.abs() < 1e-12 {
        (max / min).ln()
    } else {
        (max.powf(b) - min.powf(b)) / b
    };
    first / norm
}

/// Behaviour at the end of a bout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntermitterMode {
    /// Every bout is followed by a pause.
    #[default]
    Alternating,
    /// Each bout end flips a coin: continue with another bout or end the cycle.
    Branch { continuation_probability: f64 },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IntermitterConfig {
    pub mode: IntermitterMode,
    pub bout: DurationDistribution,
    pub pause: DurationDistribution,
    /// Activate the feeder together with the crawler during bouts.
    pub feed_bouts: bool,
    /// Fixed initial state; drawn at construction when absent.
    pub initial_state: Option<IntermittencyState>,
}

impl Default for IntermitterConfig {
    fn default() -> Self {
        Self {
            mode: IntermitterMode::Alternating,
            bout: DurationDistribution::Exponential { mean: 1.5 },
            pause: DurationDistribution::PowerLaw {
                alpha: 1.44,
                min: 0.4,
                max: 20.0,
            },
            feed_bouts: true,
            initial_state: None,
        }
    }
}

/// Phase window over which turning is attenuated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterferenceWindow {
    /// No coupling between crawling and turning.
    None,
    /// `attenuation` inside `[phase_on, phase_off]`, 1 outside.
    Square {
        phase_on: f64,
        phase_off: f64,
        attenuation: f64,
    },
    /// `1 - depth·(1 + cos(φ - center))/2`.
    #[default]
    Cosine,
    /// Explicit attenuation samples over one stride.
    Table { values: Vec<f64> },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InterferenceConfig {
    pub window: InterferenceWindow,
    /// Phase of strongest attenuation for the cosine window.
    pub center: f64,
    /// Depth of the cosine dip, in `[0, 1]`.
    pub depth: f64,
    /// Attenuation while neither crawler nor feeder is active.
    pub pause_attenuation: f64,
}

impl Default for InterferenceConfig {
    fn default() -> Self {
        Self {
            window: InterferenceWindow::Cosine,
            center: PI,
            depth: 0.8,
            pause_attenuation: 1.0,
        }
    }
}

/// How a sensor turns successive readings into a change signal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Perception {
    /// Relative change `cur/prev - 1`.
    #[default]
    Log,
    /// Absolute change `cur - prev`.
    Linear,
    /// Raw reading.
    Null,
}

/// Gain stage shared by all sensory modalities.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    pub perception: Perception,
    pub decay_coef: f64,
    /// Gain given to stimulus keys seen for the first time.
    pub initial_gain: f64,
    /// Explicit per-key gains.
    pub gains: BTreeMap<String, f64>,
    pub conditioning: SignalConditioning,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            perception: Perception::Log,
            decay_coef: 0.1,
            initial_gain: 1.0,
            gains: BTreeMap::new(),
            conditioning: SignalConditioning {
                output_range: Some((-1.0, 1.0)),
                ..Default::default()
            },
        }
    }
}

impl SensorConfig {
    #[must_use]
    pub fn with_perception(perception: Perception) -> Self {
        Self {
            perception,
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TouchConfig {
    pub sensor: SensorConfig,
    /// Number of contact sensors spread around the head.
    pub touch_sensors: usize,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::with_perception(Perception::Linear),
            touch_sensors: 8,
        }
    }
}

/// One ray sensor mounted on the head.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RayMount {
    pub name: String,
    /// Angle subtracted from the heading, radians.
    pub offset: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProximityConfig {
    pub sensor: SensorConfig,
    pub rays: Vec<RayMount>,
    pub max_distance: f64,
    pub collision_distance: f64,
    pub saturation_value: f64,
    /// Fractional standard deviation of the distance measurement.
    pub error: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig {
                initial_gain: -1.0,
                ..SensorConfig::with_perception(Perception::Null)
            },
            rays: vec![
                RayMount {
                    name: "left".into(),
                    offset: -PI / 6.0,
                },
                RayMount {
                    name: "right".into(),
                    offset: PI / 6.0,
                },
            ],
            max_distance: 0.02,
            collision_distance: 0.001,
            saturation_value: 1000.0,
            error: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub sensor: SensorConfig,
    pub rays: Vec<RayMount>,
    pub saturation_value: f64,
    pub error: f64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::with_perception(Perception::Null),
            rays: vec![RayMount {
                name: "front".into(),
                offset: 0.0,
            }],
            saturation_value: 200.0,
            error: 0.0,
        }
    }
}

/// Enabled sensory modalities; `None` disables a modality.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SensorsConfig {
    pub olfactor: Option<SensorConfig>,
    pub toucher: Option<TouchConfig>,
    pub thermosensor: Option<SensorConfig>,
    pub windsensor: Option<SensorConfig>,
    pub proximity: Option<ProximityConfig>,
    pub light: Option<LightConfig>,
}

/// Reward-gated gain adaptation for one modality.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    pub modality: Modality,
    pub learning_rate: f64,
    /// Smoothing factor of the input trace, in `(0, 1]`.
    pub trace_alpha: f64,
    pub gain_range: Range,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            modality: Modality::Olfaction,
            learning_rate: 0.05,
            trace_alpha: 0.1,
            gain_range: (-100.0, 100.0),
        }
    }
}

/// Body geometry and the kinematic coefficients used by the simulation driver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Body length in metres.
    pub length: f64,
    /// Body radius in metres; touch sensors sit on this circle around the head.
    pub radius: f64,
    pub lin_vel_coef: f64,
    pub ang_damping: f64,
    pub body_spring_k: f64,
    pub torque_coef: f64,
    pub bend_correction_coef: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            length: 0.004,
            radius: 0.0004,
            lin_vel_coef: 1.0,
            ang_damping: 1.0,
            body_spring_k: 1.0,
            torque_coef: 0.5,
            bend_correction_coef: 1.4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Tick duration in seconds.
    pub dt: f64,
    pub seed: Option<u64>,
    /// Upper bound of the random warm-up performed before recording.
    pub warmup_ticks: u32,
    pub crawler: CrawlerConfig,
    pub turner: TurnerConfig,
    pub feeder: Option<FeederConfig>,
    pub intermitter: Option<IntermitterConfig>,
    pub interference: InterferenceConfig,
    pub sensors: SensorsConfig,
    pub memory: Option<MemoryConfig>,
    pub body: BodyConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            seed: None,
            warmup_ticks: 100,
            crawler: CrawlerConfig::default(),
            turner: TurnerConfig::default(),
            feeder: Some(FeederConfig::default()),
            intermitter: Some(IntermitterConfig::default()),
            interference: InterferenceConfig::default(),
            sensors: SensorsConfig::default(),
            memory: None,
            body: BodyConfig::default(),
        }
    }
}

fn ensure_range(range: Option<Range>, label: &str) -> anyhow::Result<()> {
    if let Some((low, high)) = range {
        anyhow::ensure!(low <= high, "{label}: range lower bound exceeds upper bound");
    }
    Ok(())
}

fn ensure_conditioning(c: &SignalConditioning, label: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        c.input_noise >= 0.0 && c.output_noise >= 0.0,
        "{label}: noise levels must be non-negative"
    );
    ensure_range(c.input_range, label)?;
    ensure_range(c.output_range, label)
}

fn ensure_sensor(s: &SensorConfig, label: &str) -> anyhow::Result<()> {
    anyhow::ensure!(s.decay_coef >= 0.0, "{label}: decay coefficient must be non-negative");
    ensure_conditioning(&s.conditioning, label)
}

impl AgentConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.dt > 0.0, "Tick duration must be positive");

        anyhow::ensure!(self.crawler.freq >= 0.0, "Crawler frequency must be non-negative");
        anyhow::ensure!(
            self.crawler.amplitude >= 0.0,
            "Crawler amplitude must be non-negative"
        );
        ensure_conditioning(&self.crawler.conditioning, "crawler")?;

        anyhow::ensure!(self.turner.freq >= 0.0, "Turner frequency must be non-negative");
        ensure_conditioning(&self.turner.conditioning, "turner")?;

        if let Some(feeder) = &self.feeder {
            anyhow::ensure!(feeder.freq >= 0.0, "Feeder frequency must be non-negative");
            anyhow::ensure!(
                (0.0..=1.0).contains(&feeder.feed_radius),
                "Feed radius must be in [0.0, 1.0]"
            );
        }

        if let Some(int) = &self.intermitter {
            int.bout.validate("bout")?;
            int.pause.validate("pause")?;
            if let IntermitterMode::Branch {
                continuation_probability,
            } = int.mode
            {
                anyhow::ensure!(
                    (0.0..=1.0).contains(&continuation_probability),
                    "Continuation probability must be in [0.0, 1.0]"
                );
            }
        }

        let inf = &self.interference;
        anyhow::ensure!(
            (0.0..=1.0).contains(&inf.depth),
            "Interference depth must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&inf.pause_attenuation),
            "Pause attenuation must be in [0.0, 1.0]"
        );
        match &inf.window {
            InterferenceWindow::Square {
                phase_on,
                phase_off,
                attenuation,
            } => {
                anyhow::ensure!(
                    (0.0..=TAU).contains(phase_on) && (0.0..=TAU).contains(phase_off),
                    "Square window phases must be in [0, 2π]"
                );
                anyhow::ensure!(
                    (0.0..=1.0).contains(attenuation),
                    "Square window attenuation must be in [0.0, 1.0]"
                );
            }
            InterferenceWindow::Table { values } => {
                anyhow::ensure!(!values.is_empty(), "Interference table must not be empty");
            }
            InterferenceWindow::None | InterferenceWindow::Cosine => {}
        }

        let sensors = &self.sensors;
        if let Some(s) = &sensors.olfactor {
            ensure_sensor(s, "olfactor")?;
        }
        if let Some(t) = &sensors.toucher {
            ensure_sensor(&t.sensor, "toucher")?;
            anyhow::ensure!(t.touch_sensors > 0, "Toucher needs at least one sensor");
        }
        if let Some(s) = &sensors.thermosensor {
            ensure_sensor(s, "thermosensor")?;
        }
        if let Some(s) = &sensors.windsensor {
            ensure_sensor(s, "windsensor")?;
        }
        if let Some(p) = &sensors.proximity {
            ensure_sensor(&p.sensor, "proximity")?;
            anyhow::ensure!(p.max_distance > 0.0, "Proximity max distance must be positive");
            anyhow::ensure!(
                p.collision_distance >= 0.0 && p.collision_distance < p.max_distance,
                "Collision distance must be in [0, max_distance)"
            );
            anyhow::ensure!(p.saturation_value > 0.0, "Saturation value must be positive");
            anyhow::ensure!(p.error >= 0.0, "Proximity error must be non-negative");
        }
        if let Some(l) = &sensors.light {
            ensure_sensor(&l.sensor, "light")?;
            anyhow::ensure!(l.saturation_value > 0.0, "Saturation value must be positive");
            anyhow::ensure!(l.error >= 0.0, "Light error must be non-negative");
        }

        if let Some(mem) = &self.memory {
            anyhow::ensure!(
                mem.learning_rate >= 0.0,
                "Memory learning rate must be non-negative"
            );
            anyhow::ensure!(
                mem.trace_alpha > 0.0 && mem.trace_alpha <= 1.0,
                "Memory trace alpha must be in (0.0, 1.0]"
            );
            ensure_range(Some(mem.gain_range), "memory gain")?;
        }

        anyhow::ensure!(self.body.length > 0.0, "Body length must be positive");
        anyhow::ensure!(self.body.radius >= 0.0, "Body radius must be non-negative");
        anyhow::ensure!(
            self.body.ang_damping >= 0.0 && self.body.body_spring_k >= 0.0,
            "Body damping and stiffness must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable digest of the behavioural parameters (seed and warm-up excluded).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.dt).as_bytes());
        hasher.update(format!("{:?}", self.crawler).as_bytes());
        hasher.update(format!("{:?}", self.turner).as_bytes());
        hasher.update(format!("{:?}", self.feeder).as_bytes());
        hasher.update(format!("{:?}", self.intermitter).as_bytes());
        hasher.update(format!("{:?}", self.interference).as_bytes());
        hasher.update(format!("{:?}", self.sensors).as_bytes());
        hasher.update(format!("{:?}", self.memory).as_bytes());
        hasher.update(format!("{:?}", self.body).as_bytes());
        hex::encode(hasher.finalize())
    }
}
