//! Multiplicative Gaussian noise and range clamping for effector signals.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed interval `(low, high)`.
pub type Range = (f64, f64);

/// A value flowing through an effector: a scalar, a keyed mapping of
/// sub-signals (per-odor or per-sensor readings), or a non-numeric flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    Scalar(f64),
    Map(BTreeMap<String, Signal>),
    Flag(bool),
}

impl Signal {
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Signal::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric leaves of a flat map, in key order. Flags count as 0 or 1.
    #[must_use]
    pub fn to_values(&self) -> BTreeMap<String, f64> {
        match self {
            Signal::Map(map) => map
                .iter()
                .filter_map(|(k, v)| match v {
                    Signal::Scalar(x) => Some((k.clone(), *x)),
                    Signal::Flag(b) => Some((k.clone(), if *b { 1.0 } else { 0.0 })),
                    Signal::Map(_) => None,
                })
                .collect(),
            Signal::Scalar(x) => BTreeMap::from([(String::new(), *x)]),
            Signal::Flag(_) => BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Signal::Map(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), Signal::Scalar(v)))
                .collect(),
        )
    }
}

/// Standard normal sample (Box-Muller).
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// `N(mean, std_dev)` sample. A zero deviation returns `mean` without
/// consuming randomness.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        mean
    } else {
        mean + std_dev * gaussian(rng)
    }
}

#[inline]
#[must_use]
pub fn clamp_to(value: f64, range: Option<Range>) -> f64 {
    match range {
        Some((low, high)) => value.max(low).min(high),
        None => value,
    }
}

/// Scales `value` by `1 + N(0, noise)` and clamps it to `range`.
///
/// Maps are processed key by key with the same noise and no range; flags
/// pass through unchanged.
pub fn apply_noise<R: Rng + ?Sized>(
    value: Signal,
    noise: f64,
    range: Option<Range>,
    rng: &mut R,
) -> Signal {
    match value {
        Signal::Scalar(v) => Signal::Scalar(noisy_scalar(v, noise, range, rng)),
        Signal::Map(map) => Signal::Map(
            map.into_iter()
                .map(|(k, v)| (k, apply_noise(v, noise, None, rng)))
                .collect(),
        ),
        flag @ Signal::Flag(_) => flag,
    }
}

/// Scalar fast path of [`apply_noise`].
pub fn noisy_scalar<R: Rng + ?Sized>(
    value: f64,
    noise: f64,
    range: Option<Range>,
    rng: &mut R,
) -> f64 {
    clamp_to(value * normal(rng, 1.0, noise), range)
}
