//! Reward-gated gain memory.
//!
//! Memory is plain state passed in and out: it observes the change signal of
//! its modality, and `update_gain` returns the adjusted gain map.

use crate::config::MemoryConfig;
use crate::noise::{clamp_to, Range};
use crate::sensor::Reading;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct GainMemory {
    learning_rate: f64,
    trace_alpha: f64,
    gain_range: Range,
    /// Exponential moving average of the change signal per key.
    pub trace: Reading,
    pub updates: u64,
}

impl GainMemory {
    #[must_use]
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            trace_alpha: config.trace_alpha,
            gain_range: config.gain_range,
            trace: Reading::new(),
            updates: 0,
        }
    }

    /// Folds the latest change signal into the trace.
    pub fn observe(&mut self, dx: &Reading) {
        for (key, d) in dx {
            let t = self.trace.entry(key.clone()).or_insert(0.0);
            *t += self.trace_alpha * (d - *t);
        }
    }

    /// Moves every traced gain towards (rewarded) or away from (unrewarded)
    /// the recent stimulus change.
    #[must_use]
    pub fn update_gain(
        &mut self,
        mut gains: BTreeMap<String, f64>,
        reward: f64,
    ) -> BTreeMap<String, f64> {
        let sign = if reward > 0.0 { 1.0 } else { -1.0 };
        for (key, trace) in &self.trace {
            if let Some(gain) = gains.get_mut(key) {
                *gain = clamp_to(
                    *gain + sign * self.learning_rate * trace,
                    Some(self.gain_range),
                );
            }
        }
        self.updates += 1;
        gains
    }
}
