use serde::{Deserialize, Serialize};

/// Every delay and window the lifecycle manager uses, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTimings {
    /// Period of the eviction sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_ms: u64,
    /// Spacing of progress animation frames.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Easing window for value-driven progress updates.
    #[serde(default = "default_value_transition")]
    pub value_transition_ms: u64,
    /// Ease back to full before a restarted countdown.
    #[serde(default = "default_refill")]
    pub refill_ms: u64,
    #[serde(default = "default_switch_display")]
    pub switch_display_ms: u64,
    /// Countdown used when a time-based progress task gives no duration.
    #[serde(default = "default_progress_duration")]
    pub default_progress_duration_ms: u64,
    /// How long a fully decayed time-based task waits for fresh data.
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
    /// Eviction threshold for value-driven progress without updates.
    #[serde(default = "default_stale_timeout")]
    pub stale_timeout_ms: u64,
    /// Delay between marking a task removing and dropping it.
    #[serde(default = "default_disposal_delay")]
    pub disposal_delay_ms: u64,
}

fn default_sweep_interval() -> u64 {
    250
}
fn default_frame_interval() -> u64 {
    16
}
fn default_value_transition() -> u64 {
    400
}
fn default_refill() -> u64 {
    500
}
fn default_switch_display() -> u64 {
    500
}
fn default_progress_duration() -> u64 {
    5000
}
fn default_grace_period() -> u64 {
    1000
}
fn default_stale_timeout() -> u64 {
    1000
}
fn default_disposal_delay() -> u64 {
    500
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            sweep_interval_ms: default_sweep_interval(),
            frame_interval_ms: default_frame_interval(),
            value_transition_ms: default_value_transition(),
            refill_ms: default_refill(),
            switch_display_ms: default_switch_display(),
            default_progress_duration_ms: default_progress_duration(),
            grace_period_ms: default_grace_period(),
            stale_timeout_ms: default_stale_timeout(),
            disposal_delay_ms: default_disposal_delay(),
        }
    }
}

impl LifecycleTimings {
    /// Copy with the periodic intervals forced positive, so rescheduling
    /// always moves forward in time.
    pub fn normalized(&self) -> Self {
        Self {
            sweep_interval_ms: self.sweep_interval_ms.max(1),
            frame_interval_ms: self.frame_interval_ms.max(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let timings: LifecycleTimings = toml::from_str("grace_period_ms = 2000").unwrap();
        assert_eq!(timings.grace_period_ms, 2000);
        assert_eq!(timings.sweep_interval_ms, 250);
        assert_eq!(timings.disposal_delay_ms, 500);
    }

    #[test]
    fn normalized_rejects_zero_intervals() {
        let timings = LifecycleTimings {
            sweep_interval_ms: 0,
            frame_interval_ms: 0,
            ..LifecycleTimings::default()
        };
        let fixed = timings.normalized();
        assert_eq!(fixed.sweep_interval_ms, 1);
        assert_eq!(fixed.frame_interval_ms, 1);
    }
}
