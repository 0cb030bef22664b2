mod easing;
mod queue;
mod timings;

pub use easing::{ease_out_cubic, fast_out_slow_in, lerp, overshoot, Curve, Tween};
pub use queue::{TimerHandle, TimerId, TimerQueue};
pub use timings::LifecycleTimings;
