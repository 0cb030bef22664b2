//! Interpolation curves and time-sampled tweens.
//!
//! The lifecycle manager steps progress with [`ease_out_cubic`] on its frame
//! timer. The view layer samples [`Tween`]s against the clock instead, so a
//! frame can be rendered at any instant without extra bookkeeping.

use serde::{Deserialize, Serialize};

/// `1 - (1 - f)^3`, with `f` clamped to `[0, 1]`.
pub fn ease_out_cubic(fraction: f32) -> f32 {
    let f = fraction.clamp(0.0, 1.0);
    1.0 - (1.0 - f).powi(3)
}

/// Overshooting curve: passes 1.0, peaks, and settles back on 1.0 at `f = 1`.
/// Higher tension overshoots further.
pub fn overshoot(fraction: f32, tension: f32) -> f32 {
    let t = fraction.clamp(0.0, 1.0) - 1.0;
    t * t * ((tension + 1.0) * t + tension) + 1.0
}

/// Material "fast out, slow in": cubic bezier (0.4, 0.0) (0.2, 1.0).
pub fn fast_out_slow_in(fraction: f32) -> f32 {
    cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction)
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let sample = |a1: f32, a2: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * a1 * t * u * u + 3.0 * a2 * t * t * u + t * t * t
    };
    // x(t) is monotonic for these control points, so bisection converges.
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..24 {
        let mid = (lo + hi) / 2.0;
        if sample(x1, x2, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    sample(y1, y2, (lo + hi) / 2.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    Linear,
    EaseOutCubic,
    FastOutSlowIn,
    Overshoot { tension: f32 },
}

impl Curve {
    pub fn apply(self, fraction: f32) -> f32 {
        match self {
            Curve::Linear => fraction.clamp(0.0, 1.0),
            Curve::EaseOutCubic => ease_out_cubic(fraction),
            Curve::FastOutSlowIn => fast_out_slow_in(fraction),
            Curve::Overshoot { tension } => overshoot(fraction, tension),
        }
    }
}

/// A value moving from `from` to `to` over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub curve: Curve,
}

impl Tween {
    pub fn new(from: f32, to: f32, started_at_ms: u64, duration_ms: u64, curve: Curve) -> Self {
        Self {
            from,
            to,
            started_at_ms,
            duration_ms,
            curve,
        }
    }

    /// A tween that is already at rest on `value`.
    pub fn settled(value: f32) -> Self {
        Self::new(value, value, 0, 0, Curve::Linear)
    }

    pub fn fraction_at(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f32;
        (elapsed / self.duration_ms as f32).min(1.0)
    }

    pub fn value_at(&self, now_ms: u64) -> f32 {
        let fraction = self.fraction_at(now_ms);
        if fraction >= 1.0 {
            return self.to;
        }
        if fraction <= 0.0 {
            return self.from;
        }
        lerp(self.from, self.to, self.curve.apply(fraction))
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        self.fraction_at(now_ms) >= 1.0
    }

    /// Start a new tween toward `to` from wherever this one is at `now_ms`.
    pub fn retarget(&self, now_ms: u64, to: f32, duration_ms: u64, curve: Curve) -> Tween {
        Tween::new(self.value_at(now_ms), to, now_ms, duration_ms, curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn overshoot_passes_target_then_settles() {
        let peak = (1..100)
            .map(|i| overshoot(i as f32 / 100.0, 2.5))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
        assert!((overshoot(1.0, 2.5) - 1.0).abs() < 1e-6);
        assert!(overshoot(0.0, 2.5).abs() < 1e-6);
    }

    #[test]
    fn fast_out_slow_in_is_front_loaded() {
        assert!(fast_out_slow_in(0.0).abs() < 1e-3);
        assert!((fast_out_slow_in(1.0) - 1.0).abs() < 1e-3);
        assert!(fast_out_slow_in(0.5) > 0.5);
    }

    #[test]
    fn tween_snaps_exactly_to_target() {
        let tween = Tween::new(0.2, 0.9, 100, 400, Curve::EaseOutCubic);
        assert_eq!(tween.value_at(100), 0.2);
        assert_eq!(tween.value_at(500), 0.9);
        assert_eq!(tween.value_at(10_000), 0.9);
        assert!(tween.is_finished(500));
        assert!(!tween.is_finished(499));
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let tween = Tween::new(0.0, 1.0, 0, 100, Curve::Linear);
        let next = tween.retarget(50, 0.0, 100, Curve::Linear);
        assert!((next.from - 0.5).abs() < 1e-6);
        assert_eq!(next.started_at_ms, 50);
    }

    #[test]
    fn zero_duration_tween_is_settled() {
        let tween = Tween::settled(0.4);
        assert_eq!(tween.value_at(0), 0.4);
        assert!(tween.is_finished(0));
    }

    proptest! {
        #[test]
        fn ease_out_cubic_is_monotonic_and_bounded(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (ea, eb) = (ease_out_cubic(lo), ease_out_cubic(hi));
            prop_assert!(ea <= eb + 1e-6);
            prop_assert!((0.0..=1.0).contains(&ea));
            prop_assert!((0.0..=1.0).contains(&eb));
        }
    }
}
