//! Capsule shape animation and the collapsed/expanded cross-fade.

use serde::Serialize;

use crate::timer::{lerp, Curve, Tween};

pub const MORPH_DURATION_MS: u64 = 350;
pub const MORPH_TENSION: f32 = 0.8;
/// Resizes smaller than this (in pixels) are not animated.
pub const MORPH_EPSILON_PX: f32 = 1.0;

pub const FADE_OUT_MS: u64 = 100;
pub const FADE_IN_MS: u64 = 200;
pub const FADE_MIN_SCALE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapsuleShape {
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
}

impl CapsuleShape {
    /// Pill shape: corners fully rounded.
    pub fn pill(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            corner_radius: height / 2.0,
        }
    }

    fn lerp(from: CapsuleShape, to: CapsuleShape, t: f32) -> Self {
        Self {
            width: lerp(from.width, to.width, t),
            height: lerp(from.height, to.height, t),
            corner_radius: lerp(from.corner_radius, to.corner_radius, t),
        }
    }

    fn close_to(&self, other: &CapsuleShape) -> bool {
        (self.width - other.width).abs() <= MORPH_EPSILON_PX
            && (self.height - other.height).abs() <= MORPH_EPSILON_PX
    }
}

/// Overshooting move between two shapes.
#[derive(Debug, Clone)]
pub struct CapsuleMorph {
    from: CapsuleShape,
    to: CapsuleShape,
    progress: Tween,
    resizes: u64,
}

impl CapsuleMorph {
    pub fn new(initial: CapsuleShape) -> Self {
        Self {
            from: initial,
            to: initial,
            progress: Tween::settled(1.0),
            resizes: 0,
        }
    }

    /// Shape at `now_ms`. Overshoot carries it briefly past the target.
    pub fn shape_at(&self, now_ms: u64) -> CapsuleShape {
        CapsuleShape::lerp(self.from, self.to, self.progress.value_at(now_ms))
    }

    pub fn target(&self) -> CapsuleShape {
        self.to
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        !self.progress.is_finished(now_ms)
    }

    /// Number of animated resizes started so far.
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Animate toward `target` from the current shape.
    ///
    /// Returns false (and leaves the morph alone) when the target is within
    /// a pixel of the current shape, unless `force` is set.
    pub fn retarget(&mut self, target: CapsuleShape, now_ms: u64, force: bool) -> bool {
        let current = self.shape_at(now_ms);
        if !force && current.close_to(&target) {
            return false;
        }
        self.from = current;
        self.to = target;
        self.progress = Tween::new(
            0.0,
            1.0,
            now_ms,
            MORPH_DURATION_MS,
            Curve::Overshoot {
                tension: MORPH_TENSION,
            },
        );
        self.resizes += 1;
        true
    }
}

/// Opacity and scale of both content layers at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeState {
    pub collapsed_alpha: f32,
    pub collapsed_scale: f32,
    pub expanded_alpha: f32,
    pub expanded_scale: f32,
}

#[derive(Debug, Clone)]
pub struct ContentFade {
    collapsed_alpha: Tween,
    collapsed_scale: Tween,
    expanded_alpha: Tween,
    expanded_scale: Tween,
}

impl ContentFade {
    pub fn new(expanded: bool) -> Self {
        let (shown, hidden) = (1.0, 0.0);
        let (collapsed, expanded_alpha) = if expanded {
            (hidden, shown)
        } else {
            (shown, hidden)
        };
        Self {
            collapsed_alpha: Tween::settled(collapsed),
            collapsed_scale: Tween::settled(if expanded { FADE_MIN_SCALE } else { 1.0 }),
            expanded_alpha: Tween::settled(expanded_alpha),
            expanded_scale: Tween::settled(if expanded { 1.0 } else { FADE_MIN_SCALE }),
        }
    }

    /// Fade the outgoing layer out and the incoming layer in.
    pub fn flip(&mut self, expanded: bool, now_ms: u64) {
        let curve = Curve::FastOutSlowIn;
        let (outgoing_alpha, outgoing_scale, incoming_alpha, incoming_scale) = if expanded {
            (
                &mut self.collapsed_alpha,
                &mut self.collapsed_scale,
                &mut self.expanded_alpha,
                &mut self.expanded_scale,
            )
        } else {
            (
                &mut self.expanded_alpha,
                &mut self.expanded_scale,
                &mut self.collapsed_alpha,
                &mut self.collapsed_scale,
            )
        };
        *outgoing_alpha = outgoing_alpha.retarget(now_ms, 0.0, FADE_OUT_MS, curve);
        *outgoing_scale = outgoing_scale.retarget(now_ms, FADE_MIN_SCALE, FADE_OUT_MS, curve);
        *incoming_alpha = Tween::new(0.0, 1.0, now_ms, FADE_IN_MS, curve);
        *incoming_scale = Tween::new(FADE_MIN_SCALE, 1.0, now_ms, FADE_IN_MS, curve);
    }

    pub fn sample(&self, now_ms: u64) -> FadeState {
        FadeState {
            collapsed_alpha: self.collapsed_alpha.value_at(now_ms),
            collapsed_scale: self.collapsed_scale.value_at(now_ms),
            expanded_alpha: self.expanded_alpha.value_at(now_ms),
            expanded_scale: self.expanded_scale.value_at(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_resize_is_skipped() {
        let mut morph = CapsuleMorph::new(CapsuleShape::pill(200.0, 36.0));
        assert!(!morph.retarget(CapsuleShape::pill(200.5, 36.0), 0, false));
        assert_eq!(morph.resizes(), 0);
        assert!(morph.retarget(CapsuleShape::pill(200.5, 36.0), 0, true));
        assert_eq!(morph.resizes(), 1);
    }

    #[test]
    fn morph_overshoots_then_lands() {
        let mut morph = CapsuleMorph::new(CapsuleShape::pill(200.0, 36.0));
        let target = CapsuleShape {
            width: 300.0,
            height: 100.0,
            corner_radius: 28.0,
        };
        assert!(morph.retarget(target, 1000, false));
        assert!(morph.is_animating(1100));
        let widest = (1000..=1350)
            .map(|t| morph.shape_at(t).width)
            .fold(f32::MIN, f32::max);
        assert!(widest > 300.0);
        assert_eq!(morph.shape_at(1350), target);
        assert!(!morph.is_animating(1350));
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_shape() {
        let mut morph = CapsuleMorph::new(CapsuleShape::pill(100.0, 36.0));
        morph.retarget(CapsuleShape::pill(300.0, 36.0), 0, false);
        let mid = morph.shape_at(100);
        morph.retarget(CapsuleShape::pill(100.0, 36.0), 100, false);
        assert_eq!(morph.shape_at(100), mid);
    }

    #[test]
    fn flip_crossfades_layers() {
        let mut fade = ContentFade::new(false);
        fade.flip(true, 0);
        let start = fade.sample(0);
        assert_eq!(start.collapsed_alpha, 1.0);
        assert_eq!(start.expanded_alpha, 0.0);
        assert_eq!(start.expanded_scale, FADE_MIN_SCALE);

        let out_done = fade.sample(FADE_OUT_MS);
        assert_eq!(out_done.collapsed_alpha, 0.0);
        assert!(out_done.expanded_alpha < 1.0);

        let settled = fade.sample(FADE_IN_MS);
        assert_eq!(settled.expanded_alpha, 1.0);
        assert_eq!(settled.expanded_scale, 1.0);
    }
}
