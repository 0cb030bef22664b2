//! Ambient display parameters shared by the manager, the reconciler and the
//! collapsed summary.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.0;
pub const DEFAULT_SCALE: f32 = 0.7;
pub const DEFAULT_LABEL: &str = "User";

/// Scale and persistent label. Published on every config change; views keep
/// their own copy instead of reading a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    scale: f32,
    pub label: String,
    /// Physical pixels per layout unit.
    density: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE, DEFAULT_LABEL)
    }
}

impl DisplaySettings {
    pub fn new(scale: f32, label: impl Into<String>) -> Self {
        Self {
            scale: clamp_scale(scale),
            label: label.into(),
            density: 1.0,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }

    /// Layout units to pixels at the current scale.
    pub fn px(&self, units: f32) -> f32 {
        units * self.density * self.scale
    }
}

/// Clamp into `[MIN_SCALE, MAX_SCALE]`; non-finite input falls back to the default.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        DEFAULT_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_clamped() {
        assert_eq!(DisplaySettings::new(3.0, "x").scale(), MAX_SCALE);
        assert_eq!(DisplaySettings::new(0.1, "x").scale(), MIN_SCALE);
        assert_eq!(DisplaySettings::new(f32::NAN, "x").scale(), DEFAULT_SCALE);
    }

    #[test]
    fn px_applies_scale_and_density() {
        let settings = DisplaySettings::new(0.5, "x").with_density(2.0);
        assert_eq!(settings.px(36.0), 36.0);
    }

    #[test]
    fn invalid_density_falls_back() {
        assert_eq!(DisplaySettings::default().with_density(-1.0).density(), 1.0);
    }
}
