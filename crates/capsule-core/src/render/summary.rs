//! Collapsed summary: product label, user label and a live fps counter.

use serde::Serialize;

use crate::render::layout::{self, SUMMARY_TEXT_SIZE};
use crate::settings::DisplaySettings;
use crate::timer::{lerp, Curve, Tween};

pub const PRODUCT_LABEL: &str = "Capsule";

pub const FPS_EXIT_MS: u64 = 150;
pub const FPS_ENTRY_MS: u64 = 400;
pub const FPS_ENTRY_TENSION: f32 = 2.5;
/// Vertical travel of the digits, in layout units.
pub const FPS_TRAVEL: f32 = 20.0;
pub const FPS_EXIT_SCALE: f32 = 0.8;
pub const FPS_ENTRY_SCALE: f32 = 1.2;

/// How the fps digits are drawn at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FpsGlyph {
    pub text: String,
    /// Pixels; negative is up.
    pub offset_y: f32,
    pub alpha: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryFrame {
    pub product_label: String,
    pub user_label: String,
    pub fps: FpsGlyph,
    /// Width of the box holding the digits.
    pub number_width: f32,
    pub width: f32,
}

#[derive(Debug, Clone)]
struct FpsTransition {
    old_text: String,
    new_text: String,
    started_at_ms: u64,
    /// Digit box, animated during the entry phase.
    width: Tween,
}

impl FpsTransition {
    fn entry_starts_at(&self) -> u64 {
        self.started_at_ms + FPS_EXIT_MS
    }

    fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.entry_starts_at() + FPS_ENTRY_MS
    }
}

#[derive(Debug, Clone)]
pub struct CollapsedSummary {
    settings: DisplaySettings,
    fps: u32,
    transition: Option<FpsTransition>,
}

impl CollapsedSummary {
    pub fn new(settings: DisplaySettings) -> Self {
        Self {
            settings,
            fps: 0,
            transition: None,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn user_label(&self) -> &str {
        &self.settings.label
    }

    pub fn apply_config(&mut self, settings: &DisplaySettings) {
        self.settings = settings.clone();
    }

    /// Start the digit transition. Returns false if the value is unchanged.
    pub fn set_fps(&mut self, fps: u32, now_ms: u64) -> bool {
        if fps == self.fps {
            return false;
        }
        let old_text = self.glyph_at(now_ms).text;
        let new_text = fps.to_string();
        let start_width = self.number_width_at(now_ms);
        let end_width = self.digits_width(&new_text);
        self.transition = Some(FpsTransition {
            old_text,
            new_text,
            started_at_ms: now_ms,
            width: Tween::new(
                start_width,
                end_width,
                now_ms + FPS_EXIT_MS,
                FPS_ENTRY_MS,
                Curve::Overshoot {
                    tension: FPS_ENTRY_TENSION,
                },
            ),
        });
        self.fps = fps;
        true
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|transition| !transition.is_finished(now_ms))
    }

    pub fn glyph_at(&self, now_ms: u64) -> FpsGlyph {
        let travel = self.settings.px(FPS_TRAVEL);
        let Some(transition) = self.transition.as_ref() else {
            return self.resting_glyph();
        };

        if now_ms < transition.entry_starts_at() {
            let exit = Tween::new(0.0, 1.0, transition.started_at_ms, FPS_EXIT_MS, Curve::FastOutSlowIn);
            let t = exit.value_at(now_ms);
            return FpsGlyph {
                text: transition.old_text.clone(),
                offset_y: lerp(0.0, -travel, t),
                alpha: lerp(1.0, 0.0, t),
                scale: lerp(1.0, FPS_EXIT_SCALE, t),
            };
        }
        if transition.is_finished(now_ms) {
            return self.resting_glyph();
        }

        let entry = Tween::new(
            0.0,
            1.0,
            transition.entry_starts_at(),
            FPS_ENTRY_MS,
            Curve::Overshoot {
                tension: FPS_ENTRY_TENSION,
            },
        );
        let t = entry.value_at(now_ms);
        FpsGlyph {
            text: transition.new_text.clone(),
            offset_y: lerp(travel, 0.0, t),
            alpha: lerp(0.0, 1.0, t).clamp(0.0, 1.0),
            scale: lerp(FPS_ENTRY_SCALE, 1.0, t),
        }
    }

    pub fn number_width_at(&self, now_ms: u64) -> f32 {
        match self.transition.as_ref() {
            Some(transition) => transition.width.value_at(now_ms),
            None => self.digits_width(&self.fps.to_string()),
        }
    }

    /// Settled width of the whole summary, for sizing the collapsed capsule.
    pub fn width(&self) -> f32 {
        layout::collapsed_width(
            PRODUCT_LABEL,
            &self.settings.label,
            &self.fps.to_string(),
            &self.settings,
        )
    }

    pub fn frame(&self, now_ms: u64) -> SummaryFrame {
        SummaryFrame {
            product_label: PRODUCT_LABEL.to_string(),
            user_label: self.settings.label.clone(),
            fps: self.glyph_at(now_ms),
            number_width: self.number_width_at(now_ms),
            width: self.width(),
        }
    }

    fn resting_glyph(&self) -> FpsGlyph {
        FpsGlyph {
            text: self.fps.to_string(),
            offset_y: 0.0,
            alpha: 1.0,
            scale: 1.0,
        }
    }

    fn digits_width(&self, text: &str) -> f32 {
        layout::text_width(text, self.settings.px(SUMMARY_TEXT_SIZE), false).ceil()
    }
}

/// Counts host frames and yields a rate once per elapsed second.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    window_start_ms: Option<u64>,
    frames: u32,
}

impl FpsMeter {
    pub const WINDOW_MS: u64 = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, now_ms: u64) -> Option<u32> {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        let elapsed = now_ms.saturating_sub(start);
        if elapsed < Self::WINDOW_MS {
            return None;
        }
        let fps = (self.frames as f64 * 1000.0 / elapsed as f64).round() as u32;
        self.window_start_ms = Some(now_ms);
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CollapsedSummary {
        CollapsedSummary::new(DisplaySettings::new(1.0, "Ada"))
    }

    #[test]
    fn unchanged_fps_does_not_animate() {
        let mut summary = summary();
        assert!(!summary.set_fps(0, 0));
        assert!(!summary.is_animating(0));
    }

    #[test]
    fn fps_change_exits_then_enters() {
        let mut summary = summary();
        summary.set_fps(60, 1000);

        let exiting = summary.glyph_at(1075);
        assert_eq!(exiting.text, "0");
        assert!(exiting.offset_y < 0.0);
        assert!(exiting.alpha < 1.0);

        let entering = summary.glyph_at(1150);
        assert_eq!(entering.text, "60");
        assert_eq!(entering.offset_y, 20.0);
        assert_eq!(entering.scale, FPS_ENTRY_SCALE);

        let settled = summary.glyph_at(1550);
        assert_eq!(settled.text, "60");
        assert_eq!(settled.offset_y, 0.0);
        assert!(!summary.is_animating(1550));
    }

    #[test]
    fn digit_box_widens_during_entry() {
        let mut summary = summary();
        let before = summary.number_width_at(0);
        summary.set_fps(120, 0);
        assert_eq!(summary.number_width_at(100), before);
        assert!(summary.number_width_at(550) > before);
    }

    #[test]
    fn config_updates_label() {
        let mut summary = summary();
        let narrow = summary.width();
        summary.apply_config(&DisplaySettings::new(1.0, "Grace Hopper"));
        assert_eq!(summary.user_label(), "Grace Hopper");
        assert!(summary.width() > narrow);
    }

    #[test]
    fn meter_reports_once_per_second() {
        let mut meter = FpsMeter::new();
        let reports: Vec<u32> = (0..=120u64)
            .filter_map(|frame| meter.record_frame(frame * 1000 / 60))
            .collect();
        assert_eq!(reports, vec![61, 60]);
    }
}
