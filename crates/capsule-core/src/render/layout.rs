//! Capsule size estimation.
//!
//! Sizes are computed from formulas rather than measured, so they are
//! deterministic across hosts. Layout units are density-independent and go
//! through [`DisplaySettings::px`] before use.

use unicode_width::UnicodeWidthStr;

use crate::settings::DisplaySettings;
use crate::task::{TaskItem, TaskKind};

pub const COLLAPSED_HEIGHT: f32 = 36.0;
pub const EXPANDED_CORNER_RADIUS: f32 = 28.0;
pub const ITEM_HEIGHT: f32 = 52.0;
/// Progress rows add the bar and its spacing.
pub const PROGRESS_ITEM_EXTRA: f32 = 8.0 + 12.0;
pub const VIEW_PADDING: f32 = 12.0;
pub const HORIZONTAL_ITEM_PADDING: f32 = 24.0;
pub const ICON_SIZE: f32 = 40.0;
pub const ICON_SPACING: f32 = 12.0;
pub const SWITCH_ICON_WIDTH: f32 = 52.0;
pub const ITEM_EXTRA_PADDING: f32 = 32.0;
pub const MIN_EXPANDED_WIDTH: f32 = 280.0;
pub const MAX_EXPANDED_WIDTH: f32 = 450.0;
pub const COLLAPSED_SIDE_PADDING: f32 = 40.0;

pub const TITLE_TEXT_SIZE: f32 = 15.0;
pub const SUBTITLE_TEXT_SIZE: f32 = 12.0;
pub const SUMMARY_TEXT_SIZE: f32 = 13.0;
pub const SUMMARY_ICON_SIZE: f32 = 16.0;
pub const SUMMARY_ICON_GAP: f32 = 4.0;
pub const SUMMARY_INNER_PADDING: f32 = 12.0;
pub const SUMMARY_SEPARATOR: &str = " \u{2022} ";

/// Average advance per terminal column, as a fraction of the font size.
const ADVANCE_PER_COLUMN: f32 = 0.55;
const BOLD_FACTOR: f32 = 1.06;

/// Estimated advance of `text` at `font_px`.
pub fn text_width(text: &str, font_px: f32, bold: bool) -> f32 {
    let columns = UnicodeWidthStr::width(text) as f32;
    let width = columns * font_px * ADVANCE_PER_COLUMN;
    if bold {
        width * BOLD_FACTOR
    } else {
        width
    }
}

/// Width of one expanded row in pixels.
pub fn item_width(task: &TaskItem, settings: &DisplaySettings) -> f32 {
    let side_padding = settings.px(HORIZONTAL_ITEM_PADDING * 2.0);
    let (icon, spacing) = match task.kind() {
        TaskKind::Switch => (SWITCH_ICON_WIDTH, ICON_SPACING),
        TaskKind::Progress if task.icon().is_some() => (ICON_SIZE, ICON_SPACING),
        TaskKind::Progress => (0.0, 0.0),
    };

    let title = text_width(&task.title, settings.px(TITLE_TEXT_SIZE), true);
    let subtitle = task
        .subtitle_parts()
        .map(|parts| text_width(&parts.display_text(), settings.px(SUBTITLE_TEXT_SIZE), false))
        .unwrap_or(0.0);

    side_padding
        + settings.px(icon)
        + settings.px(spacing)
        + title.max(subtitle)
        + settings.px(ITEM_EXTRA_PADDING)
}

pub fn item_height(task: &TaskItem, settings: &DisplaySettings) -> f32 {
    match task.kind() {
        TaskKind::Switch => settings.px(ITEM_HEIGHT),
        TaskKind::Progress => settings.px(ITEM_HEIGHT + PROGRESS_ITEM_EXTRA),
    }
}

pub fn expanded_height(tasks: &[TaskItem], settings: &DisplaySettings) -> f32 {
    if tasks.is_empty() {
        return settings.px(COLLAPSED_HEIGHT);
    }
    let rows: f32 = tasks.iter().map(|task| item_height(task, settings)).sum();
    rows + settings.px(VIEW_PADDING * 2.0)
}

/// Widest row, bounded to `[MIN_EXPANDED_WIDTH, MAX_EXPANDED_WIDTH]`.
pub fn expanded_width(tasks: &[TaskItem], settings: &DisplaySettings) -> f32 {
    let min = settings.px(MIN_EXPANDED_WIDTH);
    let max = settings.px(MAX_EXPANDED_WIDTH);
    tasks
        .iter()
        .map(|task| item_width(task, settings))
        .fold(min, f32::max)
        .min(max)
}

/// Collapsed summary width: three icon+text modules joined by separators.
pub fn collapsed_width(
    product_label: &str,
    user_label: &str,
    fps_text: &str,
    settings: &DisplaySettings,
) -> f32 {
    let font = settings.px(SUMMARY_TEXT_SIZE);
    let module = |text: &str, bold: bool| {
        settings.px(SUMMARY_ICON_SIZE + SUMMARY_ICON_GAP) + text_width(text, font, bold)
    };
    let fps = format!("{fps_text} FPS");
    let modules = module(product_label, true) + module(user_label, false) + module(&fps, false);
    let separators = 2.0 * text_width(SUMMARY_SEPARATOR, font, false);
    modules
        + separators
        + settings.px(SUMMARY_INNER_PADDING * 2.0)
        + settings.px(COLLAPSED_SIDE_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{IconRef, ProgressDrive};

    fn progress(title: &str, icon: bool) -> TaskItem {
        TaskItem::new_progress(
            "p",
            title,
            Some("detail".into()),
            icon.then(|| IconRef::new("i")),
            ProgressDrive::ValueDriven,
            0,
        )
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(text_width("ab", 10.0, false), 11.0);
        assert_eq!(text_width("\u{4e2d}", 10.0, false), 11.0);
    }

    #[test]
    fn expanded_width_is_bounded() {
        let settings = DisplaySettings::new(1.0, "x");
        let short = vec![progress("a", false)];
        assert_eq!(expanded_width(&short, &settings), MIN_EXPANDED_WIDTH);

        let long = vec![progress(&"w".repeat(200), true)];
        assert_eq!(expanded_width(&long, &settings), MAX_EXPANDED_WIDTH);
    }

    #[test]
    fn expanded_height_sums_rows() {
        let settings = DisplaySettings::new(1.0, "x");
        let tasks = vec![
            TaskItem::new_switch("s", "S", true, 500, 0),
            progress("p", false),
        ];
        let expected = ITEM_HEIGHT + ITEM_HEIGHT + PROGRESS_ITEM_EXTRA + VIEW_PADDING * 2.0;
        assert_eq!(expanded_height(&tasks, &settings), expected);
    }

    #[test]
    fn switch_rows_reserve_the_toggle() {
        let settings = DisplaySettings::new(1.0, "x");
        let switch = TaskItem::new_switch("s", "S", true, 500, 0);
        let mut plain = progress(&switch.title, false);
        plain.subtitle = switch.subtitle.clone();
        let delta = item_width(&switch, &settings) - item_width(&plain, &settings);
        assert!((delta - (SWITCH_ICON_WIDTH + ICON_SPACING)).abs() < 0.01);
    }

    #[test]
    fn collapsed_width_grows_with_label() {
        let settings = DisplaySettings::default();
        let short = collapsed_width("Capsule", "Al", "60", &settings);
        let long = collapsed_width("Capsule", "Alexandria", "60", &settings);
        assert!(long > short);
    }
}
