//! The composed island view.
//!
//! [`IslandView`] listens to the manager, keeps the reconciled item views,
//! the capsule morph, the cross-fade and the collapsed summary in step with
//! it, and renders an [`IslandFrame`] for any instant.

use serde::Serialize;

use crate::events::TaskListSnapshot;
use crate::listener::{IslandListener, ListenerResult};
use crate::render::layout::{self, COLLAPSED_HEIGHT, EXPANDED_CORNER_RADIUS};
use crate::render::morph::{CapsuleMorph, CapsuleShape, ContentFade, FadeState};
use crate::render::reconciler::{ItemView, ReconcileOutcome, Reconciler};
use crate::render::summary::{CollapsedSummary, SummaryFrame};
use crate::settings::DisplaySettings;
use crate::task::{IconRef, SubtitleParts, TaskItem, TaskKind};

/// One row of expanded content as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemFrame {
    Switch {
        identifier: String,
        title: String,
        subtitle: Option<SubtitleParts>,
        thumb: f32,
        track: f32,
    },
    Progress {
        identifier: String,
        title: String,
        subtitle: Option<SubtitleParts>,
        icon: Option<IconRef>,
        progress: f32,
    },
}

/// Everything a host needs to draw the island at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandFrame {
    pub at_ms: u64,
    pub expanded: bool,
    pub shape: CapsuleShape,
    pub fade: FadeState,
    pub items: Vec<ItemFrame>,
    pub summary: SummaryFrame,
}

#[derive(Debug)]
pub struct IslandView {
    settings: DisplaySettings,
    reconciler: Reconciler,
    morph: CapsuleMorph,
    fade: ContentFade,
    summary: CollapsedSummary,
    expanded: bool,
    visible: Vec<TaskItem>,
    identity: Vec<(String, TaskKind)>,
    last_outcome: Option<ReconcileOutcome>,
}

impl IslandView {
    pub fn new(settings: DisplaySettings) -> Self {
        let summary = CollapsedSummary::new(settings.clone());
        let shape = collapsed_shape(&summary, &settings);
        Self {
            settings,
            reconciler: Reconciler::new(),
            morph: CapsuleMorph::new(shape),
            fade: ContentFade::new(false),
            summary,
            expanded: false,
            visible: Vec::new(),
            identity: Vec::new(),
            last_outcome: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn morph(&self) -> &CapsuleMorph {
        &self.morph
    }

    pub fn summary(&self) -> &CollapsedSummary {
        &self.summary
    }

    pub fn last_outcome(&self) -> Option<ReconcileOutcome> {
        self.last_outcome
    }

    pub fn set_fps(&mut self, fps: u32, now_ms: u64) -> bool {
        self.summary.set_fps(fps, now_ms)
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.morph.is_animating(now_ms)
            || self.summary.is_animating(now_ms)
            || self.reconciler.views().iter().any(|view| match view {
                ItemView::Switch(switch) => switch.is_animating(now_ms),
                ItemView::Progress(_) => false,
            })
    }

    pub fn frame(&self, now_ms: u64) -> IslandFrame {
        let items = self
            .reconciler
            .views()
            .iter()
            .map(|view| match view {
                ItemView::Switch(switch) => ItemFrame::Switch {
                    identifier: switch.identifier.clone(),
                    title: switch.title.clone(),
                    subtitle: switch.subtitle.clone(),
                    thumb: switch.thumb_position(now_ms),
                    track: switch.track_blend(now_ms),
                },
                ItemView::Progress(progress) => ItemFrame::Progress {
                    identifier: progress.identifier.clone(),
                    title: progress.title.clone(),
                    subtitle: progress.subtitle.clone(),
                    icon: progress.icon.clone(),
                    progress: progress.progress,
                },
            })
            .collect();
        IslandFrame {
            at_ms: now_ms,
            expanded: self.expanded,
            shape: self.morph.shape_at(now_ms),
            fade: self.fade.sample(now_ms),
            items,
            summary: self.summary.frame(now_ms),
        }
    }

    fn target_shape(&self) -> CapsuleShape {
        if self.expanded {
            CapsuleShape {
                width: layout::expanded_width(&self.visible, &self.settings),
                height: layout::expanded_height(&self.visible, &self.settings),
                corner_radius: self.settings.px(EXPANDED_CORNER_RADIUS),
            }
        } else {
            collapsed_shape(&self.summary, &self.settings)
        }
    }

    fn apply_expanded(&mut self, expanded: bool, now_ms: u64) -> bool {
        if expanded == self.expanded {
            return false;
        }
        self.expanded = expanded;
        self.fade.flip(expanded, now_ms);
        true
    }
}

fn collapsed_shape(summary: &CollapsedSummary, settings: &DisplaySettings) -> CapsuleShape {
    CapsuleShape::pill(summary.width(), settings.px(COLLAPSED_HEIGHT))
}

impl IslandListener for IslandView {
    fn name(&self) -> &str {
        "island-view"
    }

    fn on_tasks_changed(&mut self, snapshot: &TaskListSnapshot) -> ListenerResult {
        let now = snapshot.at_ms;
        let flipped = self.apply_expanded(snapshot.expanded, now);
        self.visible.clone_from(&snapshot.visible);
        self.last_outcome = Some(self.reconciler.reconcile(&self.visible, self.expanded, now));

        let identity: Vec<(String, TaskKind)> = self
            .visible
            .iter()
            .map(|task| (task.identifier.clone(), task.kind()))
            .collect();
        if flipped || identity != self.identity {
            self.identity = identity;
            let target = self.target_shape();
            self.morph.retarget(target, now, flipped);
        }
        Ok(())
    }

    fn on_expanded_state_changed(&mut self, expanded: bool, at_ms: u64) -> ListenerResult {
        if self.apply_expanded(expanded, at_ms) {
            let target = self.target_shape();
            self.morph.retarget(target, at_ms, true);
        }
        Ok(())
    }

    fn on_config_changed(&mut self, settings: &DisplaySettings, at_ms: u64) -> ListenerResult {
        self.settings = settings.clone();
        self.summary.apply_config(settings);
        let target = self.target_shape();
        self.morph.retarget(target, at_ms, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ProgressDrive;

    fn snapshot(visible: Vec<TaskItem>, at_ms: u64) -> TaskListSnapshot {
        TaskListSnapshot {
            expanded: !visible.is_empty(),
            live_count: visible.len(),
            visible,
            at_ms,
        }
    }

    fn progress(id: &str, value: f32) -> TaskItem {
        let mut task = TaskItem::new_progress(id, id, None, None, ProgressDrive::ValueDriven, 0);
        task.set_display_progress(value);
        task
    }

    #[test]
    fn expanding_flips_fade_and_morphs() {
        let mut view = IslandView::new(DisplaySettings::new(1.0, "Ada"));
        let collapsed = view.frame(0).shape;
        view.on_tasks_changed(&snapshot(vec![progress("a", 0.0)], 0)).unwrap();
        assert!(view.is_expanded());
        assert_eq!(view.morph().resizes(), 1);

        let settled = view.frame(400);
        assert_ne!(settled.shape, collapsed);
        assert_eq!(settled.fade.expanded_alpha, 1.0);
        assert_eq!(settled.fade.collapsed_alpha, 0.0);
        assert_eq!(settled.items.len(), 1);
    }

    #[test]
    fn progress_only_updates_do_not_morph() {
        let mut view = IslandView::new(DisplaySettings::default());
        view.on_tasks_changed(&snapshot(vec![progress("a", 0.0)], 0)).unwrap();
        for step in 1..20u64 {
            let value = step as f32 / 20.0;
            view.on_tasks_changed(&snapshot(vec![progress("a", value)], step * 16))
                .unwrap();
            assert_eq!(view.last_outcome(), Some(ReconcileOutcome::Patched));
        }
        assert_eq!(view.morph().resizes(), 1);
        assert_eq!(view.reconciler().stats().rebuilds, 1);
    }

    #[test]
    fn duplicate_expanded_event_is_ignored() {
        let mut view = IslandView::new(DisplaySettings::default());
        view.on_tasks_changed(&snapshot(vec![progress("a", 0.0)], 0)).unwrap();
        view.on_expanded_state_changed(true, 0).unwrap();
        assert_eq!(view.morph().resizes(), 1);
    }

    #[test]
    fn collapse_keeps_views_for_exit_fade() {
        let mut view = IslandView::new(DisplaySettings::default());
        view.on_tasks_changed(&snapshot(vec![progress("a", 0.5)], 0)).unwrap();
        view.on_tasks_changed(&snapshot(Vec::new(), 1000)).unwrap();
        assert!(!view.is_expanded());
        assert_eq!(view.last_outcome(), Some(ReconcileOutcome::Kept));
        let frame = view.frame(1050);
        assert_eq!(frame.items.len(), 1);
        assert!(frame.fade.expanded_alpha < 1.0);
    }

    #[test]
    fn config_change_rescales_without_rebuild() {
        let mut view = IslandView::new(DisplaySettings::new(1.0, "Ada"));
        view.on_tasks_changed(&snapshot(vec![progress("a", 0.5)], 0)).unwrap();
        view.on_config_changed(&DisplaySettings::new(2.0, "Ada"), 1000)
            .unwrap();
        assert_eq!(view.reconciler().stats().rebuilds, 1);
        assert_eq!(view.morph().resizes(), 2);
        assert_eq!(view.frame(1400).shape.width, 560.0);
    }
}
