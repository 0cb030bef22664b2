//! Expanded-content reconciliation.
//!
//! The reconciler keeps one item view per visible task. When the visible
//! list has the same identity sequence (positional identifier and kind) as
//! the rendered one, every view is patched in place. Anything else tears the
//! list down and rebuilds it in the new order.

use serde::Serialize;
use tracing::debug;

use crate::task::{IconRef, SubtitleParts, TaskItem, TaskKind};
use crate::timer::{Curve, Tween};

pub const THUMB_TRAVEL_MS: u64 = 200;
pub const THUMB_TENSION: f32 = 1.2;
pub const TRACK_FADE_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchItemView {
    pub identifier: String,
    pub title: String,
    pub subtitle: Option<SubtitleParts>,
    pub state: bool,
    /// Thumb position, 0 = off, 1 = on.
    thumb: Tween,
    /// Track colour blend, 0 = off colour, 1 = on colour.
    track: Tween,
}

impl SwitchItemView {
    /// A fresh switch is drawn at its final position.
    fn build(task: &TaskItem) -> Self {
        let state = task.switch_state().unwrap_or(false);
        let rest = if state { 1.0 } else { 0.0 };
        Self {
            identifier: task.identifier.clone(),
            title: task.title.clone(),
            subtitle: task.subtitle_parts(),
            state,
            thumb: Tween::settled(rest),
            track: Tween::settled(rest),
        }
    }

    fn patch(&mut self, task: &TaskItem, now_ms: u64) {
        self.title.clone_from(&task.title);
        self.subtitle = task.subtitle_parts();
        let state = task.switch_state().unwrap_or(self.state);
        if state != self.state {
            let target = if state { 1.0 } else { 0.0 };
            self.thumb = self.thumb.retarget(
                now_ms,
                target,
                THUMB_TRAVEL_MS,
                Curve::Overshoot {
                    tension: THUMB_TENSION,
                },
            );
            self.track = self
                .track
                .retarget(now_ms, target, TRACK_FADE_MS, Curve::Linear);
            self.state = state;
        }
    }

    pub fn thumb_position(&self, now_ms: u64) -> f32 {
        self.thumb.value_at(now_ms)
    }

    pub fn track_blend(&self, now_ms: u64) -> f32 {
        self.track.value_at(now_ms).clamp(0.0, 1.0)
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        !self.thumb.is_finished(now_ms) || !self.track.is_finished(now_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressItemView {
    pub identifier: String,
    pub title: String,
    pub subtitle: Option<SubtitleParts>,
    pub icon: Option<IconRef>,
    /// Bar fill, the manager's displayed progress.
    pub progress: f32,
}

impl ProgressItemView {
    fn build(task: &TaskItem) -> Self {
        Self {
            identifier: task.identifier.clone(),
            title: task.title.clone(),
            subtitle: task.subtitle_parts(),
            icon: task.icon().cloned(),
            progress: task.display_progress(),
        }
    }

    fn patch(&mut self, task: &TaskItem) {
        self.title.clone_from(&task.title);
        self.subtitle = task.subtitle_parts();
        self.icon = task.icon().cloned();
        self.progress = task.display_progress();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemView {
    Switch(SwitchItemView),
    Progress(ProgressItemView),
}

impl ItemView {
    pub fn build(task: &TaskItem) -> Self {
        match task.kind() {
            TaskKind::Switch => ItemView::Switch(SwitchItemView::build(task)),
            TaskKind::Progress => ItemView::Progress(ProgressItemView::build(task)),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ItemView::Switch(view) => &view.identifier,
            ItemView::Progress(view) => &view.identifier,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            ItemView::Switch(_) => TaskKind::Switch,
            ItemView::Progress(_) => TaskKind::Progress,
        }
    }

    fn matches(&self, task: &TaskItem) -> bool {
        self.identifier() == task.identifier && self.kind() == task.kind()
    }

    fn patch(&mut self, task: &TaskItem, now_ms: u64) {
        match self {
            ItemView::Switch(view) => view.patch(task, now_ms),
            ItemView::Progress(view) => view.patch(task),
        }
    }
}

/// Counters that make the patch/rebuild policy observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub patches: u64,
    pub rebuilds: u64,
    pub views_created: u64,
    pub views_destroyed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Patched,
    Rebuilt,
    /// Collapsed: the last rendered views are kept for the exit fade.
    Kept,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    views: Vec<ItemView>,
    stats: ReconcileStats,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &[ItemView] {
        &self.views
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Positional `(identifier, kind)` pairs of the rendered views.
    pub fn identity(&self) -> Vec<(String, TaskKind)> {
        self.views
            .iter()
            .map(|view| (view.identifier().to_string(), view.kind()))
            .collect()
    }

    pub fn reconcile(&mut self, visible: &[TaskItem], expanded: bool, now_ms: u64) -> ReconcileOutcome {
        if !expanded {
            return ReconcileOutcome::Kept;
        }

        let structural_match = self.views.len() == visible.len()
            && self
                .views
                .iter()
                .zip(visible)
                .all(|(view, task)| view.matches(task));

        if structural_match {
            for (view, task) in self.views.iter_mut().zip(visible) {
                view.patch(task, now_ms);
            }
            self.stats.patches += 1;
            return ReconcileOutcome::Patched;
        }

        debug!(
            rendered = self.views.len(),
            visible = visible.len(),
            "identity sequence changed, rebuilding expanded content"
        );
        self.stats.views_destroyed += self.views.len() as u64;
        self.views = visible.iter().map(ItemView::build).collect();
        self.stats.views_created += self.views.len() as u64;
        self.stats.rebuilds += 1;
        ReconcileOutcome::Rebuilt
    }
}
