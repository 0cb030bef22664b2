//! Task model.
//!
//! A [`TaskItem`] is the plain, cloneable description of one notification
//! unit. Snapshots handed to listeners and hosts are `TaskItem` copies. The
//! timer handles and in-flight animation a task owns live beside it in a
//! [`TaskRecord`], which only the manager touches.

use serde::{Deserialize, Serialize};

use crate::timer::{TimerHandle, TimerQueue};

/// Heading used for every switch task.
pub const SWITCH_TITLE: &str = "Toggle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Switch,
    Progress,
}

/// Opaque image handle supplied by the host (resource key, asset path...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(pub String);

impl IconRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

/// Kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskBody {
    Switch { state: bool },
    Progress { icon: Option<IconRef> },
}

impl TaskBody {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskBody::Switch { .. } => TaskKind::Switch,
            TaskBody::Progress { .. } => TaskKind::Progress,
        }
    }
}

/// What governs a task's visible lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProgressDrive {
    /// Counts down from full over `duration_ms`, then waits out the grace period.
    TimeBased { duration_ms: u64 },
    /// Follows externally pushed values; evicted when they stop arriving.
    ValueDriven,
}

/// Where a task sits in the eviction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Active,
    Decaying,
    /// Fully decayed; the grace period runs from `last_update_ms`.
    AwaitingData,
    Removing,
}

/// Switch subtitle halves, styled differently by the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleParts {
    Split { name: String, state: String },
    Plain(String),
}

impl SubtitleParts {
    /// Split at the first `|`.
    pub fn parse(subtitle: &str) -> Self {
        match subtitle.split_once('|') {
            Some((name, state)) => SubtitleParts::Split {
                name: name.to_string(),
                state: state.to_string(),
            },
            None => SubtitleParts::Plain(subtitle.to_string()),
        }
    }

    /// Both halves joined by a space, the way they are laid out.
    pub fn display_text(&self) -> String {
        match self {
            SubtitleParts::Split { name, state } => format!("{name} {state}"),
            SubtitleParts::Plain(text) => text.clone(),
        }
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One notification unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub identifier: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: TaskBody,
    pub drive: ProgressDrive,
    /// Last external update, or the moment the task started awaiting data.
    pub last_update_ms: u64,
    pub awaiting_data: bool,
    pub removing: bool,
    display_progress: f32,
    target_progress: f32,
    pub visually_hidden: bool,
}

impl TaskItem {
    pub fn switch_subtitle(label: &str, state: bool) -> String {
        format!("{label}|{}", if state { "enabled" } else { "disabled" })
    }

    pub fn new_switch(
        identifier: impl Into<String>,
        label: &str,
        state: bool,
        duration_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: SWITCH_TITLE.to_string(),
            subtitle: Some(Self::switch_subtitle(label, state)),
            body: TaskBody::Switch { state },
            drive: ProgressDrive::TimeBased { duration_ms },
            last_update_ms: now_ms,
            awaiting_data: false,
            removing: false,
            display_progress: 1.0,
            target_progress: 1.0,
            visually_hidden: false,
        }
    }

    /// A progress task. Value-driven tasks start empty and fill toward their
    /// first value; time-based tasks start full.
    pub fn new_progress(
        identifier: impl Into<String>,
        title: impl Into<String>,
        subtitle: Option<String>,
        icon: Option<IconRef>,
        drive: ProgressDrive,
        now_ms: u64,
    ) -> Self {
        let start = match drive {
            ProgressDrive::TimeBased { .. } => 1.0,
            ProgressDrive::ValueDriven => 0.0,
        };
        Self {
            identifier: identifier.into(),
            title: title.into(),
            subtitle,
            body: TaskBody::Progress { icon },
            drive,
            last_update_ms: now_ms,
            awaiting_data: false,
            removing: false,
            display_progress: start,
            target_progress: start,
            visually_hidden: false,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.body.kind()
    }

    pub fn is_time_based(&self) -> bool {
        matches!(self.drive, ProgressDrive::TimeBased { .. })
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match self.drive {
            ProgressDrive::TimeBased { duration_ms } => Some(duration_ms),
            ProgressDrive::ValueDriven => None,
        }
    }

    pub fn switch_state(&self) -> Option<bool> {
        match self.body {
            TaskBody::Switch { state } => Some(state),
            TaskBody::Progress { .. } => None,
        }
    }

    pub fn icon(&self) -> Option<&IconRef> {
        match &self.body {
            TaskBody::Progress { icon } => icon.as_ref(),
            TaskBody::Switch { .. } => None,
        }
    }

    pub fn subtitle_parts(&self) -> Option<SubtitleParts> {
        self.subtitle.as_deref().map(SubtitleParts::parse)
    }

    pub fn display_progress(&self) -> f32 {
        self.display_progress
    }

    pub fn target_progress(&self) -> f32 {
        self.target_progress
    }

    pub fn set_display_progress(&mut self, value: f32) {
        self.display_progress = clamp_unit(value);
    }

    pub fn set_target_progress(&mut self, value: f32) {
        self.target_progress = clamp_unit(value);
    }

    pub fn phase(&self) -> TaskPhase {
        if self.removing {
            TaskPhase::Removing
        } else if self.awaiting_data {
            TaskPhase::AwaitingData
        } else if self.is_time_based() && self.target_progress <= 0.0 {
            TaskPhase::Decaying
        } else {
            TaskPhase::Active
        }
    }

    /// Live and not yielding to a switch.
    pub fn is_shown(&self) -> bool {
        !self.removing && !self.visually_hidden
    }
}

/// What to do once the current progress animation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowUp {
    /// Count down to zero over the given window.
    Decay { duration_ms: u64 },
}

/// Frame-stepped eased move of `display_progress`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProgressAnimation {
    pub from: f32,
    pub to: f32,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub then: Option<FollowUp>,
}

impl ProgressAnimation {
    pub fn fraction_at(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f32;
        (elapsed / self.duration_ms as f32).min(1.0)
    }

    pub fn ends_at_ms(&self) -> u64 {
        self.started_at_ms.saturating_add(self.duration_ms)
    }
}

/// Timers owned by one task.
#[derive(Debug, Default)]
pub(crate) struct TaskJobs {
    pub frame: TimerHandle,
    pub disposal: TimerHandle,
}

/// A task plus the runtime state the manager keeps for it.
#[derive(Debug)]
pub struct TaskRecord {
    pub item: TaskItem,
    pub(crate) animation: Option<ProgressAnimation>,
    pub(crate) jobs: TaskJobs,
}

impl TaskRecord {
    pub fn new(item: TaskItem) -> Self {
        Self {
            item,
            animation: None,
            jobs: TaskJobs::default(),
        }
    }

    /// Cancel every timer this task owns and drop its animation.
    pub fn cancel_jobs<J>(&mut self, timers: &mut TimerQueue<J>) {
        self.jobs.frame.cancel(timers);
        self.jobs.disposal.cancel(timers);
        self.animation = None;
    }

    /// An upsert is still easing the bar back up.
    pub fn is_refilling(&self) -> bool {
        self.animation
            .is_some_and(|animation| animation.to > animation.from || animation.then.is_some())
    }
}
