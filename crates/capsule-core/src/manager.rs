//! Task lifecycle manager.
//!
//! Owns the ordered task table, the timer queue and the listeners. Like the
//! rest of capsule it has no thread of its own: the host calls
//! [`IslandManager::advance`] from its event loop and every due callback runs
//! there, in due order, observing its own due time.
//!
//! ## Eviction state machine
//!
//! ```text
//! Active -> Decaying -> AwaitingData (grace) -> Removing -> Disposed
//!   ^          |              |
//!   +----------+--------------+  upsert
//! ```
//!
//! Value-driven progress skips the countdown: it goes straight to Removing
//! once no update has arrived for the staleness timeout.

use std::rc::Rc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::events::{Event, TaskListSnapshot};
use crate::listener::{IslandListener, ListenerId, ListenerSet};
use crate::settings::DisplaySettings;
use crate::task::{
    FollowUp, IconRef, ProgressAnimation, ProgressDrive, TaskBody, TaskItem, TaskKind,
    TaskRecord, TaskSlot, TaskTable, SWITCH_TITLE,
};
use crate::timer::{ease_out_cubic, lerp, LifecycleTimings, TimerHandle, TimerId, TimerQueue};

/// Displayed progress at or below this counts as fully decayed.
const AWAITING_THRESHOLD: f32 = 0.01;
/// Moves smaller than this are applied without animating.
const MIN_ANIMATED_DELTA: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Sweep,
    Frame(TaskSlot),
    Dispose(TaskSlot),
}

/// Arguments of a progress upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Option<IconRef>,
    /// Present: value-driven. Absent: time-based countdown.
    pub progress: Option<f32>,
    pub duration_ms: Option<u64>,
}

impl ProgressUpdate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            icon: None,
            progress: None,
            duration_ms: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Counts for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ManagerStats {
    pub live: usize,
    pub removing: usize,
    pub hidden: usize,
    pub visible: usize,
    pub pending_timers: usize,
    pub listeners: usize,
}

pub struct IslandManager {
    clock: Rc<dyn Clock>,
    timings: LifecycleTimings,
    settings: DisplaySettings,
    tasks: TaskTable,
    timers: TimerQueue<Job>,
    sweep: TimerHandle,
    listeners: ListenerSet,
    last_expanded: bool,
}

impl std::fmt::Debug for IslandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IslandManager")
            .field("settings", &self.settings)
            .field("tasks", &self.tasks.len())
            .field("timers", &self.timers.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl IslandManager {
    pub fn new(settings: DisplaySettings, timings: LifecycleTimings, clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            timings: timings.normalized(),
            settings,
            tasks: TaskTable::new(),
            timers: TimerQueue::new(),
            sweep: TimerHandle::none(),
            listeners: ListenerSet::default(),
            last_expanded: false,
        }
    }

    /// Manager on the wall clock with default timings.
    pub fn create(initial_scale: f32, initial_label: impl Into<String>) -> Self {
        Self::new(
            DisplaySettings::new(initial_scale, initial_label),
            LifecycleTimings::default(),
            Rc::new(SystemClock),
        )
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn timings(&self) -> &LifecycleTimings {
        &self.timings
    }

    /// Copy of every task in the table, removing and hidden ones included.
    pub fn tasks(&self) -> Vec<TaskItem> {
        self.tasks.iter().map(|record| record.item.clone()).collect()
    }

    pub fn task(&self, identifier: &str) -> Option<TaskItem> {
        let slot = self.tasks.find(identifier)?;
        self.tasks.get(slot).map(|record| record.item.clone())
    }

    /// Tasks to render, newest first.
    ///
    /// Switch tasks take the surface exclusively while any is live;
    /// otherwise every live progress task is shown.
    pub fn visible_tasks(&self) -> Vec<TaskItem> {
        let live = self.tasks.iter().filter(|record| !record.item.removing);
        let (switches, progress): (Vec<&TaskRecord>, Vec<&TaskRecord>) =
            live.partition(|record| record.item.kind() == TaskKind::Switch);
        let chosen = if switches.is_empty() { progress } else { switches };
        chosen.into_iter().map(|record| record.item.clone()).collect()
    }

    pub fn is_expanded(&self) -> bool {
        self.tasks.iter().any(|record| record.item.is_shown())
    }

    pub fn next_due_ms(&mut self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn stats(&self) -> ManagerStats {
        let mut stats = ManagerStats {
            pending_timers: self.timers.len(),
            listeners: self.listeners.len(),
            visible: self.visible_tasks().len(),
            ..ManagerStats::default()
        };
        for record in self.tasks.iter() {
            stats.live += 1;
            if record.item.removing {
                stats.removing += 1;
            } else if record.item.visually_hidden {
                stats.hidden += 1;
            }
        }
        stats
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn add_listener(&mut self, listener: impl IslandListener + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Show momentary feedback for a toggled switch.
    pub fn upsert_switch(&mut self, identifier: &str, label: &str, state: bool) {
        self.advance();
        let now = self.now_ms();
        let duration_ms = self.timings.switch_display_ms;
        let refill_ms = self.timings.refill_ms;

        match self.tasks.find(identifier) {
            Some(slot) => {
                let Some(record) = self.tasks.get_mut(slot) else {
                    return;
                };
                if !accepts_upsert(record, TaskKind::Switch) {
                    return;
                }
                record.cancel_jobs(&mut self.timers);
                let item = &mut record.item;
                item.title = SWITCH_TITLE.to_string();
                item.subtitle = Some(TaskItem::switch_subtitle(label, state));
                item.body = TaskBody::Switch { state };
                item.drive = ProgressDrive::TimeBased { duration_ms };
                item.last_update_ms = now;
                item.awaiting_data = false;
                start_countdown(record, &mut self.timers, slot, duration_ms, refill_ms, now);
                debug!(identifier, state, "switch task updated");
            }
            None => {
                let item = TaskItem::new_switch(identifier, label, state, duration_ms, now);
                let slot = self.tasks.insert_front(TaskRecord::new(item));
                if let Some(record) = self.tasks.get_mut(slot) {
                    start_countdown(record, &mut self.timers, slot, duration_ms, refill_ms, now);
                }
                self.ensure_sweep(now);
                debug!(identifier, state, "switch task created");
            }
        }
        self.notify_tasks_changed(now);
    }

    /// Create or refresh a progress task.
    pub fn upsert_progress(&mut self, identifier: &str, update: ProgressUpdate) {
        self.advance();
        let now = self.now_ms();
        let timings = self.timings.clone();
        let drive = match update.progress {
            Some(_) => ProgressDrive::ValueDriven,
            None => ProgressDrive::TimeBased {
                duration_ms: update
                    .duration_ms
                    .unwrap_or(timings.default_progress_duration_ms),
            },
        };

        let slot = match self.tasks.find(identifier) {
            Some(slot) => {
                let Some(record) = self.tasks.get_mut(slot) else {
                    return;
                };
                if !accepts_upsert(record, TaskKind::Progress) {
                    return;
                }
                record.cancel_jobs(&mut self.timers);
                let item = &mut record.item;
                item.title = update.title;
                item.subtitle = update.subtitle;
                if let Some(icon) = update.icon {
                    item.body = TaskBody::Progress { icon: Some(icon) };
                }
                item.drive = drive;
                item.last_update_ms = now;
                item.awaiting_data = false;
                debug!(identifier, ?drive, "progress task updated");
                slot
            }
            None => {
                let item = TaskItem::new_progress(
                    identifier,
                    update.title,
                    update.subtitle,
                    update.icon,
                    drive,
                    now,
                );
                let slot = self.tasks.insert_front(TaskRecord::new(item));
                self.ensure_sweep(now);
                debug!(identifier, ?drive, "progress task created");
                slot
            }
        };

        if let Some(record) = self.tasks.get_mut(slot) {
            match (drive, update.progress) {
                (ProgressDrive::ValueDriven, Some(value)) => begin_animation(
                    record,
                    &mut self.timers,
                    slot,
                    value,
                    timings.value_transition_ms,
                    now,
                    None,
                ),
                (ProgressDrive::TimeBased { duration_ms }, _) => start_countdown(
                    record,
                    &mut self.timers,
                    slot,
                    duration_ms,
                    timings.refill_ms,
                    now,
                ),
                (ProgressDrive::ValueDriven, None) => {}
            }
        }
        self.notify_tasks_changed(now);
    }

    /// Start the exit of a task. Unknown or already removing ids are ignored.
    pub fn remove(&mut self, identifier: &str) {
        self.advance();
        let now = self.now_ms();
        let Some(slot) = self.tasks.find(identifier) else {
            return;
        };
        if !self.mark_removing(slot, now) {
            return;
        }
        debug!(identifier, "task removal requested");
        self.notify_tasks_changed(now);
    }

    /// Drop every task and timer immediately.
    pub fn clear(&mut self) {
        let now = self.now_ms();
        for mut record in self.tasks.drain() {
            record.cancel_jobs(&mut self.timers);
        }
        self.sweep.cancel(&mut self.timers);
        debug!("all tasks cleared");
        self.notify_tasks_changed(now);
    }

    pub fn hide_all(&mut self) {
        self.clear();
    }

    /// Teardown: clear, drop anything still queued, detach listeners.
    pub fn shutdown(&mut self) {
        self.clear();
        self.timers.clear();
        self.listeners.clear();
    }

    /// Change the ambient scale and label. Publishes a config event only.
    pub fn update_display_config(&mut self, scale: f32, label: impl Into<String>) {
        self.advance();
        let now = self.now_ms();
        self.settings.set_scale(scale);
        self.settings.label = label.into();
        let event = Event::ConfigChanged {
            settings: self.settings.clone(),
            at_ms: now,
        };
        self.listeners.dispatch(&event);
    }

    /// Run every callback due by now. Returns how many ran.
    pub fn advance(&mut self) -> usize {
        let now = self.now_ms();
        let mut ran = 0;
        while let Some((id, due, job)) = self.timers.pop_due(now) {
            ran += 1;
            match job {
                Job::Sweep => self.on_sweep(id, due),
                Job::Frame(slot) => self.on_frame(slot, id, due),
                Job::Dispose(slot) => self.on_dispose(slot, id, due),
            }
        }
        ran
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_sweep(&mut self, now: u64) {
        if !self.sweep.is_armed() {
            self.sweep = self
                .timers
                .schedule_at(now + self.timings.sweep_interval_ms, Job::Sweep);
        }
    }

    fn on_sweep(&mut self, id: TimerId, at: u64) {
        self.sweep.fired(id);
        let grace = self.timings.grace_period_ms;
        let stale = self.timings.stale_timeout_ms;
        let mut evicted = Vec::new();

        for slot in self.tasks.slots() {
            let Some(record) = self.tasks.get_mut(slot) else {
                continue;
            };
            let refilling = record.is_refilling();
            let item = &mut record.item;
            if item.removing {
                continue;
            }
            let evict = match item.drive {
                ProgressDrive::TimeBased { duration_ms: 0 } => true,
                ProgressDrive::TimeBased { .. } => {
                    if !refilling
                        && !item.awaiting_data
                        && item.display_progress() <= AWAITING_THRESHOLD
                    {
                        item.awaiting_data = true;
                        item.last_update_ms = at;
                    }
                    item.awaiting_data && at.saturating_sub(item.last_update_ms) >= grace
                }
                ProgressDrive::ValueDriven => at.saturating_sub(item.last_update_ms) >= stale,
            };
            if evict {
                evicted.push(slot);
            }
        }

        let changed = !evicted.is_empty();
        for slot in evicted {
            if self.mark_removing(slot, at) {
                if let Some(record) = self.tasks.get(slot) {
                    debug!(identifier = %record.item.identifier, "task evicted by sweep");
                }
            }
        }
        if changed {
            self.notify_tasks_changed(at);
        }
        if !self.tasks.is_empty() {
            self.sweep = self
                .timers
                .schedule_at(at + self.timings.sweep_interval_ms, Job::Sweep);
        }
    }

    fn on_frame(&mut self, slot: TaskSlot, id: TimerId, at: u64) {
        let frame_interval = self.timings.frame_interval_ms;
        let Some(record) = self.tasks.get_mut(slot) else {
            return;
        };
        record.jobs.frame.fired(id);
        let Some(animation) = record.animation else {
            return;
        };
        if record.item.removing {
            record.animation = None;
            return;
        }
        let is_switch = record.item.kind() == TaskKind::Switch;
        let fraction = animation.fraction_at(at);

        if fraction < 1.0 {
            let value = lerp(animation.from, animation.to, ease_out_cubic(fraction));
            record.item.set_display_progress(value);
            let next = self.timers.schedule_at(at + frame_interval, Job::Frame(slot));
            record.jobs.frame.replace(&mut self.timers, next);
            if !is_switch {
                self.notify_tasks_changed(at);
            }
            return;
        }

        record.item.set_display_progress(animation.to);
        record.animation = None;
        match animation.then {
            Some(FollowUp::Decay { duration_ms }) => {
                begin_animation(
                    record,
                    &mut self.timers,
                    slot,
                    0.0,
                    duration_ms,
                    animation.ends_at_ms(),
                    None,
                );
            }
            None => {
                if record.item.is_time_based()
                    && animation.to <= 0.0
                    && !record.item.awaiting_data
                {
                    record.item.awaiting_data = true;
                    record.item.last_update_ms = animation.ends_at_ms();
                }
            }
        }
        self.notify_tasks_changed(at);
    }

    fn on_dispose(&mut self, slot: TaskSlot, id: TimerId, at: u64) {
        let Some(record) = self.tasks.get_mut(slot) else {
            return;
        };
        record.jobs.disposal.fired(id);
        if !record.item.removing {
            return;
        }
        if let Some(mut record) = self.tasks.remove(slot) {
            record.cancel_jobs(&mut self.timers);
            debug!(identifier = %record.item.identifier, "task disposed");
        }
        self.notify_tasks_changed(at);
    }

    /// Flag a task removing and schedule its disposal. False if it already was.
    fn mark_removing(&mut self, slot: TaskSlot, at: u64) -> bool {
        let Some(record) = self.tasks.get_mut(slot) else {
            return false;
        };
        if record.item.removing {
            return false;
        }
        record.item.removing = true;
        record.cancel_jobs(&mut self.timers);
        record.jobs.disposal = self
            .timers
            .schedule_at(at + self.timings.disposal_delay_ms, Job::Dispose(slot));
        true
    }

    fn refresh_visibility(&mut self) {
        let switch_live = self
            .tasks
            .iter()
            .any(|record| !record.item.removing && record.item.kind() == TaskKind::Switch);
        for slot in self.tasks.slots() {
            if let Some(record) = self.tasks.get_mut(slot) {
                record.item.visually_hidden =
                    switch_live && record.item.kind() == TaskKind::Progress;
            }
        }
    }

    fn notify_tasks_changed(&mut self, at: u64) {
        self.refresh_visibility();
        let expanded = self.is_expanded();
        let snapshot = TaskListSnapshot {
            visible: self.visible_tasks(),
            expanded,
            live_count: self.tasks.len(),
            at_ms: at,
        };
        self.listeners.dispatch(&Event::TasksChanged(snapshot));
        if expanded != self.last_expanded {
            self.last_expanded = expanded;
            self.listeners.dispatch(&Event::ExpandedStateChanged {
                expanded,
                at_ms: at,
            });
        }
    }
}

/// Upserts only refresh live tasks of the same kind.
fn accepts_upsert(record: &TaskRecord, kind: TaskKind) -> bool {
    if record.item.removing {
        debug!(identifier = %record.item.identifier, "ignoring upsert for removing task");
        return false;
    }
    if record.item.kind() != kind {
        debug!(
            identifier = %record.item.identifier,
            live = ?record.item.kind(),
            requested = ?kind,
            "ignoring upsert with mismatched kind"
        );
        return false;
    }
    true
}

/// Ease `display_progress` toward `target`, starting at `started_at`.
///
/// The first frame is scheduled at `started_at`; moves too small to animate
/// (or zero-length windows) land immediately and chain into `then`.
fn begin_animation(
    record: &mut TaskRecord,
    timers: &mut TimerQueue<Job>,
    slot: TaskSlot,
    target: f32,
    duration_ms: u64,
    started_at: u64,
    then: Option<FollowUp>,
) {
    record.jobs.frame.cancel(timers);
    record.animation = None;
    record.item.set_target_progress(target);
    let to = record.item.target_progress();
    let from = record.item.display_progress();

    if (to - from).abs() < MIN_ANIMATED_DELTA || duration_ms == 0 {
        record.item.set_display_progress(to);
        if let Some(FollowUp::Decay { duration_ms }) = then {
            begin_animation(record, timers, slot, 0.0, duration_ms, started_at, None);
        }
        return;
    }

    record.animation = Some(ProgressAnimation {
        from,
        to,
        started_at_ms: started_at,
        duration_ms,
        then,
    });
    record.jobs.frame = timers.schedule_at(started_at, Job::Frame(slot));
}

/// Count down from full. A task below full eases back up first so the bar
/// never snaps.
fn start_countdown(
    record: &mut TaskRecord,
    timers: &mut TimerQueue<Job>,
    slot: TaskSlot,
    duration_ms: u64,
    refill_ms: u64,
    now: u64,
) {
    if record.item.display_progress() < 1.0 {
        begin_animation(
            record,
            timers,
            slot,
            1.0,
            refill_ms,
            now,
            Some(FollowUp::Decay { duration_ms }),
        );
    } else {
        begin_animation(record, timers, slot, 0.0, duration_ms, now, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::listener::EventLog;
    use crate::task::TaskPhase;

    fn manager() -> (IslandManager, ManualClock, EventLog) {
        let clock = ManualClock::new(0);
        let mut manager = IslandManager::new(
            DisplaySettings::default(),
            LifecycleTimings::default(),
            Rc::new(clock.clone()),
        );
        let log = EventLog::new();
        manager.add_listener(log.clone());
        (manager, clock, log)
    }

    fn step_to(manager: &mut IslandManager, clock: &ManualClock, until: u64, step: u64) {
        while clock.now_ms() < until {
            clock.advance(step.min(until - clock.now_ms()));
            manager.advance();
        }
    }

    #[test]
    fn switch_creation_inserts_at_front() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_switch("a", "A", true);
        manager.upsert_switch("b", "B", false);
        let ids: Vec<_> = manager.tasks().into_iter().map(|t| t.identifier).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn switch_update_keeps_position() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_switch("a", "A", true);
        manager.upsert_switch("b", "B", true);
        manager.upsert_switch("a", "A", false);
        let tasks = manager.tasks();
        assert_eq!(tasks[1].identifier, "a");
        assert_eq!(tasks[1].switch_state(), Some(false));
        assert_eq!(tasks[1].subtitle.as_deref(), Some("A|disabled"));
    }

    #[test]
    fn value_driven_progress_eases_to_target() {
        let (mut manager, clock, _log) = manager();
        manager.upsert_progress("dl", ProgressUpdate::new("Download").progress(0.8));
        assert_eq!(manager.task("dl").unwrap().display_progress(), 0.0);

        step_to(&mut manager, &clock, 200, 16);
        let mid = manager.task("dl").unwrap().display_progress();
        assert!(mid > 0.4 && mid < 0.8, "mid = {mid}");

        step_to(&mut manager, &clock, 416, 16);
        assert_eq!(manager.task("dl").unwrap().display_progress(), 0.8);
    }

    #[test]
    fn progress_frames_notify_but_switch_frames_do_not() {
        let (mut manager, clock, log) = manager();
        manager.upsert_switch("s", "S", true);
        log.take();
        step_to(&mut manager, &clock, 400, 16);
        let frames = log
            .take()
            .into_iter()
            .filter(|e| matches!(e, Event::TasksChanged(_)))
            .count();
        assert_eq!(frames, 0);

        step_to(&mut manager, &clock, 600, 16);
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e, Event::TasksChanged(_))));
    }

    #[test]
    fn decay_completion_enters_awaiting_data() {
        let (mut manager, clock, _log) = manager();
        manager.upsert_switch("s", "S", true);
        step_to(&mut manager, &clock, 520, 16);
        let task = manager.task("s").unwrap();
        assert_eq!(task.display_progress(), 0.0);
        assert_eq!(task.phase(), TaskPhase::AwaitingData);
    }

    #[test]
    fn value_driven_progress_goes_stale() {
        let (mut manager, clock, _log) = manager();
        manager.upsert_progress("up", ProgressUpdate::new("Upload").progress(0.5));
        step_to(&mut manager, &clock, 950, 50);
        assert!(!manager.task("up").unwrap().removing);
        step_to(&mut manager, &clock, 1000, 50);
        assert!(manager.task("up").unwrap().removing);
        step_to(&mut manager, &clock, 1500, 50);
        assert!(manager.task("up").is_none());
    }

    #[test]
    fn fresh_values_keep_progress_alive() {
        let (mut manager, clock, _log) = manager();
        for i in 0..6 {
            manager.upsert_progress("up", ProgressUpdate::new("Upload").progress(i as f32 / 5.0));
            step_to(&mut manager, &clock, (i + 1) * 600, 50);
        }
        assert!(!manager.task("up").unwrap().removing);
    }

    #[test]
    fn upsert_on_removing_task_is_ignored() {
        let (mut manager, clock, _log) = manager();
        manager.upsert_switch("s", "S", true);
        manager.remove("s");
        manager.upsert_switch("s", "S", false);
        let task = manager.task("s").unwrap();
        assert!(task.removing);
        assert_eq!(task.switch_state(), Some(true));

        step_to(&mut manager, &clock, 600, 50);
        assert!(manager.task("s").is_none());
        manager.upsert_switch("s", "S", false);
        assert_eq!(manager.task("s").unwrap().switch_state(), Some(false));
    }

    #[test]
    fn upsert_with_other_kind_is_ignored() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_switch("x", "X", true);
        manager.upsert_progress("x", ProgressUpdate::new("X").progress(0.5));
        assert_eq!(manager.task("x").unwrap().kind(), TaskKind::Switch);
        assert_eq!(manager.tasks().len(), 1);
    }

    #[test]
    fn zero_duration_is_evicted_on_next_sweep() {
        let (mut manager, clock, _log) = manager();
        manager.upsert_progress("p", ProgressUpdate::new("P").duration_ms(0));
        step_to(&mut manager, &clock, 250, 10);
        assert!(manager.task("p").unwrap().removing);
    }

    #[test]
    fn update_keeps_icon_when_none_given() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_progress(
            "p",
            ProgressUpdate::new("P").icon(IconRef::new("download")).duration_ms(5000),
        );
        manager.upsert_progress("p", ProgressUpdate::new("P2").subtitle("half"));
        let task = manager.task("p").unwrap();
        assert_eq!(task.icon(), Some(&IconRef::new("download")));
        assert_eq!(task.title, "P2");
        assert_eq!(task.subtitle.as_deref(), Some("half"));
    }

    #[test]
    fn expanded_event_fires_only_on_flip() {
        let (mut manager, _clock, log) = manager();
        manager.upsert_switch("a", "A", true);
        manager.upsert_switch("b", "B", true);
        manager.clear();
        let flips: Vec<bool> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::ExpandedStateChanged { expanded, .. } => Some(expanded),
                _ => None,
            })
            .collect();
        assert_eq!(flips, vec![true, false]);
    }

    #[test]
    fn config_change_publishes_only_config_event() {
        let (mut manager, _clock, log) = manager();
        manager.update_display_config(5.0, "Neo");
        let events = log.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::ConfigChanged { settings, .. } => {
                assert_eq!(settings.scale(), 2.0);
                assert_eq!(settings.label, "Neo");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn clear_cancels_every_timer() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_switch("a", "A", true);
        manager.upsert_progress("p", ProgressUpdate::new("P").progress(0.3));
        assert!(manager.stats().pending_timers > 0);
        manager.clear();
        assert_eq!(manager.stats().pending_timers, 0);
        assert!(manager.tasks().is_empty());
        assert!(!manager.is_expanded());
    }

    #[test]
    fn shutdown_detaches_listeners() {
        let (mut manager, _clock, log) = manager();
        manager.shutdown();
        log.take();
        manager.upsert_switch("a", "A", true);
        assert!(log.is_empty());
        assert_eq!(manager.stats().listeners, 0);
    }

    #[test]
    fn stats_count_hidden_progress() {
        let (mut manager, _clock, _log) = manager();
        manager.upsert_progress("p", ProgressUpdate::new("P").duration_ms(5000));
        manager.upsert_switch("s", "S", true);
        let stats = manager.stats();
        assert_eq!(stats.live, 2);
        assert_eq!(stats.hidden, 1);
        assert_eq!(stats.visible, 1);
    }
}
