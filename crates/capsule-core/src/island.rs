//! Collaborator-facing island handle.
//!
//! An [`Island`] owns a lifecycle manager and the view wired to it while it
//! is showing. Hiding tears both down; commands sent to a hidden island are
//! dropped. Display settings survive a hide/show cycle.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::listener::{IslandListener, ListenerId};
use crate::manager::{IslandManager, ManagerStats, ProgressUpdate};
use crate::render::{FpsMeter, IslandFrame, IslandView};
use crate::settings::DisplaySettings;
use crate::storage::Config;
use crate::task::TaskItem;
use crate::timer::LifecycleTimings;

struct Session {
    manager: IslandManager,
    view: Rc<RefCell<IslandView>>,
}

pub struct Island {
    settings: DisplaySettings,
    timings: LifecycleTimings,
    clock: Rc<dyn Clock>,
    session: Option<Session>,
    fps: FpsMeter,
}

impl std::fmt::Debug for Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Island")
            .field("settings", &self.settings)
            .field("showing", &self.is_showing())
            .finish()
    }
}

impl Island {
    /// A showing island on the wall clock.
    pub fn create(initial_scale: f32, initial_label: impl Into<String>) -> Self {
        Self::with_clock(
            DisplaySettings::new(initial_scale, initial_label),
            LifecycleTimings::default(),
            Rc::new(SystemClock),
        )
    }

    /// A showing island on `clock`.
    pub fn with_clock(
        settings: DisplaySettings,
        timings: LifecycleTimings,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let mut island = Self::hidden(settings, timings, clock);
        island.show();
        island
    }

    /// Built from configuration; shown only if `island.enabled` is set.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_clock(config, Rc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &Config, clock: Rc<dyn Clock>) -> Self {
        let mut island = Self::hidden(config.display_settings(), config.timings.clone(), clock);
        if config.island.enabled {
            island.show();
        }
        island
    }

    fn hidden(settings: DisplaySettings, timings: LifecycleTimings, clock: Rc<dyn Clock>) -> Self {
        Self {
            settings,
            timings,
            clock,
            session: None,
            fps: FpsMeter::new(),
        }
    }

    pub fn show(&mut self) {
        if self.session.is_some() {
            return;
        }
        let mut manager = IslandManager::new(
            self.settings.clone(),
            self.timings.clone(),
            Rc::clone(&self.clock),
        );
        let view = Rc::new(RefCell::new(IslandView::new(self.settings.clone())));
        manager.add_listener(Rc::clone(&view));
        self.fps = FpsMeter::new();
        self.session = Some(Session { manager, view });
        debug!(scale = self.settings.scale(), label = %self.settings.label, "island shown");
    }

    pub fn hide(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.manager.shutdown();
            debug!("island hidden");
        }
    }

    pub fn is_showing(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.manager.is_expanded())
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn upsert_switch(&mut self, identifier: &str, label: &str, state: bool) {
        if let Some(session) = self.session.as_mut() {
            session.manager.upsert_switch(identifier, label, state);
        }
    }

    pub fn upsert_progress(&mut self, identifier: &str, update: ProgressUpdate) {
        if let Some(session) = self.session.as_mut() {
            session.manager.upsert_progress(identifier, update);
        }
    }

    pub fn remove_task(&mut self, identifier: &str) {
        if let Some(session) = self.session.as_mut() {
            session.manager.remove(identifier);
        }
    }

    pub fn hide_all(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.manager.hide_all();
        }
    }

    /// Kept across hide/show even while hidden.
    pub fn update_display_config(&mut self, scale: f32, label: impl Into<String>) {
        self.settings.set_scale(scale);
        self.settings.label = label.into();
        if let Some(session) = self.session.as_mut() {
            session
                .manager
                .update_display_config(self.settings.scale(), self.settings.label.clone());
        }
    }

    /// Register an extra listener. `None` while hidden.
    pub fn add_listener(&mut self, listener: impl IslandListener + 'static) -> Option<ListenerId> {
        self.session
            .as_mut()
            .map(|session| session.manager.add_listener(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.manager.remove_listener(id))
    }

    /// Count one host frame; feeds the collapsed fps readout.
    pub fn report_frame(&mut self) -> Option<u32> {
        let session = self.session.as_ref()?;
        let now = self.clock.now_ms();
        let fps = self.fps.record_frame(now)?;
        session.view.borrow_mut().set_fps(fps, now);
        Some(fps)
    }

    /// Run due callbacks and sample the view. `None` while hidden.
    pub fn tick(&mut self) -> Option<IslandFrame> {
        let session = self.session.as_mut()?;
        session.manager.advance();
        let now = self.clock.now_ms();
        let frame = session.view.borrow().frame(now);
        Some(frame)
    }

    pub fn next_due_ms(&mut self) -> Option<u64> {
        self.session
            .as_mut()
            .and_then(|session| session.manager.next_due_ms())
    }

    pub fn visible_tasks(&self) -> Vec<TaskItem> {
        self.session
            .as_ref()
            .map(|session| session.manager.visible_tasks())
            .unwrap_or_default()
    }

    pub fn tasks(&self) -> Vec<TaskItem> {
        self.session
            .as_ref()
            .map(|session| session.manager.tasks())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Option<ManagerStats> {
        self.session.as_ref().map(|session| session.manager.stats())
    }

    pub fn view(&self) -> Option<Ref<'_, IslandView>> {
        self.session.as_ref().map(|session| session.view.borrow())
    }
}

impl Drop for Island {
    fn drop(&mut self) {
        self.hide();
    }
}
