//! Listener registration and isolated dispatch.
//!
//! A listener that returns an error or panics is logged and skipped; the
//! remaining listeners still see the notification and manager state is
//! untouched.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{error, warn};

use crate::error::ListenerError;
use crate::events::{Event, TaskListSnapshot};
use crate::settings::DisplaySettings;

pub type ListenerResult = Result<(), ListenerError>;

/// Callbacks delivered on the manager's event loop turn.
///
/// Callbacks cannot reach back into the manager; they get everything they
/// need in the arguments.
pub trait IslandListener {
    /// Used in log lines.
    fn name(&self) -> &str {
        "listener"
    }

    fn on_tasks_changed(&mut self, _snapshot: &TaskListSnapshot) -> ListenerResult {
        Ok(())
    }

    fn on_expanded_state_changed(&mut self, _expanded: bool, _at_ms: u64) -> ListenerResult {
        Ok(())
    }

    fn on_config_changed(&mut self, _settings: &DisplaySettings, _at_ms: u64) -> ListenerResult {
        Ok(())
    }
}

/// Shared listener. A re-entrant notification (the cell already borrowed)
/// is reported as a listener error instead of panicking.
impl<L: IslandListener> IslandListener for Rc<RefCell<L>> {
    fn name(&self) -> &str {
        "shared"
    }

    fn on_tasks_changed(&mut self, snapshot: &TaskListSnapshot) -> ListenerResult {
        borrow(self)?.on_tasks_changed(snapshot)
    }

    fn on_expanded_state_changed(&mut self, expanded: bool, at_ms: u64) -> ListenerResult {
        borrow(self)?.on_expanded_state_changed(expanded, at_ms)
    }

    fn on_config_changed(&mut self, settings: &DisplaySettings, at_ms: u64) -> ListenerResult {
        borrow(self)?.on_config_changed(settings, at_ms)
    }
}

fn borrow<L>(cell: &Rc<RefCell<L>>) -> Result<std::cell::RefMut<'_, L>, ListenerError> {
    cell.try_borrow_mut()
        .map_err(|_| ListenerError::new("shared", "listener is already borrowed"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of delivering one event to every listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: Vec<(ListenerId, Box<dyn IslandListener>)>,
    next_id: u64,
}

impl ListenerSet {
    pub fn add(&mut self, listener: Box<dyn IslandListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn dispatch(&mut self, event: &Event) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (_, listener) in self.entries.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| deliver(listener.as_mut(), event)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!(listener = listener.name(), error = %err, "listener returned an error");
                }
                Err(panic) => {
                    report.failed += 1;
                    error!(
                        listener = listener.name(),
                        panic = %panic_message(&panic),
                        "listener panicked"
                    );
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

fn deliver(listener: &mut dyn IslandListener, event: &Event) -> ListenerResult {
    match event {
        Event::TasksChanged(snapshot) => listener.on_tasks_changed(snapshot),
        Event::ExpandedStateChanged { expanded, at_ms } => {
            listener.on_expanded_state_changed(*expanded, *at_ms)
        }
        Event::ConfigChanged { settings, at_ms } => listener.on_config_changed(settings, *at_ms),
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Listener that keeps every event, in delivery order. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Remove and return everything logged so far.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn last_snapshot(&self) -> Option<TaskListSnapshot> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            Event::TasksChanged(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl IslandListener for EventLog {
    fn name(&self) -> &str {
        "event-log"
    }

    fn on_tasks_changed(&mut self, snapshot: &TaskListSnapshot) -> ListenerResult {
        self.push(Event::TasksChanged(snapshot.clone()));
        Ok(())
    }

    fn on_expanded_state_changed(&mut self, expanded: bool, at_ms: u64) -> ListenerResult {
        self.push(Event::ExpandedStateChanged { expanded, at_ms });
        Ok(())
    }

    fn on_config_changed(&mut self, settings: &DisplaySettings, at_ms: u64) -> ListenerResult {
        self.push(Event::ConfigChanged {
            settings: settings.clone(),
            at_ms,
        });
        Ok(())
    }
}
