use serde::{Deserialize, Serialize};

use crate::settings::DisplaySettings;
use crate::task::TaskItem;

/// Consistent view of the task list after one mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListSnapshot {
    /// Visible tasks, priority rule applied, newest first.
    pub visible: Vec<TaskItem>,
    pub expanded: bool,
    /// All tasks still in the table, including removing and hidden ones.
    pub live_count: usize,
    pub at_ms: u64,
}

/// Every state change the manager publishes.
/// Listeners receive them as callbacks; [`crate::EventLog`] keeps them in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TasksChanged(TaskListSnapshot),
    ExpandedStateChanged {
        expanded: bool,
        at_ms: u64,
    },
    /// Cosmetic change only; task views are not rebuilt for it.
    ConfigChanged {
        settings: DisplaySettings,
        at_ms: u64,
    },
}

impl Event {
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::TasksChanged(snapshot) => snapshot.at_ms,
            Event::ExpandedStateChanged { at_ms, .. } | Event::ConfigChanged { at_ms, .. } => {
                *at_ms
            }
        }
    }
}
