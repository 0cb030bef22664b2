//! # Capsule Core Library
//!
//! This library provides the core logic for Capsule, a transient-notification
//! island: a small persistent capsule that shows ambient status and morphs
//! into an expanded list of short-lived tasks (switch toggles, progress
//! indicators) that animate and expire on their own.
//!
//! ## Architecture
//!
//! - **Lifecycle manager**: owns the ordered task table and decides when a
//!   task is created, how its progress eases or decays, and when it is
//!   evicted. Single-threaded and cooperative: the host calls `advance()`
//!   (or `Island::tick()`) from its event loop
//! - **Timers**: every wait is an entry in a `TimerQueue`, cancellable through
//!   an owned `TimerHandle`
//! - **Render**: a reconciler that patches or rebuilds item views, the capsule
//!   morph, and the collapsed summary with its fps readout
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`IslandManager`]: task lifecycle state machine
//! - [`Island`]: collaborator-facing handle wiring the manager to the view
//! - [`IslandListener`]: trait for observing task list and config changes
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod island;
pub mod listener;
pub mod manager;
pub mod render;
pub mod settings;
pub mod storage;
pub mod task;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ListenerError};
pub use events::{Event, TaskListSnapshot};
pub use island::Island;
pub use listener::{DispatchReport, EventLog, IslandListener, ListenerId, ListenerResult};
pub use manager::{IslandManager, ManagerStats, ProgressUpdate};
pub use render::{IslandFrame, IslandView, ItemFrame, ReconcileStats};
pub use settings::DisplaySettings;
pub use storage::Config;
pub use task::{IconRef, ProgressDrive, SubtitleParts, TaskBody, TaskItem, TaskKind, TaskPhase};
pub use timer::LifecycleTimings;
