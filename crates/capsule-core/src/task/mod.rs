//! Task model and the ordered task table.

mod model;
mod table;

pub use model::{
    clamp_unit, IconRef, ProgressDrive, SubtitleParts, TaskBody, TaskItem, TaskKind, TaskPhase,
    TaskRecord, SWITCH_TITLE,
};
pub(crate) use model::{FollowUp, ProgressAnimation};
pub use table::{TaskSlot, TaskTable};
