//! View layer: reconciliation, capsule morph and the collapsed summary.

pub mod layout;
mod morph;
mod reconciler;
mod summary;
mod view;

pub use morph::{CapsuleMorph, CapsuleShape, ContentFade, FadeState};
pub use reconciler::{
    ItemView, ProgressItemView, ReconcileOutcome, ReconcileStats, Reconciler, SwitchItemView,
};
pub use summary::{CollapsedSummary, FpsGlyph, FpsMeter, SummaryFrame, PRODUCT_LABEL};
pub use view::{IslandFrame, IslandView, ItemFrame};
