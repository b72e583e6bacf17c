//! Work-order domain module.
//!
//! # Module Structure
//!
//! - `model`: `WorkOrder` and its value objects (`Stage`, `SubState`, `Priority`, ...)
//! - `projection`: pure board derivation (stage buckets, filters, counts)
//! - `transition`: the stage-transition form and its technician guard
//! - `repository`: `WorkOrderGateway` trait for the work-order endpoints

mod model;
pub mod projection;
pub mod repository;
pub mod transition;

pub use model::{
    Client, DetailLine, Device, Priority, Stage, SubState, Totals, WorkOrder, WorkOrderId,
    WorkTask,
};
pub use projection::{
    BoardView, DUE_SOON_WINDOW_DAYS, FilterState, StageBuckets, StageCounts, StageKey,
    apply_filters, board_view, count_by_stage, is_due_soon, project_by_stage,
};
pub use repository::WorkOrderGateway;
pub use transition::{MoveRequest, TransitionError, TransitionForm};
