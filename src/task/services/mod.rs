//! Application services for task lifecycle orchestration.

mod gate;
mod lifecycle;
mod outbox;
mod projection;
mod reconciler;

pub use gate::{GateDecision, GateStats, GateWatch, PhaseGateEvaluator};
pub use lifecycle::{CreateTaskRequest, LifecycleEngine, LifecycleError, LifecycleResult};
pub use outbox::ChangeOutbox;
pub use projection::{TaskRow, WHOLE_TEAM_LABEL, assignment_rows};
pub use reconciler::{DeadlineReconciler, overdue};
