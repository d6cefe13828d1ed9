//! Plan documents and rotation summaries on local storage, plus the
//! reconciliation that keeps the local plan in step with the dashboard.

mod reconcile;
mod store;

pub use reconcile::{reconcile, PlanAction, Reconciliation, RemotePlan};
pub use store::PlanStore;
