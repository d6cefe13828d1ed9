//! Remote dashboard gateway.
//!
//! The dashboard owns teams, workstreams (one per branch), plans and
//! rotation records. Every call is a single request with a fixed timeout;
//! callers decide whether a failure is fatal (it almost never is).

mod client;
mod http;
mod types;

use async_trait::async_trait;

pub use client::DashboardClient;
pub use types::{
    ApiError, CreateRotationRequest, Rotation, RotationDetails, Team, Workstream,
};

/// Client-observable contract of the dashboard, scoped to one team.
#[async_trait]
pub trait Dashboard: Send + Sync {
    /// The team and its workstreams; `None` for an unknown team.
    async fn get_team(&self) -> Result<Option<Team>, ApiError>;

    /// Register the branch, or fetch the existing registration.
    async fn create_workstream(&self, repo_url: &str, branch: &str) -> Result<Workstream, ApiError>;

    async fn get_workstream(&self, branch: &str) -> Result<Option<Workstream>, ApiError>;

    /// Remote plan text; `None` if the workstream or plan does not exist.
    async fn get_plan(&self, branch: &str) -> Result<Option<String>, ApiError>;

    /// Replace the remote plan.
    async fn update_plan(&self, branch: &str, plan_text: &str) -> Result<(), ApiError>;

    async fn create_rotation(
        &self,
        branch: &str,
        rotation: &CreateRotationRequest,
    ) -> Result<Rotation, ApiError>;

    /// Liveness probe.
    async fn health(&self) -> Result<(), ApiError>;
}
