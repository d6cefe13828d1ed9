//! Dashboard request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The dashboard's view of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workstream {
    pub id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub repo_url: String,
    pub branch: String,
    #[serde(default)]
    pub plan_text: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub workstreams: Vec<Workstream>,
}

/// A rotation as recorded by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    pub id: String,
    #[serde(default)]
    pub workstream_id: Option<String>,
    pub driver_name: String,
    #[serde(default)]
    pub summary_tldr: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateWorkstreamRequest<'a> {
    pub repo_url: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePlanRequest<'a> {
    pub plan_text: &'a str,
}

/// Either shape the plan endpoint may answer with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlanResponse {
    #[serde(default)]
    pub plan_text: Option<String>,
}

/// Structured part of a rotation upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationDetails {
    pub changes: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Payload for recording a rotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRotationRequest {
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_tldr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_json: Option<RotationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_snapshot: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// Dashboard call failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid dashboard URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ApiError {
    #[allow(dead_code)]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
