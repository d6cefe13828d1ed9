use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::http;
use super::types::{
    ApiError, CreateRotationRequest, CreateWorkstreamRequest, PlanResponse, Rotation, Team,
    UpdatePlanRequest, Workstream,
};
use super::Dashboard;

/// Fixed overall timeout per request, in seconds
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_user_agent() -> String {
    format!("mob-relay/{}", DEFAULT_VERSION)
}

/// HTTP client for one team on one dashboard.
pub struct DashboardClient {
    client: Client,
    base_url: Url,
    team: String,
    session_id: String,
}

impl DashboardClient {
    pub fn new(base_url: &str, team: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(build_user_agent())
            .build()
            .map_err(|e| ApiError::InvalidUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            team: team.to_string(),
            session_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    /// Build `<base>/api/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn workstream_endpoint(&self, branch: &str, tail: &[&str]) -> Url {
        let mut segments = vec!["teams", self.team.as_str(), "workstreams", branch];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("x-request-id", Uuid::new_v4().to_string())
            .header("x-request-session-id", &self.session_id)
    }
}

#[async_trait]
impl Dashboard for DashboardClient {
    async fn get_team(&self) -> Result<Option<Team>, ApiError> {
        let url = self.endpoint(&["teams", &self.team]);
        let endpoint = url.to_string();
        let response = http::send(self.request(reqwest::Method::GET, url), &endpoint).await?;
        match http::found(response).await? {
            Some(response) => http::json(response, &endpoint).await.map(Some),
            None => Ok(None),
        }
    }

    async fn create_workstream(&self, repo_url: &str, branch: &str) -> Result<Workstream, ApiError> {
        let url = self.endpoint(&["teams", &self.team, "workstreams"]);
        let endpoint = url.to_string();
        let request = self
            .request(reqwest::Method::POST, url)
            .json(&CreateWorkstreamRequest { repo_url, branch });
        let response = http::success(http::send(request, &endpoint).await?).await?;
        http::json(response, &endpoint).await
    }

    async fn get_workstream(&self, branch: &str) -> Result<Option<Workstream>, ApiError> {
        let url = self.workstream_endpoint(branch, &[]);
        let endpoint = url.to_string();
        let response = http::send(self.request(reqwest::Method::GET, url), &endpoint).await?;
        match http::found(response).await? {
            Some(response) => http::json(response, &endpoint).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_plan(&self, branch: &str) -> Result<Option<String>, ApiError> {
        let url = self.workstream_endpoint(branch, &["plan"]);
        let endpoint = url.to_string();
        let response = http::send(self.request(reqwest::Method::GET, url), &endpoint).await?;
        let Some(response) = http::found(response).await? else {
            return Ok(None);
        };

        let body = http::text(response, &endpoint).await?;
        let plan = match serde_json::from_str::<PlanResponse>(&body) {
            Ok(parsed) => parsed.plan_text.unwrap_or_default(),
            Err(_) => body,
        };
        Ok(Some(plan).filter(|p| !p.is_empty()))
    }

    async fn update_plan(&self, branch: &str, plan_text: &str) -> Result<(), ApiError> {
        let url = self.workstream_endpoint(branch, &["plan"]);
        let endpoint = url.to_string();
        let request = self
            .request(reqwest::Method::PUT, url)
            .json(&UpdatePlanRequest { plan_text });
        http::success(http::send(request, &endpoint).await?).await?;
        Ok(())
    }

    async fn create_rotation(
        &self,
        branch: &str,
        rotation: &CreateRotationRequest,
    ) -> Result<Rotation, ApiError> {
        let url = self.workstream_endpoint(branch, &["rotations"]);
        let endpoint = url.to_string();
        let request = self.request(reqwest::Method::POST, url).json(rotation);
        let response = http::success(http::send(request, &endpoint).await?).await?;
        http::json(response, &endpoint).await
    }

    async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["health"]);
        let endpoint = url.to_string();
        let response = http::send(self.request(reqwest::Method::GET, url), &endpoint).await?;
        http::success(response).await?;
        Ok(())
    }
}
