use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::ApiError;

/// Send a request exactly once. Retrying is left to the user.
pub(super) async fn send(request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
    debug!("=== API Request === {}", endpoint);
    let response = request.send().await.map_err(|source| ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;
    debug!("=== API Response === {} -> {}", endpoint, response.status());
    Ok(response)
}

/// Map a 404 to `None`, any other non-success to `ApiError::Status`.
pub(super) async fn found(response: Response) -> Result<Option<Response>, ApiError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    success(response).await.map(Some)
}

pub(super) async fn success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

pub(super) async fn text(response: Response, endpoint: &str) -> Result<String, ApiError> {
    response.text().await.map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

pub(super) async fn json<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, ApiError> {
    let body = text(response, endpoint).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
