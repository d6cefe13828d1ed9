//! Text-generation backends.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::exec::{ExecError, Invocation, ProcessRunner};

const CLAUDE_PROGRAM: &str = "claude";

/// Upper bound on one backend run.
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} not found in PATH")]
    Unavailable(String),

    #[error("generation backend failed: {0}")]
    Failed(#[source] ExecError),
}

/// What the backend is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub max_turns: u32,
}

/// Content-generation capability.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// Runs the `claude` CLI in print mode.
pub struct ClaudeCli {
    runner: Arc<dyn ProcessRunner>,
}

impl ClaudeCli {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    fn invocation(request: &GenerationRequest) -> Invocation {
        Invocation::new(
            CLAUDE_PROGRAM,
            [
                "-p".to_string(),
                request.prompt.clone(),
                "--model".to_string(),
                request.model.clone(),
                "--max-turns".to_string(),
                request.max_turns.to_string(),
                "--output-format".to_string(),
                "text".to_string(),
            ],
        )
        .with_timeout(BACKEND_TIMEOUT)
    }
}

#[async_trait]
impl ContentGenerator for ClaudeCli {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.runner
            .capture(&Self::invocation(request))
            .await
            .map_err(|e| match e {
                ExecError::NotFound { program } => BackendError::Unavailable(program),
                other => BackendError::Failed(other),
            })
    }
}
