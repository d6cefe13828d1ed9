//! In-memory collaborators for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::api::{ApiError, CreateRotationRequest, Dashboard, Rotation, Team, Workstream};
use crate::exec::{ExecError, Invocation, ProcessRunner};
use crate::summary::{BackendError, ContentGenerator, GenerationRequest};

fn key(invocation: &Invocation) -> String {
    std::iter::once(invocation.program.as_str())
        .chain(invocation.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scripted process runner. Unscripted captures fail, passthroughs succeed.
#[derive(Default)]
pub struct FakeRunner {
    responses: Mutex<HashMap<String, String>>,
    program_responses: Mutex<HashMap<String, String>>,
    missing: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the exact command line `command` with `stdout`.
    pub fn respond(&self, command: &str, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), stdout.to_string());
    }

    /// Answer any invocation of `program` with `stdout`.
    pub fn respond_program(&self, program: &str, stdout: &str) {
        self.program_responses
            .lock()
            .unwrap()
            .insert(program.to_string(), stdout.to_string());
    }

    /// Make `program` look uninstalled.
    pub fn missing(&self, program: &str) {
        self.missing.lock().unwrap().insert(program.to_string());
    }

    /// Make the exact command line `command` exit non-zero.
    pub fn fail(&self, command: &str) {
        self.failing.lock().unwrap().insert(command.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, command: &str) -> bool {
        self.calls().iter().any(|c| c == command)
    }

    fn check(&self, invocation: &Invocation) -> Result<String, ExecError> {
        let command = key(invocation);
        self.calls.lock().unwrap().push(command.clone());

        if self.missing.lock().unwrap().contains(&invocation.program) {
            return Err(ExecError::NotFound {
                program: invocation.program.clone(),
            });
        }
        if self.failing.lock().unwrap().contains(&command) {
            return Err(ExecError::Failed {
                program: invocation.program.clone(),
                status: "exit status: 1".to_string(),
                stderr: format!("{} failed", command),
            });
        }
        Ok(command)
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn capture(&self, invocation: &Invocation) -> Result<String, ExecError> {
        let command = self.check(invocation)?;
        if let Some(out) = self.responses.lock().unwrap().get(&command) {
            return Ok(out.clone());
        }
        if let Some(out) = self.program_responses.lock().unwrap().get(&invocation.program) {
            return Ok(out.clone());
        }
        Err(ExecError::Failed {
            program: invocation.program.clone(),
            status: "exit status: 128".to_string(),
            stderr: format!("unscripted: {}", command),
        })
    }

    async fn passthrough(&self, invocation: &Invocation) -> Result<(), ExecError> {
        self.check(invocation).map(|_| ())
    }
}

enum Behavior {
    Answer(String),
    Fail,
    Unavailable,
}

/// Canned content generator that records every request.
pub struct FakeGenerator {
    behavior: Behavior,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl FakeGenerator {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::with(Behavior::Answer(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(Behavior::Fail)
    }

    pub fn unavailable() -> Self {
        Self::with(Behavior::Unavailable)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            Behavior::Answer(text) => Ok(text.clone()),
            Behavior::Fail => Err(BackendError::Failed(ExecError::Failed {
                program: "claude".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "rate limited".to_string(),
            })),
            Behavior::Unavailable => Err(BackendError::Unavailable("claude".to_string())),
        }
    }
}

#[derive(Default)]
pub struct DashboardState {
    pub plans: HashMap<String, String>,
    pub workstreams: HashMap<String, Workstream>,
    pub rotations: Vec<(String, CreateRotationRequest)>,
    pub plan_updates: Vec<(String, String)>,
    pub plan_fetches: usize,
    pub unreachable: bool,
}

/// In-memory dashboard. Clones share state, so a test can keep a handle
/// after boxing one into the orchestrator.
#[derive(Clone, Default)]
pub struct FakeDashboard {
    state: Arc<Mutex<DashboardState>>,
}

impl FakeDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(self, branch: &str, plan: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .plans
            .insert(branch.to_string(), plan.to_string());
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, DashboardState>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(ApiError::Status {
                status: 502,
                body: "dashboard unreachable".to_string(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl Dashboard for FakeDashboard {
    async fn get_team(&self) -> Result<Option<Team>, ApiError> {
        let state = self.guard()?;
        Ok(Some(Team {
            id: "team-1".to_string(),
            name: "otters".to_string(),
            display_name: None,
            workstreams: state.workstreams.values().cloned().collect(),
        }))
    }

    async fn create_workstream(&self, repo_url: &str, branch: &str) -> Result<Workstream, ApiError> {
        let mut state = self.guard()?;
        let next_id = format!("ws-{}", state.workstreams.len() + 1);
        let ws = state
            .workstreams
            .entry(branch.to_string())
            .or_insert_with(|| Workstream {
                id: next_id,
                team_id: Some("team-1".to_string()),
                repo_url: repo_url.to_string(),
                branch: branch.to_string(),
                plan_text: None,
                is_active: true,
            });
        Ok(ws.clone())
    }

    async fn get_workstream(&self, branch: &str) -> Result<Option<Workstream>, ApiError> {
        Ok(self.guard()?.workstreams.get(branch).cloned())
    }

    async fn get_plan(&self, branch: &str) -> Result<Option<String>, ApiError> {
        let mut state = self.guard()?;
        state.plan_fetches += 1;
        Ok(state.plans.get(branch).cloned())
    }

    async fn update_plan(&self, branch: &str, plan_text: &str) -> Result<(), ApiError> {
        let mut state = self.guard()?;
        state
            .plans
            .insert(branch.to_string(), plan_text.to_string());
        state
            .plan_updates
            .push((branch.to_string(), plan_text.to_string()));
        Ok(())
    }

    async fn create_rotation(
        &self,
        branch: &str,
        rotation: &CreateRotationRequest,
    ) -> Result<Rotation, ApiError> {
        let mut state = self.guard()?;
        state
            .rotations
            .push((branch.to_string(), rotation.clone()));
        Ok(Rotation {
            id: format!("rot-{}", state.rotations.len()),
            workstream_id: state.workstreams.get(branch).map(|w| w.id.clone()),
            driver_name: rotation.driver_name.clone(),
            summary_tldr: rotation.summary_tldr.clone(),
        })
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.guard().map(|_| ())
    }
}
