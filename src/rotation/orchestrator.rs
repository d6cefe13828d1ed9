use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::RotationState;
use crate::api::{CreateRotationRequest, Dashboard, RotationDetails};
use crate::domain::{RotationSummary, SummaryContent};
use crate::error::{MobError, Result};
use crate::mob::{base_branch_of, MobTool};
use crate::plans::{reconcile, PlanStore, Reconciliation, RemotePlan};
use crate::session::{Session, SessionStore};
use crate::summary::{SummaryInput, SummarySynthesizer};

/// Commits included as context for the summary.
const RECENT_COMMITS: usize = 5;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub branch: Option<String>,
    pub mob_args: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HandoffRequest {
    pub note: String,
    pub skip_summary: bool,
    pub mob_args: Vec<String>,
}

#[derive(Debug)]
pub struct StartOutcome {
    pub session: Session,
    /// The git branch mob left us on, e.g. "mob/feature-x".
    pub git_branch: String,
    pub reconciliation: Option<Reconciliation>,
    pub registered: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct HandoffOutcome {
    pub summary: Option<RotationSummary>,
    pub summary_path: Option<PathBuf>,
    pub rotation_uploaded: bool,
    pub plan_pushed: bool,
    pub state: RotationState,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct DashboardStatus {
    pub health: std::result::Result<(), String>,
    pub registered: Option<bool>,
    pub active_workstreams: Option<usize>,
}

#[derive(Debug)]
pub struct StatusReport {
    pub mob_status: std::result::Result<String, String>,
    pub state: RotationState,
    pub session: Option<Session>,
    /// Why the session file could not be read, if it could not.
    pub session_error: Option<String>,
    pub branch: Option<String>,
    pub plan: Option<String>,
    pub latest_summary: Option<RotationSummary>,
    pub dashboard: Option<DashboardStatus>,
}

/// Records a non-fatal problem and carries on.
fn degrade(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

/// Drives the start / next / done lifecycle.
pub struct Orchestrator {
    mob: MobTool,
    plans: PlanStore,
    sessions: SessionStore,
    synthesizer: SummarySynthesizer,
    dashboard: Option<Box<dyn Dashboard>>,
    skip_summary: bool,
}

impl Orchestrator {
    pub fn new(
        mob: MobTool,
        plans: PlanStore,
        sessions: SessionStore,
        synthesizer: SummarySynthesizer,
        dashboard: Option<Box<dyn Dashboard>>,
    ) -> Self {
        Self {
            mob,
            plans,
            sessions,
            synthesizer,
            dashboard,
            skip_summary: false,
        }
    }

    /// Skip summary generation for every hand-off (the `skipSummary` setting).
    pub fn skip_summaries(mut self, skip: bool) -> Self {
        self.skip_summary = skip;
        self
    }

    #[allow(dead_code)]
    pub fn state(&self) -> Result<RotationState> {
        Ok(match self.sessions.current()? {
            Some(_) => RotationState::Active,
            None => RotationState::Idle,
        })
    }

    async fn driver_name(&self) -> String {
        if let Some(name) = self.mob.user_name().await {
            return name;
        }
        ["USER", "USERNAME"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Start or join a session and make the local plan authoritative.
    pub async fn start(&self, request: StartRequest) -> Result<StartOutcome> {
        self.mob.check_installed().await?;
        let mut warnings = Vec::new();

        match self.sessions.current() {
            Ok(Some(stale)) => degrade(
                &mut warnings,
                format!(
                    "replacing session for {} on {} started at {}",
                    stale.driver_name, stale.branch, stale.started_at
                ),
            ),
            Ok(None) => {}
            Err(e) => degrade(&mut warnings, format!("ignoring unreadable session: {}", e)),
        }

        info!("Starting mob session...");
        self.mob
            .start(request.branch.as_deref(), &request.mob_args)
            .await?;

        let git_branch = self.mob.current_branch().await?;
        let branch = base_branch_of(&git_branch);
        let repo_url = self.mob.repo_url().await.unwrap_or_else(|e| {
            debug!("No origin remote: {}", e);
            UNKNOWN.to_string()
        });

        let remote = match &self.dashboard {
            Some(dashboard) => {
                let remote = RemotePlan::from_fetch(dashboard.get_plan(&branch).await);
                if matches!(remote, RemotePlan::Present(_)) {
                    info!("Fetched plan from dashboard");
                }
                remote
            }
            None => RemotePlan::Absent,
        };

        let reconciliation = match reconcile(&self.plans, &branch, &remote) {
            Ok(outcome) => {
                warnings.extend(outcome.warnings.iter().cloned());
                Some(outcome)
            }
            Err(e) => {
                degrade(&mut warnings, format!("could not reconcile plan: {}", e));
                None
            }
        };

        let mut workstream_id = None;
        if let Some(dashboard) = &self.dashboard {
            match dashboard.create_workstream(&repo_url, &branch).await {
                Ok(workstream) => {
                    info!("Registered with dashboard as workstream {}", workstream.id);
                    workstream_id = Some(workstream.id);
                }
                Err(e) => degrade(
                    &mut warnings,
                    format!("could not register with dashboard: {}", e),
                ),
            }
        }

        let driver = self.driver_name().await;
        let registered = workstream_id.is_some();
        let session = self
            .sessions
            .begin(&branch, &repo_url, &driver, workstream_id)?;
        debug!("Rotation state: {} -> {}", RotationState::Idle, RotationState::Active);

        Ok(StartOutcome {
            session,
            git_branch,
            reconciliation,
            registered,
            warnings,
        })
    }

    /// Record this driver's rotation and hand off to the next driver.
    pub async fn next(&self, request: HandoffRequest) -> Result<HandoffOutcome> {
        self.mob.check_installed().await?;
        let session = self.sessions.current()?.ok_or(MobError::NoActiveSession)?;

        let mut outcome = self.hand_off(Some(&session), &request).await;

        self.sessions.clear()?;
        info!("Handing off to next driver...");
        self.mob.next(&request.mob_args).await?;

        outcome.state = RotationState::Idle;
        Ok(outcome)
    }

    /// Record a final rotation, if a session exists, and complete the
    /// mob session.
    pub async fn done(&self, request: HandoffRequest) -> Result<HandoffOutcome> {
        self.mob.check_installed().await?;
        let session = self.sessions.current()?;
        if session.is_none() {
            info!("No active session; completing without a summary");
        }

        let mut outcome = self.hand_off(session.as_ref(), &request).await;

        self.sessions.clear()?;
        info!("Completing mob session...");
        self.mob.done(&request.mob_args).await?;

        outcome.state = RotationState::Completed;
        Ok(outcome)
    }

    /// Summary, local record and remote upload. Nothing in here aborts.
    async fn hand_off(&self, session: Option<&Session>, request: &HandoffRequest) -> HandoffOutcome {
        let mut outcome = HandoffOutcome {
            summary: None,
            summary_path: None,
            rotation_uploaded: false,
            plan_pushed: false,
            state: RotationState::HandingOff,
            warnings: Vec::new(),
        };
        let Some(session) = session else {
            return outcome;
        };
        debug!("Rotation state: {} -> {}", RotationState::Active, RotationState::HandingOff);

        let content = self
            .summarize(session, request, &mut outcome.warnings)
            .await;
        let summary = RotationSummary::new(
            content,
            &session.driver_name,
            &request.note,
            &session.branch,
        );

        match self.plans.save_summary(&summary) {
            Ok(path) => outcome.summary_path = Some(path),
            Err(e) => degrade(&mut outcome.warnings, format!("could not save summary: {}", e)),
        }

        if let Some(dashboard) = &self.dashboard {
            self.publish(dashboard.as_ref(), session, &summary, &mut outcome)
                .await;
        }

        outcome.summary = Some(summary);
        outcome
    }

    async fn summarize(
        &self,
        session: &Session,
        request: &HandoffRequest,
        warnings: &mut Vec<String>,
    ) -> SummaryContent {
        if request.skip_summary || self.skip_summary {
            debug!("Summary generation skipped");
            return SummaryContent::note_only(&request.note);
        }

        info!("Generating rotation summary...");
        let diff = self.mob.diff_from_base().await.unwrap_or_else(|e| {
            degrade(warnings, format!("could not get diff: {}", e));
            String::new()
        });
        let commits = self.mob.recent_commits(RECENT_COMMITS).await.ok();

        let synthesis = self
            .synthesizer
            .synthesize(&SummaryInput {
                diff: &diff,
                driver_note: &request.note,
                branch: &session.branch,
                recent_commits: commits.as_deref(),
            })
            .await;
        if let Some(reason) = synthesis.degraded {
            warnings.push(reason);
        }
        synthesis.content
    }

    /// Upload the rotation and push the local plan over the remote one.
    async fn publish(
        &self,
        dashboard: &dyn Dashboard,
        session: &Session,
        summary: &RotationSummary,
        outcome: &mut HandoffOutcome,
    ) {
        let plan = match self.plans.load_plan(&session.branch) {
            Ok(plan) => plan.filter(|p| !p.is_empty()),
            Err(e) => {
                degrade(&mut outcome.warnings, format!("could not read plan: {}", e));
                None
            }
        };

        let rotation = CreateRotationRequest {
            driver_name: session.driver_name.clone(),
            driver_note: Some(summary.driver_note.clone()).filter(|n| !n.is_empty()),
            summary_tldr: Some(summary.tldr.clone()),
            summary_json: Some(RotationDetails {
                changes: summary.changes.clone(),
                next_steps: summary.next_steps.clone(),
            }),
            plan_snapshot: plan.clone(),
            started_at: session.started_at,
        };

        match dashboard.create_rotation(&session.branch, &rotation).await {
            Ok(recorded) => {
                info!("Rotation recorded in dashboard ({})", recorded.id);
                outcome.rotation_uploaded = true;
            }
            Err(e) => degrade(
                &mut outcome.warnings,
                format!("could not upload rotation: {}", e),
            ),
        }

        if let Some(plan) = plan {
            match dashboard.update_plan(&session.branch, &plan).await {
                Ok(()) => {
                    debug!("Plan pushed to dashboard");
                    outcome.plan_pushed = true;
                }
                Err(e) => degrade(&mut outcome.warnings, format!("could not sync plan: {}", e)),
            }
        }
    }

    /// Gather everything `status` shows. Read-only; never fails.
    pub async fn status(&self) -> StatusReport {
        let mob_status = self.mob.status().await.map_err(|e| e.to_string());
        let (session, session_error) = match self.sessions.current() {
            Ok(session) => (session, None),
            Err(e) => {
                warn!("could not read session: {}", e);
                (None, Some(e.to_string()))
            }
        };
        let state = if session.is_some() {
            RotationState::Active
        } else {
            RotationState::Idle
        };

        let branch = match &session {
            Some(session) => Some(session.branch.clone()),
            None => self.mob.base_branch().await.ok(),
        };

        let plan = branch.as_deref().and_then(|branch| {
            self.plans
                .load_plan(branch)
                .unwrap_or_else(|e| {
                    warn!("could not read plan: {}", e);
                    None
                })
                .filter(|p| !p.is_empty())
        });

        let latest_summary = self.plans.latest_summary().unwrap_or_else(|e| {
            warn!("could not list summaries: {}", e);
            None
        });

        let dashboard = match &self.dashboard {
            Some(dashboard) => {
                let health = dashboard.health().await.map_err(|e| e.to_string());
                let (registered, active_workstreams) = if health.is_ok() {
                    let registered = match &branch {
                        Some(branch) => dashboard
                            .get_workstream(branch)
                            .await
                            .ok()
                            .map(|ws| ws.is_some()),
                        None => None,
                    };
                    let active = dashboard.get_team().await.ok().flatten().map(|team| {
                        team.workstreams.iter().filter(|ws| ws.is_active).count()
                    });
                    (registered, active)
                } else {
                    (None, None)
                };
                Some(DashboardStatus {
                    health,
                    registered,
                    active_workstreams,
                })
            }
            None => None,
        };

        StatusReport {
            mob_status,
            state,
            session,
            session_error,
            branch,
            plan,
            latest_summary,
            dashboard,
        }
    }
}
