mod config;
mod handoff;
mod start;
mod status;

pub use config::{set_config, show_config};
pub use handoff::{run_done, run_next};
pub use start::run_start;
pub use status::run_status;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{Dashboard, DashboardClient};
use crate::cli::ProjectLayout;
use crate::config::Config;
use crate::exec::{ProcessRunner, SystemRunner};
use crate::mob::MobTool;
use crate::plans::PlanStore;
use crate::rotation::Orchestrator;
use crate::session::SessionStore;
use crate::summary::{ClaudeCli, SummarySynthesizer};

/// Wire the orchestrator to the real processes, files and dashboard.
pub fn build_orchestrator(layout: &ProjectLayout, config: &Config) -> Orchestrator {
    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemRunner::new(layout.root()));

    let dashboard: Option<Box<dyn Dashboard>> = if config.remote_enabled() {
        match DashboardClient::new(&config.api_url, &config.team_name) {
            Ok(client) => {
                debug!("Using dashboard {} for team {}", config.api_url, client.team());
                Some(Box::new(client))
            }
            Err(e) => {
                warn!("Dashboard disabled: {}", e);
                None
            }
        }
    } else {
        debug!("No team configured, running without dashboard");
        None
    };

    let synthesizer = SummarySynthesizer::new(
        Box::new(ClaudeCli::new(runner.clone())),
        &config.model,
        config.max_turns,
    );

    Orchestrator::new(
        MobTool::new(runner),
        PlanStore::new(layout),
        SessionStore::new(layout.session_path()),
        synthesizer,
        dashboard,
    )
    .skip_summaries(config.skip_summary)
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n⚠️  Completed with {} warning(s):", warnings.len());
    for warning in warnings {
        println!("   - {}", warning);
    }
}
