use anyhow::Result;

use super::print_warnings;
use crate::plans::PlanAction;
use crate::rotation::{Orchestrator, StartRequest};

pub async fn run_start(
    orchestrator: &Orchestrator,
    branch: Option<String>,
    mob_args: Vec<String>,
) -> Result<()> {
    let outcome = orchestrator.start(StartRequest { branch, mob_args }).await?;

    println!("\n✅ Mob session started on {}", outcome.git_branch);
    println!("   Driver: {}", outcome.session.driver_name);

    if let Some(reconciliation) = &outcome.reconciliation {
        let how = match reconciliation.action {
            PlanAction::CreateDefault => "created",
            PlanAction::AdoptRemote => "synced from dashboard",
            PlanAction::KeepLocal => "kept local copy",
            PlanAction::InSync => "in sync",
            PlanAction::OverwriteLocal => "replaced by dashboard copy",
        };
        println!("   Plan: {} ({})", reconciliation.plan_path.display(), how);
        if let Some(backup) = &reconciliation.displaced_local {
            println!("   Previous local plan: {}", backup.display());
        }
    }

    if outcome.registered {
        println!("   Dashboard: registered");
    }

    print_warnings(&outcome.warnings);
    Ok(())
}
