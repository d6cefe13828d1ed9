use anyhow::Result;

use super::print_warnings;
use crate::rotation::{HandoffOutcome, HandoffRequest, Orchestrator};

pub async fn run_next(
    orchestrator: &Orchestrator,
    message: String,
    skip_summary: bool,
    mob_args: Vec<String>,
) -> Result<()> {
    let outcome = orchestrator
        .next(HandoffRequest {
            note: message,
            skip_summary,
            mob_args,
        })
        .await?;

    print_outcome(&outcome);
    println!("\n✅ Handed off to the next driver");
    Ok(())
}

pub async fn run_done(
    orchestrator: &Orchestrator,
    message: String,
    skip_summary: bool,
    mob_args: Vec<String>,
) -> Result<()> {
    let outcome = orchestrator
        .done(HandoffRequest {
            note: message,
            skip_summary,
            mob_args,
        })
        .await?;

    print_outcome(&outcome);
    println!("\n✅ Mob session completed");
    Ok(())
}

fn print_outcome(outcome: &HandoffOutcome) {
    if let Some(summary) = &outcome.summary {
        println!("\n📝 {}", summary.tldr);
        for change in &summary.changes {
            println!("   - {}", change);
        }
        if !summary.next_steps.is_empty() {
            println!("   Next steps:");
            for step in &summary.next_steps {
                println!("   - {}", step);
            }
        }
    }
    if let Some(path) = &outcome.summary_path {
        println!("   Saved to {}", path.display());
    }
    if outcome.rotation_uploaded {
        println!("   Rotation recorded in dashboard");
    }
    print_warnings(&outcome.warnings);
}
