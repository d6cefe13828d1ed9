use anyhow::Result;

use crate::rotation::Orchestrator;

/// Plan lines shown by `status`.
const PLAN_PREVIEW_LINES: usize = 20;

pub async fn run_status(orchestrator: &Orchestrator) -> Result<()> {
    let report = orchestrator.status().await;

    println!("=== Mob Status ===");
    match &report.mob_status {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => println!("⚠️  {}", e),
    }

    println!("\n=== Session ({}) ===", report.state);
    match &report.session {
        Some(session) => {
            println!("Branch: {}", session.branch);
            println!("Driver: {}", session.driver_name);
            println!("Started: {}", session.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
            if let Some(id) = &session.workstream_id {
                println!("Workstream: {}", id);
            }
        }
        None => match &report.session_error {
            Some(e) => println!("⚠️  Session file unreadable: {}", e),
            None => println!("No active session"),
        },
    }

    if let Some(plan) = &report.plan {
        println!("\n=== Plan ===");
        let total = plan.lines().count();
        for line in plan.lines().take(PLAN_PREVIEW_LINES) {
            println!("{}", line);
        }
        if total > PLAN_PREVIEW_LINES {
            println!("... ({} more lines)", total - PLAN_PREVIEW_LINES);
        }
    } else if let Some(branch) = &report.branch {
        println!("\nNo plan for {}", branch);
    }

    if let Some(summary) = &report.latest_summary {
        println!("\n=== Last Rotation ===");
        println!(
            "{} ({}): {}",
            summary.driver_name,
            summary.timestamp.format("%Y-%m-%d %H:%M"),
            summary.tldr
        );
        if !summary.driver_note.is_empty() {
            println!("Note: {}", summary.driver_note);
        }
        for step in &summary.next_steps {
            println!("  → {}", step);
        }
    }

    if let Some(dashboard) = &report.dashboard {
        println!("\n=== Dashboard ===");
        match &dashboard.health {
            Ok(()) => println!("✅ Reachable"),
            Err(e) => println!("❌ Unreachable: {}", e),
        }
        match dashboard.registered {
            Some(true) => println!("   Workstream registered"),
            Some(false) => println!("   Workstream not registered"),
            None => {}
        }
        if let Some(active) = dashboard.active_workstreams {
            println!("   Active workstreams: {}", active);
        }
    }

    Ok(())
}
