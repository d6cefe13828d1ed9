use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod atomic;
mod cli;
mod command;
mod config;
mod domain;
mod error;
mod exec;
mod mob;
mod plans;
mod rotation;
mod session;
mod summary;
#[cfg(test)]
mod testing;

use cli::{Cli, Commands, ConfigAction, ProjectLayout};
use config::ConfigStore;
use error::MobError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Err(e) if is_precondition(&e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        result => result,
    }
}

/// Missing mob tool or session: a short message, no error chain.
fn is_precondition(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<MobError>()
        .is_some_and(MobError::is_hard_precondition)
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command specified, show help
        eprintln!("No command specified. Use --help for usage information.");
        eprintln!("Use 'mob-relay start' to start or join a mob session.");
        return Ok(());
    };

    let layout = ProjectLayout::new(cli::resolve_project_root(cli.project_root)?);
    let config_store = ConfigStore::new(layout.config_path());

    let config = || {
        config_store
            .load_or_default()
            .with_overrides(cli.api_url.clone(), cli.team.clone())
    };

    match command {
        Commands::Config { action } => match action {
            ConfigAction::Show => command::show_config(&config_store, &config())?,
            ConfigAction::Set { key, value } => command::set_config(&config_store, &key, &value)?,
        },
        Commands::Start { branch, mob_args } => {
            let orchestrator = command::build_orchestrator(&layout, &config());
            command::run_start(&orchestrator, branch, mob_args).await?;
        }
        Commands::Next {
            message,
            skip_summary,
            mob_args,
        } => {
            let orchestrator = command::build_orchestrator(&layout, &config());
            command::run_next(&orchestrator, message, skip_summary, mob_args).await?;
        }
        Commands::Done {
            message,
            skip_summary,
            mob_args,
        } => {
            let orchestrator = command::build_orchestrator(&layout, &config());
            command::run_done(&orchestrator, message, skip_summary, mob_args).await?;
        }
        Commands::Status => {
            let orchestrator = command::build_orchestrator(&layout, &config());
            command::run_status(&orchestrator).await?;
        }
    }

    Ok(())
}
