use clap::{Parser, Subcommand};

/// mob-relay - mob programming rotations with shared plans and rotation summaries
#[derive(Parser)]
#[command(name = "mob-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (auto-detects git root if absent)
    #[arg(long, global = true)]
    pub project_root: Option<String>,

    /// Dashboard base URL (overrides apiUrl from config)
    #[arg(long, global = true, env = "MOB_RELAY_API_URL")]
    pub api_url: Option<String>,

    /// Dashboard team name (overrides teamName from config)
    #[arg(long, global = true, env = "MOB_RELAY_TEAM")]
    pub team: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start or join a mob session and sync the plan
    Start {
        /// Branch to start or join
        #[arg(short, long)]
        branch: Option<String>,

        /// Extra arguments passed through to `mob start`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        mob_args: Vec<String>,
    },
    /// Record a rotation summary and hand off to the next driver
    Next {
        /// Note for the next driver
        #[arg(short, long, default_value = "")]
        message: String,

        /// Skip AI summary generation
        #[arg(long)]
        skip_summary: bool,

        /// Extra arguments passed through to `mob next` (after `--`)
        #[arg(last = true)]
        mob_args: Vec<String>,
    },
    /// Record a final summary and complete the mob session
    Done {
        /// Final note for the session
        #[arg(short, long, default_value = "")]
        message: String,

        /// Skip AI summary generation
        #[arg(long)]
        skip_summary: bool,

        /// Extra arguments passed through to `mob done` (after `--`)
        #[arg(last = true)]
        mob_args: Vec<String>,
    },
    /// Show the mob status, session, plan and latest summary
    Status,
    /// View or update configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Set a configuration value (apiUrl, teamName, model, maxTurns, skipSummary)
    Set { key: String, value: String },
}
