use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use wskit::RunAs;

#[derive(Parser)]
#[command(name = "wasctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative JDBC provider management for WebSphere", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Declarations file (defaults to the `declarations` setting)
    #[arg(short, long, global = true, env = "WASCTL_FILE")]
    pub file: Option<PathBuf>,

    /// Settings file (defaults to config.toml in the config directory)
    #[arg(long, global = true, env = "WASCTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check declarations without contacting WebSphere
    Validate(ValidateArgs),

    /// Show what apply would change
    Plan(PlanArgs),

    /// Create or remove JDBC providers to match the declarations
    Apply(ApplyArgs),

    /// Show outcomes recorded by previous runs
    Status(StatusArgs),

    /// Describe the attributes of each resource type
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

#[derive(Args)]
pub struct ValidateArgs {
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Options shared by commands that talk to wsadmin
#[derive(Args, Clone, Default)]
pub struct WsadminArgs {
    /// How to start wsadmin relative to the declared user: auto, sudo, never
    #[arg(long, value_name = "MODE")]
    pub run_as: Option<RunAs>,

    /// Attempts per wsadmin call when the deployment manager is unreachable
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Only plan matching providers: `jdbc_provider`, `jdbc_provider.<name>` or a name
    pub target: Option<String>,

    #[command(flatten)]
    pub wsadmin: WsadminArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only apply matching providers: `jdbc_provider`, `jdbc_provider.<name>` or a name
    pub target: Option<String>,

    /// Discover and report, but change nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of providers reconciled in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub wsadmin: WsadminArgs,

    /// Print machine-readable JSON (implies --yes)
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Only show matching providers
    pub target: Option<String>,

    /// Number of recent runs to list
    #[arg(long, default_value = "5")]
    pub runs: usize,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Resource type to describe (all when omitted)
    pub resource_type: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}
