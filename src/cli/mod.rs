pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::github::github_client::DEFAULT_API_URL;

/// Version your deployment configuration. Push it to GitHub Actions.
#[derive(Parser, Debug)]
#[command(name = "envsync", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration document to read
    #[arg(long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Directory holding configuration snapshots
    #[arg(long, global = true, default_value = "versions")]
    pub versions_dir: PathBuf,

    /// Audit log file (JSON lines)
    #[arg(long, global = true, default_value = ".envsync/audit.log")]
    pub audit_log: PathBuf,

    /// Do not record operations in the audit log
    #[arg(long, global = true)]
    pub no_audit: bool,

    /// Account that owns the target repositories
    #[arg(long, global = true, env = "GITHUB_OWNER")]
    pub owner: Option<String>,

    /// API token with access to Actions secrets and variables
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Snapshot the configuration and push one repository environment
    Apply {
        /// Repository to apply (skips the prompt)
        #[arg(long)]
        repo: Option<String>,
        /// Environment to apply (skips the prompt)
        #[arg(long)]
        env: Option<String>,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Show what an apply would upload, without contacting GitHub
    Plan {
        /// Repository to resolve
        #[arg(long)]
        repo: String,
        /// Environment to resolve
        #[arg(long)]
        env: String,
    },

    /// Verify the configuration document for dangling references and bad names
    Check,

    /// List stored configuration snapshots
    Versions {
        /// Print the original text of one snapshot
        #[arg(long, value_name = "HASH")]
        show: Option<String>,
    },

    /// Show operation history
    Log {
        /// Filter by repository
        #[arg(long)]
        repo: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },
}
