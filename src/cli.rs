//! CLI argument parsing module for outdater

use clap::Parser;
use std::path::PathBuf;

/// Keeps a repository's dependencies up to date through pull requests
#[derive(Parser, Debug, Clone)]
#[command(
    name = "outdater",
    version,
    about = "Dependency update bot: discovers outdated dependencies and reconciles an update pull request"
)]
pub struct CliArgs {
    // Project options
    /// Path to the root manifest (default: package.json)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Ecosystem of the manifest (default: nodejs)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Package manager used to install after updating: yarn, npm, pnpm, bun, auto or none
    #[arg(long)]
    pub package_manager: Option<String>,

    /// Version checker: registry or ncu
    #[arg(long)]
    pub checker: Option<String>,

    /// npm registry base URL
    #[arg(long)]
    pub registry: Option<String>,

    /// Config file (default: ./outdater.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    // Git options
    /// Git remote to fetch from and push to (default: origin)
    #[arg(long)]
    pub remote: Option<String>,

    /// Base branch for new pull requests (default: from the environment)
    #[arg(long)]
    pub base: Option<String>,

    /// Commit id the run is keyed on (default: GITHUB_SHA)
    #[arg(long)]
    pub commit: Option<String>,

    /// Name used for update commits
    #[arg(long)]
    pub commit_name: Option<String>,

    /// Email used for update commits
    #[arg(long)]
    pub commit_email: Option<String>,

    // Hosting options
    /// Access token for the hosting API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Hosting API base URL (default: https://api.github.com)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    // General options
    /// Dry run mode - show what would be updated without writing or touching the remote
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Default log filter for the selected verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "outdater=debug"
        } else if self.quiet {
            "outdater=warn"
        } else {
            "outdater=info"
        }
    }
}
