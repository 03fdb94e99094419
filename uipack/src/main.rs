//! PowerShell-backed pack-and-deploy helper for UiPath automation projects.
//!
//! Extracts the bundled UiPath PowerShell modules into a scratch workspace,
//! imports them into a `pwsh` session, and drives the `Pack`/`Deploy`
//! commands they provide.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use uipack::cli;
use uipack::io::session::SessionConfig;
use uipack::logging;

#[derive(Parser)]
#[command(
    name = "uipack",
    version,
    about = "Pack and deploy automation projects through PowerShell"
)]
struct Cli {
    /// Shell executable to drive.
    #[arg(long, global = true, default_value = "pwsh")]
    shell: String,

    /// Upper bound on one shell command round-trip, in seconds.
    #[arg(long, global = true, default_value_t = 600)]
    command_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack a project into a deployable package.
    Pack {
        /// Path to the project's `project.json`.
        #[arg(long)]
        project: PathBuf,
        /// Directory to write the package into.
        #[arg(long)]
        output: PathBuf,
        /// Override the version recorded in the project.
        #[arg(long)]
        package_version: Option<String>,
    },
    /// Deploy a package to an orchestrator.
    Deploy {
        /// Orchestrator base URL.
        #[arg(long)]
        orchestrator: String,
        /// Path to the package to deploy.
        #[arg(long)]
        package: PathBuf,
        /// Orchestrator tenant.
        #[arg(long)]
        tenant: String,
        /// Orchestrator username.
        #[arg(long)]
        username: String,
        /// Orchestrator password; falls back to `UIPACK_ORCH_PASSWORD`.
        #[arg(long)]
        password: Option<String>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let session_config = SessionConfig {
        program: cli.shell,
        command_timeout: Duration::from_secs(cli.command_timeout_secs),
    };
    match cli.command {
        Command::Pack {
            project,
            output,
            package_version,
        } => cli::pack(
            &project,
            &output,
            package_version.as_deref(),
            &session_config,
        ),
        Command::Deploy {
            orchestrator,
            package,
            tenant,
            username,
            password,
        } => {
            let password = cli::resolve_password(password)?;
            cli::deploy(
                &orchestrator,
                &package,
                &tenant,
                &username,
                &password,
                &session_config,
            )
        }
    }
}
