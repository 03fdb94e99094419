//! CLI command implementations.
//!
//! Both commands share the same preamble: validate arguments, acquire the
//! scratch workspace, locate the module payload, spawn the shell session,
//! and import the modules. Each then issues its own operation and tears the
//! session down.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::info;

use crate::core::command::{self, DeployArgs};
use crate::io::modules::ModuleSource;
use crate::io::session::{PsSession, SessionConfig};
use crate::io::workspace;
use crate::manifest::{self, ModuleManifest};
use crate::sequence;

/// Environment fallback for the orchestrator password.
pub const PASSWORD_ENV: &str = "UIPACK_ORCH_PASSWORD";

/// Pack a project into a deployable package.
pub fn pack(
    project: &Path,
    output: &Path,
    package_version: Option<&str>,
    session_config: &SessionConfig,
) -> Result<()> {
    let project = project.to_string_lossy();
    let output = output.to_string_lossy();
    command::validate_param(Some(project.as_ref()), "project path")?;
    command::validate_param(Some(output.as_ref()), "output folder")?;

    let (workspace, source, manifest) = prepare()?;
    let mut session = PsSession::spawn(session_config)?;
    let result = sequence::import_modules(&mut session, &workspace, &source, &manifest).and_then(
        |()| sequence::generate_package(&mut session, &project, &output, package_version),
    );
    finish(session, result)
}

/// Deploy a package to an orchestrator using basic credentials.
pub fn deploy(
    orchestrator: &str,
    package: &Path,
    tenant: &str,
    username: &str,
    password: &str,
    session_config: &SessionConfig,
) -> Result<()> {
    let package = package.to_string_lossy();
    command::validate_param(Some(orchestrator), "orchestrator address")?;
    command::validate_param(Some(tenant), "orchestrator tenant")?;
    command::validate_param(Some(username), "orchestrator username")?;
    command::validate_param(Some(password), "orchestrator password")?;
    command::validate_param(Some(package.as_ref()), "package path")?;

    let (workspace, source, manifest) = prepare()?;
    let mut session = PsSession::spawn(session_config)?;
    let args = DeployArgs {
        orchestrator_url: orchestrator,
        tenant,
        username,
        password,
        package_path: package.as_ref(),
    };
    let result = sequence::import_modules(&mut session, &workspace, &source, &manifest)
        .and_then(|()| sequence::deploy_package(&mut session, &args));
    finish(session, result)
}

/// Resolve the deploy password from the flag or the environment.
pub fn resolve_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    std::env::var(PASSWORD_ENV).map_err(|_| {
        anyhow!("missing orchestrator password: pass --password or set {PASSWORD_ENV}")
    })
}

fn prepare() -> Result<(PathBuf, ModuleSource, ModuleManifest)> {
    let manifest = manifest::bundled()?;
    let workspace = workspace::acquire()?;
    let source = ModuleSource::locate(&manifest)?;
    info!(source = %source.path().display(), "module source located");
    Ok((workspace, source, manifest))
}

/// Close the session and print the operation's response on success. The
/// session is torn down on the error path too, so a failed run never leaves
/// a shell behind.
fn finish(session: PsSession, result: Result<String>) -> Result<()> {
    match result {
        Ok(response) => {
            session.close()?;
            println!("{response}");
            Ok(())
        }
        Err(err) => {
            let _ = session.close();
            Err(err)
        }
    }
}
