//! Fixed command sequences issued through a [`Session`].
//!
//! Each operation is a linear template: issue a command, check its status,
//! stop at the first failure. A failure carries the operation's context
//! message plus the raw shell response; effects already applied (an
//! imported module, a written package) are not rolled back.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::core::command::{self, DeployArgs};
use crate::io::modules::ModuleSource;
use crate::io::session::{PsOutput, Session};
use crate::manifest::ModuleManifest;

/// Module manifest files imported from the version-specific extensions
/// directory, in import order.
const MODULE_MANIFESTS: [&str; 2] = [
    "RobotExecutor-PublicModule.psd1",
    "UiPathPackage-Module.psd1",
];

/// Issue `cmd` and fail with `context` plus the raw response on failure.
fn run_checked<S: Session>(session: &mut S, cmd: &str, context: &str) -> Result<PsOutput> {
    let output = session.execute(cmd)?;
    if !output.success() {
        bail!("{context}: {}", output.text);
    }
    Ok(output)
}

/// Materialize the bundled modules into `workspace` and import them.
///
/// Sequence: `cd` into the workspace, copy the module payload in, then
/// force-import the two extension module manifests.
#[instrument(skip_all, fields(workspace = %workspace.display()))]
pub fn import_modules<S: Session>(
    session: &mut S,
    workspace: &Path,
    source: &ModuleSource,
    manifest: &ModuleManifest,
) -> Result<()> {
    info!("importing PowerShell and extensions modules");

    let response = run_checked(
        session,
        &command::change_dir(workspace),
        "error while changing to the workspace directory",
    )?;
    debug!(response = %response.text, "changed to workspace directory");

    source
        .materialize_into(workspace, manifest)
        .context("copy modules to workspace")?;

    for file in MODULE_MANIFESTS {
        let path = workspace.join(manifest.extension_manifest_path(file));
        run_checked(
            session,
            &command::import_module(&path),
            &format!("error while importing module {file}"),
        )?;
    }

    info!("modules imported");
    Ok(())
}

/// Pack the project at `project_path` into `output_dir`.
///
/// `version = None` keeps the version recorded in the project. Returns the
/// shell's response text.
#[instrument(skip_all)]
pub fn generate_package<S: Session>(
    session: &mut S,
    project_path: &str,
    output_dir: &str,
    version: Option<&str>,
) -> Result<String> {
    command::validate_param(Some(project_path), "project path")?;
    command::validate_param(Some(output_dir), "output folder")?;
    if let Some(v) = version {
        command::validate_param(Some(v), "package version")?;
    }

    let output = run_checked(
        session,
        &command::pack(project_path, output_dir, version),
        "error while packaging the project",
    )?;
    info!(response = %output.text, "package generated");
    Ok(output.text)
}

/// Deploy a generated package to the orchestrator.
///
/// Returns the shell's response text.
#[instrument(skip_all)]
pub fn deploy_package<S: Session>(session: &mut S, args: &DeployArgs<'_>) -> Result<String> {
    command::validate_param(Some(args.orchestrator_url), "orchestrator address")?;
    command::validate_param(Some(args.tenant), "orchestrator tenant")?;
    command::validate_param(Some(args.username), "orchestrator username")?;
    command::validate_param(Some(args.password), "orchestrator password")?;
    command::validate_param(Some(args.package_path), "package path")?;

    let output = run_checked(
        session,
        &command::deploy(args),
        "error while deploying the project",
    )?;
    info!(response = %output.text, "package deployed");
    Ok(output.text)
}
