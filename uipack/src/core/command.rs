//! Command templates for the PowerShell session.
//!
//! Templates are pure string builders so the exact command text is testable
//! without a shell. Every argument passes through [`quote_pwsh`] here;
//! callers hand in raw, unescaped values.

use std::path::Path;

use anyhow::{Result, bail};

use crate::core::escape::quote_pwsh;

/// Reject a missing or blank required parameter.
///
/// Called before any shell interaction so a bad argument never reaches the
/// session.
pub fn validate_param(value: Option<&str>, what: &str) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => bail!("{what} must not be empty"),
    }
}

fn quote_path(path: &Path) -> String {
    quote_pwsh(&path.to_string_lossy())
}

/// Change the session's working directory.
pub fn change_dir(dir: &Path) -> String {
    format!("cd {}", quote_path(dir))
}

/// Force-import a module manifest file.
pub fn import_module(manifest_path: &Path) -> String {
    format!("Import-Module {} -Force", quote_path(manifest_path))
}

/// `Pack` invocation. `version = None` omits the version argument entirely,
/// leaving the version recorded in the project untouched.
pub fn pack(project_path: &str, output_dir: &str, version: Option<&str>) -> String {
    match version {
        None => format!(
            "Pack -projectJsonPath {} -outputFolder {}",
            quote_pwsh(project_path),
            quote_pwsh(output_dir)
        ),
        Some(v) => format!(
            "Pack -projectJsonPath {} -packageVersion {} -outputFolder {}",
            quote_pwsh(project_path),
            quote_pwsh(v),
            quote_pwsh(output_dir)
        ),
    }
}

/// Arguments for a `Deploy` invocation, in the order they appear in the
/// command.
#[derive(Debug, Clone)]
pub struct DeployArgs<'a> {
    pub orchestrator_url: &'a str,
    pub tenant: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub package_path: &'a str,
}

/// `Deploy` invocation with basic credentials.
pub fn deploy(args: &DeployArgs<'_>) -> String {
    format!(
        "Deploy -orchestratorAddress {} -tenant {} -username {} -password {} -packagePath {} -authType UserPass",
        quote_pwsh(args.orchestrator_url),
        quote_pwsh(args.tenant),
        quote_pwsh(args.username),
        quote_pwsh(args.password),
        quote_pwsh(args.package_path),
    )
}
