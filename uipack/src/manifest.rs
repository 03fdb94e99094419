//! Bundled module manifest describing the PowerShell payload.
//!
//! The manifest is a read-only resource compiled into the binary. It names
//! the two module roots inside the installation archive and the version
//! under which the extensions module manifests are shipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

const BUNDLED: &str = include_str!("../resources/modules.toml");

/// Names and version of the bundled PowerShell modules.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModuleManifest {
    /// Entry-name root of the UiPath PowerShell module inside the archive.
    #[serde(rename = "UiPath.PowerShell.Name")]
    pub powershell_name: String,

    /// Entry-name root of the extensions module inside the archive.
    #[serde(rename = "UiPath.Extensions.Name")]
    pub extensions_name: String,

    /// Version directory the extensions module manifests live under.
    #[serde(rename = "UiPath.Extensions.Version")]
    pub extensions_version: String,
}

impl ModuleManifest {
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("UiPath.PowerShell.Name", &self.powershell_name),
            ("UiPath.Extensions.Name", &self.extensions_name),
            ("UiPath.Extensions.Version", &self.extensions_version),
        ];
        for (key, value) in keys {
            if value.trim().is_empty() {
                return Err(anyhow!("manifest key {key} must not be blank"));
            }
        }
        Ok(())
    }

    /// Workspace-relative path of a module manifest file under the
    /// version-specific extensions directory.
    pub fn extension_manifest_path(&self, file: &str) -> PathBuf {
        Path::new(&self.extensions_name)
            .join(&self.extensions_version)
            .join(file)
    }
}

/// Load and validate the manifest bundled into the binary.
pub fn bundled() -> Result<ModuleManifest> {
    let manifest: ModuleManifest =
        toml::from_str(BUNDLED).context("parse bundled module manifest")?;
    manifest.validate().context("bundled module manifest")?;
    Ok(manifest)
}
