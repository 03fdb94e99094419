//! Locating and materializing the bundled PowerShell modules.
//!
//! Probe order: the packaged installation archive under `$UIPACK_HOME`,
//! then a development-tree `resources/` directory found by walking up from
//! the running executable (so `cargo run` from a source checkout works
//! without an installed archive).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use walkdir::WalkDir;

use crate::io::archive::extract_filtered;
use crate::manifest::ModuleManifest;

/// Environment variable naming the tool's installation root.
pub const HOME_ENV: &str = "UIPACK_HOME";
/// Archive location relative to the installation root.
const ARCHIVE_RELATIVE: &str = "lib/uipack-modules.zip";
/// Development-tree directory holding the module payload.
const RESOURCE_DIR: &str = "resources";

/// Where the bundled PowerShell modules come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    /// Packaged installation archive; extraction filters on the module
    /// roots named by the manifest.
    Archive(PathBuf),
    /// Development-tree directory; copied recursively without filtering.
    Directory(PathBuf),
}

impl ModuleSource {
    /// Probe the known locations in priority order.
    pub fn locate(manifest: &ModuleManifest) -> Result<Self> {
        Self::from_probes(install_archive_path(), dev_resource_dir(manifest))
    }

    fn from_probes(archive: Option<PathBuf>, directory: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = archive {
            if path.is_file() {
                debug!(archive = %path.display(), "using installation archive");
                return Ok(Self::Archive(path));
            }
            debug!(archive = %path.display(), "installation archive not present");
        }
        if let Some(dir) = directory {
            if dir.is_dir() {
                debug!(dir = %dir.display(), "using development resource directory");
                return Ok(Self::Directory(dir));
            }
        }
        bail!(
            "module payload not found: set {HOME_ENV} to the installation root \
             (expected {ARCHIVE_RELATIVE} beneath it) or run from a source tree \
             with a {RESOURCE_DIR} directory"
        )
    }

    /// Copy the module payload into `dest`.
    pub fn materialize_into(&self, dest: &Path, manifest: &ModuleManifest) -> Result<()> {
        match self {
            Self::Archive(path) => extract_filtered(
                path,
                dest,
                &[
                    manifest.powershell_name.as_str(),
                    manifest.extensions_name.as_str(),
                ],
            ),
            Self::Directory(dir) => copy_tree(dir, dest),
        }
    }

    /// Path shown in progress logs.
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive(path) | Self::Directory(path) => path,
        }
    }
}

fn install_archive_path() -> Option<PathBuf> {
    env::var_os(HOME_ENV).map(|root| PathBuf::from(root).join(ARCHIVE_RELATIVE))
}

/// Find a `resources/` directory carrying the extensions module by walking
/// up from the executable (covers `target/debug` and `target/release`
/// layouts in a source checkout).
fn dev_resource_dir(manifest: &ModuleManifest) -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    for ancestor in exe.ancestors().skip(1) {
        let candidate = ancestor.join(RESOURCE_DIR);
        if candidate.join(&manifest.extensions_name).is_dir() {
            return Some(candidate);
        }
    }
    None
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("strip prefix {}", src.display()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest;
    use crate::test_support::write_zip;

    #[test]
    fn archive_probe_wins_when_both_exist() {
        let temp = tempfile::tempdir().expect("tempdir");
        let archive = temp.path().join("uipack-modules.zip");
        fs::write(&archive, "stub").expect("write archive");
        let dir = temp.path().join("resources");
        fs::create_dir_all(&dir).expect("resources");

        let source = ModuleSource::from_probes(Some(archive.clone()), Some(dir)).expect("locate");
        assert_eq!(source, ModuleSource::Archive(archive));
    }

    #[test]
    fn falls_back_to_the_directory_probe() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("absent/uipack-modules.zip");
        let dir = temp.path().join("resources");
        fs::create_dir_all(&dir).expect("resources");

        let source = ModuleSource::from_probes(Some(missing), Some(dir.clone())).expect("locate");
        assert_eq!(source, ModuleSource::Directory(dir));
    }

    #[test]
    fn neither_probe_is_a_location_error() {
        let err = ModuleSource::from_probes(None, None).unwrap_err();
        assert!(err.to_string().contains(HOME_ENV));
    }

    #[test]
    fn archive_source_extracts_the_module_roots() {
        let temp = tempfile::tempdir().expect("tempdir");
        let manifest = manifest::bundled().expect("manifest");
        let archive = temp.path().join("uipack-modules.zip");
        let ps_entry = format!("{}/UiPath.PowerShell.psd1", manifest.powershell_name);
        let ext_entry = format!(
            "{}/{}/UiPathPackage-Module.psd1",
            manifest.extensions_name, manifest.extensions_version
        );
        write_zip(
            &archive,
            &[
                (ps_entry.as_str(), Some("ps module")),
                (ext_entry.as_str(), Some("ext module")),
                ("META-INF/MANIFEST.MF", Some("skipped")),
            ],
        )
        .expect("write zip");

        let dest = temp.path().join("workspace");
        fs::create_dir_all(&dest).expect("workspace");
        ModuleSource::Archive(archive)
            .materialize_into(&dest, &manifest)
            .expect("materialize");

        assert!(dest.join(ps_entry).is_file());
        assert!(dest.join(ext_entry).is_file());
        assert!(!dest.join("META-INF").exists());
    }

    #[test]
    fn directory_source_copies_recursively_without_filtering() {
        let temp = tempfile::tempdir().expect("tempdir");
        let manifest = manifest::bundled().expect("manifest");
        let src = temp.path().join("resources");
        fs::create_dir_all(src.join("UiPath.Extensions/20.4.1")).expect("tree");
        fs::write(
            src.join("UiPath.Extensions/20.4.1/UiPathPackage-Module.psd1"),
            "ext",
        )
        .expect("ext file");
        fs::create_dir_all(src.join("other")).expect("other");
        fs::write(src.join("other/extra.txt"), "extra").expect("extra file");

        let dest = temp.path().join("workspace");
        fs::create_dir_all(&dest).expect("workspace");
        ModuleSource::Directory(src)
            .materialize_into(&dest, &manifest)
            .expect("materialize");

        assert!(
            dest.join("UiPath.Extensions/20.4.1/UiPathPackage-Module.psd1")
                .is_file()
        );
        assert!(dest.join("other/extra.txt").is_file());
    }
}
