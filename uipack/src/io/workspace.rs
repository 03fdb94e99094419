//! Scratch workspace under the system temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Directory name under the system temp root. The path is fixed, so
/// concurrent invocations on one host share (and race on) the same
/// workspace; callers needing concurrency must serialize externally.
const WORKSPACE_DIR: &str = "UiPath";

/// Create (if missing) and empty the scratch workspace, returning its path.
///
/// Idempotent: repeated calls in one process yield the same, empty
/// directory. Contents left behind by a previous invocation are removed
/// before the path is handed out.
pub fn acquire() -> Result<PathBuf> {
    acquire_under(&std::env::temp_dir())
}

fn acquire_under(base: &Path) -> Result<PathBuf> {
    let dir = base.join(WORKSPACE_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("create temp workspace {}", dir.display()))?;
    clean_dir(&dir)?;
    debug!(workspace = %dir.display(), "workspace ready");
    Ok(dir)
}

fn clean_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).with_context(|| format!("remove {}", path.display()))?;
        } else {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
    }
    Ok(())
}
