//! Filtered extraction of the bundled module archive.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use zip::ZipArchive;

/// Extract entries whose names start with one of `prefixes` into `dest`.
///
/// Entries are processed in ascending name order, which puts every directory
/// entry before the files beneath it. Entries matching no prefix are
/// skipped. On error the destination is left as-is; callers must treat the
/// workspace as invalid and not reuse partially extracted contents.
pub fn extract_filtered(archive_path: &Path, dest: &Path, prefixes: &[&str]) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("open module archive {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("read module archive {}", archive_path.display()))?;

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();

    let mut extracted = 0usize;
    for name in &names {
        if !prefixes.iter().any(|prefix| name.starts_with(prefix)) {
            continue;
        }
        let mut entry = archive
            .by_name(name)
            .with_context(|| format!("read archive entry {name}"))?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| anyhow!("unsafe archive entry name {name}"))?;
        let target = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            let mut out = File::create(&target)
                .with_context(|| format!("create {}", target.display()))?;
            io::copy(&mut entry, &mut out)
                .with_context(|| format!("write {}", target.display()))?;
            extracted += 1;
        }
    }

    debug!(files = extracted, "module archive extracted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_zip;

    #[test]
    fn extracts_only_entries_under_the_configured_prefixes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let archive = temp.path().join("modules.zip");
        write_zip(
            &archive,
            &[
                ("A/x", Some("ax")),
                ("B/y", Some("by")),
                ("C/z", Some("cz")),
            ],
        )
        .expect("write zip");

        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).expect("dest");
        extract_filtered(&archive, &dest, &["A", "C"]).expect("extract");

        assert_eq!(fs::read_to_string(dest.join("A/x")).expect("A/x"), "ax");
        assert_eq!(fs::read_to_string(dest.join("C/z")).expect("C/z"), "cz");
        assert!(!dest.join("B").exists());
    }

    #[test]
    fn directory_entries_land_before_their_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let archive = temp.path().join("modules.zip");
        // Written deliberately out of order; extraction sorts by name.
        write_zip(
            &archive,
            &[
                ("Mod/a/deep.psm1", Some("module")),
                ("Mod/empty/", None),
                ("Mod/", None),
                ("Mod/a/", None),
            ],
        )
        .expect("write zip");

        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).expect("dest");
        extract_filtered(&archive, &dest, &["Mod"]).expect("extract");

        assert!(dest.join("Mod/empty").is_dir());
        assert_eq!(
            fs::read_to_string(dest.join("Mod/a/deep.psm1")).expect("deep"),
            "module"
        );
    }

    #[test]
    fn rejects_entries_that_escape_the_destination() {
        let temp = tempfile::tempdir().expect("tempdir");
        let archive = temp.path().join("modules.zip");
        write_zip(&archive, &[("Mod/../evil.txt", Some("evil"))]).expect("write zip");

        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).expect("dest");
        let err = extract_filtered(&archive, &dest, &["Mod"]).unwrap_err();
        assert!(err.to_string().contains("unsafe archive entry name"));
    }

    #[test]
    fn unreadable_archive_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let archive = temp.path().join("corrupt.zip");
        fs::write(&archive, "not a zip").expect("write corrupt");

        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).expect("dest");
        let err = extract_filtered(&archive, &dest, &["Mod"]).unwrap_err();
        assert!(err.to_string().contains("read module archive"));
    }
}

