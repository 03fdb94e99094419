//! Shared test fixtures: scripted sessions and zip archives.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Result, anyhow};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::io::session::{PsOutput, Session};

/// Session that replays canned results and records every command issued.
pub struct ScriptedSession {
    results: Vec<PsOutput>,
    pub commands: Vec<String>,
}

impl ScriptedSession {
    pub fn new(results: Vec<PsOutput>) -> Self {
        let mut results = results;
        results.reverse();
        Self {
            results,
            commands: Vec::new(),
        }
    }
}

impl Session for ScriptedSession {
    fn execute(&mut self, command: &str) -> Result<PsOutput> {
        self.commands.push(command.to_string());
        self.results
            .pop()
            .ok_or_else(|| anyhow!("scripted session exhausted at {command:?}"))
    }
}

/// Successful response with the given text.
pub fn ok(text: &str) -> PsOutput {
    PsOutput {
        text: text.to_string(),
        exit_code: 0,
    }
}

/// Failed response with the given text.
pub fn failed(text: &str) -> PsOutput {
    PsOutput {
        text: text.to_string(),
        exit_code: 1,
    }
}

/// Write a zip archive at `path` from `(name, contents)` entries. `None`
/// contents creates a directory entry.
pub fn write_zip(path: &Path, entries: &[(&str, Option<&str>)]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        match contents {
            None => writer.add_directory(*name, options)?,
            Some(text) => {
                writer.start_file(*name, options)?;
                writer.write_all(text.as_bytes())?;
            }
        }
    }
    writer.finish()?;
    Ok(())
}
