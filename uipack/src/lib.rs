//! PowerShell-backed pack-and-deploy helper for UiPath automation projects.
//!
//! This crate extracts the bundled UiPath PowerShell modules into a scratch
//! workspace, imports them into a long-lived `pwsh` session, and issues the
//! `Pack` and `Deploy` commands those modules provide. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (argument escaping, command
//!   templates, parameter validation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (workspace, archive extraction,
//!   the shell process). Isolated so sequencing can be tested with scripted
//!   sessions.
//!
//! Orchestration modules ([`sequence`], [`cli`]) coordinate core logic with
//! I/O to implement the CLI commands.

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod manifest;
pub mod sequence;
#[cfg(test)]
pub mod test_support;
