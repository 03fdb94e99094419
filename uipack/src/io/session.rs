//! Long-lived PowerShell session.
//!
//! One `pwsh` process serves a whole invocation. Commands are written
//! line-by-line to its stdin; after each command a sentinel probe line asks
//! the shell whether that command succeeded, so [`Session::execute`] returns
//! the response text and an exit code in a single round-trip without a
//! separate status query.
//!
//! Reader threads drain stdout and stderr into a channel so the pipes can
//! never deadlock; commands themselves remain strictly sequential.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// How long session teardown waits for the shell to exit on its own.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one shell command round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsOutput {
    /// Combined stdout/stderr text produced before the status probe.
    pub text: String,
    /// 0 when the command succeeded, nonzero otherwise.
    pub exit_code: i32,
}

impl PsOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over the shell backend so sequencing logic can be tested
/// with scripted sessions.
pub trait Session {
    /// Issue one command and await its full response.
    fn execute(&mut self, command: &str) -> Result<PsOutput>;
}

/// Spawn options for the PowerShell process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shell executable, `pwsh` unless overridden.
    pub program: String,
    /// Upper bound on one command round-trip.
    pub command_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            program: "pwsh".to_string(),
            command_timeout: Duration::from_secs(10 * 60),
        }
    }
}

enum Line {
    Out(String),
    Err(String),
    Eof,
}

/// A live PowerShell process driven over stdin/stdout.
pub struct PsSession {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<Line>,
    seq: u64,
    timeout: Duration,
}

impl PsSession {
    /// Spawn the shell and wire up the reader threads.
    #[instrument(skip_all, fields(program = %config.program))]
    pub fn spawn(config: &SessionConfig) -> Result<Self> {
        let mut child = Command::new(&config.program)
            .arg("-NoLogo")
            .arg("-NoProfile")
            .arg("-NoExit")
            .arg("-Command")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn {}", config.program))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let (tx, lines) = mpsc::channel();
        let err_tx = tx.clone();
        // Only stdout carries the sentinel, so only its EOF ends a read loop.
        thread::spawn(move || forward_lines(stdout, &tx, Line::Out, true));
        thread::spawn(move || forward_lines(stderr, &err_tx, Line::Err, false));

        debug!("shell session started");
        Ok(Self {
            child,
            stdin: Some(stdin),
            lines,
            seq: 0,
            timeout: config.command_timeout,
        })
    }

    /// Ask the shell to exit; kill it if it lingers past the grace period.
    pub fn close(mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            let _ = writeln!(stdin, "exit");
            let _ = stdin.flush();
        }
        match self
            .child
            .wait_timeout(SHUTDOWN_TIMEOUT)
            .context("wait for shell exit")?
        {
            Some(status) => {
                debug!(exit = ?status.code(), "shell session closed");
            }
            None => {
                warn!("shell did not exit, killing");
                self.child.kill().context("kill shell")?;
                self.child.wait().context("wait for shell after kill")?;
            }
        }
        Ok(())
    }
}

impl Session for PsSession {
    #[instrument(skip_all)]
    fn execute(&mut self, command: &str) -> Result<PsOutput> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("session already closed"))?;
        self.seq += 1;
        let token = format!("__uipack_done_{}__", self.seq);

        writeln!(stdin, "{command}").context("write command")?;
        // When the probe runs, `$?` still refers to the command line above.
        writeln!(
            stdin,
            "Write-Output \"{token} $(if ($?) {{ 0 }} else {{ 1 }})\""
        )
        .context("write status probe")?;
        stdin.flush().context("flush command")?;

        let mut text = String::new();
        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| anyhow!("shell response timed out after {:?}", self.timeout))?;
            match self.lines.recv_timeout(remaining) {
                Ok(Line::Out(line)) => {
                    if let Some(rest) = line.strip_prefix(&token) {
                        let exit_code = rest
                            .trim()
                            .parse::<i32>()
                            .with_context(|| format!("parse status probe {rest:?}"))?;
                        debug!(exit_code, "command finished");
                        return Ok(PsOutput { text, exit_code });
                    }
                    push_line(&mut text, &line);
                }
                Ok(Line::Err(line)) => push_line(&mut text, &line),
                Ok(Line::Eof) => bail!("shell exited before responding"),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    bail!("shell response timed out after {:?}", self.timeout)
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    bail!("shell output stream closed")
                }
            }
        }
    }
}

impl Drop for PsSession {
    fn drop(&mut self) {
        // Sessions closed via `close` have already been waited on.
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn forward_lines<R: Read>(reader: R, tx: &Sender<Line>, wrap: fn(String) -> Line, signal_eof: bool) {
    let reader = BufReader::new(reader);
    for line in reader.lines() {
        match line {
            Ok(text) => {
                if tx.send(wrap(text)).is_err() {
                    return;
                }
            }
            Err(_) => break,
        }
    }
    if signal_eof {
        let _ = tx.send(Line::Eof);
    }
}

fn push_line(text: &mut String, line: &str) {
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(line);
}
