// SPDX-License-Identifier: MIT
//! Scanner controller — concurrent subprocess fan-out with settle-all joins.
//!
//! Every available scanner runs as its own child process with its own pipes
//! and timeout; one scanner failing, timing out, or emitting garbage never
//! cancels the others. The review favors degraded-but-available over
//! all-or-nothing: every failure mode here recovers to zero findings plus a
//! diagnostic log line.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::{search_path, InputMode, Scanner, ScannerSpec};
use crate::review::model::{Finding, ScannerRun};

/// Captured stdout cap (1 MiB). Prevents OOM from runaway tool output.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Run every enabled, probed-available scanner against `file` concurrently.
///
/// Results are joined with settle-all semantics; completion order is
/// irrelevant (the aggregator imposes final ordering). An optional overall
/// `deadline` bounds the join: when it elapses, still-pending scanners are
/// discarded and their children reaped via `kill_on_drop`.
pub async fn run_available(
    scanners: &[Scanner],
    file: &std::path::Path,
    content: &str,
    deadline: Option<Duration>,
) -> (Vec<Finding>, Vec<ScannerRun>) {
    let content: Arc<str> = Arc::from(content);
    let mut set = JoinSet::new();

    for scanner in scanners.iter().filter(|s| s.enabled && s.available) {
        let spec = scanner.spec;
        let command = scanner.command.clone();
        let timeout = scanner.timeout;
        let file = file.to_path_buf();
        let content = Arc::clone(&content);
        set.spawn(async move { run_one(spec, command, timeout, file, content).await });
    }

    let mut findings = Vec::new();
    let mut runs = Vec::new();

    let drain = async {
        while let Some(res) = set.join_next().await {
            match res {
                Ok((scanner_findings, run)) => {
                    findings.extend(scanner_findings);
                    runs.push(run);
                }
                Err(e) => warn!(err = %e, "scanner task failed to join"),
            }
        }
    };

    match deadline {
        Some(limit) => {
            if tokio::time::timeout(limit, drain).await.is_err() {
                warn!(
                    deadline_ms = limit.as_millis() as u64,
                    "review deadline reached — discarding pending scanner results"
                );
            }
        }
        None => drain.await,
    }

    (findings, runs)
}

/// Run a single scanner to completion (or timeout) and normalize its output.
async fn run_one(
    spec: ScannerSpec,
    command: String,
    timeout: Duration,
    file: std::path::PathBuf,
    content: Arc<str>,
) -> (Vec<Finding>, ScannerRun) {
    let start = Instant::now();
    let args = (spec.build_args)(&file);
    debug!(tool = spec.name, ?args, "running scanner");

    let mut cmd = Command::new(&command);
    cmd.args(&args)
        .stdin(match spec.input {
            InputMode::Stdin => Stdio::piped(),
            InputMode::FileArg => Stdio::null(),
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(path) = search_path(&spec) {
        cmd.env("PATH", path);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(tool = spec.name, err = %e, "scanner spawn failed");
            return (vec![], failed(spec.name, start, format!("spawn error: {e}")));
        }
    };

    let wait = async {
        if spec.input == InputMode::Stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // Dropping stdin closes the pipe so the tool sees EOF.
                let _ = stdin.write_all(content.as_bytes()).await;
            }
        }
        child.wait_with_output().await
    };

    let output = match tokio::time::timeout(timeout, wait).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(tool = spec.name, err = %e, "scanner I/O failed");
            return (vec![], failed(spec.name, start, format!("io error: {e}")));
        }
        Err(_) => {
            // The timed-out future owned the child; dropping it triggers
            // kill_on_drop, so the process is reaped rather than orphaned.
            warn!(
                tool = spec.name,
                timeout_ms = timeout.as_millis() as u64,
                "scanner timed out"
            );
            return (
                vec![],
                failed(
                    spec.name,
                    start,
                    format!("timed out after {} ms", timeout.as_millis()),
                ),
            );
        }
    };

    let code = output.status.code().unwrap_or(-1);
    if !(spec.exit_ok)(code) {
        let preview = String::from_utf8_lossy(&output.stderr[..output.stderr.len().min(512)]);
        warn!(tool = spec.name, code, stderr = %preview, "scanner exited outside accepted codes");
        return (
            vec![],
            failed(spec.name, start, format!("unexpected exit code {code}")),
        );
    }

    let raw = {
        let bytes = &output.stdout;
        if bytes.len() > MAX_OUTPUT_BYTES {
            warn!(tool = spec.name, bytes = bytes.len(), "truncating large scanner output");
            String::from_utf8_lossy(&bytes[..MAX_OUTPUT_BYTES]).into_owned()
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        }
    };

    match (spec.parse)(&raw, &file) {
        Ok(findings) => {
            let run = ScannerRun {
                tool: spec.name.to_string(),
                success: true,
                finding_count: findings.len(),
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            };
            (findings, run)
        }
        Err(e) => {
            warn!(tool = spec.name, err = %e, "failed to parse scanner output — treating as zero findings");
            (vec![], failed(spec.name, start, format!("parse error: {e}")))
        }
    }
}

fn failed(tool: &str, start: Instant, error: String) -> ScannerRun {
    ScannerRun {
        tool: tool.to_string(),
        success: false,
        finding_count: 0,
        duration_ms: start.elapsed().as_millis() as u64,
        error: Some(error),
    }
}
