// SPDX-License-Identifier: MIT
//! Scanner availability probing.
//!
//! Runs once per process, at engine construction: each known scanner is
//! probed with a `--version` invocation, and only probed-available scanners
//! are ever invoked during reviews. The availability table is written here
//! and read-only afterwards.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::debug;

use super::{search_path, Scanner};

/// A tool that cannot print its version within this window is treated as not
/// installed.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe every enabled scanner concurrently and record availability.
///
/// A missing binary (spawn failure) and a non-zero exit are treated the same:
/// `available = false`. No retries.
pub async fn probe(scanners: &mut [Scanner]) {
    let mut set = JoinSet::new();
    for (idx, scanner) in scanners.iter().enumerate() {
        if !scanner.enabled {
            continue;
        }
        let command = scanner.command.clone();
        let path = search_path(&scanner.spec);
        set.spawn(async move { (idx, probe_one(&command, path).await) });
    }

    while let Some(res) = set.join_next().await {
        if let Ok((idx, available)) = res {
            scanners[idx].available = available;
            debug!(
                tool = scanners[idx].spec.name,
                available, "scanner probed"
            );
        }
    }
}

async fn probe_one(command: &str, path: Option<OsString>) -> bool {
    let mut cmd = Command::new(command);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    if let Some(p) = path {
        cmd.env("PATH", p);
    }

    match tokio::time::timeout(PROBE_TIMEOUT, cmd.status()).await {
        Ok(Ok(status)) => status.success(),
        // Spawn error (binary missing) or probe timeout — same outcome.
        _ => false,
    }
}
