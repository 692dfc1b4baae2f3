// SPDX-License-Identifier: MIT
//! External scanner orchestration — registry, availability probing, and the
//! concurrent subprocess controller.
//!
//! Every scanner is described by a [`ScannerSpec`]: how to build its
//! arguments, how to feed it input, which exit codes mean "ran fine", and how
//! to normalize its output into [`Finding`]s. Adding a scanner means adding
//! one registry entry — there is no per-tool branching in the controller.

pub mod parsers;
pub mod probe;
pub mod registry;
pub mod runner;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ScannerOverride;
use crate::review::model::Finding;

// ─── Scanner descriptor ───────────────────────────────────────────────────────

/// How a scanner receives the content under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// The file path is passed on the command line (the common case).
    FileArg,
    /// Content is piped to the child's stdin — secret detectors are built to
    /// scan streams and commit diffs, not arbitrary paths.
    Stdin,
}

/// Static behavior of one external scanner.
///
/// All fields are `'static` data and plain function pointers, so specs are
/// `Copy` and the registry never needs locking.
#[derive(Clone, Copy)]
pub struct ScannerSpec {
    /// Registry name, used in finding attribution and config overrides.
    pub name: &'static str,
    /// Default binary name; overridable per project in `codevet.toml`.
    pub command: &'static str,
    /// Domain tag stamped on this scanner's findings.
    pub category: &'static str,
    pub input: InputMode,
    pub default_timeout_ms: u64,
    /// Extra executable directories (relative to `$HOME`) appended to the
    /// child's `PATH` at spawn time — never to the parent's environment.
    /// Used for tools distributed via side-channel installers
    /// (`.dotnet/tools` and friends).
    pub extra_search_paths: &'static [&'static str],
    /// Build the command-line arguments for reviewing `file`.
    pub build_args: fn(&Path) -> Vec<String>,
    /// Normalize raw stdout into findings. Errors are recovered by the
    /// controller (logged, zero findings).
    pub parse: fn(&str, &Path) -> anyhow::Result<Vec<Finding>>,
    /// Exit codes accepted as a successful run.
    pub exit_ok: fn(i32) -> bool,
}

impl std::fmt::Debug for ScannerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerSpec")
            .field("name", &self.name)
            .field("command", &self.command)
            .field("input", &self.input)
            .finish()
    }
}

// ─── Runtime scanner state ────────────────────────────────────────────────────

/// A scanner plus its per-process runtime state.
///
/// Constructed with `available = false`; probing flips it exactly once,
/// before any review is accepted, so reads never race the write.
#[derive(Debug)]
pub struct Scanner {
    pub spec: ScannerSpec,
    /// Binary to invoke (spec default unless overridden in config).
    pub command: String,
    pub timeout: Duration,
    pub enabled: bool,
    pub available: bool,
}

impl Scanner {
    pub fn from_spec(spec: ScannerSpec) -> Self {
        Self {
            command: spec.command.to_string(),
            timeout: Duration::from_millis(spec.default_timeout_ms),
            enabled: true,
            available: false,
            spec,
        }
    }

    /// Apply a `[scanners.<name>]` config section.
    pub fn apply_override(&mut self, over: &ScannerOverride) {
        if let Some(enabled) = over.enabled {
            self.enabled = enabled;
        }
        if let Some(ms) = over.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(command) = &over.command {
            self.command = command.clone();
        }
    }
}

/// All built-in scanners in registry order, with defaults applied.
pub fn builtin_scanners() -> Vec<Scanner> {
    registry::builtin_specs()
        .into_iter()
        .map(Scanner::from_spec)
        .collect()
}

// ─── Child PATH augmentation ──────────────────────────────────────────────────

/// Compute the child's `PATH` for a spec with extra search paths.
///
/// Returns `None` when the inherited environment is fine as-is. The parent
/// process environment is never mutated.
pub(crate) fn search_path(spec: &ScannerSpec) -> Option<OsString> {
    if spec.extra_search_paths.is_empty() {
        return None;
    }
    let home = std::env::var_os("HOME")?;
    let mut paths: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();

    let mut changed = false;
    for extra in spec.extra_search_paths {
        let dir = Path::new(&home).join(extra);
        if dir.is_dir() && !paths.contains(&dir) {
            paths.push(dir);
            changed = true;
        }
    }
    if !changed {
        return None;
    }
    std::env::join_paths(paths).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanners_start_unavailable() {
        for scanner in builtin_scanners() {
            assert!(!scanner.available, "{} must start unavailable", scanner.spec.name);
            assert!(scanner.enabled);
        }
    }

    #[test]
    fn override_changes_timeout_and_enablement() {
        let mut scanner = builtin_scanners().remove(0);
        scanner.apply_override(&ScannerOverride {
            enabled: Some(false),
            timeout_ms: Some(1234),
            command: Some("/opt/custom/bin".into()),
        });
        assert!(!scanner.enabled);
        assert_eq!(scanner.timeout, Duration::from_millis(1234));
        assert_eq!(scanner.command, "/opt/custom/bin");
    }
}
