// SPDX-License-Identifier: MIT
//! Built-in scanner registry.
//!
//! One entry per supported tool: argument construction, input mode, exit-code
//! policy, and the parser that normalizes its output. The controller selects
//! behavior by lookup, never by branching on tool names.

use std::path::Path;

use super::{parsers, InputMode, ScannerSpec};

/// Exit codes `{0, 1}` — the common linter convention where 1 means
/// "findings present, no tool error".
pub(crate) fn exit_zero_or_one(code: i32) -> bool {
    matches!(code, 0 | 1)
}

/// devskim encodes the finding count in its exit code; `0..=5` are all
/// successful runs.
pub(crate) fn exit_counts_findings(code: i32) -> bool {
    (0..=5).contains(&code)
}

// ─── Argument builders ────────────────────────────────────────────────────────

fn semgrep_args(file: &Path) -> Vec<String> {
    vec![
        "scan".into(),
        "--config".into(),
        "auto".into(),
        "--json".into(),
        "--quiet".into(),
        file.display().to_string(),
    ]
}

fn eslint_args(file: &Path) -> Vec<String> {
    vec![
        "--format".into(),
        "json".into(),
        "--no-color".into(),
        file.display().to_string(),
    ]
}

fn bandit_args(file: &Path) -> Vec<String> {
    vec![
        "--format".into(),
        "json".into(),
        "--quiet".into(),
        file.display().to_string(),
    ]
}

fn gitleaks_args(_file: &Path) -> Vec<String> {
    // Content arrives on stdin; the report goes to stdout so the controller
    // can capture it like any other scanner.
    vec![
        "stdin".into(),
        "--report-format".into(),
        "json".into(),
        "--report-path".into(),
        "/dev/stdout".into(),
        "--no-banner".into(),
    ]
}

fn devskim_args(file: &Path) -> Vec<String> {
    vec![
        "analyze".into(),
        "--source-code".into(),
        file.display().to_string(),
        "--file-format".into(),
        "json".into(),
        "--console-verbosity".into(),
        "Error".into(),
    ]
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// All built-in scanner specs.
///
/// A function rather than a static so callers get fresh `Vec`s to reorder or
/// filter; the entries themselves are `Copy`.
pub fn builtin_specs() -> Vec<ScannerSpec> {
    vec![
        ScannerSpec {
            name: "semgrep",
            command: "semgrep",
            category: "security",
            input: InputMode::FileArg,
            default_timeout_ms: 60_000,
            extra_search_paths: &[],
            build_args: semgrep_args,
            parse: parsers::parse_semgrep,
            exit_ok: exit_zero_or_one,
        },
        ScannerSpec {
            name: "eslint",
            command: "eslint",
            category: "typescript",
            input: InputMode::FileArg,
            default_timeout_ms: 30_000,
            extra_search_paths: &[],
            build_args: eslint_args,
            parse: parsers::parse_eslint,
            exit_ok: exit_zero_or_one,
        },
        ScannerSpec {
            name: "bandit",
            command: "bandit",
            category: "security",
            input: InputMode::FileArg,
            default_timeout_ms: 30_000,
            extra_search_paths: &[],
            build_args: bandit_args,
            parse: parsers::parse_bandit,
            exit_ok: exit_zero_or_one,
        },
        ScannerSpec {
            name: "gitleaks",
            command: "gitleaks",
            category: "security",
            input: InputMode::Stdin,
            default_timeout_ms: 20_000,
            extra_search_paths: &[],
            build_args: gitleaks_args,
            parse: parsers::parse_gitleaks,
            exit_ok: exit_zero_or_one,
        },
        ScannerSpec {
            name: "devskim",
            command: "devskim",
            category: "security",
            input: InputMode::FileArg,
            default_timeout_ms: 30_000,
            // dotnet tool installs land outside the default PATH.
            extra_search_paths: &[".dotnet/tools"],
            build_args: devskim_args,
            parse: parsers::parse_devskim,
            exit_ok: exit_counts_findings,
        },
    ]
}
