//! Integration tests for the scanner controller, using fake scanner scripts.
//!
//! Covers:
//! 1. Unavailable scanners are never spawned
//! 2. One scanner's malformed output never hides another's findings
//! 3. Timeouts bound completion and contribute zero findings
//! 4. Exit-code policies (0/1 default vs finding-count codes)
//! 5. Stdin-mode scanners receive the content under review
//! 6. Probing flips availability exactly for installed tools
//! 7. End-to-end merge of pattern and scanner findings
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use codevet::review::model::{Finding, ReviewOptions, Severity};
use codevet::review::ReviewEngine;
use codevet::scanners::{probe, runner, InputMode, Scanner, ScannerSpec};
use codevet::VetConfig;

// ─── Fake scanner plumbing ────────────────────────────────────────────────────

/// Minimal output contract for the stub scanners: a JSON array of
/// `{"line": n, "message": "..."}` objects.
fn parse_stub(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: serde_json::Value = serde_json::from_str(raw.trim())?;
    let items = root
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("expected array"))?;
    Ok(items
        .iter()
        .map(|item| Finding {
            severity: Severity::High,
            rule: "stub-rule".to_string(),
            message: item
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("stub finding")
                .to_string(),
            file: file.display().to_string(),
            line: item.get("line").and_then(|v| v.as_u64()).unwrap_or(1) as u32,
            col: None,
            suggestion: None,
            tool: "stub".to_string(),
            category: "test".to_string(),
        })
        .collect())
}

fn no_args(_file: &Path) -> Vec<String> {
    vec![]
}

fn exit_zero_or_one(code: i32) -> bool {
    matches!(code, 0 | 1)
}

fn exit_up_to_five(code: i32) -> bool {
    (0..=5).contains(&code)
}

fn stub_spec(name: &'static str, input: InputMode, exit_ok: fn(i32) -> bool) -> ScannerSpec {
    ScannerSpec {
        name,
        command: name,
        category: "test",
        input,
        default_timeout_ms: 5_000,
        extra_search_paths: &[],
        build_args: no_args,
        parse: parse_stub,
        exit_ok,
    }
}

/// Write an executable `#!/bin/sh` script and return its path.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn scanner(script: &Path, spec: ScannerSpec, timeout_ms: u64, available: bool) -> Scanner {
    let mut s = Scanner::from_spec(spec);
    s.command = script.display().to_string();
    s.timeout = Duration::from_millis(timeout_ms);
    s.available = available;
    s
}

// ─── Test 1: unavailable scanners are never spawned ──────────────────────────

#[tokio::test]
async fn unavailable_scanner_is_never_invoked() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("spawned.marker");
    let script = write_script(
        dir.path(),
        "marking-scanner",
        &format!("touch {}\necho '[]'", marker.display()),
    );

    let scanners = vec![scanner(
        &script,
        stub_spec("marking", InputMode::FileArg, exit_zero_or_one),
        5_000,
        false, // probed unavailable
    )];

    let (findings, runs) =
        runner::run_available(&scanners, Path::new("/tmp/x.ts"), "content", None).await;
    assert!(findings.is_empty());
    assert!(runs.is_empty());
    assert!(!marker.exists(), "unavailable scanner must not be spawned");
}

// ─── Test 2: parse-failure isolation ─────────────────────────────────────────

#[tokio::test]
async fn malformed_output_from_one_scanner_does_not_hide_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_script(dir.path(), "broken", "echo 'this is not json {{{'");
    let healthy = write_script(
        dir.path(),
        "healthy",
        r#"echo '[{"line": 2, "message": "real finding"}]'"#,
    );

    let scanners = vec![
        scanner(&broken, stub_spec("broken", InputMode::FileArg, exit_zero_or_one), 5_000, true),
        scanner(&healthy, stub_spec("healthy", InputMode::FileArg, exit_zero_or_one), 5_000, true),
    ];

    let (findings, runs) =
        runner::run_available(&scanners, Path::new("/tmp/x.ts"), "content", None).await;

    assert_eq!(findings.len(), 1, "healthy scanner's finding must survive");
    assert_eq!(findings[0].line, 2);

    let broken_run = runs.iter().find(|r| r.tool == "broken").unwrap();
    assert!(!broken_run.success);
    assert!(broken_run.error.as_deref().unwrap().contains("parse error"));
    let healthy_run = runs.iter().find(|r| r.tool == "healthy").unwrap();
    assert!(healthy_run.success);
    assert_eq!(healthy_run.finding_count, 1);
}

// ─── Test 3: timeout bounds completion ───────────────────────────────────────

#[tokio::test]
async fn slow_scanner_times_out_without_delaying_review() {
    let dir = tempfile::tempdir().unwrap();
    let sleeper = write_script(dir.path(), "sleeper", "sleep 5\necho '[]'");
    let quick = write_script(
        dir.path(),
        "quick",
        r#"echo '[{"line": 1, "message": "fast"}]'"#,
    );

    let scanners = vec![
        scanner(&sleeper, stub_spec("sleeper", InputMode::FileArg, exit_zero_or_one), 1_000, true),
        scanner(&quick, stub_spec("quick", InputMode::FileArg, exit_zero_or_one), 5_000, true),
    ];

    let start = Instant::now();
    let (findings, runs) =
        runner::run_available(&scanners, Path::new("/tmp/x.ts"), "content", None).await;
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(3),
        "timed-out scanner must not stretch the review to its sleep ({elapsed:?})"
    );
    assert_eq!(findings.len(), 1, "only the quick scanner contributes");

    let sleeper_run = runs.iter().find(|r| r.tool == "sleeper").unwrap();
    assert!(!sleeper_run.success);
    assert!(sleeper_run.error.as_deref().unwrap().contains("timed out"));
}

// ─── Test 4: exit-code policies ──────────────────────────────────────────────

#[tokio::test]
async fn unexpected_exit_code_yields_zero_findings() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit3", "echo '[]'\nexit 3");

    let scanners = vec![scanner(
        &script,
        stub_spec("strict", InputMode::FileArg, exit_zero_or_one),
        5_000,
        true,
    )];
    let (findings, runs) =
        runner::run_available(&scanners, Path::new("/tmp/x.ts"), "content", None).await;
    assert!(findings.is_empty());
    assert!(!runs[0].success);
    assert!(runs[0].error.as_deref().unwrap().contains("exit code 3"));
}

#[tokio::test]
async fn finding_count_exit_codes_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    // Exit code 3 means "3 findings" under the finding-count convention.
    let script = write_script(
        dir.path(),
        "exit3ok",
        r#"echo '[{"line": 1, "message": "a"}]'
exit 3"#,
    );

    let scanners = vec![scanner(
        &script,
        stub_spec("counting", InputMode::FileArg, exit_up_to_five),
        5_000,
        true,
    )];
    let (findings, runs) =
        runner::run_available(&scanners, Path::new("/tmp/x.ts"), "content", None).await;
    assert_eq!(findings.len(), 1);
    assert!(runs[0].success);
}

// ─── Test 5: stdin-mode scanners receive the content ─────────────────────────

#[tokio::test]
async fn stdin_scanner_receives_content_on_standard_input() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "stdin-echo",
        r#"payload=$(cat)
case "$payload" in
  *NEEDLE*) echo '[{"line": 1, "message": "saw needle"}]' ;;
  *) echo '[]' ;;
esac"#,
    );

    let scanners = vec![scanner(
        &script,
        stub_spec("stdin", InputMode::Stdin, exit_zero_or_one),
        5_000,
        true,
    )];
    let (findings, _) = runner::run_available(
        &scanners,
        Path::new("/tmp/x.ts"),
        "line one\nNEEDLE here\n",
        None,
    )
    .await;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "saw needle");
}

// ─── Test 6: probing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn probe_marks_installed_tools_available_and_missing_tools_not() {
    let dir = tempfile::tempdir().unwrap();
    let versioned = write_script(dir.path(), "versioned", "echo '1.0.0'\nexit 0");

    let mut scanners = vec![
        scanner(
            &versioned,
            stub_spec("installed", InputMode::FileArg, exit_zero_or_one),
            5_000,
            false,
        ),
        {
            let mut missing = Scanner::from_spec(stub_spec(
                "missing",
                InputMode::FileArg,
                exit_zero_or_one,
            ));
            missing.command = "codevet-definitely-not-installed".to_string();
            missing
        },
    ];

    probe::probe(&mut scanners).await;
    assert!(scanners[0].available);
    assert!(!scanners[1].available);
}

// ─── Test 7: end-to-end merge through the engine ─────────────────────────────

#[tokio::test]
async fn engine_merges_pattern_and_scanner_findings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.ts"), "let x: any = input();\n").unwrap();
    let script = write_script(
        dir.path(),
        "external",
        r#"echo '[{"line": 7, "message": "external finding"}]'"#,
    );

    let external = scanner(
        &script,
        stub_spec("external", InputMode::FileArg, exit_zero_or_one),
        5_000,
        true,
    );
    let engine =
        ReviewEngine::with_scanners(dir.path(), VetConfig::default(), vec![external]).unwrap();

    let report = engine
        .review_file(
            Path::new("app.ts"),
            None,
            &ReviewOptions {
                include_external: true,
                threshold: Severity::High,
                deadline: None,
            },
        )
        .await
        .unwrap();

    // Pattern finding (ts-explicit-any, medium) and the stub's high finding.
    assert!(report.findings.iter().any(|f| f.rule == "ts-explicit-any"));
    assert!(report.findings.iter().any(|f| f.rule == "stub-rule"));
    assert_eq!(report.scanner_runs.len(), 1);
    assert!(!report.passed, "stub emits a high finding at threshold high");

    // Worst-first ordering: the high stub finding sorts before the medium one.
    assert_eq!(report.findings[0].severity, Severity::High);
}
