// SPDX-License-Identifier: MIT
//! Terminal output for `codevet review` and `codevet scanners`.

use crate::review::model::{ReviewReport, Severity};
use crate::scanners::Scanner;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => RED,
        Severity::Medium => YELLOW,
        Severity::Low | Severity::Info => DIM,
    }
}

// ─── Review report ────────────────────────────────────────────────────────────

/// Print a formatted review report to stdout.
pub fn print_report(report: &ReviewReport, quiet: bool) {
    if !quiet {
        println!();
        println!("{BOLD}codevet review — {}{RESET}", report.file);
        println!("{}", "─".repeat(60));
    }

    for f in &report.findings {
        let color = severity_color(f.severity);
        let location = match f.col {
            Some(col) => format!("{}:{}:{}", f.file, f.line, col),
            None => format!("{}:{}", f.file, f.line),
        };
        println!(
            "  {color}{:<8}{RESET} {:<24} {}  {DIM}[{}]{RESET}",
            f.severity.as_str(),
            location,
            f.message,
            f.rule
        );
        if let Some(suggestion) = &f.suggestion {
            if !quiet {
                println!("           {DIM}fix: {suggestion}{RESET}");
            }
        }
    }

    if !quiet {
        println!("{}", "─".repeat(60));
        for run in &report.scanner_runs {
            let status = if run.success {
                format!("{GREEN}ok{RESET}")
            } else {
                format!("{RED}failed{RESET}")
            };
            let detail = run.error.as_deref().unwrap_or("");
            println!(
                "  {DIM}{:<10}{RESET} {status}  {} finding(s) in {} ms  {DIM}{detail}{RESET}",
                run.tool, run.finding_count, run.duration_ms
            );
        }
    }

    let verdict = if report.passed {
        format!("{GREEN}passed{RESET}")
    } else {
        format!("{RED}failed{RESET}")
    };
    println!(
        "{} — {} finding(s), threshold {} ({} critical, {} high, {} medium, {} low, {} info)",
        verdict,
        report.findings.len(),
        report.threshold.as_str(),
        report.counts.critical,
        report.counts.high,
        report.counts.medium,
        report.counts.low,
        report.counts.info,
    );
}

// ─── Scanner table ────────────────────────────────────────────────────────────

/// Print the probed scanner availability table, `doctor`-style.
pub fn print_scanner_table(scanners: &[Scanner]) {
    println!();
    println!("{BOLD}codevet scanners — availability{RESET}");
    println!("{}", "─".repeat(60));

    for scanner in scanners {
        let (symbol, color, detail) = if !scanner.enabled {
            ("-", DIM, "disabled in codevet.toml".to_string())
        } else if scanner.available {
            ("✓", GREEN, format!("{} ({})", scanner.command, scanner.spec.category))
        } else {
            ("✗", RED, "not found in PATH".to_string())
        };
        println!(
            "  {color}{symbol}{RESET}  {:<12}  {}",
            scanner.spec.name, detail
        );
    }

    println!("{}", "─".repeat(60));
    let available = scanners.iter().filter(|s| s.available).count();
    println!(
        "{available} of {} scanners available. Reviews still run with a reduced tool set.",
        scanners.len()
    );
    println!();
}
