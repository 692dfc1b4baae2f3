// SPDX-License-Identifier: MIT
//! Output normalizers — one per external tool.
//!
//! Each parser maps a tool's result schema and severity vocabulary onto the
//! common [`Finding`] model via an explicit lookup. Unknown severities map to
//! `Medium` — never dropped, never pushed to an extreme. Secret-detection
//! findings are forced to `Critical` regardless of the tool's own opinion.
//!
//! Parsers never panic: malformed output returns `Err`, which the controller
//! recovers as zero findings.

use std::path::Path;

use anyhow::anyhow;
use serde_json::Value;

use crate::review::model::{Finding, Severity};

// ─── Severity lookup tables ───────────────────────────────────────────────────

/// semgrep: `ERROR` / `WARNING` / `INFO`.
pub fn map_semgrep_severity(s: &str) -> Severity {
    match s.to_ascii_uppercase().as_str() {
        "ERROR" => Severity::High,
        "WARNING" => Severity::Medium,
        "INFO" => Severity::Info,
        _ => Severity::Medium,
    }
}

/// eslint: numeric severity, 2 = error, 1 = warn (warn and unknown both
/// land on Medium).
pub fn map_eslint_severity(n: u64) -> Severity {
    match n {
        2 => Severity::High,
        _ => Severity::Medium,
    }
}

/// bandit: `HIGH` / `MEDIUM` / `LOW`.
pub fn map_bandit_severity(s: &str) -> Severity {
    match s.to_ascii_uppercase().as_str() {
        "HIGH" => Severity::High,
        "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        _ => Severity::Medium,
    }
}

/// devskim: five-level vocabulary of its own.
pub fn map_devskim_severity(s: &str) -> Severity {
    match s.to_ascii_lowercase().as_str() {
        "critical" => Severity::Critical,
        "important" => Severity::High,
        "moderate" => Severity::Medium,
        "best-practice" | "bestpractice" => Severity::Low,
        "manual-review" | "manualreview" => Severity::Info,
        _ => Severity::Medium,
    }
}

// ─── semgrep ─────────────────────────────────────────────────────────────────

/// Parse `semgrep scan --json` output: `{"results": [...]}`.
pub fn parse_semgrep(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let results = root
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("missing results array"))?;

    let mut findings = Vec::new();
    for item in results {
        let extra = item.get("extra");
        let message = extra
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("semgrep finding")
            .to_string();
        let severity = extra
            .and_then(|e| e.get("severity"))
            .and_then(|v| v.as_str())
            .map(map_semgrep_severity)
            .unwrap_or(Severity::Medium);
        let suggestion = extra
            .and_then(|e| e.get("fix"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let start = item.get("start");
        findings.push(Finding {
            severity,
            rule: str_or(item.get("check_id"), "semgrep"),
            message,
            file: str_or(item.get("path"), &file.display().to_string()),
            line: u32_or(start.and_then(|s| s.get("line")), 1),
            col: start
                .and_then(|s| s.get("col"))
                .and_then(|v| v.as_u64())
                .map(|c| c as u32),
            suggestion,
            tool: "semgrep".to_string(),
            category: "security".to_string(),
        });
    }
    Ok(findings)
}

// ─── eslint ──────────────────────────────────────────────────────────────────

/// Parse `eslint --format json` output: an array of per-file results, each
/// with a `messages` array.
pub fn parse_eslint(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let files = root.as_array().ok_or_else(|| anyhow!("expected array"))?;

    let mut findings = Vec::new();
    for file_obj in files {
        let path = str_or(file_obj.get("filePath"), &file.display().to_string());
        let messages = match file_obj.get("messages").and_then(|v| v.as_array()) {
            Some(m) => m,
            None => continue,
        };

        for msg in messages {
            let severity = msg
                .get("severity")
                .and_then(|v| v.as_u64())
                .map(map_eslint_severity)
                .unwrap_or(Severity::Medium);
            let suggestion = msg
                .get("fix")
                .and_then(|f| f.get("text"))
                .and_then(|t| t.as_str())
                .map(|s| format!("Auto-fix available: {s}"));

            findings.push(Finding {
                severity,
                rule: str_or(msg.get("ruleId"), "eslint"),
                message: str_or(msg.get("message"), "eslint finding"),
                file: path.clone(),
                line: u32_or(msg.get("line"), 1),
                col: msg.get("column").and_then(|v| v.as_u64()).map(|c| c as u32),
                suggestion,
                tool: "eslint".to_string(),
                category: "typescript".to_string(),
            });
        }
    }
    Ok(findings)
}

// ─── bandit ──────────────────────────────────────────────────────────────────

/// Parse `bandit --format json` output: `{"results": [...]}`.
pub fn parse_bandit(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let results = root
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("missing results array"))?;

    let mut findings = Vec::new();
    for item in results {
        let severity = item
            .get("issue_severity")
            .and_then(|v| v.as_str())
            .map(map_bandit_severity)
            .unwrap_or(Severity::Medium);
        let suggestion = item
            .get("more_info")
            .and_then(|v| v.as_str())
            .map(|url| format!("See {url}"));

        findings.push(Finding {
            severity,
            rule: str_or(item.get("test_id"), "bandit"),
            message: str_or(item.get("issue_text"), "bandit finding"),
            file: str_or(item.get("filename"), &file.display().to_string()),
            line: u32_or(item.get("line_number"), 1),
            col: item
                .get("col_offset")
                .and_then(|v| v.as_u64())
                .map(|c| (c + 1) as u32),
            suggestion,
            tool: "bandit".to_string(),
            category: "security".to_string(),
        });
    }
    Ok(findings)
}

// ─── gitleaks ────────────────────────────────────────────────────────────────

/// Parse a gitleaks JSON report: a top-level array of leak records.
///
/// Every leak is forced to `Critical` regardless of the tool's own severity
/// field — an exposed credential is maximal risk no matter what the scanner
/// thinks of the rule that matched it.
pub fn parse_gitleaks(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let leaks = root.as_array().ok_or_else(|| anyhow!("expected array"))?;

    let mut findings = Vec::new();
    for leak in leaks {
        // Stdin scans report an empty File field; fall back to the reviewed path.
        let leak_file = leak
            .get("File")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| file.display().to_string());

        findings.push(Finding {
            severity: Severity::Critical,
            rule: str_or(leak.get("RuleID"), "gitleaks"),
            message: str_or(leak.get("Description"), "Secret detected"),
            file: leak_file,
            line: u32_or(leak.get("StartLine"), 1),
            col: leak
                .get("StartColumn")
                .and_then(|v| v.as_u64())
                .map(|c| c as u32),
            suggestion: Some(
                "Rotate this credential immediately and purge it from history".to_string(),
            ),
            tool: "gitleaks".to_string(),
            category: "security".to_string(),
        });
    }
    Ok(findings)
}

// ─── devskim ─────────────────────────────────────────────────────────────────

/// Parse `devskim analyze --file-format json` output: a top-level array.
pub fn parse_devskim(raw: &str, file: &Path) -> anyhow::Result<Vec<Finding>> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let items = root.as_array().ok_or_else(|| anyhow!("expected array"))?;

    let mut findings = Vec::new();
    for item in items {
        let severity = item
            .get("severity")
            .and_then(|v| v.as_str())
            .map(map_devskim_severity)
            .unwrap_or(Severity::Medium);

        findings.push(Finding {
            severity,
            rule: str_or(item.get("rule_id"), "devskim"),
            message: str_or(
                item.get("rule_name").or_else(|| item.get("description")),
                "devskim finding",
            ),
            file: str_or(item.get("filename"), &file.display().to_string()),
            line: u32_or(item.get("start_line"), 1),
            col: item
                .get("start_column")
                .and_then(|v| v.as_u64())
                .map(|c| c as u32),
            suggestion: item
                .get("recommendation")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            tool: "devskim".to_string(),
            category: "security".to_string(),
        });
    }
    Ok(findings)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn str_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn u32_or(value: Option<&Value>, default: u32) -> u32 {
    value
        .and_then(|v| v.as_u64())
        .map(|n| n as u32)
        .unwrap_or(default)
        .max(1)
}
