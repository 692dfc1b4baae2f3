// SPDX-License-Identifier: MIT
//! In-process pattern rules — regex and predicate detection over raw file
//! content. No I/O, no subprocesses.
//!
//! Rules live in per-domain registries (`security`, `typescript`,
//! `documentation`), each compiled once behind a `Lazy`. The engine selects
//! registries by file extension and evaluates every rule independently: rules
//! cannot short-circuit each other, and a file can trigger the same rule once
//! per match.

pub mod documentation;
pub mod security;
pub mod typescript;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::review::model::{Finding, Severity};

// ─── Rule types ───────────────────────────────────────────────────────────────

/// One hit reported by a `Detection::Check` function.
pub struct CheckMatch {
    /// Human-readable message for this specific hit.
    pub message: String,
    /// 1-based line number; whole-file findings use 1.
    pub line: u32,
}

/// A predicate rule body: receives the whole file content, returns zero or
/// more hits. An `Err` is logged and skipped without aborting the scan.
pub type CheckFn = fn(&str) -> anyhow::Result<Vec<CheckMatch>>;

/// How a rule detects issues.
pub enum Detection {
    /// Scanned line-by-line; every regex match produces one finding at that
    /// line, with the match offset as the column.
    Regex(Regex),
    /// Invoked once with the full content — for cross-line or structural
    /// checks a single regex cannot express.
    Check(CheckFn),
}

/// A single detection rule. Immutable once built.
pub struct PatternRule {
    /// Stable rule identifier, e.g. `"sec-hardcoded-credential"`.
    pub id: &'static str,
    /// Short human-readable name.
    pub name: &'static str,
    pub severity: Severity,
    /// Message attached to regex findings (check findings carry their own).
    pub description: &'static str,
    /// Advisory remediation text.
    pub fix: Option<&'static str>,
    /// Domain tag carried into every finding this rule produces.
    pub category: &'static str,
    pub detection: Detection,
}

/// A named collection of rules for one domain.
pub struct PatternRegistry {
    /// Registry name; findings are attributed to `"pattern:<name>"`.
    pub name: &'static str,
    pub rules: Vec<PatternRule>,
}

// ─── Registry selection ───────────────────────────────────────────────────────

static SECURITY: Lazy<PatternRegistry> = Lazy::new(security::registry);
static TYPESCRIPT: Lazy<PatternRegistry> = Lazy::new(typescript::registry);
static DOCUMENTATION: Lazy<PatternRegistry> = Lazy::new(documentation::registry);

/// Registries applicable to `file`, selected by extension.
///
/// TypeScript/JavaScript sources get the language registry plus security;
/// markdown gets documentation; everything else gets security alone.
pub fn registries_for(file: &str) -> Vec<&'static PatternRegistry> {
    let ext = std::path::Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => vec![&*TYPESCRIPT, &*SECURITY],
        "md" | "mdx" => vec![&*DOCUMENTATION],
        _ => vec![&*SECURITY],
    }
}

/// All built-in registries (CLI listing, benchmarks).
pub fn all_registries() -> Vec<&'static PatternRegistry> {
    vec![&*SECURITY, &*TYPESCRIPT, &*DOCUMENTATION]
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Evaluate one registry against `content`, producing findings attributed to
/// `"pattern:<registry>"`.
///
/// Rules are independent: a failing check rule is logged and skipped, and no
/// deduplication happens at this layer.
pub fn evaluate(registry: &PatternRegistry, content: &str, file: &str) -> Vec<Finding> {
    let tool = format!("pattern:{}", registry.name);
    let mut findings = Vec::new();

    for rule in &registry.rules {
        match &rule.detection {
            Detection::Regex(re) => {
                for (idx, line) in content.lines().enumerate() {
                    for m in re.find_iter(line) {
                        findings.push(Finding {
                            severity: rule.severity,
                            rule: rule.id.to_string(),
                            message: rule.description.to_string(),
                            file: file.to_string(),
                            line: (idx + 1) as u32,
                            col: Some((m.start() + 1) as u32),
                            suggestion: rule.fix.map(str::to_string),
                            tool: tool.clone(),
                            category: rule.category.to_string(),
                        });
                    }
                }
            }
            Detection::Check(check) => match check(content) {
                Ok(matches) => {
                    for hit in matches {
                        findings.push(Finding {
                            severity: rule.severity,
                            rule: rule.id.to_string(),
                            message: hit.message,
                            file: file.to_string(),
                            line: hit.line.max(1),
                            col: None,
                            suggestion: rule.fix.map(str::to_string),
                            tool: tool.clone(),
                            category: rule.category.to_string(),
                        });
                    }
                }
                Err(e) => {
                    warn!(rule = rule.id, err = %e, "check rule failed — skipping");
                }
            },
        }
    }

    findings
}

/// Evaluate every registry applicable to `file`.
pub fn evaluate_for_file(content: &str, file: &str) -> Vec<Finding> {
    registries_for(file)
        .into_iter()
        .flat_map(|registry| evaluate(registry, content, file))
        .collect()
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// 1-based line number of a byte offset into `content`.
///
/// Used by check rules that locate hits with a whole-content regex.
pub(crate) fn line_of_offset(content: &str, offset: usize) -> u32 {
    let clamped = offset.min(content.len());
    (content[..clamped].bytes().filter(|&b| b == b'\n').count() + 1) as u32
}
