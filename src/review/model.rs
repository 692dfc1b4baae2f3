// SPDX-License-Identifier: MIT
//! Data models for the review engine.
//!
//! All types are `Serialize`/`Deserialize` so they can be sent over the MCP
//! JSON-RPC transport and emitted by the CLI's `--json` output.

use serde::{Deserialize, Serialize};

// ─── Severity ─────────────────────────────────────────────────────────────────

/// Finding severity, aligned across pattern rules and all external scanners.
///
/// The derive order gives the total order `Critical > High > Medium > Low >
/// Info`, which the aggregator relies on for sorting and for the threshold
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational — worth knowing, never blocks a review.
    Info,
    /// Minor issue — style or hygiene.
    Low,
    /// Potential problem — should be fixed.
    Medium,
    /// Serious problem — likely a real defect or vulnerability.
    High,
    /// Maximal risk — exposed credentials, exploitable flaws.
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            other => Err(format!(
                "unknown severity '{other}' (expected critical, high, medium, low, or info)"
            )),
        }
    }
}

// ─── Finding ─────────────────────────────────────────────────────────────────

/// A single normalized issue, from either the pattern engine or an external
/// scanner.
///
/// Invariant: `rule`, `message`, `file`, and `tool` are non-empty; `line` is
/// 1-based and defaults to 1 when a tool cannot localize the issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    /// Severity on the common five-level scale.
    pub severity: Severity,
    /// Stable rule identifier (pattern rule id or external-tool rule id).
    pub rule: String,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Project-relative file path.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (not all tools report columns).
    pub col: Option<u32>,
    /// Optional remediation advice.
    pub suggestion: Option<String>,
    /// Originating component: `"pattern:<registry>"` or the scanner name.
    pub tool: String,
    /// Domain tag: `"security"`, `"typescript"`, `"documentation"`, …
    pub category: String,
}

// ─── Scanner run record ───────────────────────────────────────────────────────

/// The raw outcome of one external-scanner invocation, kept in the report for
/// transparency: a degraded toolchain is visible, not silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerRun {
    /// Scanner name (matches the registry entry).
    pub tool: String,
    /// Whether the scanner ran and its output was parsed.
    pub success: bool,
    /// Number of findings contributed after normalization.
    pub finding_count: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Failure detail when `success` is false (timeout, exit code, parse error).
    pub error: Option<String>,
}

// ─── Review options ───────────────────────────────────────────────────────────

/// Caller-supplied knobs for a single review request.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Run the external scanner fan-out in addition to pattern rules.
    pub include_external: bool,
    /// Review fails when any finding's severity is ≥ this threshold.
    pub threshold: Severity,
    /// Hard deadline for the scanner fan-out. Pending scanners past the
    /// deadline are discarded (their processes are reaped on drop).
    pub deadline: Option<std::time::Duration>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            include_external: true,
            threshold: Severity::High,
            deadline: None,
        }
    }
}

// ─── Review report ────────────────────────────────────────────────────────────

/// Per-severity finding tallies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }
}

/// Complete result of one review request.
///
/// Findings are ordered worst-first (severity descending, then file, then
/// line) and are immutable once the report is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Unique review ID (UUID v4).
    pub id: String,
    /// Project-relative path of the reviewed file.
    pub file: String,
    /// Ordered, normalized findings from all sources.
    pub findings: Vec<Finding>,
    /// `false` when any finding's severity is ≥ the threshold.
    pub passed: bool,
    /// Threshold the verdict was computed against.
    pub threshold: Severity,
    /// Per-severity tallies over `findings`.
    pub counts: SeverityCounts,
    /// Per-scanner run records (empty for pattern-only reviews).
    pub scanner_runs: Vec<ScannerRun>,
    /// ISO-8601 timestamp when the review completed.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn severity_round_trips_lowercase() {
        for sev in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
        ] {
            let parsed: Severity = sev.as_str().parse().unwrap();
            assert_eq!(parsed, sev);
        }
    }

    #[test]
    fn severity_rejects_free_text() {
        assert!("warning".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn tally_counts_each_level() {
        let mk = |severity| Finding {
            severity,
            rule: "r".into(),
            message: "m".into(),
            file: "f".into(),
            line: 1,
            col: None,
            suggestion: None,
            tool: "t".into(),
            category: "c".into(),
        };
        let findings = vec![
            mk(Severity::Critical),
            mk(Severity::High),
            mk(Severity::High),
            mk(Severity::Info),
        ];
        let counts = SeverityCounts::tally(&findings);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.info, 1);
    }
}
