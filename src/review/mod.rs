// SPDX-License-Identifier: MIT
//! Review engine — the invocation surface shared by the CLI, the MCP server,
//! and git hooks.
//!
//! A review runs in three stages: the path boundary check, the synchronous
//! pattern pass, and (unless disabled) the concurrent external-scanner
//! fan-out. The aggregator merges both finding sets into one ordered report
//! and computes the pass/fail verdict against the severity threshold.

pub mod model;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::VetConfig;
use crate::patterns;
use crate::scanners::{self, probe, runner, Scanner};
use crate::security;
use model::{Finding, ReviewOptions, ReviewReport, Severity, SeverityCounts};

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Fatal review-request errors.
///
/// Everything else (missing tools, tool crashes, timeouts, bad rule bodies)
/// is recovered inside the engine: the review completes with a report, just
/// possibly with fewer findings than a fully healthy toolchain would produce.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Invalid root or malformed configuration — nothing was scanned.
    #[error("config error: {0}")]
    Config(String),
    /// The requested path escapes the project root — nothing was scanned.
    #[error("path violation: {0}")]
    PathViolation(String),
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Merge pattern and scanner findings into one ordered list and compute the
/// verdict.
///
/// No cross-tool deduplication: two tools flagging the same line may be
/// seeing different underlying issues, so both reports survive. Ordering is
/// severity descending, then file, then line — worst issues first.
pub fn aggregate(
    pattern_findings: Vec<Finding>,
    scanner_findings: Vec<Finding>,
    threshold: Severity,
) -> (Vec<Finding>, bool) {
    let mut findings = pattern_findings;
    findings.extend(scanner_findings);

    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
    });

    let passed = !findings.iter().any(|f| f.severity >= threshold);
    (findings, passed)
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// The review engine: project root, configuration, and the probed scanner
/// table.
///
/// The scanner availability table is written once during construction and
/// read-only afterwards — construction completes before any review is
/// accepted, so no locking is needed.
pub struct ReviewEngine {
    root: PathBuf,
    config: VetConfig,
    scanners: Vec<Scanner>,
}

impl ReviewEngine {
    /// Build an engine for `root`: load scanner overrides from config and
    /// probe availability once.
    pub async fn new(root: impl Into<PathBuf>, config: VetConfig) -> Result<Self, ReviewError> {
        let root: PathBuf = root.into();
        let root = std::fs::canonicalize(&root).map_err(|e| {
            ReviewError::Config(format!("invalid project root {}: {e}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(ReviewError::Config(format!(
                "project root is not a directory: {}",
                root.display()
            )));
        }

        let mut scanners = scanners::builtin_scanners();
        for scanner in &mut scanners {
            if let Some(over) = config.scanners.get(scanner.spec.name) {
                scanner.apply_override(over);
            }
        }
        probe::probe(&mut scanners).await;

        let available = scanners.iter().filter(|s| s.available).count();
        info!(available, total = scanners.len(), "scanner probe complete");

        Ok(Self {
            root,
            config,
            scanners,
        })
    }

    /// Build an engine with an explicit scanner table, skipping probing.
    ///
    /// Callers own the availability flags; used by tests and embedders that
    /// manage their own scanner set.
    pub fn with_scanners(
        root: impl Into<PathBuf>,
        config: VetConfig,
        scanners: Vec<Scanner>,
    ) -> Result<Self, ReviewError> {
        let root: PathBuf = root.into();
        let root = std::fs::canonicalize(&root).map_err(|e| {
            ReviewError::Config(format!("invalid project root {}: {e}", root.display()))
        })?;
        Ok(Self {
            root,
            config,
            scanners,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scanners(&self) -> &[Scanner] {
        &self.scanners
    }

    /// Review options seeded from the `[review]` config section.
    pub fn default_options(&self) -> ReviewOptions {
        ReviewOptions {
            include_external: self.config.review.include_external,
            threshold: self.config.review.threshold,
            deadline: self
                .config
                .review
                .deadline_ms
                .map(std::time::Duration::from_millis),
        }
    }

    /// Review one file.
    ///
    /// `content` overrides the on-disk state (staged content from a git hook,
    /// unsaved editor buffers); when omitted the file is read from disk.
    /// `include_external = false` skips the scanner fan-out entirely.
    pub async fn review_file(
        &self,
        path: &Path,
        content: Option<&str>,
        options: &ReviewOptions,
    ) -> Result<ReviewReport, ReviewError> {
        let resolved = security::confine(&self.root, path)
            .map_err(|e| ReviewError::PathViolation(e.to_string()))?;

        let owned;
        let content = match content {
            Some(c) => c,
            None => {
                owned = tokio::fs::read_to_string(&resolved).await.map_err(|e| {
                    ReviewError::Io {
                        path: resolved.display().to_string(),
                        source: e,
                    }
                })?;
                &owned
            }
        };

        let rel = resolved
            .strip_prefix(&self.root)
            .unwrap_or(&resolved)
            .display()
            .to_string();
        debug!(file = %rel, bytes = content.len(), "reviewing file");

        let pattern_findings = patterns::evaluate_for_file(content, &rel);

        let (mut scanner_findings, scanner_runs) = if options.include_external {
            runner::run_available(&self.scanners, &resolved, content, options.deadline).await
        } else {
            (Vec::new(), Vec::new())
        };

        // Scanner output often reports absolute paths; make them project-relative.
        for finding in &mut scanner_findings {
            if let Ok(stripped) = Path::new(&finding.file).strip_prefix(&self.root) {
                finding.file = stripped.display().to_string();
            }
        }

        let (findings, passed) = aggregate(pattern_findings, scanner_findings, options.threshold);
        let counts = SeverityCounts::tally(&findings);

        Ok(ReviewReport {
            id: Uuid::new_v4().to_string(),
            file: rel,
            passed,
            threshold: options.threshold,
            counts,
            findings,
            scanner_runs,
            created_at: Utc::now().to_rfc3339(),
        })
    }
}
