// SPDX-License-Identifier: MIT
//! Project configuration — `codevet.toml` at the project root.
//!
//! All sections are optional and default to sensible values; a malformed file
//! is a fatal configuration error (reported before any scan begins), but a
//! missing file is not.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::review::model::Severity;

/// Config file name looked up at the project root.
pub const CONFIG_FILE: &str = "codevet.toml";

// ─── ReviewSection ────────────────────────────────────────────────────────────

/// Review defaults (`[review]` in codevet.toml). CLI flags win over these.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewSection {
    /// Review fails when any finding's severity is ≥ this threshold.
    pub threshold: Severity,
    /// Run external scanners in addition to pattern rules.
    pub include_external: bool,
    /// Hard deadline for the scanner fan-out, in milliseconds. None = no cap
    /// beyond the per-scanner timeouts.
    pub deadline_ms: Option<u64>,
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            threshold: Severity::High,
            include_external: true,
            deadline_ms: None,
        }
    }
}

// ─── ScannerOverride ──────────────────────────────────────────────────────────

/// Per-scanner tuning (`[scanners.<name>]` in codevet.toml).
///
/// Unset fields keep the registry defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerOverride {
    /// Disable a scanner entirely (it will not even be probed).
    pub enabled: Option<bool>,
    /// Per-invocation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Alternate binary path/name for this scanner.
    pub command: Option<String>,
}

// ─── VetConfig ────────────────────────────────────────────────────────────────

/// Full codevet configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VetConfig {
    pub review: ReviewSection,
    /// Keyed by registry scanner name (`semgrep`, `eslint`, …).
    pub scanners: HashMap<String, ScannerOverride>,
}

impl VetConfig {
    /// Load `codevet.toml` from `root`, falling back to defaults when the
    /// file does not exist.
    ///
    /// Returns `Err` on unreadable or malformed TOML — configuration errors
    /// are fatal and must surface before any scan.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file — using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: VetConfig = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
