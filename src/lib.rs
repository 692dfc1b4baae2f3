pub mod cli;
pub mod config;
pub mod mcp;
pub mod patterns;
pub mod review;
pub mod scanners;
pub mod security;

// --- Key type re-exports ---
// The invocation surface most embedders need, without digging into modules.

pub use config::VetConfig;
pub use review::model::{
    Finding, ReviewOptions, ReviewReport, ScannerRun, Severity, SeverityCounts,
};
pub use review::{aggregate, ReviewEngine, ReviewError};
pub use scanners::{InputMode, Scanner, ScannerSpec};
