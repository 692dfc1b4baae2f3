// SPDX-License-Identifier: MIT
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use codevet::review::model::Severity;
use codevet::review::ReviewEngine;
use codevet::{cli, mcp, VetConfig};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "codevet",
    about = "CodeVet — pattern-based code review engine with external scanner orchestration",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Project root. All reviewed paths must resolve inside it.
    #[arg(long, env = "CODEVET_ROOT", default_value = ".", global = true)]
    root: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CODEVET_LOG", global = true)]
    log: Option<String>,

    /// Suppress progress and informational output.
    ///
    /// Findings and the verdict are still printed. JSON output (--json
    /// flags) is unaffected. Use this flag when piping output to other tools.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review one or more files and print the findings.
    ///
    /// Runs the in-process pattern rules, plus every installed external
    /// scanner unless --no-external is given. Exit code 0 when every file
    /// passes the threshold, 1 when any fails, 2 on config/path errors.
    ///
    /// Examples:
    ///   codevet review src/auth.ts
    ///   codevet review --threshold medium --json src/**/*.ts
    Review {
        /// Files to review, relative to the project root.
        #[arg(required = true)]
        paths: Vec<std::path::PathBuf>,
        /// Fail the review when any finding is at or above this severity
        /// (critical, high, medium, low). Defaults to the project config.
        #[arg(long)]
        threshold: Option<Severity>,
        /// Skip external scanners — pattern-only review.
        #[arg(long)]
        no_external: bool,
        /// Emit reports as JSON instead of the human-readable table.
        #[arg(long)]
        json: bool,
    },
    /// Probe and list the known external scanners.
    ///
    /// Shows which scanner binaries are installed, which are disabled in
    /// codevet.toml, and the command each one resolves to.
    ///
    /// Examples:
    ///   codevet scanners
    ///   codevet scanners --json
    Scanners {
        /// Emit the table as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Serve the review engine over MCP (stdio).
    ///
    /// Intended to be spawned by an AI coding assistant; speaks JSON-RPC 2.0
    /// on stdin/stdout and exposes the review_file and list_scanners tools.
    ///
    /// Examples:
    ///   codevet mcp
    Mcp,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log.as_deref(), args.quiet);

    std::process::exit(match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            2
        }
    });
}

async fn run(args: Args) -> Result<i32> {
    let config = VetConfig::load(&args.root).context("loading codevet.toml")?;

    match args.command {
        Command::Review {
            paths,
            threshold,
            no_external,
            json,
        } => {
            let engine = ReviewEngine::new(&args.root, config).await?;

            let mut options = engine.default_options();
            if let Some(threshold) = threshold {
                options.threshold = threshold;
            }
            if no_external {
                options.include_external = false;
            }

            let mut all_passed = true;
            for path in &paths {
                // Path violations and unreadable files are fatal: no partial
                // scan is attempted for the request.
                let report = engine.review_file(path, None, &options).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    cli::print_report(&report, args.quiet);
                }
                all_passed &= report.passed;
            }

            Ok(if all_passed { 0 } else { 1 })
        }

        Command::Scanners { json } => {
            let engine = ReviewEngine::new(&args.root, config).await?;
            if json {
                let rows: Vec<_> = engine
                    .scanners()
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "name": s.spec.name,
                            "command": s.command,
                            "category": s.spec.category,
                            "available": s.available,
                            "enabled": s.enabled,
                            "timeout_ms": s.timeout.as_millis() as u64,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                cli::print_scanner_table(engine.scanners());
            }
            Ok(0)
        }

        Command::Mcp => {
            let engine = ReviewEngine::new(&args.root, config).await?;
            if let Err(e) = mcp::serve(engine).await {
                warn!(err = %e, "MCP server terminated with error");
                return Ok(2);
            }
            Ok(0)
        }
    }
}

fn init_tracing(level: Option<&str>, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if quiet { "error" } else { "info" };
    let filter = EnvFilter::try_new(level.unwrap_or(default))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
