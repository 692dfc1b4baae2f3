/// MCP `tools/list` and `tools/call` — the review tools exposed to agents.
///
/// Each tool definition follows the JSON Schema convention for `inputSchema`.
/// Agents call `tools/list` to discover the tools, then invoke them via
/// `tools/call`.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::review::model::Severity;
use crate::review::{ReviewEngine, ReviewError};

// ─── Tool definition type ─────────────────────────────────────────────────────

/// A single MCP tool definition, as returned in `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl McpToolDef {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

// ─── Tool catalogue ───────────────────────────────────────────────────────────

/// Returns all codevet tools available via MCP.
///
/// Defined as a function (not a static) because `serde_json::json!` produces
/// a non-`const` `Value`. The list is small and cheap to allocate.
pub fn codevet_tools() -> Vec<McpToolDef> {
    vec![
        // ── review_file ───────────────────────────────────────────────────────
        McpToolDef::new(
            "review_file",
            "Run a static code review on one file: pattern rules plus any installed external scanners. Returns ordered findings and a pass/fail verdict.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path, relative to the project root."
                    },
                    "content": {
                        "type": "string",
                        "description": "Review this content instead of the on-disk file (e.g. staged or unsaved changes)."
                    },
                    "threshold": {
                        "type": "string",
                        "enum": ["critical", "high", "medium", "low"],
                        "description": "Fail the review when any finding is at or above this severity. Defaults to the project config."
                    },
                    "include_external": {
                        "type": "boolean",
                        "description": "Also run external scanners. Defaults to the project config."
                    }
                },
                "additionalProperties": false
            }),
        ),
        // ── list_scanners ─────────────────────────────────────────────────────
        McpToolDef::new(
            "list_scanners",
            "List the known external scanners and whether each is installed and enabled.",
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        ),
    ]
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Dispatch a `tools/call` invocation to the engine.
///
/// Returns the tool result value, or `Err` with a message the transport maps
/// to an MCP error response.
pub async fn dispatch(
    engine: &ReviewEngine,
    tool_name: &str,
    arguments: Value,
) -> anyhow::Result<Value> {
    match tool_name {
        "review_file" => review_file(engine, arguments).await,
        "list_scanners" => Ok(list_scanners(engine)),
        other => {
            warn!(tool = other, "MCP unknown tool");
            anyhow::bail!("unknown tool: {other}")
        }
    }
}

async fn review_file(engine: &ReviewEngine, arguments: Value) -> anyhow::Result<Value> {
    let path = arguments
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: path"))?;
    let content = arguments.get("content").and_then(|v| v.as_str());

    let mut options = engine.default_options();
    if let Some(threshold) = arguments.get("threshold").and_then(|v| v.as_str()) {
        options.threshold = threshold
            .parse::<Severity>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(include_external) = arguments.get("include_external").and_then(|v| v.as_bool()) {
        options.include_external = include_external;
    }

    let report = engine
        .review_file(std::path::Path::new(path), content, &options)
        .await
        .map_err(|e| match e {
            ReviewError::PathViolation(msg) => anyhow::anyhow!("path violation: {msg}"),
            other => anyhow::anyhow!(other),
        })?;

    Ok(serde_json::to_value(report)?)
}

fn list_scanners(engine: &ReviewEngine) -> Value {
    let scanners: Vec<Value> = engine
        .scanners()
        .iter()
        .map(|s| {
            json!({
                "name": s.spec.name,
                "command": s.command,
                "category": s.spec.category,
                "available": s.available,
                "enabled": s.enabled,
                "timeout_ms": s.timeout.as_millis() as u64,
            })
        })
        .collect();
    json!({ "scanners": scanners })
}
