//! Model Context Protocol (MCP) server for codevet.
//!
//! An AI coding assistant spawns `codevet mcp` as a subprocess and talks
//! JSON-RPC 2.0 over stdio (protocol 2024-11-05). The server exposes the
//! review engine as tools:
//!
//! | Module | Role |
//! |--------|------|
//! | `transport` | JSON-RPC wire types, error codes, `initialize` handling |
//! | `tools` | `tools/list` definitions and the `tools/call` dispatcher |

pub mod tools;
pub mod transport;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::review::ReviewEngine;
use transport::{
    initialize_result, McpError, McpMessage, McpResponse, MCP_INTERNAL_ERROR, MCP_INVALID_PARAMS,
    MCP_METHOD_NOT_FOUND, MCP_PARSE_ERROR,
};

pub use tools::{codevet_tools, McpToolDef};

/// Serve MCP over stdio until the client closes the stream.
///
/// One request per line in, one response per line out. Notifications get no
/// response; malformed lines get a parse-error response with a null id.
pub async fn serve(engine: ReviewEngine) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpMessage>(&line) {
            Ok(message) => handle_message(&engine, message).await,
            Err(e) => {
                warn!(err = %e, "malformed MCP request line");
                Some(McpResponse::error(
                    Value::Null,
                    McpError::new(MCP_PARSE_ERROR, format!("parse error: {e}")),
                ))
            }
        };

        if let Some(response) = response {
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            stdout.write_all(payload.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    debug!("MCP client closed stdin — shutting down");
    Ok(())
}

/// Handle one request; `None` for notifications.
async fn handle_message(engine: &ReviewEngine, message: McpMessage) -> Option<McpResponse> {
    // Notifications carry no id and expect no response.
    let id = match message.id {
        Some(id) => id,
        None => {
            debug!(method = %message.method, "MCP notification");
            return None;
        }
    };

    let response = match message.method.as_str() {
        "initialize" => McpResponse::ok(id, initialize_result()),
        "ping" => McpResponse::ok(id, serde_json::json!({})),
        "tools/list" => {
            let tools = serde_json::to_value(codevet_tools()).unwrap_or_default();
            McpResponse::ok(id, serde_json::json!({ "tools": tools }))
        }
        "tools/call" => {
            let params = message.params.unwrap_or_default();
            let name = params.get("name").and_then(|v| v.as_str());
            let arguments = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}));

            match name {
                None => McpResponse::error(
                    id,
                    McpError::new(MCP_INVALID_PARAMS, "missing tool name"),
                ),
                Some(tool_name) => match tools::dispatch(engine, tool_name, arguments).await {
                    Ok(result) => McpResponse::ok(id, result),
                    Err(e) => {
                        let text = e.to_string();
                        let code = if text.starts_with("unknown tool")
                            || text.starts_with("missing required argument")
                            || text.starts_with("path violation")
                        {
                            MCP_INVALID_PARAMS
                        } else {
                            MCP_INTERNAL_ERROR
                        };
                        McpResponse::error(id, McpError::new(code, text))
                    }
                },
            }
        }
        other => McpResponse::error(
            id,
            McpError::new(MCP_METHOD_NOT_FOUND, format!("unknown method: {other}")),
        ),
    };

    Some(response)
}
