//! Aidpcore node configuration process
//!
//! Serves the configuration bootstrap to node-startup orchestration over
//! line-delimited JSON on stdio.
//!
//! # Protocol
//!
//! Request (one JSON object per line on stdin):
//!   { "id": "<string>", "op": "<string>", "payload": {...} }
//!
//! Response (one JSON object per line on stdout):
//!   { "id": "<string>", "ok": true|false, "result": {...}|null, "error": {...}|null }
//!
//! # Handled Operations
//!
//! - config.resolve
//! - config.status
//! - config.service
//! - runtime.info

use aidpcore_node::{BootstrapError, BootstrapOptions, ConfigBootstrap};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};

// =============================================================================
// Protocol Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct Request {
    id: String,
    op: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    id: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl Response {
    fn ok(id: String, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: String, code: &str, message: &str) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn from_bootstrap_error(id: &str, err: &BootstrapError) -> Self {
        tracing::error!(op = "core.bootstrap.error", code = err.code(), error = %err, "Bootstrap failed");
        Self::err(id.to_string(), err.code(), &err.to_string())
    }
}

// =============================================================================
// Op Dispatch
// =============================================================================

fn dispatch(bootstrap: &ConfigBootstrap, req: &Request) -> Response {
    match req.op.as_str() {
        "config.resolve" => handle_resolve(bootstrap, &req.id, &req.payload),
        "config.status" => handle_status(bootstrap, &req.id),
        "config.service" => handle_service(bootstrap, &req.id, &req.payload),
        "runtime.info" => handle_runtime_info(bootstrap, &req.id),
        _ => Response::err(
            req.id.clone(),
            "UNKNOWN_OP",
            &format!("Node config process does not handle op: {}", req.op),
        ),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// config.resolve — bootstrap if needed, return root + document as persisted
fn handle_resolve(bootstrap: &ConfigBootstrap, id: &str, payload: &Value) -> Response {
    tracing::info!(op = "core.config.resolve", "Handling config.resolve");

    let options = BootstrapOptions::from_value(payload);

    match bootstrap.resolve(Some(&options)) {
        Ok(resolved) => Response::ok(
            id.to_string(),
            serde_json::json!({
                "path": resolved.path.to_string_lossy(),
                "state": resolved.state,
                "config": resolved.raw,
            }),
        ),
        Err(e) => Response::from_bootstrap_error(id, &e),
    }
}

/// config.status — what exists under the root, without creating anything
fn handle_status(bootstrap: &ConfigBootstrap, id: &str) -> Response {
    tracing::info!(op = "core.config.status", "Handling config.status");

    match serde_json::to_value(bootstrap.status()) {
        Ok(status) => Response::ok(id.to_string(), status),
        Err(e) => Response::err(id.to_string(), "SERIALIZE_ERROR", &e.to_string()),
    }
}

/// config.service — fragment of one service, null if the document has none
fn handle_service(bootstrap: &ConfigBootstrap, id: &str, payload: &Value) -> Response {
    tracing::info!(op = "core.config.service", "Handling config.service");

    let name = match payload.get("name").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => return Response::err(id.to_string(), "INVALID_PAYLOAD", "name is required"),
    };

    match bootstrap.resolve(None) {
        Ok(resolved) => Response::ok(
            id.to_string(),
            serde_json::json!({
                "name": name,
                "enabled": resolved.config.has_service(name),
                "config": resolved.config.service_config(name),
            }),
        ),
        Err(e) => Response::from_bootstrap_error(id, &e),
    }
}

/// runtime.info — version and configuration root
fn handle_runtime_info(bootstrap: &ConfigBootstrap, id: &str) -> Response {
    tracing::info!(op = "core.runtime.info", "Handling runtime.info");

    Response::ok(
        id.to_string(),
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "root": bootstrap.paths().root().to_string_lossy(),
        }),
    )
}

// =============================================================================
// Main Loop
// =============================================================================

fn write_response<W: Write>(out: &mut W, resp: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *out, resp)?;
    out.write_all(b"\n")?;
    out.flush()
}

fn serve<R: BufRead, W: Write>(bootstrap: &ConfigBootstrap, input: R, mut output: W) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(op = "core.stdin.error", error = %e, "Failed to read stdin");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<Request>(trimmed) {
            Ok(req) => {
                tracing::debug!(op = "core.dispatch", id = %req.id, op_name = %req.op, "Dispatching");
                dispatch(bootstrap, &req)
            }
            // Can't correlate to an ID, respond with an empty one
            Err(e) => Response::err(
                String::new(),
                "PARSE_ERROR",
                &format!("Invalid JSON request: {}", e),
            ),
        };

        if let Err(e) = write_response(&mut output, &resp) {
            tracing::error!(op = "core.stdout.error", error = %e, "Failed to write response");
            break;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Tracing goes to stderr, stdout is reserved for responses
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aidpcore_node=info".parse()?),
        )
        .with_target(true)
        .init();

    let bootstrap = ConfigBootstrap::from_env().context("Failed to locate configuration root")?;

    tracing::info!(
        op = "core.startup",
        root = %bootstrap.paths().root().display(),
        "Node config process starting (stdio)"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&bootstrap, stdin.lock(), stdout.lock());

    tracing::info!(op = "core.shutdown", "Node config process shutting down");

    Ok(())
}
