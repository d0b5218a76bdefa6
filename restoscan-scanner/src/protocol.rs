//! Minimal MCP client over newline-delimited JSON-RPC 2.0.
//!
//! Only the pieces the webscan server needs are covered: the `initialize`
//! handshake, `tools/list` and `tools/call`. Server-initiated `ping` requests
//! are answered; other server messages are skipped.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::debug;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request or notification (no id).
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// Any message the server may write: a response, a request or a notification.
#[derive(Debug, Deserialize)]
struct JsonRpcMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Tool advertised by the server in `tools/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolsListResult {
    tools: Vec<ToolInfo>,
}

#[derive(Debug, Deserialize)]
struct ToolCallResult {
    #[serde(default)]
    content: Option<Vec<Value>>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

pub struct McpConnection<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
    next_id: u64,
}

impl<R, W> McpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            next_id: 1,
        }
    }

    async fn write_line(&mut self, message: &impl Serialize) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a request and wait for the response carrying the same id.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        debug!("-> [{}] {}", id, method);
        self.write_line(&JsonRpcRequest {
            jsonrpc: "2.0",
            id: Some(id),
            method,
            params: Some(params),
        })
        .await?;

        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Err(ScanError::Disconnected);
            };
            if line.trim().is_empty() {
                continue;
            }

            let message: JsonRpcMessage = match serde_json::from_str(&line) {
                Ok(m) => m,
                Err(e) => {
                    debug!("Skipping non JSON-RPC line from server: {}", e);
                    continue;
                }
            };

            if let Some(server_method) = message.method.as_deref() {
                if server_method == "ping"
                    && let Some(ping_id) = message.id
                {
                    self.write_line(&json!({ "jsonrpc": "2.0", "id": ping_id, "result": {} }))
                        .await?;
                } else {
                    debug!("Ignoring server message: {}", server_method);
                }
                continue;
            }

            if message.id.as_ref().and_then(Value::as_u64) != Some(id) {
                debug!("Ignoring response for stale id {:?}", message.id);
                continue;
            }

            debug!("<- [{}] {}", id, method);
            if let Some(error) = message.error {
                return Err(ScanError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(message.result.unwrap_or(Value::Null));
        }
    }

    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        debug!("-> {}", method);
        self.write_line(&JsonRpcRequest {
            jsonrpc: "2.0",
            id: None,
            method,
            params,
        })
        .await
    }

    pub async fn initialize(&mut self) -> Result<()> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "restoscan",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;

        if let Some(server) = result.get("serverInfo") {
            debug!("Connected to MCP server {}", server);
        }

        self.notify("notifications/initialized", None).await
    }

    pub async fn list_tools(&mut self) -> Result<Vec<ToolInfo>> {
        let result = self.request("tools/list", json!({})).await?;
        let list: ToolsListResult = serde_json::from_value(result)
            .map_err(|e| ScanError::Protocol(format!("Malformed tools/list result: {}", e)))?;
        Ok(list.tools)
    }

    /// Invoke a tool and flatten its content blocks to text.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;

        let (text, is_error) = tool_result_text(&result)?;
        if is_error {
            return Err(ScanError::ToolFailed(text));
        }
        Ok(text)
    }
}

/// Text blocks are used verbatim; any other block, or a result without
/// content, is rendered as JSON.
fn tool_result_text(result: &Value) -> Result<(String, bool)> {
    if let Value::String(text) = result {
        return Ok((text.clone(), false));
    }

    let parsed: ToolCallResult = serde_json::from_value(result.clone())
        .unwrap_or(ToolCallResult {
            content: None,
            is_error: false,
        });

    let Some(blocks) = parsed.content else {
        return Ok((serde_json::to_string(result)?, parsed.is_error));
    };

    let mut parts = Vec::with_capacity(blocks.len());
    for block in &blocks {
        match (block.get("type").and_then(Value::as_str), block.get("text")) {
            (Some("text"), Some(Value::String(text))) => parts.push(text.clone()),
            _ => parts.push(serde_json::to_string(block)?),
        }
    }
    Ok((parts.join("\n"), parsed.is_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf, duplex, split};

    type TestConnection = McpConnection<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

    /// Spawn a fake server answering each request with `respond(method, params)`.
    fn fake_server<F>(respond: F) -> TestConnection
    where
        F: Fn(&str, &Value) -> Option<Value> + Send + 'static,
    {
        let (client, server) = duplex(64 * 1024);
        tokio::spawn(async move {
            let (read, mut write) = split(server);
            let mut lines = BufReader::new(read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let request: Value = serde_json::from_str(&line).unwrap();
                let method = request["method"].as_str().unwrap_or_default().to_string();
                let Some(id) = request.get("id").cloned() else {
                    continue;
                };
                if let Some(reply) = respond(&method, &request["params"]) {
                    let mut out = serde_json::to_string(&json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": reply
                    }))
                    .unwrap();
                    out.push('\n');
                    write.write_all(out.as_bytes()).await.unwrap();
                }
            }
        });
        let (read, write) = split(client);
        McpConnection::new(read, write)
    }

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let mut conn = fake_server(|method, _| match method {
            "initialize" => Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": { "name": "webscan", "version": "1.0.0" },
                "capabilities": { "tools": {} }
            })),
            "tools/list" => Some(json!({
                "tools": [
                    { "name": "fetch-page", "description": "Fetch a page" },
                    { "name": "extract-links" }
                ]
            })),
            _ => None,
        });

        conn.initialize().await.unwrap();
        let tools = conn.list_tools().await.unwrap();

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["fetch-page", "extract-links"]);
        assert_eq!(tools[0].description.as_deref(), Some("Fetch a page"));
    }

    #[tokio::test]
    async fn test_call_tool_joins_text_blocks() {
        let mut conn = fake_server(|method, params| {
            assert_eq!(method, "tools/call");
            assert_eq!(params["name"], "fetch-page");
            assert_eq!(params["arguments"]["url"], "https://example.com");
            Some(json!({
                "content": [
                    { "type": "text", "text": "# Luigi's" },
                    { "type": "text", "text": "Open daily" }
                ]
            }))
        });

        let text = conn
            .call_tool("fetch-page", json!({ "url": "https://example.com" }))
            .await
            .unwrap();
        assert_eq!(text, "# Luigi's\nOpen daily");
    }

    #[tokio::test]
    async fn test_call_tool_reports_tool_error() {
        let mut conn = fake_server(|_, _| {
            Some(json!({
                "content": [{ "type": "text", "text": "HTTP 404" }],
                "isError": true
            }))
        });

        let err = conn
            .call_tool("fetch-page", json!({ "url": "https://example.com/gone" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::ToolFailed(ref msg) if msg == "HTTP 404"));
    }

    #[tokio::test]
    async fn test_result_without_content_is_serialized() {
        let mut conn = fake_server(|_, _| Some(json!({ "links": ["https://x.example/menu"] })));

        let text = conn.call_tool("extract-links", json!({})).await.unwrap();
        assert_eq!(text, r#"{"links":["https://x.example/menu"]}"#);
    }

    #[tokio::test]
    async fn test_rpc_error_is_surfaced() {
        let (client, server) = duplex(4096);
        tokio::spawn(async move {
            let (read, mut write) = split(server);
            let mut lines = BufReader::new(read).lines();
            let line = lines.next_line().await.unwrap().unwrap();
            let request: Value = serde_json::from_str(&line).unwrap();
            let reply = json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": -32601, "message": "Method not found" }
            });
            write
                .write_all(format!("{}\n", reply).as_bytes())
                .await
                .unwrap();
        });
        let (read, write) = split(client);
        let mut conn = McpConnection::new(read, write);

        let err = conn.request("bogus", json!({})).await.unwrap_err();
        assert!(matches!(err, ScanError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_skips_noise_and_stale_responses() {
        let (client, server) = duplex(4096);
        tokio::spawn(async move {
            let (read, mut write) = split(server);
            let mut lines = BufReader::new(read).lines();
            let line = lines.next_line().await.unwrap().unwrap();
            let request: Value = serde_json::from_str(&line).unwrap();
            let out = format!(
                "server starting...\n{}\n{}\n{}\n",
                json!({ "jsonrpc": "2.0", "method": "notifications/message", "params": {} }),
                json!({ "jsonrpc": "2.0", "id": 999, "result": "stale" }),
                json!({ "jsonrpc": "2.0", "id": request["id"], "result": "fresh" }),
            );
            write.write_all(out.as_bytes()).await.unwrap();
        });
        let (read, write) = split(client);
        let mut conn = McpConnection::new(read, write);

        let result = conn.request("tools/list", json!({})).await.unwrap();
        assert_eq!(result, json!("fresh"));
    }

    #[tokio::test]
    async fn test_eof_is_disconnected() {
        let (client, server) = duplex(4096);
        drop(server);
        let (read, write) = split(client);
        let mut conn = McpConnection::new(read, write);

        let err = conn.request("tools/list", json!({})).await.unwrap_err();
        assert!(err.is_transient());
    }
}
