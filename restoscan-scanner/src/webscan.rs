use crate::error::{Result, ScanError};
use crate::links::parse_links;
use crate::protocol::{McpConnection, ToolInfo};
use crate::result::ScanResult;
use crate::scanner::{LINK_LIMIT, PageScanner};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_SERVER_PATH: &str = "/path/to/mcp-server-webscan/build/index.js";

const FETCH_TOOL: &str = "fetch-page";
const LINKS_TOOL: &str = "extract-links";

/// How often a crashed webscan server is restarted before giving up.
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebscanConfig {
    /// Interpreter used to run the server, usually `node`.
    pub command: String,
    pub server_path: String,
    /// Let the server skip certificate checks. Applied to the child only.
    pub insecure_tls: bool,
    pub call_timeout: Duration,
    pub restart: RestartPolicy,
}

impl Default for WebscanConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            server_path: DEFAULT_SERVER_PATH.to_string(),
            insecure_tls: true,
            call_timeout: Duration::from_secs(60),
            restart: RestartPolicy::default(),
        }
    }
}

impl WebscanConfig {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg(&self.server_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if self.insecure_tls {
            cmd.env("NODE_TLS_REJECT_UNAUTHORIZED", "0");
        }
        cmd
    }
}

#[derive(Debug, Clone, Copy)]
enum Tool {
    FetchPage,
    ExtractLinks,
}

impl Tool {
    fn label(self) -> &'static str {
        match self {
            Tool::FetchPage => FETCH_TOOL,
            Tool::ExtractLinks => LINKS_TOOL,
        }
    }
}

/// One running webscan server process with its resolved tool names.
struct Session {
    child: Child,
    conn: McpConnection<ChildStdout, ChildStdin>,
    fetch_tool: String,
    links_tool: String,
}

impl Session {
    async fn start(config: &WebscanConfig) -> Result<Self> {
        info!("Starting webscan server: {} {}", config.command, config.server_path);

        let mut child = config.command().spawn().map_err(|e| ScanError::Spawn {
            command: format!("{} {}", config.command, config.server_path),
            source: e,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScanError::Protocol("webscan stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ScanError::Protocol("webscan stdout unavailable".to_string()))?;

        let mut conn = McpConnection::new(stdout, stdin);
        let handshake = async {
            conn.initialize().await?;
            conn.list_tools().await
        };
        let tools = tokio::time::timeout(config.call_timeout, handshake)
            .await
            .map_err(|_| ScanError::Timeout(config.call_timeout))??;

        let fetch_tool = find_tool(&tools, FETCH_TOOL)?;
        let links_tool = find_tool(&tools, LINKS_TOOL)?;
        debug!("Resolved webscan tools: {}, {}", fetch_tool, links_tool);

        Ok(Self {
            child,
            conn,
            fetch_tool,
            links_tool,
        })
    }

    async fn call(&mut self, tool: Tool, arguments: Value) -> Result<String> {
        let name = match tool {
            Tool::FetchPage => self.fetch_tool.clone(),
            Tool::ExtractLinks => self.links_tool.clone(),
        };
        self.conn.call_tool(&name, arguments).await
    }

    async fn shutdown(self) {
        let Session { mut child, conn, .. } = self;
        // Closing stdin asks the server to exit on its own.
        drop(conn);
        match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
            Ok(Ok(status)) => debug!("Webscan server exited with {}", status),
            Ok(Err(e)) => warn!("Failed waiting for webscan server: {}", e),
            Err(_) => {
                debug!("Webscan server did not exit, killing it");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill webscan server: {}", e);
                }
            }
        }
    }
}

fn find_tool(tools: &[ToolInfo], needle: &str) -> Result<String> {
    tools
        .iter()
        .find(|t| t.name.contains(needle))
        .map(|t| t.name.clone())
        .ok_or_else(|| ScanError::ToolNotFound(needle.to_string()))
}

/// Scanner backed by an `mcp-server-webscan` child process.
///
/// The process is started lazily on the first call and restarted when the
/// connection breaks, bounded by the configured [`RestartPolicy`].
pub struct WebscanClient {
    config: WebscanConfig,
    session: Mutex<Option<Session>>,
}

impl WebscanClient {
    pub fn new(config: WebscanConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Start the server now instead of on first use.
    pub async fn connect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            *session = Some(Session::start(&self.config).await?);
        }
        Ok(())
    }

    async fn call_once(&self, tool: Tool, arguments: &Value) -> Result<String> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(Session::start(&self.config).await?);
        }
        let Some(session) = guard.as_mut() else {
            return Err(ScanError::Disconnected);
        };

        let timeout = self.config.call_timeout;
        let outcome = match tokio::time::timeout(timeout, session.call(tool, arguments.clone())).await
        {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout(timeout)),
        };

        // A broken or stalled connection is not reused.
        if let Err(ref e) = outcome
            && (e.is_transient() || matches!(e, ScanError::Timeout(_)))
            && let Some(stale) = guard.take()
        {
            stale.shutdown().await;
        }
        outcome
    }

    async fn call(&self, tool: Tool, arguments: Value) -> Result<String> {
        let max_attempts = self.config.restart.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.call_once(tool, &arguments).await {
                Err(e) if e.is_transient() => {
                    if attempt >= max_attempts {
                        return Err(ScanError::RestartsExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                    warn!(
                        "Webscan {} failed ({}), restarting server (attempt {}/{})",
                        tool.label(),
                        e,
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(self.config.restart.delay).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl PageScanner for WebscanClient {
    async fn scan(&self, url: &str) -> Result<ScanResult> {
        debug!("Fetching page {}", url);
        let content = self.call(Tool::FetchPage, json!({ "url": url })).await?;
        Ok(ScanResult::new(url, content))
    }

    async fn extract_links(&self, url: &str) -> Result<Vec<String>> {
        debug!("Extracting links from {}", url);
        let text = self
            .call(Tool::ExtractLinks, json!({ "url": url, "limit": LINK_LIMIT }))
            .await?;
        let mut links = parse_links(&text);
        links.truncate(LINK_LIMIT);
        Ok(links)
    }

    async fn close(&self) -> Result<()> {
        if let Some(session) = self.session.lock().await.take() {
            info!("Stopping webscan server");
            session.shutdown().await;
        }
        Ok(())
    }
}
