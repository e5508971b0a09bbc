//! MCP Transport Implementations
//!
//! Transports handle the I/O for MCP communication.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::error::{PromcpError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

/// Transport trait for MCP communication
#[async_trait]
pub trait Transport: Send {
    /// Receive the next message; `None` once the peer has closed the stream
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>>;

    /// Send a response through the transport
    async fn send(&mut self, response: JsonRpcResponse) -> Result<()>;
}

/// Newline-delimited JSON over any reader/writer pair
///
/// Lines that are not JSON are answered with a parse error, JSON that is not
/// a request with an invalid-request error; both are then skipped.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Stdio transport for MCP hosts
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Create a transport over the process's stdin/stdout
    pub fn stdio() -> Self {
        LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a transport over a reader/writer pair
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer (e.g. to inspect what was written)
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, response: &JsonRpcResponse) -> Result<()> {
        let mut json = serde_json::to_string(response)?;
        json.push('\n');

        self.writer.write_all(json.as_bytes()).await.map_err(|e| {
            PromcpError::Transport(format!("Failed to write response: {}", e))
        })?;

        self.writer
            .flush()
            .await
            .map_err(|e| PromcpError::Transport(format!("Failed to flush response: {}", e)))
    }
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>> {
        let mut line = String::new();

        loop {
            line.clear();
            let read = self.reader.read_line(&mut line).await.map_err(|e| {
                PromcpError::Transport(format!("Failed to read request: {}", e))
            })?;

            if read == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let value = match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unparseable message");
                    let response =
                        JsonRpcResponse::error(RequestId::Null, JsonRpcError::parse_error());
                    self.write_line(&response).await?;
                    continue;
                }
            };

            // Answer with the sender's id when it can be read
            let id = value
                .get("id")
                .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok())
                .unwrap_or(RequestId::Null);

            match serde_json::from_value::<JsonRpcRequest>(value) {
                Ok(request) => return Ok(Some(request)),
                Err(e) => {
                    tracing::warn!(error = %e, id = %id, "Discarding invalid JSON-RPC request");
                    let response = JsonRpcResponse::error(id, JsonRpcError::invalid_request());
                    self.write_line(&response).await?;
                }
            }
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<()> {
        self.write_line(&response).await
    }
}

/// In-memory transport for testing
#[derive(Debug, Default)]
pub struct MemoryTransport {
    requests: std::collections::VecDeque<JsonRpcRequest>,
    responses: Vec<JsonRpcResponse>,
}

impl MemoryTransport {
    /// Create a new memory transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request to be received
    pub fn push_request(&mut self, request: JsonRpcRequest) {
        self.requests.push_back(request);
    }

    /// Get all sent responses
    pub fn responses(&self) -> &[JsonRpcResponse] {
        &self.responses
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>> {
        Ok(self.requests.pop_front())
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<()> {
        self.responses.push(response);
        Ok(())
    }
}
