//! Socket stream: sends run commands to a stream bridge over a Unix socket.
//!
//! Each command opens a new connection, writes one JSON line and reads one
//! JSON line back. The socket I/O is blocking, so the `RunStream` impl runs
//! it on tokio's blocking pool.

use crate::config::InboxConfig;
use crate::stream::protocol::{StreamRequest, StreamResponse};
use crate::stream::{RunStream, SubmitOptions};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Run stream backed by a bridge listening on a Unix socket.
#[derive(Debug, Clone)]
pub struct SocketRunStream {
    socket_path: PathBuf,
    assistant_id: String,
    thread_id: Option<String>,
}

impl SocketRunStream {
    pub fn new(socket_path: impl AsRef<Path>, assistant_id: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            assistant_id: assistant_id.into(),
            thread_id: None,
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Build a stream from configuration. Requires `socket_path`.
    pub fn from_config(config: &InboxConfig) -> Result<Self> {
        let socket_path = config.socket_path.as_ref().context(
            "No stream bridge socket configured. Set INBOXCTL_SOCKET, pass --socket, \
             or use --dry-run to print commands instead.",
        )?;
        let mut stream = Self::new(socket_path, config.assistant_id.clone());
        stream.thread_id = config.thread_id.clone();
        Ok(stream)
    }

    /// Send a request and receive the bridge's response (synchronous).
    pub fn send(&self, request: &StreamRequest) -> Result<StreamResponse> {
        let mut stream = UnixStream::connect(&self.socket_path).with_context(|| {
            format!(
                "Failed to connect to stream bridge at {}. Is the bridge running?",
                self.socket_path.display()
            )
        })?;

        let json = serde_json::to_string(request)?;
        stream.write_all(json.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let mut reader = BufReader::new(stream);
        let mut response_line = String::new();
        reader.read_line(&mut response_line)?;

        let response: StreamResponse = serde_json::from_str(response_line.trim())
            .context("Failed to parse stream bridge response")?;

        if response.request_id != request.request_id {
            bail!(
                "Stream bridge answered request {} while {} was pending",
                response.request_id,
                request.request_id
            );
        }

        Ok(response)
    }

    fn request(&self, input: Option<Value>, options: SubmitOptions) -> StreamRequest {
        StreamRequest {
            request_id: Uuid::new_v4().to_string(),
            assistant_id: self.assistant_id.clone(),
            thread_id: self.thread_id.clone(),
            input,
            command: options.command,
        }
    }
}

#[async_trait]
impl RunStream for SocketRunStream {
    async fn submit(&self, input: Option<Value>, options: SubmitOptions) -> Result<()> {
        let request = self.request(input, options);
        let client = self.clone();

        let response = tokio::task::spawn_blocking(move || client.send(&request)).await??;

        if !response.ok {
            bail!(
                "{}",
                response
                    .error
                    .unwrap_or_else(|| "Stream bridge rejected the command".to_string())
            );
        }

        tracing::info!("bridge accepted request {}", response.request_id);
        Ok(())
    }
}
