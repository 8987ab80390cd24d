//! Stream bridge IPC protocol types.
//!
//! Defines the JSON messages exchanged between inboxctl and a run-stream
//! bridge (the process holding the live connection to the graph backend)
//! over a Unix domain socket.
//!
//! inboxctl sends one StreamRequest per command; the bridge forwards it to
//! the run and answers with a StreamResponse.

use crate::stream::Command;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command for the bridge to forward to the paused run.
/// Sent over the Unix domain socket as a JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Unique request ID (for correlating responses)
    pub request_id: String,

    /// Assistant (graph) the command targets; the backend rejects unknown ids
    pub assistant_id: String,

    /// Thread holding the interrupted run, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Run input sent with the command (usually empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    pub command: Command,
}

/// The bridge's answer to a StreamRequest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamResponse {
    /// Matches the request_id from the request
    pub request_id: String,

    /// Whether the run accepted the command
    pub ok: bool,

    /// If not ok: the backend's error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StreamResponse {
    /// Create an "accepted" response.
    pub fn accepted(request_id: String) -> Self {
        Self {
            request_id,
            ok: true,
            error: None,
        }
    }

    /// Create a "failed" response with the backend's message.
    pub fn failed(request_id: String, error: impl Into<String>) -> Self {
        Self {
            request_id,
            ok: false,
            error: Some(error.into()),
        }
    }
}
