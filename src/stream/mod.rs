//! Boundary to the agent run stream.
//!
//! The run stream delivers interrupts and accepts commands that resume or
//! end a paused run. Implementations can talk to a bridge over a socket,
//! print commands for a dry run, or record them for tests.

pub mod client;
pub mod jsonl;
pub mod memory;
pub mod protocol;

use crate::inbox::types::Decision;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use client::SocketRunStream;
pub use jsonl::JsonlRunStream;
pub use memory::{MemoryStream, Submission};

/// Node name that ends the graph run.
pub const END: &str = "__end__";

/// A command for a paused run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Resume with one decision per pending action, in action order.
    Resume { decisions: Vec<Decision> },
    /// Jump to a node; `END` finishes the run without deciding.
    Goto(String),
}

/// Options passed alongside the (usually empty) run input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOptions {
    pub command: Command,
}

impl SubmitOptions {
    pub fn resume(decisions: Vec<Decision>) -> Self {
        Self {
            command: Command::Resume { decisions },
        }
    }

    pub fn goto_end() -> Self {
        Self {
            command: Command::Goto(END.to_string()),
        }
    }
}

/// Trait for run-stream transports.
#[async_trait]
pub trait RunStream {
    async fn submit(&self, input: Option<Value>, options: SubmitOptions) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resume_shape() {
        let options = SubmitOptions::resume(vec![Decision::Approve, Decision::reject("no")]);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"command": {"resume": {"decisions": [
                {"type": "approve"},
                {"type": "reject", "message": "no"}
            ]}}})
        );
    }

    #[test]
    fn test_goto_end_shape() {
        assert_eq!(
            serde_json::to_value(SubmitOptions::goto_end()).unwrap(),
            json!({"command": {"goto": "__end__"}})
        );
    }
}
