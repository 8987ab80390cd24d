//! JSONL stream: writes each command as one JSON line instead of sending it.
//!
//! Backs `--dry-run`: the commands a review would send are printed to
//! stdout (or any writer) so they can be inspected or piped to another
//! tool. Flushes after every write.

use crate::stream::memory::Submission;
use crate::stream::{RunStream, SubmitOptions};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use std::sync::Mutex;

pub struct JsonlRunStream<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonlRunStream<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonlRunStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Serialize one submission and append it as a line.
    pub fn write_submission(&self, submission: &Submission) -> Result<()> {
        let json = serde_json::to_string(submission).context("Failed to serialize command")?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("Command writer lock poisoned"))?;
        writeln!(writer, "{}", json).context("Failed to write command")?;
        writer.flush().context("Failed to flush command output")?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|_| anyhow!("Command writer lock poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> RunStream for JsonlRunStream<W> {
    async fn submit(&self, input: Option<Value>, options: SubmitOptions) -> Result<()> {
        self.write_submission(&Submission { input, options })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::types::Decision;

    #[tokio::test]
    async fn test_one_line_per_command() {
        let stream = JsonlRunStream::new(Vec::new());
        stream
            .submit(
                Some(serde_json::json!({})),
                SubmitOptions::resume(vec![Decision::Approve]),
            )
            .await
            .unwrap();
        stream.submit(None, SubmitOptions::goto_end()).await.unwrap();

        let output = String::from_utf8(stream.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"input":{},"command":{"resume":{"decisions":[{"type":"approve"}]}}}"#,
                r#"{"command":{"goto":"__end__"}}"#,
            ]
        );
    }
}
