//! In-memory run stream that records every command it is given.
//!
//! Used by tests and by anything that wants to inspect commands without a
//! live run. It can be armed to fail so transport-error paths are testable.

use crate::stream::{RunStream, SubmitOptions};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

/// One recorded call to [`RunStream::submit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(flatten)]
    pub options: SubmitOptions,
}

#[derive(Debug, Default)]
pub struct MemoryStream {
    submissions: Mutex<Vec<Submission>>,
    /// When set, every submit fails with this message and records nothing
    fail_with: Mutex<Option<String>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream whose submits fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            fail_with: Mutex::new(Some(message.into())),
        }
    }

    pub async fn fail_with(&self, message: Option<String>) {
        *self.fail_with.lock().await = message;
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.submissions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.lock().await.is_empty()
    }
}

#[async_trait]
impl RunStream for MemoryStream {
    async fn submit(&self, input: Option<Value>, options: SubmitOptions) -> Result<()> {
        if let Some(message) = self.fail_with.lock().await.clone() {
            bail!("{}", message);
        }
        self.submissions
            .lock()
            .await
            .push(Submission { input, options });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::types::Decision;

    #[tokio::test]
    async fn test_records_submissions() {
        let stream = MemoryStream::new();
        stream
            .submit(None, SubmitOptions::resume(vec![Decision::Approve]))
            .await
            .unwrap();
        stream.submit(None, SubmitOptions::goto_end()).await.unwrap();

        let submissions = stream.submissions().await;
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[1].options, SubmitOptions::goto_end());
    }

    #[tokio::test]
    async fn test_failing_stream_records_nothing() {
        let stream = MemoryStream::failing("connection closed");
        let err = stream
            .submit(None, SubmitOptions::goto_end())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "connection closed");
        assert!(stream.is_empty().await);

        stream.fail_with(None).await;
        stream.submit(None, SubmitOptions::goto_end()).await.unwrap();
        assert_eq!(stream.len().await, 1);
    }
}
