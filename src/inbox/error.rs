//! Errors and user-facing notices for the review flow.
//!
//! Nothing here is fatal: every error leaves the controller in an
//! interactive state the reviewer can retry from. `Display` strings are the
//! exact messages shown to the reviewer.

use std::fmt;

/// Outbound operations that can fail in transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOperation {
    Submit,
    Resolve,
    SubmitAll,
    ApproveAll,
    RejectAll,
}

impl StreamOperation {
    /// Generic failure message shown when the run stream rejects a command.
    pub fn failure_message(&self) -> &'static str {
        match self {
            StreamOperation::Submit => "Failed to submit response.",
            StreamOperation::Resolve => "Failed to mark thread as resolved.",
            StreamOperation::SubmitAll => "Failed to submit actions.",
            StreamOperation::ApproveAll => "Failed to approve all actions.",
            StreamOperation::RejectAll => "Failed to reject all actions.",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            StreamOperation::Submit => "Response submitted successfully.",
            StreamOperation::Resolve => "Marked thread as resolved.",
            StreamOperation::SubmitAll => "All actions submitted successfully.",
            StreamOperation::ApproveAll => "All actions approved successfully.",
            StreamOperation::RejectAll => "All actions rejected successfully.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InboxError {
    #[error("Please enter a response.")]
    NoResponse,

    #[error("No response selected.")]
    NoResponseSelected,

    #[error("Unsupported response type.")]
    UnsupportedResponseType { found: String },

    #[error("Unable to update edited values.")]
    MismatchedEditShape,

    #[error("This action cannot be edited.")]
    NoEditResponse,

    #[error("This action cannot be rejected.")]
    NoRejectResponse,

    #[error("No pending action to review.")]
    NoActionRequest,

    #[error("No review config found for action '{action}'.")]
    NoMatchingReviewConfig { action: String },

    #[error("Unable to render interrupt. The data provided is not in the expected HITL format.")]
    InvalidInterrupt,

    #[error("Please address all {total} actions before submitting ({remaining} remaining).")]
    ActionsRemaining { total: usize, remaining: usize },

    #[error("Approve all is unavailable: action {index} does not allow approval.")]
    ApproveAllNotAllowed { index: usize },

    #[error(
        "The provided assistant ID was not found in this graph. \
         Please update the assistant ID in the settings and try again."
    )]
    InvalidAssistant,

    #[error("{}", .operation.failure_message())]
    Transport {
        operation: StreamOperation,
        reason: String,
    },
}

impl InboxError {
    /// Classify a run-stream failure. Backends report an unknown assistant
    /// with a message containing "Invalid assistant"; that case gets its own
    /// remediation text.
    pub fn from_transport(operation: StreamOperation, error: &anyhow::Error) -> Self {
        let invalid_assistant = error
            .chain()
            .any(|cause| cause.to_string().contains("Invalid assistant"));
        if invalid_assistant {
            InboxError::InvalidAssistant
        } else {
            InboxError::Transport {
                operation,
                reason: format!("{:#}", error),
            }
        }
    }

    /// Local validation failures: nothing was sent and state is unchanged.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            InboxError::InvalidAssistant | InboxError::Transport { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the reviewer (a toast in graphical clients).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&InboxError> for Notice {
    fn from(error: &InboxError) -> Self {
        match error {
            InboxError::InvalidAssistant => Notice {
                level: NoticeLevel::Error,
                title: "Error: Invalid assistant ID".to_string(),
                description: error.to_string(),
            },
            other => Notice::error(other.to_string()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_assistant_is_distinguished() {
        let err = anyhow::anyhow!("Invalid assistant: 'agent' not found");
        let classified = InboxError::from_transport(StreamOperation::Submit, &err);
        assert_eq!(classified, InboxError::InvalidAssistant);
        assert!(!classified.is_validation());

        let notice = Notice::from(&classified);
        assert_eq!(notice.title, "Error: Invalid assistant ID");
    }

    #[test]
    fn test_invalid_assistant_found_in_context_chain() {
        let err = anyhow::anyhow!("Invalid assistant id").context("bridge refused command");
        assert_eq!(
            InboxError::from_transport(StreamOperation::RejectAll, &err),
            InboxError::InvalidAssistant
        );
    }

    #[test]
    fn test_generic_transport_message_per_operation() {
        let err = anyhow::anyhow!("connection reset");
        let classified = InboxError::from_transport(StreamOperation::Resolve, &err);
        assert_eq!(classified.to_string(), "Failed to mark thread as resolved.");
        match classified {
            InboxError::Transport { reason, .. } => assert_eq!(reason, "connection reset"),
            other => panic!("Expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_remaining_message_names_counts() {
        let err = InboxError::ActionsRemaining {
            total: 3,
            remaining: 2,
        };
        assert_eq!(
            err.to_string(),
            "Please address all 3 actions before submitting (2 remaining)."
        );
        assert!(err.is_validation());
    }
}
