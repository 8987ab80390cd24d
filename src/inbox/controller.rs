//! Single-action review controller.
//!
//! Owns the working state for one pending interrupt and sends the
//! reviewer's decision to the run stream:
//!
//! ```text
//! idle ──submit──▶ submitting ──ok──▶ resolved
//!   ▲                   │
//!   └──────error────────┘
//! ```
//!
//! A new interrupt always replaces the working state wholesale.

use crate::inbox::error::{InboxError, Notice, StreamOperation};
use crate::inbox::tracker::{EditInput, ReviewState};
use crate::inbox::types::*;
use crate::stream::{RunStream, SubmitOptions};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    Idle,
    Submitting,
    Resolved,
}

pub struct InterruptController {
    stream: Arc<dyn RunStream + Send + Sync>,
    interrupt: Option<Interrupt>,
    request: Option<HitlRequest>,
    state: ReviewState,
    status: ControllerStatus,
    notice: Option<Notice>,
}

impl InterruptController {
    pub fn new(stream: Arc<dyn RunStream + Send + Sync>) -> Self {
        Self {
            stream,
            interrupt: None,
            request: None,
            state: ReviewState::default(),
            status: ControllerStatus::Idle,
            notice: None,
        }
    }

    /// Show `interrupt`. Returns false (and keeps the current state) only
    /// when it is the identified interrupt still under review. Anything
    /// else, including an equal payload after a resolved submit, rebuilds
    /// the working state.
    pub fn set_interrupt(&mut self, interrupt: Interrupt) -> bool {
        if self.status != ControllerStatus::Resolved
            && is_same_pending(self.interrupt.as_ref(), &interrupt)
        {
            return false;
        }

        self.request = interrupt.hitl_request();
        self.state = match &self.request {
            Some(request) => ReviewState::from_request(request),
            None => {
                tracing::debug!("interrupt value is not reviewable, showing fallback");
                ReviewState::default()
            }
        };
        self.interrupt = Some(interrupt);
        self.status = ControllerStatus::Idle;
        self.notice = None;
        true
    }

    /// Close the current interrupt and drop its working state.
    pub fn clear_interrupt(&mut self) {
        self.interrupt = None;
        self.request = None;
        self.state = ReviewState::default();
        self.status = ControllerStatus::Idle;
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        self.interrupt.as_ref()
    }

    /// The validated request; `None` means the interrupt cannot be rendered
    /// as a review.
    pub fn request(&self) -> Option<&HitlRequest> {
        self.request.as_ref()
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ControllerStatus::Submitting
    }

    pub fn stream_finished(&self) -> bool {
        self.status == ControllerStatus::Resolved
    }

    pub fn approve_allowed(&self) -> bool {
        self.state.approve_allowed()
    }

    pub fn has_edited(&self) -> bool {
        self.state.has_edited()
    }

    pub fn has_added_response(&self) -> bool {
        self.state.has_added_response()
    }

    pub fn selected(&self) -> Option<DecisionType> {
        self.state.selected()
    }

    pub fn supports_multiple_methods(&self) -> bool {
        self.state.supports_multiple_methods()
    }

    /// The most recent notice, if not yet taken.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn select(&mut self, decision: DecisionType) {
        self.state.select(decision);
    }

    pub fn apply_edit(
        &mut self,
        change: impl Into<EditInput>,
        key: impl Into<EditInput>,
    ) -> Result<bool, InboxError> {
        let result = self.state.apply_edit(change, key);
        self.note_failure(result)
    }

    pub fn reset_edits(&mut self) -> Result<(), InboxError> {
        let result = self.state.reset_edits();
        self.note_failure(result)
    }

    pub fn apply_reject(&mut self, change: impl Into<String>) -> Result<(), InboxError> {
        let result = self.state.apply_reject(change);
        self.note_failure(result)
    }

    /// Build the decision for the current selection and resume the run.
    pub async fn submit(&mut self) -> Result<Decision, InboxError> {
        let decision = match self.state.build_decision() {
            Ok(decision) => decision,
            Err(e) => return Err(self.fail(e)),
        };

        self.status = ControllerStatus::Submitting;
        tracing::info!("submitting decision: {}", decision);

        let sent = self
            .stream
            .submit(Some(json!({})), SubmitOptions::resume(vec![decision.clone()]))
            .await;

        match sent {
            Ok(()) => {
                self.state.clear_snapshot();
                self.status = ControllerStatus::Resolved;
                self.notice = Some(Notice::success(StreamOperation::Submit.success_message()));
                Ok(decision)
            }
            Err(e) => {
                tracing::error!("Error sending human response: {:#}", e);
                self.status = ControllerStatus::Idle;
                Err(self.fail(InboxError::from_transport(StreamOperation::Submit, &e)))
            }
        }
    }

    /// Mark the thread resolved without deciding: the run jumps to its end.
    pub async fn resolve(&mut self) -> Result<(), InboxError> {
        self.status = ControllerStatus::Submitting;
        self.state.clear_snapshot();

        let sent = self
            .stream
            .submit(Some(json!({})), SubmitOptions::goto_end())
            .await;

        match sent {
            Ok(()) => {
                self.status = ControllerStatus::Resolved;
                self.notice = Some(Notice::success(StreamOperation::Resolve.success_message()));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error marking thread as resolved: {:#}", e);
                self.status = ControllerStatus::Idle;
                Err(self.fail(InboxError::from_transport(StreamOperation::Resolve, &e)))
            }
        }
    }

    fn fail(&mut self, error: InboxError) -> InboxError {
        self.notice = Some(Notice::from(&error));
        error
    }

    fn note_failure<T>(&mut self, result: Result<T, InboxError>) -> Result<T, InboxError> {
        result.map_err(|e| self.fail(e))
    }
}

/// Redelivery of the interrupt under review: equal envelopes carrying a
/// non-empty id. Payloads without an id cannot be told apart from a new
/// pause with the same content.
pub(crate) fn is_same_pending(current: Option<&Interrupt>, incoming: &Interrupt) -> bool {
    incoming.id.as_deref().is_some_and(|id| !id.is_empty()) && current == Some(incoming)
}
