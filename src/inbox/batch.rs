//! Multi-action review: one interrupt carrying several pending actions.
//!
//! The reviewer walks the actions with a cursor, saving one decision per
//! action index. Once every index has a decision the batch is sent as a
//! single resume, ordered by action index. Approve-all and reject-all skip
//! the per-action flow entirely.
//!
//! Recorded decisions are keyed by position in the *current* interrupt, so
//! any new interrupt clears them and moves the cursor back to the start.

use crate::config::DEFAULT_REJECT_ALL_MESSAGE;
use crate::inbox::controller::is_same_pending;
use crate::inbox::error::{InboxError, Notice, StreamOperation};
use crate::inbox::tracker::{EditInput, ReviewState};
use crate::inbox::types::*;
use crate::stream::{RunStream, SubmitOptions};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct BatchController {
    stream: Arc<dyn RunStream + Send + Sync>,
    interrupt: Option<Interrupt>,
    request: Option<HitlRequest>,
    current_index: usize,
    addressed: BTreeMap<usize, Decision>,
    /// Working state for the action under the cursor
    state: ReviewState,
    submitting_all: bool,
    /// A resume for the current interrupt was accepted
    resolved: bool,
    reject_all_message: String,
    notice: Option<Notice>,
}

impl BatchController {
    pub fn new(stream: Arc<dyn RunStream + Send + Sync>) -> Self {
        Self {
            stream,
            interrupt: None,
            request: None,
            current_index: 0,
            addressed: BTreeMap::new(),
            state: ReviewState::default(),
            submitting_all: false,
            resolved: false,
            reject_all_message: DEFAULT_REJECT_ALL_MESSAGE.to_string(),
            notice: None,
        }
    }

    /// Override the reason sent by [`reject_all`](Self::reject_all).
    pub fn with_reject_all_message(mut self, message: impl Into<String>) -> Self {
        self.reject_all_message = message.into();
        self
    }

    /// Show `interrupt`. Unless it is a redelivery of the identified
    /// interrupt still under review, the cursor resets and every recorded
    /// decision is dropped.
    pub fn set_interrupt(&mut self, interrupt: Interrupt) -> bool {
        if !self.resolved && is_same_pending(self.interrupt.as_ref(), &interrupt) {
            return false;
        }

        self.request = interrupt.hitl_request();
        self.interrupt = Some(interrupt);
        self.current_index = 0;
        self.addressed.clear();
        self.submitting_all = false;
        self.resolved = false;
        self.notice = None;
        self.reload_state();
        true
    }

    pub fn request(&self) -> Option<&HitlRequest> {
        self.request.as_ref()
    }

    pub fn len(&self) -> usize {
        self.request.as_ref().map_or(0, HitlRequest::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_action(&self) -> Option<&ActionRequest> {
        self.request
            .as_ref()
            .and_then(|request| request.action_requests.get(self.current_index))
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.submitting_all
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn addressed(&self) -> &BTreeMap<usize, Decision> {
        &self.addressed
    }

    /// Type of the decision recorded for `index`, if any.
    pub fn decision_status(&self, index: usize) -> Option<DecisionType> {
        self.addressed.get(&index).map(Decision::decision_type)
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.addressed.len())
    }

    pub fn has_all_decisions(&self) -> bool {
        !self.is_empty() && self.addressed.len() == self.len()
    }

    /// Approve-all is offered only when every action allows approve.
    pub fn all_allow_approve(&self) -> bool {
        self.first_without_approve().is_none() && !self.is_empty()
    }

    fn first_without_approve(&self) -> Option<usize> {
        let request = self.request.as_ref()?;
        (0..request.len()).find(|&index| {
            !request
                .review_config_for(index)
                .is_some_and(|config| config.allows(DecisionType::Approve))
        })
    }

    /// Move the cursor (clamped to the action range). Unsaved edits on the
    /// action being left are discarded.
    pub fn go_to(&mut self, index: usize) {
        let clamped = index.min(self.len().saturating_sub(1));
        if clamped != self.current_index {
            self.current_index = clamped;
            self.reload_state();
        }
    }

    pub fn next(&mut self) {
        self.go_to(self.current_index + 1);
    }

    pub fn previous(&mut self) {
        self.go_to(self.current_index.saturating_sub(1));
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
        result.map_err(|e| self.fail(e))
    }

    pub fn reset_edits(&mut self) -> Result<(), InboxError> {
        let result = self.state.reset_edits();
        result.map_err(|e| self.fail(e))
    }

    pub fn apply_reject(&mut self, change: impl Into<String>) -> Result<(), InboxError> {
        let result = self.state.apply_reject(change);
        result.map_err(|e| self.fail(e))
    }

    /// Record the decision for the action under the cursor and advance.
    /// `submit_type` replaces the current selection when given.
    pub fn save_decision(
        &mut self,
        submit_type: Option<DecisionType>,
    ) -> Result<Decision, InboxError> {
        let built = match submit_type {
            Some(decision) => self.state.build_decision_as(decision),
            None => self.state.build_decision(),
        };
        let decision = built.map_err(|e| self.fail(e))?;

        let index = self.current_index;
        self.addressed.insert(index, decision.clone());
        tracing::debug!("captured decision for action {}: {}", index + 1, decision);
        self.notice = Some(Notice::success(format!("Action {} captured.", index + 1)));

        self.go_to(index + 1);
        Ok(decision)
    }

    /// Send every recorded decision, in action order, as one resume.
    pub async fn submit_all(&mut self) -> Result<Vec<Decision>, InboxError> {
        let total = self.len();
        if total == 0 || self.addressed.len() != total {
            let remaining = self.remaining();
            return Err(self.fail(InboxError::ActionsRemaining { total, remaining }));
        }

        let decisions = (0..total)
            .map(|index| self.addressed.get(&index).cloned())
            .collect::<Option<Vec<_>>>();
        let Some(decisions) = decisions else {
            let remaining = self.remaining();
            return Err(self.fail(InboxError::ActionsRemaining { total, remaining }));
        };

        self.submitting_all = true;
        let result = self.send(StreamOperation::SubmitAll, decisions).await;
        self.submitting_all = false;

        if result.is_ok() {
            self.addressed.clear();
        }
        result
    }

    /// Approve every action immediately.
    pub async fn approve_all(&mut self) -> Result<Vec<Decision>, InboxError> {
        if self.is_empty() {
            return Err(self.fail(InboxError::NoActionRequest));
        }
        if let Some(index) = self.first_without_approve() {
            return Err(self.fail(InboxError::ApproveAllNotAllowed { index: index + 1 }));
        }

        let decisions = vec![Decision::Approve; self.len()];
        self.send_bulk(StreamOperation::ApproveAll, decisions).await
    }

    /// Reject every action immediately with the configured reason.
    pub async fn reject_all(&mut self) -> Result<Vec<Decision>, InboxError> {
        if self.is_empty() {
            return Err(self.fail(InboxError::NoActionRequest));
        }

        let decisions = vec![Decision::reject(self.reject_all_message.clone()); self.len()];
        self.send_bulk(StreamOperation::RejectAll, decisions).await
    }

    async fn send_bulk(
        &mut self,
        operation: StreamOperation,
        decisions: Vec<Decision>,
    ) -> Result<Vec<Decision>, InboxError> {
        self.submitting_all = true;
        let result = self.send(operation, decisions).await;
        self.submitting_all = false;

        if result.is_ok() {
            // The run moves past this interrupt; partial work is moot.
            self.addressed.clear();
        }
        result
    }

    async fn send(
        &mut self,
        operation: StreamOperation,
        decisions: Vec<Decision>,
    ) -> Result<Vec<Decision>, InboxError> {
        tracing::info!("sending {} decisions ({:?})", decisions.len(), operation);

        let sent = self
            .stream
            .submit(Some(json!({})), SubmitOptions::resume(decisions.clone()))
            .await;

        match sent {
            Ok(()) => {
                self.resolved = true;
                self.notice = Some(Notice::success(operation.success_message()));
                Ok(decisions)
            }
            Err(e) => {
                tracing::error!("Error sending batch decisions ({:?}): {:#}", operation, e);
                Err(self.fail(InboxError::from_transport(operation, &e)))
            }
        }
    }

    fn reload_state(&mut self) {
        self.state = self
            .request
            .as_ref()
            .and_then(|request| request.single_action(self.current_index))
            .map(|single| ReviewState::from_request(&single))
            .unwrap_or_default();
    }

    fn fail(&mut self, error: InboxError) -> InboxError {
        self.notice = Some(Notice::from(&error));
        error
    }
}
