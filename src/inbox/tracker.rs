//! Working state for the action under review, and the edits applied to it.
//!
//! `ReviewState` is rebuilt from scratch for every interrupt (and, in a
//! batch, for every cursor move). Edits are diffed against the snapshot of
//! the original args; the diff drives both `editsMade` and which response
//! is selected for submission.

use crate::inbox::builder::build_decision;
use crate::inbox::error::InboxError;
use crate::inbox::initializer::{create_default_response, InitialResponse};
use crate::inbox::types::*;
use indexmap::IndexMap;

/// A value or key argument to [`ReviewState::apply_edit`]: either a single
/// string or an ordered list applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditInput {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for EditInput {
    fn from(value: &str) -> Self {
        EditInput::One(value.to_string())
    }
}

impl From<String> for EditInput {
    fn from(value: String) -> Self {
        EditInput::One(value)
    }
}

impl From<Vec<String>> for EditInput {
    fn from(values: Vec<String>) -> Self {
        EditInput::Many(values)
    }
}

impl From<Vec<&str>> for EditInput {
    fn from(values: Vec<&str>) -> Self {
        EditInput::Many(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewState {
    responses: Vec<DecisionWithEdits>,
    selected: Option<DecisionType>,
    approve_allowed: bool,
    has_edited: bool,
    has_added_response: bool,
    original_args: IndexMap<String, String>,
}

impl ReviewState {
    /// Fresh state for the first action of `request`. A request with no
    /// reviewable action yields an empty state.
    pub fn from_request(request: &HitlRequest) -> Self {
        match create_default_response(request) {
            Ok(initial) => Self::from_initial(initial),
            Err(e) => {
                tracing::warn!("nothing to review: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_initial(initial: InitialResponse) -> Self {
        Self {
            responses: initial.responses,
            selected: initial.default_submit_type,
            approve_allowed: initial.has_approve,
            has_edited: false,
            has_added_response: false,
            original_args: initial.original_args,
        }
    }

    pub fn responses(&self) -> &[DecisionWithEdits] {
        &self.responses
    }

    pub fn selected(&self) -> Option<DecisionType> {
        self.selected
    }

    pub fn approve_allowed(&self) -> bool {
        self.approve_allowed
    }

    pub fn has_edited(&self) -> bool {
        self.has_edited
    }

    pub fn has_added_response(&self) -> bool {
        self.has_added_response
    }

    pub fn original_args(&self) -> &IndexMap<String, String> {
        &self.original_args
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn offers(&self, decision: DecisionType) -> bool {
        self.responses
            .iter()
            .any(|response| response.decision_type() == decision)
    }

    /// More than one response mode is on offer (an "Or" between cards).
    pub fn supports_multiple_methods(&self) -> bool {
        self.responses
            .iter()
            .filter(|response| DecisionType::CONSTRUCTION_ORDER.contains(&response.decision_type()))
            .count()
            > 1
    }

    pub fn edit_response(&self) -> Option<&EditedAction> {
        self.responses.iter().find_map(|response| match response {
            DecisionWithEdits::Edit { edited_action, .. } => Some(edited_action),
            _ => None,
        })
    }

    pub fn reject_message(&self) -> Option<&str> {
        self.responses.iter().find_map(|response| match response {
            DecisionWithEdits::Reject { message } => Some(message.as_str()),
            _ => None,
        })
    }

    /// Explicitly choose which response to submit.
    pub fn select(&mut self, decision: DecisionType) {
        self.selected = Some(decision);
    }

    /// Merge one or more edited values into the edit response.
    ///
    /// `change` and `key` must have the same shape: one value for one key,
    /// or equal-length lists. Returns whether the args now differ from the
    /// original snapshot.
    pub fn apply_edit(
        &mut self,
        change: impl Into<EditInput>,
        key: impl Into<EditInput>,
    ) -> Result<bool, InboxError> {
        let pairs: Vec<(String, String)> = match (change.into(), key.into()) {
            (EditInput::One(value), EditInput::One(key)) => vec![(key, value)],
            (EditInput::Many(values), EditInput::Many(keys)) if values.len() == keys.len() => {
                keys.into_iter().zip(values).collect()
            }
            (change, key) => {
                tracing::warn!(
                    "rejected edit with mismatched shapes: change={:?} key={:?}",
                    change,
                    key
                );
                return Err(InboxError::MismatchedEditShape);
            }
        };

        let original = &self.original_args;
        let (args, edits_made) = self
            .responses
            .iter_mut()
            .find_map(|response| match response {
                DecisionWithEdits::Edit {
                    edited_action,
                    edits_made,
                    ..
                } => Some((&mut edited_action.args, edits_made)),
                _ => None,
            })
            .ok_or(InboxError::NoEditResponse)?;

        for (key, value) in pairs {
            args.insert(key, value);
        }

        // Only keys in the original snapshot count; added keys are ignored.
        let changed = original
            .iter()
            .any(|(key, value)| args.get(key) != Some(value));
        *edits_made = changed;

        if changed {
            self.selected = Some(DecisionType::Edit);
            self.has_edited = true;
        } else {
            self.has_edited = false;
            if self.approve_allowed {
                self.selected = Some(DecisionType::Approve);
            } else if self.has_added_response {
                self.selected = Some(DecisionType::Reject);
            }
        }

        tracing::debug!("applied edit (changed: {}, selected: {:?})", changed, self.selected);
        Ok(changed)
    }

    /// Restore every field of the edit response to its original value.
    pub fn reset_edits(&mut self) -> Result<(), InboxError> {
        let (keys, values): (Vec<String>, Vec<String>) = self
            .original_args
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .unzip();
        self.apply_edit(values, keys).map(|_| ())
    }

    /// Set the rejection reason verbatim. Reject becomes the selected
    /// response even when the message is cleared.
    pub fn apply_reject(&mut self, change: impl Into<String>) -> Result<(), InboxError> {
        let change = change.into();
        let message = self
            .responses
            .iter_mut()
            .find_map(|response| match response {
                DecisionWithEdits::Reject { message } => Some(message),
                _ => None,
            })
            .ok_or(InboxError::NoRejectResponse)?;

        self.has_added_response = !change.trim().is_empty();
        *message = change;
        self.selected = Some(DecisionType::Reject);
        Ok(())
    }

    /// Forget the original-args snapshot (the interrupt is being closed).
    pub fn clear_snapshot(&mut self) {
        self.original_args.clear();
    }

    pub fn build_decision(&self) -> Result<Decision, InboxError> {
        build_decision(&self.responses, self.selected)
    }

    /// Like [`build_decision`](Self::build_decision) but with an explicit
    /// submit type in place of the current selection.
    pub fn build_decision_as(&self, decision: DecisionType) -> Result<Decision, InboxError> {
        build_decision(&self.responses, Some(decision))
    }
}
