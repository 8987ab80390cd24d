//! Derives the working responses for the first action of a HITL request.
//!
//! One working response is built per allowed decision, always in the order
//! edit, approve, reject. The default selection prefers approve, then
//! reject, then edit, so an untouched review never submits an edit.

use crate::inbox::error::InboxError;
use crate::inbox::types::*;
use indexmap::IndexMap;

/// Initial working state for one action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitialResponse {
    pub responses: Vec<DecisionWithEdits>,
    pub default_submit_type: Option<DecisionType>,
    pub has_approve: bool,
    /// Stringified original args, captured only when edit is allowed.
    /// Edits are diffed against this snapshot.
    pub original_args: IndexMap<String, String>,
}

impl InitialResponse {
    /// Nothing renderable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// Build the initial responses for `request.action_requests[0]`.
///
/// Fails when there is no action, or no review config matches it by name
/// or position. Callers render "nothing to review" in that case.
pub fn create_default_response(request: &HitlRequest) -> Result<InitialResponse, InboxError> {
    let action = request
        .action_requests
        .first()
        .ok_or(InboxError::NoActionRequest)?;
    let config = request
        .review_config_for(0)
        .ok_or_else(|| InboxError::NoMatchingReviewConfig {
            action: action.name.clone(),
        })?;

    let mut initial = InitialResponse::empty();
    let approve_allowed = config.allows(DecisionType::Approve);

    for decision in DecisionType::CONSTRUCTION_ORDER {
        if !config.allows(decision) {
            continue;
        }
        let response = match decision {
            DecisionType::Edit => {
                let args = stringify_args(&action.args);
                initial.original_args = args.clone();
                DecisionWithEdits::Edit {
                    edited_action: EditedAction {
                        name: action.name.clone(),
                        args,
                    },
                    accept_allowed: approve_allowed,
                    edits_made: false,
                }
            }
            DecisionType::Approve => DecisionWithEdits::Approve,
            DecisionType::Reject => DecisionWithEdits::Reject {
                message: String::new(),
            },
        };
        initial.responses.push(response);
    }

    initial.default_submit_type = [DecisionType::Approve, DecisionType::Reject, DecisionType::Edit]
        .into_iter()
        .find(|decision| config.allows(*decision));
    initial.has_approve = approve_allowed;

    tracing::debug!(
        "initialized {} responses for '{}' (default: {:?})",
        initial.responses.len(),
        action.name,
        initial.default_submit_type
    );

    Ok(initial)
}
