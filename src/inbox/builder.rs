//! Turns the working responses and the selected submit type into the
//! decision sent to the backend.

use crate::inbox::error::InboxError;
use crate::inbox::types::*;

/// Resolve the decision for the selected response.
///
/// An edit response that approve also covers, and that the reviewer left
/// untouched, is sent as a plain approve so the backend never receives a
/// no-op edit.
pub fn build_decision(
    responses: &[DecisionWithEdits],
    selected: Option<DecisionType>,
) -> Result<Decision, InboxError> {
    if responses.is_empty() {
        return Err(InboxError::NoResponse);
    }

    let response = selected
        .and_then(|selected| {
            responses
                .iter()
                .find(|response| response.decision_type() == selected)
        })
        .ok_or(InboxError::NoResponseSelected)?;

    let decision = match response {
        DecisionWithEdits::Approve => Decision::Approve,
        DecisionWithEdits::Reject { message } => Decision::Reject {
            message: message.trim().to_string(),
        },
        DecisionWithEdits::Edit {
            accept_allowed: true,
            edits_made: false,
            ..
        } => Decision::Approve,
        DecisionWithEdits::Edit { edited_action, .. } => Decision::Edit {
            edited_action: edited_action.clone(),
        },
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn edit(accept_allowed: bool, edits_made: bool) -> DecisionWithEdits {
        let mut args = IndexMap::new();
        args.insert("to".to_string(), "a@b.com".to_string());
        DecisionWithEdits::Edit {
            edited_action: EditedAction {
                name: "send_email".to_string(),
                args,
            },
            accept_allowed,
            edits_made,
        }
    }

    #[test]
    fn test_empty_responses() {
        let err = build_decision(&[], Some(DecisionType::Approve)).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a response.");
    }

    #[test]
    fn test_selection_not_present() {
        let err =
            build_decision(&[DecisionWithEdits::Approve], Some(DecisionType::Reject)).unwrap_err();
        assert_eq!(err.to_string(), "No response selected.");

        let err = build_decision(&[DecisionWithEdits::Approve], None).unwrap_err();
        assert_eq!(err, InboxError::NoResponseSelected);
    }

    #[test]
    fn test_approve() {
        let decision =
            build_decision(&[DecisionWithEdits::Approve], Some(DecisionType::Approve)).unwrap();
        assert_eq!(decision, Decision::Approve);
    }

    #[test]
    fn test_reject_message_is_trimmed() {
        let responses = [DecisionWithEdits::Reject {
            message: "  wrong recipient \n".to_string(),
        }];
        let decision = build_decision(&responses, Some(DecisionType::Reject)).unwrap();
        assert_eq!(decision, Decision::reject("wrong recipient"));

        let responses = [DecisionWithEdits::Reject {
            message: "   ".to_string(),
        }];
        let decision = build_decision(&responses, Some(DecisionType::Reject)).unwrap();
        assert_eq!(decision, Decision::reject(""));
    }

    #[test]
    fn test_untouched_edit_downgrades_to_approve() {
        let decision = build_decision(&[edit(true, false)], Some(DecisionType::Edit)).unwrap();
        assert_eq!(decision, Decision::Approve);
    }

    #[test]
    fn test_edit_without_approve_fallback_is_sent_as_edit() {
        let decision = build_decision(&[edit(false, false)], Some(DecisionType::Edit)).unwrap();
        assert_eq!(decision.decision_type(), DecisionType::Edit);
    }

    #[test]
    fn test_changed_edit_is_sent_as_edit() {
        let decision = build_decision(&[edit(true, true)], Some(DecisionType::Edit)).unwrap();
        match decision {
            Decision::Edit { edited_action } => {
                assert_eq!(edited_action.name, "send_email");
                assert_eq!(edited_action.args["to"], "a@b.com");
            }
            other => panic!("Expected edit decision, got {:?}", other),
        }
    }
}
