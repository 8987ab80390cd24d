//! Integration tests for the stream bridge protocol.
//! Checks the exact JSON the bridge receives and answers with.

use inboxctl::inbox::{Decision, EditedAction};
use inboxctl::stream::protocol::{StreamRequest, StreamResponse};
use inboxctl::stream::{Command, SubmitOptions, END};
use indexmap::IndexMap;
use serde_json::json;

#[test]
fn test_resume_request_shape() {
    let mut args = IndexMap::new();
    args.insert("to".to_string(), "a@b.com".to_string());

    let request = StreamRequest {
        request_id: "req-001".to_string(),
        assistant_id: "agent".to_string(),
        thread_id: Some("thread-9".to_string()),
        input: Some(json!({})),
        command: SubmitOptions::resume(vec![
            Decision::Approve,
            Decision::reject("no"),
            Decision::Edit {
                edited_action: EditedAction {
                    name: "send_email".to_string(),
                    args,
                },
            },
        ])
        .command,
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "request_id": "req-001",
            "assistant_id": "agent",
            "thread_id": "thread-9",
            "input": {},
            "command": {"resume": {"decisions": [
                {"type": "approve"},
                {"type": "reject", "message": "no"},
                {"type": "edit", "edited_action": {"name": "send_email", "args": {"to": "a@b.com"}}}
            ]}}
        })
    );
}

#[test]
fn test_goto_request_omits_optional_fields() {
    let request = StreamRequest {
        request_id: "req-002".to_string(),
        assistant_id: "agent".to_string(),
        thread_id: None,
        input: None,
        command: SubmitOptions::goto_end().command,
    };

    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(
        json,
        r#"{"request_id":"req-002","assistant_id":"agent","command":{"goto":"__end__"}}"#
    );
}

#[test]
fn test_request_parses_back() {
    let line = r#"{"request_id":"r","assistant_id":"agent","command":{"goto":"__end__"}}"#;
    let parsed: StreamRequest = serde_json::from_str(line).unwrap();
    assert_eq!(parsed.command, Command::Goto(END.to_string()));
    assert!(parsed.thread_id.is_none());
    assert!(parsed.input.is_none());
}

#[test]
fn test_response_accepted() {
    let response = StreamResponse::accepted("req-001".to_string());
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"request_id": "req-001", "ok": true})
    );
}

#[test]
fn test_response_failed() {
    let response = StreamResponse::failed("req-002".to_string(), "Invalid assistant ID");
    let json = serde_json::to_string(&response).unwrap();
    let parsed: StreamResponse = serde_json::from_str(&json).unwrap();

    assert!(!parsed.ok);
    assert_eq!(parsed.error.as_deref(), Some("Invalid assistant ID"));
}
