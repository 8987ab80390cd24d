//! End-to-end test: review controllers + socket stream over a Unix socket.
//!
//! A fake bridge listens on a Unix socket, records every request and
//! answers like a backend would: unknown assistants are refused with an
//! "Invalid assistant" error.
//!
//! Note: SocketRunStream does blocking socket I/O on tokio's blocking pool,
//! so the async bridge keeps running on the runtime while a submit waits.

use inboxctl::inbox::{
    BatchController, Decision, DecisionType, InboxError, Interrupt, InterruptController,
};
use inboxctl::stream::protocol::{StreamRequest, StreamResponse};
use inboxctl::stream::{Command, SocketRunStream, SubmitOptions};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::Mutex;

const KNOWN_ASSISTANT: &str = "agent";

/// Helper: start a fake bridge and return its socket path and request log.
fn start_bridge() -> (String, Arc<Mutex<Vec<StreamRequest>>>) {
    let socket_path = format!("/tmp/inboxctl-test-{}.sock", uuid::Uuid::new_v4());
    let listener = UnixListener::bind(&socket_path).unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = received.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut line = String::new();
                if BufReader::new(reader).read_line(&mut line).await.is_err() {
                    return;
                }
                let request: StreamRequest = match serde_json::from_str(line.trim()) {
                    Ok(request) => request,
                    Err(_) => return,
                };

                let response = if request.assistant_id == KNOWN_ASSISTANT {
                    StreamResponse::accepted(request.request_id.clone())
                } else {
                    StreamResponse::failed(
                        request.request_id.clone(),
                        format!("Invalid assistant ID: {}", request.assistant_id),
                    )
                };
                log.lock().await.push(request);

                let mut json = serde_json::to_string(&response).unwrap();
                json.push('\n');
                writer.write_all(json.as_bytes()).await.ok();
            });
        }
    });

    (socket_path, received)
}

fn batch_interrupt() -> Interrupt {
    Interrupt::new(json!({
        "action_requests": [
            {"name": "send_email", "args": {"to": "a@b.com", "subject": "Hi"}},
            {"name": "delete_file", "args": {"path": "/tmp/x"}}
        ],
        "review_configs": [
            {"action_name": "send_email", "allowed_decisions": ["approve", "edit", "reject"]},
            {"action_name": "delete_file", "allowed_decisions": ["approve", "reject"]}
        ]
    }))
    .with_id("interrupt-1")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_batch_submit_over_socket() {
    let (socket_path, received) = start_bridge();
    let stream = SocketRunStream::new(&socket_path, KNOWN_ASSISTANT).with_thread_id("thread-1");

    let mut batch = BatchController::new(Arc::new(stream));
    batch.set_interrupt(batch_interrupt());
    batch.apply_edit("Hello", "subject").unwrap();
    batch.save_decision(None).unwrap();
    batch.apply_reject("keep it").unwrap();
    batch.save_decision(None).unwrap();

    let decisions = batch.submit_all().await.unwrap();
    assert_eq!(decisions[0].decision_type(), DecisionType::Edit);
    assert_eq!(decisions[1], Decision::reject("keep it"));
    assert!(batch.addressed().is_empty());

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].assistant_id, KNOWN_ASSISTANT);
    assert_eq!(received[0].thread_id.as_deref(), Some("thread-1"));
    assert_eq!(received[0].input, Some(json!({})));
    assert_eq!(received[0].command, SubmitOptions::resume(decisions).command);

    std::fs::remove_file(&socket_path).ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_resolve_over_socket() {
    let (socket_path, received) = start_bridge();
    let stream = SocketRunStream::new(&socket_path, KNOWN_ASSISTANT);

    let mut controller = InterruptController::new(Arc::new(stream));
    controller.set_interrupt(batch_interrupt());
    controller.resolve().await.unwrap();
    assert!(controller.stream_finished());

    let received = received.lock().await;
    assert_eq!(received[0].command, Command::Goto("__end__".to_string()));

    std::fs::remove_file(&socket_path).ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_unknown_assistant_is_reported() {
    let (socket_path, received) = start_bridge();
    let stream = SocketRunStream::new(&socket_path, "missing-graph");

    let mut batch = BatchController::new(Arc::new(stream));
    batch.set_interrupt(batch_interrupt());
    batch.save_decision(Some(DecisionType::Approve)).unwrap();
    batch.save_decision(Some(DecisionType::Approve)).unwrap();

    let err = batch.submit_all().await.unwrap_err();
    assert_eq!(err, InboxError::InvalidAssistant);
    let notice = batch.take_notice().unwrap();
    assert_eq!(notice.title, "Error: Invalid assistant ID");

    // Recorded decisions survive a failed send so the reviewer can retry
    assert_eq!(batch.addressed().len(), 2);
    assert_eq!(received.lock().await.len(), 1);

    std::fs::remove_file(&socket_path).ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_bridge_not_running() {
    let socket_path = format!("/tmp/inboxctl-missing-{}.sock", uuid::Uuid::new_v4());
    let stream = SocketRunStream::new(&socket_path, KNOWN_ASSISTANT);

    let mut controller = InterruptController::new(Arc::new(stream));
    controller.set_interrupt(batch_interrupt());
    let err = controller.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to submit response.");
    assert!(!err.is_validation());
}
