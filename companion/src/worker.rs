//! Background task that owns the chat session.
//!
//! The TUI sends requests over a channel and keeps drawing while the
//! completion call is in flight. Requests are handled strictly one at a time.

use companion_core::{ChatSession, Reply};
use tokio::sync::mpsc;
use tracing::debug;

/// Requests from the UI to the worker.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Send a student message through the pipeline.
    Message(String),
    /// Clear the conversation.
    Reset,
}

/// Responses from the worker to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    Reply(Reply),
    /// The completion failed; `notice` is safe to show the student.
    Failed { notice: &'static str, detail: String },
    ResetDone,
}

/// Spawn the worker and return its channel endpoints.
pub fn spawn_worker(
    session: ChatSession,
) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, request_rx) = mpsc::channel(8);
    let (response_tx, response_rx) = mpsc::channel(8);
    tokio::spawn(run_worker(session, request_rx, response_tx));
    (request_tx, response_rx)
}

async fn run_worker(
    mut session: ChatSession,
    mut requests: mpsc::Receiver<WorkerRequest>,
    responses: mpsc::Sender<WorkerResponse>,
) {
    while let Some(request) = requests.recv().await {
        let response = match request {
            WorkerRequest::Message(text) => match session.send(&text).await {
                Ok(reply) => WorkerResponse::Reply(reply),
                Err(e) => WorkerResponse::Failed {
                    notice: e.user_message(),
                    detail: e.to_string(),
                },
            },
            WorkerRequest::Reset => {
                session.reset();
                WorkerResponse::ResetDone
            }
        };

        if responses.send(response).await.is_err() {
            break;
        }
    }
    debug!("worker channel closed");
}
