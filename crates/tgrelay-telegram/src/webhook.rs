//! HTTP entry point Telegram pushes updates to.
//!
//! Only POST is routed; axum answers every other method with 405. The body is
//! parsed as JSON and pushed onto the forward queue; the response never waits
//! for delivery. Unparsable bodies are logged and still acknowledged so
//! Telegram does not redeliver them forever.

use axum::{body::Bytes, extract::State, routing::post, Router};
use serde_json::Value;
use tracing::error;

use tgrelay_core::forward::{queue::ForwardQueue, update::InboundUpdate};

#[derive(Clone)]
struct ReceiverState {
    queue: ForwardQueue,
}

pub fn webhook_router(path: &str, queue: ForwardQueue) -> Router {
    Router::new()
        .route(path, post(receive_update))
        .with_state(ReceiverState { queue })
}

async fn receive_update(State(state): State<ReceiverState>, body: Bytes) -> &'static str {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            if let Err(e) = state.queue.push(InboundUpdate::new(payload)) {
                error!(error = %e, "failed to enqueue update");
            }
        }
        Err(e) => error!(error = %e, bytes = body.len(), "webhook payload is not valid JSON"),
    }
    "OK"
}
