//! Single consumer of the forward queue.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::forward::{
    dispatcher::Dispatcher,
    policy::{Disposition, RetryPolicy},
    queue::{ForwardQueue, QueueReceiver},
    update::InboundUpdate,
};

/// Result of processing one dequeued update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    /// Not a message; nothing was sent.
    Discarded,
    /// Transient failure; the update went back to the tail of the queue.
    Requeued,
    /// Permanent failure.
    Dropped,
    /// Transient failure with the attempt bound reached.
    Exhausted,
    /// The dispatch task died (panic); the update is lost.
    Fault,
}

pub struct ForwardWorker {
    queue: ForwardQueue,
    inbox: QueueReceiver,
    dispatcher: Arc<Dispatcher>,
    policy: RetryPolicy,
}

impl ForwardWorker {
    /// `queue` must feed `inbox`; the worker uses it to re-enqueue retries.
    pub fn new(
        queue: ForwardQueue,
        inbox: QueueReceiver,
        dispatcher: Dispatcher,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            queue,
            inbox,
            dispatcher: Arc::new(dispatcher),
            policy,
        }
    }

    /// Drain the queue until `shutdown` fires.
    ///
    /// Cancellation is only observed while waiting for the next update, so an
    /// attempt in flight always completes (including its retry bookkeeping).
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            target_chat = %self.dispatcher.target(),
            backoff_ms = self.policy.backoff.as_millis() as u64,
            pacing_ms = self.policy.pacing.as_millis() as u64,
            "forward worker started"
        );

        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => break,
                update = self.inbox.recv() => update,
            };
            // The worker owns a sender for re-enqueueing, so the channel never
            // closes; shutdown only comes through the token.
            let Some(update) = next else {
                break;
            };
            self.process(update).await;
        }

        info!(pending = self.inbox.len(), "forward worker stopped");
    }

    /// Wait for one update and process it.
    pub async fn step(&mut self) -> Option<Outcome> {
        let update = self.inbox.recv().await?;
        Some(self.process(update).await)
    }

    pub async fn process(&mut self, mut update: InboundUpdate) -> Outcome {
        let Some(msg) = update.normalize() else {
            debug!("update carries no message; skipped");
            return Outcome::Discarded;
        };
        update.record_attempt();
        let attempt = update.attempts();

        // Run the dispatch in its own task so a panic in an adapter cannot take
        // the worker down with it.
        let dispatcher = self.dispatcher.clone();
        let job = msg.clone();
        let joined = tokio::spawn(async move { dispatcher.dispatch(&job).await }).await;

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, sender = %msg.sender_id, "worker fault");
                sleep(self.policy.fault_pause).await;
                return Outcome::Fault;
            }
        };

        let outcome = match self.policy.classify(&result, attempt) {
            Disposition::Delivered => {
                info!(
                    sender = %msg.sender_id,
                    chat = %msg.chat_title,
                    kind = msg.content.kind(),
                    attempt,
                    "Forward OK ← @{} | {}",
                    msg.display_name,
                    msg.chat_title
                );
                Outcome::Delivered
            }
            Disposition::Retry => {
                warn!(
                    sender = %msg.sender_id,
                    kind = msg.content.kind(),
                    attempt,
                    error = %display_err(&result),
                    "transient send failure; retrying"
                );
                sleep(self.policy.backoff).await;
                match self.queue.push(update) {
                    Ok(()) => Outcome::Requeued,
                    Err(e) => {
                        error!(error = %e, "could not re-enqueue update");
                        Outcome::Dropped
                    }
                }
            }
            Disposition::Drop => {
                error!(
                    sender = %msg.sender_id,
                    kind = msg.content.kind(),
                    error = %display_err(&result),
                    "send failed; dropping update"
                );
                Outcome::Dropped
            }
            Disposition::Exhausted => {
                error!(
                    sender = %msg.sender_id,
                    kind = msg.content.kind(),
                    attempt,
                    error = %display_err(&result),
                    "retries exhausted; dropping update"
                );
                Outcome::Exhausted
            }
        };

        sleep(self.policy.pacing).await;
        outcome
    }
}

fn display_err(result: &crate::Result<()>) -> String {
    match result {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}
