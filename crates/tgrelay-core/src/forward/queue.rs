//! Unbounded FIFO between the webhook receiver and the worker.
//!
//! Producers hold cloneable [`ForwardQueue`] handles; the single consumer owns
//! the [`QueueReceiver`], which cannot be cloned.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use crate::{errors::Error, forward::update::InboundUpdate, Result};

#[derive(Clone, Debug)]
pub struct ForwardQueue {
    tx: mpsc::UnboundedSender<InboundUpdate>,
    depth: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<InboundUpdate>,
    depth: Arc<AtomicUsize>,
}

pub fn channel() -> (ForwardQueue, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        ForwardQueue {
            tx,
            depth: depth.clone(),
        },
        QueueReceiver { rx, depth },
    )
}

impl ForwardQueue {
    /// Append at the tail. Never waits.
    pub fn push(&self, update: InboundUpdate) -> Result<()> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.tx.send(update).map_err(|_| {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            Error::External("forward queue is closed".to_string())
        })
    }

    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueReceiver {
    /// Wait for the next update. `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<InboundUpdate> {
        let update = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(update)
    }

    pub fn try_recv(&mut self) -> Option<InboundUpdate> {
        let update = self.rx.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(update)
    }

    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn preserves_insertion_order() {
        let (queue, mut rx) = channel();
        for i in 0..3 {
            queue.push(InboundUpdate::new(json!({ "update_id": i }))).unwrap();
        }
        assert_eq!(queue.len(), 3);

        for i in 0..3 {
            let u = rx.recv().await.unwrap();
            assert_eq!(u.payload()["update_id"], i);
        }
        assert!(rx.is_empty());
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn push_fails_after_consumer_dropped() {
        let (queue, rx) = channel();
        drop(rx);
        assert!(queue.push(InboundUpdate::new(json!({}))).is_err());
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn recv_ends_when_producers_are_gone() {
        let (queue, mut rx) = channel();
        queue.push(InboundUpdate::new(json!({}))).unwrap();
        drop(queue);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
