//! Replay-latest broadcast channel.
//!
//! # Subscriber States
//! ```text
//! Attached → Replaying(latest) → Live → Detached
//!          └─(no latest yet)──────┘
//! ```
//!
//! # Design Decisions
//! - `latest` and attaching a receiver change under one lock, so a
//!   subscriber sees the latest item exactly once and never an older one
//! - Per-subscriber queues are bounded and lossy (`tokio::sync::broadcast`):
//!   a slow reader loses its oldest items, publishers never wait
//! - Detach is dropping the stream

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::observability::metrics;

struct Shared<T> {
    latest: Mutex<Option<T>>,
    tx: broadcast::Sender<T>,
}

/// Single-writer, multi-reader hub remembering the latest item.
///
/// Clones share the same hub.
pub struct BroadcastChannel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BroadcastChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

enum Phase<T> {
    Replaying(T),
    Live,
}

impl<T> BroadcastChannel<T>
where
    T: Clone + Send + 'static,
{
    /// Create a hub whose subscribers each buffer up to `capacity` items.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                latest: Mutex::new(None),
                tx,
            }),
        }
    }

    fn latest_slot(&self) -> MutexGuard<'_, Option<T>> {
        self.shared.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `item` the latest value and hand it to every attached subscriber.
    pub fn publish(&self, item: T) {
        let mut latest = self.latest_slot();
        *latest = Some(item.clone());
        // No receivers is fine; the item is still remembered.
        let delivered = self.shared.tx.send(item).unwrap_or(0);
        drop(latest);

        metrics::record_publish();
        tracing::debug!(subscribers = delivered, "Published to live stream");
    }

    /// Live sequence: the latest item (if any), then every later publish.
    pub fn subscribe(&self) -> BoxStream<'static, T> {
        let (rx, replay) = {
            let latest = self.latest_slot();
            (self.shared.tx.subscribe(), latest.clone())
        };
        metrics::record_subscribers(self.shared.tx.receiver_count());

        let phase = match replay {
            Some(item) => Phase::Replaying(item),
            None => Phase::Live,
        };
        let subscriber = Subscriber {
            rx,
            shared: self.shared.clone(),
        };

        stream::unfold((subscriber, phase), |(mut subscriber, phase)| async move {
            if let Phase::Replaying(item) = phase {
                return Some((item, (subscriber, Phase::Live)));
            }
            loop {
                match subscriber.rx.recv().await {
                    Ok(item) => return Some((item, (subscriber, Phase::Live))),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Slow live stream subscriber dropped items");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }

    /// Most recently published item.
    pub fn latest(&self) -> Option<T> {
        self.latest_slot().clone()
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.tx.receiver_count()
    }
}

/// One attached receiver; refreshes the subscriber gauge on detach.
struct Subscriber<T> {
    rx: broadcast::Receiver<T>,
    shared: Arc<Shared<T>>,
}

impl<T> Drop for Subscriber<T> {
    fn drop(&mut self) {
        // `rx` is still attached while this runs.
        metrics::record_subscribers(self.shared.tx.receiver_count().saturating_sub(1));
    }
}
