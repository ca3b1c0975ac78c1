//! Per-collection change fan-out

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;

use crate::ChangeEvent;

/// Buffered events per subscriber before it starts skipping
pub const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Debug)]
pub(crate) struct ChangeFeed {
    channels: DashMap<String, broadcast::Sender<ChangeEvent>>,
    capacity: usize,
}

impl ChangeFeed {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn subscribe(&self, collection: &str) -> broadcast::Receiver<ChangeEvent> {
        self.channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub(crate) fn publish(&self, event: ChangeEvent) {
        if let Some(sender) = self.channels.get(&event.collection) {
            // No receivers is not an error
            let delivered = sender.send(event).unwrap_or(0);
            trace!("Change event delivered to {} subscriber(s)", delivered);
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
