//! In-process fan-out of chat events to WebSocket subscribers
//!
//! One broadcast channel per conversation, created by the first subscriber
//! and removed by [`ChatHub::release`] once no receivers remain. Publishing
//! to a conversation nobody watches is a no-op.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::types::ChatEvent;

const DEFAULT_CAPACITY: usize = 64;

pub struct ChatHub {
    channels: RwLock<HashMap<i32, broadcast::Sender<ChatEvent>>>,
    capacity: usize,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is the per-conversation backlog a slow subscriber may fall
    /// behind before it starts losing events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscribe(&self, conversation_id: i32) -> broadcast::Receiver<ChatEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(conversation_id)
            .or_insert_with(|| {
                debug!("Opening chat channel for conversation {}", conversation_id);
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }

    /// Returns how many subscribers the event reached
    pub async fn publish(&self, conversation_id: i32, event: ChatEvent) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&conversation_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Call after dropping a receiver. Removes the channel once its last
    /// subscriber is gone.
    pub async fn release(&self, conversation_id: i32) {
        let mut channels = self.channels.write().await;
        if channels
            .get(&conversation_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&conversation_id);
            debug!("Closed chat channel for conversation {}", conversation_id);
        }
    }

    pub async fn subscriber_count(&self, conversation_id: i32) -> usize {
        self.channels
            .read()
            .await
            .get(&conversation_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
