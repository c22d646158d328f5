/**
 * Per-board Event Broadcasting
 *
 * Each board gets its own `tokio::sync::broadcast` channel, created on the
 * first subscription. Publishing to a board nobody watches is a no-op, and
 * channels whose last subscriber went away are dropped by
 * `cleanup_inactive_channels`, which the server runs periodically.
 */
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::BoardEvent;

/// Registry of per-board broadcast channels
#[derive(Clone)]
pub struct BoardChannels {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<BoardEvent>>>>,
    capacity: usize,
}

impl BoardChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<BoardEvent>>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe to a board, creating its channel if needed
    pub fn subscribe(&self, board_id: Uuid) -> broadcast::Receiver<BoardEvent> {
        let capacity = self.capacity;
        self.lock()
            .entry(board_id)
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe()
    }

    /// Send an event to its board's subscribers
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: BoardEvent) -> usize {
        let board_id = event.board_id;
        let event_name = event.event_type.as_str();
        let sender = self.lock().get(&board_id).cloned();
        match sender.map(|sender| sender.send(event)) {
            Some(Ok(count)) => {
                tracing::info!(
                    "[Realtime] {} on board {} sent to {} subscriber(s)",
                    event_name,
                    board_id,
                    count
                );
                count
            }
            Some(Err(_)) | None => {
                tracing::debug!("[Realtime] No subscribers for {} on board {}", event_name, board_id);
                0
            }
        }
    }

    /// Drop a board's channel; open streams end once drained
    pub fn close(&self, board_id: Uuid) {
        if self.lock().remove(&board_id).is_some() {
            tracing::info!("[Realtime] Closed channel for board {}", board_id);
        }
    }

    /// Remove channels with no subscribers, returning how many were removed
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub fn subscriber_count(&self, board_id: Uuid) -> usize {
        self.lock()
            .get(&board_id)
            .map_or(0, |sender| sender.receiver_count())
    }

    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }
}
