//! # Status Event Bus
//!
//! Broadcast bus SDK adapters use to publish sync status using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The bus consists of:
//! - **StatusBus**: Central broadcast channel for publishing `StatusEvent`s
//! - **StatusReceiver**: A subscription that implements `StatusStream`, so
//!   an adapter can hand it straight out of `HealthSdk::status`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐    subscribe    ┌──────────────┐
//! │ SDK adapter ├──────────────>│ StatusBus ├────────────────>│ StatusBridge │
//! └─────────────┘               │ (broadcast├────────────────>│ test probe   │
//!                               │  channel) │                 └──────────────┘
//!                               └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::StatusBus;
//! use bridge_traits::StatusEvent;
//!
//! let bus = StatusBus::new(100);
//! let _receiver = bus.subscribe();
//! bus.emit(StatusEvent::SyncingCompleted).ok();
//! ```
//!
//! ## Lagging
//!
//! A receiver that falls more than `capacity` events behind skips the missed
//! events and resumes with the oldest one still buffered. The gap is logged at
//! `warn`.

use async_trait::async_trait;
use bridge_traits::{StatusEvent, StatusStream};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
    Receiver,
};
use tracing::warn;

use crate::config::DEFAULT_EVENT_BUFFER_SIZE;

// ============================================================================
// Status Bus
// ============================================================================

/// Central bus for publishing and subscribing to status events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `StatusBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
#[derive(Clone)]
pub struct StatusBus {
    sender: broadcast::Sender<StatusEvent>,
    capacity: usize,
}

impl StatusBus {
    /// Creates a new bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Sizes taken from a validated
    /// [`BridgeConfig`](crate::config::BridgeConfig) are always non-zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Number of events buffered per subscriber before it lags.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: StatusEvent) -> Result<usize, SendError<StatusEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber.
    ///
    /// The receiver only observes events emitted after this call. Past events
    /// are not replayed.
    pub fn subscribe(&self) -> StatusReceiver {
        StatusReceiver::new(self.sender.subscribe())
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for StatusBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBus")
            .field("capacity", &self.capacity)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Status Receiver
// ============================================================================

/// A subscription to a [`StatusBus`].
pub struct StatusReceiver {
    receiver: Receiver<StatusEvent>,
}

impl StatusReceiver {
    fn new(receiver: Receiver<StatusEvent>) -> Self {
        Self { receiver }
    }

    /// Receives the next event.
    ///
    /// Returns `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<StatusEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Status receiver lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[async_trait]
impl StatusStream for StatusReceiver {
    async fn next(&mut self) -> Option<StatusEvent> {
        self.recv().await
    }
}

impl fmt::Debug for StatusReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReceiver")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
