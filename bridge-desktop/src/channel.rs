//! Queue-backed Host Channel

use bridge_traits::{
    channel::HostChannel,
    error::{BridgeError, Result},
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

/// A method invocation pushed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub method: String,
    pub arguments: Value,
}

/// Receiving end handed to the embedding application.
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Host channel for desktop embeddings.
///
/// Pushes are queued on an unbounded tokio channel so `invoke_method` never
/// blocks. Dropping the receiver closes the channel; later pushes fail with
/// `BridgeError::ChannelClosed`.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    channel_name: String,
    sender: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelHost {
    /// Create a channel and the receiver the host drains.
    pub fn new(channel_name: impl Into<String>) -> (Self, HostEventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let host = Self {
            channel_name: channel_name.into(),
            sender,
        };
        (host, receiver)
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Whether the host has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl HostChannel for ChannelHost {
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<()> {
        trace!(channel = %self.channel_name, method, "Pushing to host");
        self.sender
            .send(HostEvent {
                method: method.to_string(),
                arguments,
            })
            .map_err(|_| BridgeError::ChannelClosed(self.channel_name.clone()))
    }
}
