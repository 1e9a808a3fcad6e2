//! Host Channel Abstraction
//!
//! The push half of the call boundary. Responses to calls travel back through
//! per-call reply handles; unsolicited notifications (sync status) go through
//! a [`HostChannel`].

use serde_json::Value;

use crate::error::Result;

/// Host channel trait
///
/// Delivers fire-and-forget method invocations to the host environment:
/// - **iOS/Android**: the Flutter method channel (`invokeMethod`)
/// - **Desktop**: an in-process queue drained by the embedding application
///
/// Implementations must not block: the status bridge calls
/// [`HostChannel::invoke_method`] while holding its lock.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::channel::HostChannel;
/// use serde_json::json;
///
/// fn notify_done(channel: &dyn HostChannel) {
///     channel
///         .invoke_method("sendStatus", json!(["syncingCompleted", null, null]))
///         .ok();
/// }
/// ```
pub trait HostChannel: Send + Sync {
    /// Queue a method invocation on the host side.
    ///
    /// Returns [`BridgeError::ChannelClosed`](crate::BridgeError::ChannelClosed)
    /// once the host has gone away.
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<()>;
}
