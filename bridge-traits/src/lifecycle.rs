//! Host Lifecycle Notifications
//!
//! Lets the bridge learn that the host environment is going away so it can
//! stop pushing events into a torn-down channel.

use crate::error::Result;

/// Lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The bridge was detached from the host engine
    Detached,
    /// The application is about to terminate
    WillTerminate,
}

/// Lifecycle observer trait
///
/// Notifies the bridge about teardown of the host environment.
///
/// # Platform Support
///
/// - **iOS**: `detachFromEngine` and `applicationWillTerminate`
/// - **Android**: `onDetachedFromEngine`
/// - **Desktop**: explicit notifications from the embedding application
///
/// Both events may fire for the same teardown; consumers must treat them as
/// idempotent.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::lifecycle::{LifecycleObserver, LifecycleEvent};
///
/// async fn wait_for_teardown(observer: &dyn LifecycleObserver) -> Result<()> {
///     let mut stream = observer.subscribe_changes().await?;
///
///     while let Some(event) = stream.next().await {
///         if matches!(event, LifecycleEvent::WillTerminate) {
///             break;
///         }
///     }
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Subscribe to lifecycle events
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle events
#[async_trait::async_trait]
pub trait LifecycleChangeStream: Send {
    /// Get the next lifecycle event
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleEvent>;
}
