//! Desktop Lifecycle Notifications

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    lifecycle::{LifecycleChangeStream, LifecycleEvent, LifecycleObserver},
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

const LIFECYCLE_BUFFER: usize = 8;

/// Lifecycle observer for desktop embeddings.
///
/// Desktop has no engine callbacks, so the embedding application reports
/// teardown explicitly through [`DesktopLifecycleObserver::notify`].
#[derive(Debug, Clone)]
pub struct DesktopLifecycleObserver {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl DesktopLifecycleObserver {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(LIFECYCLE_BUFFER);
        Self { sender }
    }

    /// Report a lifecycle event. Returns the number of listeners reached.
    pub fn notify(&self, event: LifecycleEvent) -> usize {
        let delivered = self.sender.send(event).unwrap_or(0);
        debug!(?event, delivered, "Lifecycle event reported");
        delivered
    }
}

impl Default for DesktopLifecycleObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleObserver for DesktopLifecycleObserver {
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        Ok(Box::new(DesktopLifecycleChangeStream {
            receiver: self.sender.subscribe(),
        }))
    }
}

struct DesktopLifecycleChangeStream {
    receiver: broadcast::Receiver<LifecycleEvent>,
}

#[async_trait]
impl LifecycleChangeStream for DesktopLifecycleChangeStream {
    async fn next(&mut self) -> Option<LifecycleEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Lifecycle stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
