//! Relay from the SDK's status stream to host push events.
//!
//! At most one subscription is live at a time. Every push happens while the
//! bridge lock is held and only if the bridge is still live and the
//! subscription has not been cancelled, so `shutdown` and `unsubscribe`
//! take effect for events already in flight.

use bridge_traits::{HealthSdk, HostChannel, StatusStream};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::mappers::{status_arguments, status_tag};

struct Subscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Subscription {
    fn cancel(self) {
        self.token.cancel();
    }

    fn is_running(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }
}

struct BridgeState {
    live: bool,
    subscription: Option<Subscription>,
}

/// Owner of the status subscription.
#[derive(Clone)]
pub struct StatusBridge {
    sdk: Arc<dyn HealthSdk>,
    channel: Arc<dyn HostChannel>,
    status_method: Arc<str>,
    state: Arc<Mutex<BridgeState>>,
}

impl StatusBridge {
    pub fn new(
        sdk: Arc<dyn HealthSdk>,
        channel: Arc<dyn HostChannel>,
        status_method: impl Into<String>,
    ) -> Self {
        Self {
            sdk,
            channel,
            status_method: Arc::from(status_method.into()),
            state: Arc::new(Mutex::new(BridgeState {
                live: true,
                subscription: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        lock_state(&self.state)
    }

    /// Replace any existing subscription with a fresh one.
    ///
    /// Must be called from within a tokio runtime. A no-op after
    /// [`shutdown`](Self::shutdown).
    pub fn subscribe(&self) {
        let mut state = self.lock();
        if !state.live {
            debug!("Ignoring subscribe after shutdown");
            return;
        }

        if let Some(previous) = state.subscription.take() {
            debug!("Replacing existing status subscription");
            previous.cancel();
        }

        let stream = self.sdk.status();
        let token = CancellationToken::new();
        let handle = tokio::spawn(relay(
            stream,
            token.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.channel),
            Arc::clone(&self.status_method),
        ));

        state.subscription = Some(Subscription { token, handle });
        info!("Subscribed to SDK status");
    }

    /// Cancel the current subscription, if any.
    pub fn unsubscribe(&self) {
        if let Some(subscription) = self.lock().subscription.take() {
            subscription.cancel();
            info!("Unsubscribed from SDK status");
        }
    }

    /// Stop delivering for good. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if state.live {
            info!("Status bridge shut down");
        }
        state.live = false;
        if let Some(subscription) = state.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_live(&self) -> bool {
        self.lock().live
    }

    /// Whether a relay is currently running.
    pub fn is_subscribed(&self) -> bool {
        self.lock()
            .subscription
            .as_ref()
            .is_some_and(Subscription::is_running)
    }
}

fn lock_state(state: &Mutex<BridgeState>) -> MutexGuard<'_, BridgeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn relay(
    mut stream: Box<dyn StatusStream>,
    token: CancellationToken,
    state: Arc<Mutex<BridgeState>>,
    channel: Arc<dyn HostChannel>,
    method: Arc<str>,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = stream.next() => event,
        };

        let Some(event) = event else {
            debug!("SDK status stream ended");
            break;
        };

        let arguments = status_arguments(&event);

        let guard = lock_state(&state);
        if !guard.live || token.is_cancelled() {
            break;
        }

        match channel.invoke_method(&method, arguments) {
            Ok(()) => debug!(status = status_tag(&event), "Pushed status"),
            Err(err) => warn!(
                status = status_tag(&event),
                error = %err,
                "Host rejected status push"
            ),
        }
    }
}
