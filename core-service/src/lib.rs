//! Health SDK bridge: request dispatcher and status-stream relay.
//!
//! Host calls arrive as [`MethodCall`]s with positional JSON arguments. The
//! [`Dispatcher`] decodes them into typed operations, runs each against the
//! injected [`HealthSdk`](bridge_traits::HealthSdk) on its own task, and
//! answers through a single-use [`ReplySender`]. Sync status flows the other
//! way: the [`StatusBridge`] relays the SDK's status stream to the host as
//! `sendStatus` pushes until it is unsubscribed or the host goes away.
//!
//! Desktop apps typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and start from [`bootstrap_desktop`].

pub mod args;
pub mod call;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod mappers;
pub mod status;

#[cfg(test)]
mod testing;

pub use call::{MethodCall, MethodResponse, ReplyReceiver, ReplySender};
pub use dispatcher::Dispatcher;
pub use error::{BridgeFailure, ErrorKind, ErrorResult, PlatformError, Result};
pub use status::StatusBridge;

#[cfg(feature = "desktop-shims")]
use bridge_desktop::{ChannelHost, DesktopHealthSdk, DesktopLifecycleObserver, HostEventReceiver};
#[cfg(feature = "desktop-shims")]
use core_runtime::config::{BridgeConfig, BridgeConfigBuilder};
#[cfg(feature = "desktop-shims")]
use core_runtime::events::StatusBus;
#[cfg(feature = "desktop-shims")]
use std::sync::Arc;

/// A dispatcher wired to the desktop adapters.
#[cfg(feature = "desktop-shims")]
pub struct DesktopBridge {
    pub dispatcher: Dispatcher,
    pub sdk: Arc<DesktopHealthSdk>,
    pub lifecycle: Arc<DesktopLifecycleObserver>,
    /// Status pushes destined for the host.
    pub host_events: HostEventReceiver,
}

/// Convenience bootstrapper for desktop hosts.
///
/// Call from within a tokio runtime so lifecycle notifications are observed.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_runtime::Result<()> {
/// use core_service::{bootstrap_desktop, MethodCall};
///
/// let bridge = bootstrap_desktop()?;
/// let response = bridge.dispatcher.call(MethodCall::bare("cleanUp")).await;
/// assert!(response.is_success());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> core_runtime::Result<DesktopBridge> {
    bootstrap_desktop_with(BridgeConfig::builder())
}

/// Like [`bootstrap_desktop`], honoring the channel name, status method and
/// event buffer size set on `builder`.
///
/// The SDK, host channel and lifecycle observer are always the desktop
/// adapters; any set on `builder` are replaced.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop_with(builder: BridgeConfigBuilder) -> core_runtime::Result<DesktopBridge> {
    let buffer_size = builder.resolved_event_buffer_size()?;
    let sdk = Arc::new(DesktopHealthSdk::with_bus(StatusBus::new(buffer_size)));
    let lifecycle = Arc::new(DesktopLifecycleObserver::new());
    let (host, host_events) = ChannelHost::new(builder.resolved_channel_name());

    let config = builder
        .sdk(sdk.clone())
        .host_channel(Arc::new(host))
        .lifecycle_observer(lifecycle.clone())
        .build()?;

    Ok(DesktopBridge {
        dispatcher: Dispatcher::register(config),
        sdk,
        lifecycle,
        host_events,
    })
}
