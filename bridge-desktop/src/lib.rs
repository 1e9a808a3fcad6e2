//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Desktop has no native health store, so this crate provides in-process
//! adapters that let the bridge run end to end outside a mobile engine:
//! - `HealthSdk` as an in-memory simulator publishing on a `StatusBus`
//! - `HostChannel` over a tokio unbounded queue
//! - `LifecycleObserver` driven by explicit notifications
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ChannelHost, DesktopHealthSdk};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = Arc::new(DesktopHealthSdk::new());
//!     let (host, mut events) = ChannelHost::new("vital_health_kit");
//!
//!     // Use in bridge configuration, then drain `events`
//! }
//! ```

mod channel;
mod lifecycle;
mod sdk;

pub use channel::{ChannelHost, HostEvent, HostEventReceiver};
pub use lifecycle::DesktopLifecycleObserver;
pub use sdk::{DesktopHealthSdk, SyncRequest, WrittenSample};
