//! # Host Bridge Traits
//!
//! Contracts between the health bridge core and the collaborators it drives
//! but does not own.
//!
//! ## Overview
//!
//! The bridge sits between a host environment (a Flutter engine, a desktop
//! shell) and a native health-data SDK. Each trait here represents one side of
//! that arrangement that must be implemented per platform.
//!
//! ## Traits
//!
//! ### SDK
//! - [`HealthSdk`](sdk::HealthSdk) - Configuration, permissions, reads, writes, sync
//! - [`StatusStream`](sdk::StatusStream) - Reactive stream of sync status events
//!
//! ### Host
//! - [`HostChannel`](channel::HostChannel) - Fire-and-forget push events to the host
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - Engine detach / app termination
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Domain Types
//!
//! The SDK's vocabulary lives in [`sdk`]: [`Resource`](sdk::Resource),
//! [`WritableResource`](sdk::WritableResource), [`Provider`](sdk::Provider),
//! [`Environment`](sdk::Environment), [`DataPushMode`](sdk::DataPushMode) and
//! [`StatusEvent`](sdk::StatusEvent). These types carry no wire
//! representation; string mapping is the bridge's job.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` with an actionable message, since the message is what the
//! host ends up seeing.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so implementations can be shared across
//! the per-call tasks the dispatcher spawns.

pub mod channel;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod sdk;

pub use error::BridgeError;

// Re-export commonly used types
pub use channel::HostChannel;
pub use lifecycle::{LifecycleChangeStream, LifecycleEvent, LifecycleObserver};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use sdk::{
    DataInput, DataPushMode, Environment, HealthSdk, HealthSourceConfig, IndividualKind,
    NutritionKind, Payload, PermissionOutcome, ProcessedResourceData, Provider, Region, Resource,
    StatusEvent, StatusStream, Tier, VitalsKind, WritableResource,
};
