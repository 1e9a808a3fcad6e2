//! # Bridge Configuration Module
//!
//! Provides configuration management for the health bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `BridgeConfig` instance holding the collaborators and settings the
//! dispatcher needs. It enforces fail-fast validation so a bridge is never
//! registered without an SDK or a channel to push status events on.
//!
//! ## Required Dependencies
//!
//! - `HealthSdk` - The native health-data SDK being bridged
//! - `HostChannel` - Outbound channel used for `sendStatus` pushes
//!
//! ## Optional Dependencies
//!
//! - `LifecycleObserver` - Engine detach / application termination
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .sdk(Arc::new(MyHealthSdk))
//!     .host_channel(Arc::new(MyHostChannel))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! Missing collaborators are reported as `Error::CapabilityMissing` with an
//! actionable message naming what to inject.

use crate::error::{Error, Result};
use bridge_traits::{HealthSdk, HostChannel, LifecycleObserver};
use std::sync::Arc;

/// Default name of the method channel the host talks to.
pub const DEFAULT_CHANNEL_NAME: &str = "vital_health_kit";

/// Default host method used to push status events.
pub const DEFAULT_STATUS_METHOD: &str = "sendStatus";

/// Default capacity of status event buffers.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Configuration for the health bridge.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Native health SDK (required)
    pub sdk: Arc<dyn HealthSdk>,

    /// Host channel for push events (required)
    pub host_channel: Arc<dyn HostChannel>,

    /// Engine lifecycle observer (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Name of the method channel
    pub channel_name: String,

    /// Host method invoked for each status event
    pub status_method: String,

    /// Capacity of status event buffers
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("sdk", &"HealthSdk { ... }")
            .field("host_channel", &"HostChannel { ... }")
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field("channel_name", &self.channel_name)
            .field("status_method", &self.status_method)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Channel name and status method are not empty
    /// - Event buffer size is within `1..=10_000`
    pub fn validate(&self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(Error::Config("Channel name cannot be empty".to_string()));
        }

        if self.status_method.trim().is_empty() {
            return Err(Error::Config(
                "Status method name cannot be empty".to_string(),
            ));
        }

        check_event_buffer_size(self.event_buffer_size)
    }
}

fn check_event_buffer_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::Config(
            "Event buffer size must be greater than 0".to_string(),
        ));
    }

    if size > MAX_EVENT_BUFFER_SIZE {
        return Err(Error::Config(format!(
            "Event buffer size exceeds maximum of {}",
            MAX_EVENT_BUFFER_SIZE
        )));
    }

    Ok(())
}

fn sdk_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HealthSdk".to_string(),
        message: "HealthSdk implementation is required to serve bridge calls. \
                 iOS: inject the HealthKit-backed SDK client. \
                 Desktop: enable the 'desktop-shims' feature and use DesktopHealthSdk."
            .to_string(),
    }
}

fn host_channel_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HostChannel".to_string(),
        message: "HostChannel implementation is required to push status events. \
                 Mobile: wrap the engine's method channel. \
                 Desktop: use bridge_desktop::ChannelHost."
            .to_string(),
    }
}

/// Builder for constructing [`BridgeConfig`] instances.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    sdk: Option<Arc<dyn HealthSdk>>,
    host_channel: Option<Arc<dyn HostChannel>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    channel_name: Option<String>,
    status_method: Option<String>,
    event_buffer_size: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Sets the health SDK implementation (required).
    pub fn sdk(mut self, sdk: Arc<dyn HealthSdk>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    /// Sets the host channel used for status pushes (required).
    pub fn host_channel(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.host_channel = Some(channel);
        self
    }

    /// Sets the lifecycle observer.
    ///
    /// When provided, the dispatcher shuts the status bridge down on engine
    /// detach and application termination.
    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Sets the method channel name.
    ///
    /// Default: `vital_health_kit`
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    /// Sets the host method used for status pushes.
    ///
    /// Default: `sendStatus`
    pub fn status_method(mut self, method: impl Into<String>) -> Self {
        self.status_method = Some(method.into());
        self
    }

    /// Sets the capacity of status event buffers.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// The channel name `build` will use.
    pub fn resolved_channel_name(&self) -> &str {
        self.channel_name.as_deref().unwrap_or(DEFAULT_CHANNEL_NAME)
    }

    /// The event buffer size `build` will use, validated.
    ///
    /// Lets adapters size their status bus before the SDK is handed to the
    /// builder.
    pub fn resolved_event_buffer_size(&self) -> Result<usize> {
        let size = self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        check_event_buffer_size(size)?;
        Ok(size)
    }

    /// Builds the final `BridgeConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BridgeConfig)` on success, or an error if:
    /// - The SDK or host channel is missing
    /// - Configuration values are invalid
    pub fn build(self) -> Result<BridgeConfig> {
        let sdk = self.sdk.ok_or_else(sdk_missing_error)?;
        let host_channel = self.host_channel.ok_or_else(host_channel_missing_error)?;

        let config = BridgeConfig {
            sdk,
            host_channel,
            lifecycle_observer: self.lifecycle_observer,
            channel_name: self
                .channel_name
                .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
            status_method: self
                .status_method
                .unwrap_or_else(|| DEFAULT_STATUS_METHOD.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        BridgeError, DataInput, Environment, HealthSourceConfig, LifecycleChangeStream,
        PermissionOutcome, Provider, Resource, StatusEvent, StatusStream, WritableResource,
    };
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    struct StubSdk;

    struct EmptyStream;

    #[async_trait]
    impl StatusStream for EmptyStream {
        async fn next(&mut self) -> Option<StatusEvent> {
            None
        }
    }

    #[async_trait]
    impl HealthSdk for StubSdk {
        async fn configure_client(&self, _api_key: &str, _environment: Environment) {}

        async fn configure_health_source(&self, _config: HealthSourceConfig) {}

        async fn set_user_id(&self, _user_id: Uuid) {}

        async fn clean_up(&self) {}

        fn has_asked_for_permission(&self, _resource: Resource) -> bool {
            false
        }

        async fn is_user_connected(&self, _provider: Provider) -> BridgeResult<bool> {
            Err(BridgeError::NotAvailable("stub".to_string()))
        }

        async fn ask(
            &self,
            _read_resources: Vec<Resource>,
            _write_resources: Vec<WritableResource>,
        ) -> PermissionOutcome {
            PermissionOutcome::Success
        }

        fn sync_data(&self, _resources: Vec<Resource>) {}

        fn sync_all(&self) {}

        async fn write(
            &self,
            _input: DataInput,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> BridgeResult<()> {
            Ok(())
        }

        fn status(&self) -> Box<dyn StatusStream> {
            Box::new(EmptyStream)
        }
    }

    struct StubChannel;

    impl HostChannel for StubChannel {
        fn invoke_method(&self, _method: &str, _arguments: serde_json::Value) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct StubObserver;

    #[async_trait]
    impl LifecycleObserver for StubObserver {
        async fn subscribe_changes(&self) -> BridgeResult<Box<dyn LifecycleChangeStream>> {
            Err(BridgeError::NotAvailable("stub".to_string()))
        }
    }

    fn complete_builder() -> BridgeConfigBuilder {
        BridgeConfig::builder()
            .sdk(Arc::new(StubSdk))
            .host_channel(Arc::new(StubChannel))
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.channel_name, "vital_health_kit");
        assert_eq!(config.status_method, "sendStatus");
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.lifecycle_observer.is_none());
    }

    #[test]
    fn test_builder_requires_sdk() {
        let result = BridgeConfig::builder()
            .host_channel(Arc::new(StubChannel))
            .build();

        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            Error::CapabilityMissing { capability, .. } if capability == "HealthSdk"
        ));
        assert!(err.to_string().contains("DesktopHealthSdk"));
    }

    #[test]
    fn test_builder_requires_host_channel() {
        let result = BridgeConfig::builder().sdk(Arc::new(StubSdk)).build();

        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            Error::CapabilityMissing { capability, .. } if capability == "HostChannel"
        ));
    }

    #[test]
    fn test_builder_with_custom_settings() {
        let config = complete_builder()
            .lifecycle_observer(Arc::new(StubObserver))
            .channel_name("health_channel")
            .status_method("onStatus")
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert_eq!(config.channel_name, "health_channel");
        assert_eq!(config.status_method, "onStatus");
        assert_eq!(config.event_buffer_size, 16);
        assert!(config.lifecycle_observer.is_some());
    }

    #[test]
    fn test_validate_rejects_empty_channel_name() {
        let result = complete_builder().channel_name("  ").build();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Channel name cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_empty_status_method() {
        let result = complete_builder().status_method("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let result = complete_builder().event_buffer_size(0).build();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("greater than 0"));
    }

    #[test]
    fn test_validate_rejects_excessive_buffer() {
        let result = complete_builder().event_buffer_size(10_001).build();
        assert!(result.is_err());

        let result = complete_builder().event_buffer_size(10_000).build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_resolves_values_before_build() {
        let builder = BridgeConfig::builder();
        assert_eq!(builder.resolved_channel_name(), DEFAULT_CHANNEL_NAME);
        assert_eq!(
            builder.resolved_event_buffer_size().unwrap(),
            DEFAULT_EVENT_BUFFER_SIZE
        );

        let builder = BridgeConfig::builder()
            .channel_name("health_channel")
            .event_buffer_size(8);
        assert_eq!(builder.resolved_channel_name(), "health_channel");
        assert_eq!(builder.resolved_event_buffer_size().unwrap(), 8);

        let builder = BridgeConfig::builder().event_buffer_size(0);
        assert!(builder.resolved_event_buffer_size().is_err());
    }

    #[test]
    fn test_config_debug_hides_collaborators() {
        let config = complete_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("HealthSdk { ... }"));
        assert!(debug.contains("vital_health_kit"));
    }
}
