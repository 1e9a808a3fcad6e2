//! Call routing and lifecycle plumbing.
//!
//! The dispatcher decodes each call synchronously, answers status commands
//! and decode failures inline, and runs every SDK-bound call on its own tokio
//! task. Completions of different calls are not ordered.

use bridge_traits::{HealthSdk, LifecycleEvent, LifecycleObserver};
use core_runtime::config::BridgeConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument, Span};

use crate::call::{MethodCall, MethodResponse, ReplySender};
use crate::error::{ErrorResult, PlatformError};
use crate::handlers::{self, Method, Route, StatusCommand};
use crate::status::StatusBridge;

/// Entry point for host calls.
#[derive(Clone)]
pub struct Dispatcher {
    sdk: Arc<dyn HealthSdk>,
    status: StatusBridge,
    channel_name: String,
}

impl Dispatcher {
    /// Build a dispatcher from `config`.
    ///
    /// When the config carries a lifecycle observer and a tokio runtime is
    /// available, the observer is watched right away.
    pub fn register(config: BridgeConfig) -> Self {
        let status = StatusBridge::new(
            Arc::clone(&config.sdk),
            Arc::clone(&config.host_channel),
            config.status_method.clone(),
        );

        let dispatcher = Self {
            sdk: config.sdk,
            status,
            channel_name: config.channel_name,
        };

        if let Some(observer) = config.lifecycle_observer {
            if tokio::runtime::Handle::try_current().is_ok() {
                dispatcher.watch_lifecycle(observer);
            } else {
                warn!("No tokio runtime at registration; lifecycle events will not be observed");
            }
        }

        info!(channel = %dispatcher.channel_name, "Bridge registered");
        dispatcher
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn status(&self) -> &StatusBridge {
        &self.status
    }

    /// Route `call` and answer it through `reply`.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all, fields(method = %call.method))]
    pub fn dispatch(&self, call: MethodCall, reply: ReplySender) {
        debug!("Dispatching call");

        let Some(method) = Method::from_name(&call.method) else {
            warn!("Unsupported method");
            reply.send(MethodResponse::Unsupported(
                PlatformError::unsupported_method(&call.method),
            ));
            return;
        };

        let route = match handlers::route(method, &call.arguments) {
            Ok(route) => route,
            Err(failure) => {
                warn!(error = %failure, "Rejected call arguments");
                reply.send(failure.into());
                return;
            }
        };

        match route {
            Route::Status(StatusCommand::Subscribe) => {
                self.status.subscribe();
                reply.send(MethodResponse::null());
            }
            Route::Status(StatusCommand::Unsubscribe) => {
                self.status.unsubscribe();
                reply.send(MethodResponse::null());
            }
            Route::Sdk(operation) => {
                let sdk = Arc::clone(&self.sdk);
                tokio::spawn(
                    async move {
                        let response = handlers::execute(sdk.as_ref(), operation).await;
                        reply.send(response);
                    }
                    .instrument(Span::current()),
                );
            }
        }
    }

    /// Dispatch `call` and wait for its reply.
    pub async fn call(&self, call: MethodCall) -> MethodResponse {
        let (reply, receiver) = ReplySender::channel(call.method.clone());
        self.dispatch(call, reply);

        receiver.await.unwrap_or_else(|_| {
            MethodResponse::Failure(ErrorResult::unknown("Call was dropped before replying"))
        })
    }

    /// The bridge was detached from the host engine.
    pub fn detach(&self) {
        info!("Detached from engine");
        self.status.shutdown();
    }

    /// The application is about to terminate.
    pub fn application_will_terminate(&self) {
        info!("Application will terminate");
        self.status.shutdown();
    }

    /// Apply lifecycle events from `observer` until its stream ends.
    pub fn watch_lifecycle(&self, observer: Arc<dyn LifecycleObserver>) -> JoinHandle<()> {
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let mut changes = match observer.subscribe_changes().await {
                Ok(changes) => changes,
                Err(err) => {
                    warn!(error = %err, "Failed to observe lifecycle");
                    return;
                }
            };

            while let Some(event) = changes.next().await {
                match event {
                    LifecycleEvent::Detached => dispatcher.detach(),
                    LifecycleEvent::WillTerminate => dispatcher.application_will_terminate(),
                }
            }
            debug!("Lifecycle stream ended");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSdk;
    use bridge_desktop::{ChannelHost, DesktopLifecycleObserver};
    use bridge_traits::{IndividualKind, Resource};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn dispatcher(sdk: MockSdk) -> Dispatcher {
        let (host, _receiver) = ChannelHost::new("vital_health_kit");
        let config = BridgeConfig::builder()
            .sdk(Arc::new(sdk))
            .host_channel(Arc::new(host))
            .build()
            .unwrap();
        Dispatcher::register(config)
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let dispatcher = dispatcher(MockSdk::new());

        let response = dispatcher.call(MethodCall::new("foo", json!([1, 2]))).await;
        let err = response.to_wire().unwrap_err();

        assert_eq!(err.code, "Unsupported method");
        assert_eq!(err.message.as_deref(), Some("Method not supported foo"));
    }

    #[tokio::test]
    async fn test_decode_failure_skips_sdk() {
        // Any SDK call would panic on the unconfigured mock
        let dispatcher = dispatcher(MockSdk::new());

        let response = dispatcher
            .call(MethodCall::new("syncData", json!(["bogus"])))
            .await;

        assert_eq!(
            response.to_wire().unwrap(),
            Value::String(r#"{"code":"UnsupportedResource","message":"bogus"}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_sdk_call_runs_and_replies() {
        let mut sdk = MockSdk::new();
        sdk.expect_has_asked_for_permission()
            .withf(|resource| *resource == Resource::Individual(IndividualKind::Steps))
            .return_const(true);
        let dispatcher = dispatcher(sdk);

        let response = dispatcher
            .call(MethodCall::new("hasAskedForPermission", json!("steps")))
            .await;

        assert_eq!(response, MethodResponse::Success(json!(true)));
    }

    #[tokio::test]
    async fn test_status_commands_reply_null() {
        let mut sdk = MockSdk::new();
        sdk.expect_status()
            .returning(|| Box::new(core_runtime::events::StatusBus::new(1).subscribe()));
        let dispatcher = dispatcher(sdk);

        assert_eq!(
            dispatcher.call(MethodCall::bare("subscribeToStatus")).await,
            MethodResponse::null()
        );
        assert_eq!(
            dispatcher.call(MethodCall::bare("unsubscribeFromStatus")).await,
            MethodResponse::null()
        );
    }

    #[tokio::test]
    async fn test_detach_and_terminate_are_idempotent() {
        let dispatcher = dispatcher(MockSdk::new());

        dispatcher.detach();
        dispatcher.application_will_terminate();
        dispatcher.detach();

        assert!(!dispatcher.status().is_live());
    }

    #[tokio::test]
    async fn test_lifecycle_observer_shuts_down_bridge() {
        let observer = Arc::new(DesktopLifecycleObserver::new());
        let (host, _receiver) = ChannelHost::new("vital_health_kit");
        let config = BridgeConfig::builder()
            .sdk(Arc::new(MockSdk::new()))
            .host_channel(Arc::new(host))
            .lifecycle_observer(observer.clone())
            .build()
            .unwrap();
        let dispatcher = Dispatcher::register(config);

        // Let the watcher subscribe before notifying
        for _ in 0..50 {
            if observer.notify(LifecycleEvent::WillTerminate) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        for _ in 0..50 {
            if !dispatcher.status().is_live() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!dispatcher.status().is_live());
    }

    #[tokio::test]
    async fn test_channel_name_from_config() {
        let dispatcher = dispatcher(MockSdk::new());
        assert_eq!(dispatcher.channel_name(), "vital_health_kit");
    }
}
