//! In-process Health SDK Simulator

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    sdk::{
        DataInput, Environment, HealthSdk, HealthSourceConfig, Payload, PermissionOutcome,
        ProcessedResourceData, Provider, Resource, StatusEvent, StatusStream, WritableResource,
    },
};
use chrono::{DateTime, Utc};
use core_runtime::events::StatusBus;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// A sample accepted by [`DesktopHealthSdk::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSample {
    pub input: DataInput,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Scope of a sync request observed by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    All,
    Resources(Vec<Resource>),
}

#[derive(Default)]
struct SdkState {
    environment: Option<Environment>,
    health_source: Option<HealthSourceConfig>,
    user_id: Option<Uuid>,
    asked: HashSet<Resource>,
    granted_writes: HashSet<WritableResource>,
    connected: HashSet<Provider>,
    pending: HashMap<Resource, VecDeque<Payload>>,
    failures: HashMap<Resource, String>,
    written: Vec<WrittenSample>,
    sync_requests: Vec<SyncRequest>,
}

/// Desktop stand-in for the native health SDK.
///
/// Keeps everything in memory and reports sync progress through a
/// [`StatusBus`]. A sync of one resource emits `Syncing`, then
/// `SuccessSyncing` per pending payload, `FailedSyncing` for an injected
/// failure, or `NothingToSync`. Every sync request ends with
/// `SyncingCompleted`.
///
/// Written water samples become pending uploads for the next sync.
pub struct DesktopHealthSdk {
    state: Mutex<SdkState>,
    bus: StatusBus,
    health_data_available: bool,
}

impl DesktopHealthSdk {
    /// Create a simulator with the default status buffer.
    pub fn new() -> Self {
        Self::with_bus(StatusBus::default())
    }

    /// Create a simulator publishing on `bus`.
    pub fn with_bus(bus: StatusBus) -> Self {
        Self {
            state: Mutex::new(SdkState::default()),
            bus,
            health_data_available: true,
        }
    }

    /// Simulate a device without an on-device health store.
    ///
    /// Permission requests then report `HealthKitNotAvailable`.
    pub fn without_health_data(mut self) -> Self {
        self.health_data_available = false;
        self
    }

    fn state(&self) -> MutexGuard<'_, SdkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `provider` as connected for the current user.
    pub fn connect_provider(&self, provider: Provider) {
        self.state().connected.insert(provider);
    }

    /// Queue a payload to be uploaded by the next sync of `resource`.
    pub fn queue_upload(&self, resource: Resource, payload: Payload) {
        self.state()
            .pending
            .entry(resource)
            .or_default()
            .push_back(payload);
    }

    /// Make the next sync of `resource` fail with `message`.
    pub fn fail_next_sync(&self, resource: Resource, message: impl Into<String>) {
        self.state().failures.insert(resource, message.into());
    }

    pub fn environment(&self) -> Option<Environment> {
        self.state().environment
    }

    pub fn health_source(&self) -> Option<HealthSourceConfig> {
        self.state().health_source.clone()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.state().user_id
    }

    pub fn written_samples(&self) -> Vec<WrittenSample> {
        self.state().written.clone()
    }

    pub fn sync_requests(&self) -> Vec<SyncRequest> {
        self.state().sync_requests.clone()
    }

    pub fn granted_writes(&self) -> HashSet<WritableResource> {
        self.state().granted_writes.clone()
    }

    /// Bus the simulator publishes status events on.
    pub fn bus(&self) -> &StatusBus {
        &self.bus
    }

    fn run_sync(&self, resources: Vec<Resource>) {
        let mut events = Vec::new();
        {
            let mut state = self.state();
            for resource in resources {
                events.push(StatusEvent::Syncing(resource));

                if let Some(message) = state.failures.remove(&resource) {
                    events.push(StatusEvent::FailedSyncing(resource, Some(message)));
                    continue;
                }

                let pending = state.pending.remove(&resource).unwrap_or_default();
                if pending.is_empty() {
                    events.push(StatusEvent::NothingToSync(resource));
                    continue;
                }

                for payload in pending {
                    events.push(StatusEvent::SuccessSyncing(
                        resource,
                        ProcessedResourceData::new(payload),
                    ));
                }
            }
        }
        events.push(StatusEvent::SyncingCompleted);

        for event in events {
            // No subscriber is not an error: nobody is listening yet.
            let delivered = self.bus.emit(event).unwrap_or(0);
            debug!(delivered, "Status event emitted");
        }
    }
}

impl Default for DesktopHealthSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthSdk for DesktopHealthSdk {
    async fn configure_client(&self, _api_key: &str, environment: Environment) {
        info!(?environment, "Client configured");
        self.state().environment = Some(environment);
    }

    async fn configure_health_source(&self, config: HealthSourceConfig) {
        info!(mode = ?config.mode, days = config.number_of_days_to_back_fill, "Health source configured");
        self.state().health_source = Some(config);
    }

    async fn set_user_id(&self, user_id: Uuid) {
        self.state().user_id = Some(user_id);
    }

    async fn clean_up(&self) {
        *self.state() = SdkState::default();
        info!("Simulator state cleared");
    }

    fn has_asked_for_permission(&self, resource: Resource) -> bool {
        self.state().asked.contains(&resource)
    }

    async fn is_user_connected(&self, provider: Provider) -> Result<bool> {
        let state = self.state();
        if state.user_id.is_none() {
            return Err(BridgeError::OperationFailed(
                "User id must be set before querying providers".to_string(),
            ));
        }
        Ok(state.connected.contains(&provider))
    }

    async fn ask(
        &self,
        read_resources: Vec<Resource>,
        write_resources: Vec<WritableResource>,
    ) -> PermissionOutcome {
        if !self.health_data_available {
            return PermissionOutcome::HealthKitNotAvailable;
        }

        let mut state = self.state();
        state.asked.extend(read_resources);
        for writable in write_resources {
            state.asked.insert(writable.as_resource());
            state.granted_writes.insert(writable);
        }
        PermissionOutcome::Success
    }

    fn sync_data(&self, resources: Vec<Resource>) {
        self.state()
            .sync_requests
            .push(SyncRequest::Resources(resources.clone()));
        self.run_sync(resources);
    }

    fn sync_all(&self) {
        let resources = {
            let mut state = self.state();
            state.sync_requests.push(SyncRequest::All);
            Resource::ALL
                .into_iter()
                .filter(|resource| state.asked.contains(resource))
                .collect::<Vec<_>>()
        };
        self.run_sync(resources);
    }

    async fn write(&self, input: DataInput, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if end < start {
            return Err(BridgeError::OperationFailed(format!(
                "Sample ends before it starts: {} < {}",
                end, start
            )));
        }

        let (resource, payload) = match &input {
            DataInput::Water { milliliters } => (
                WritableResource::Water.as_resource(),
                json!({
                    "milliliters": milliliters,
                    "start": start,
                    "end": end,
                }),
            ),
        };

        let mut state = self.state();
        state
            .pending
            .entry(resource)
            .or_default()
            .push_back(Payload::Json(payload));
        state.written.push(WrittenSample { input, start, end });
        Ok(())
    }

    fn status(&self) -> Box<dyn StatusStream> {
        Box::new(self.bus.subscribe())
    }
}
