//! Health SDK Abstraction
//!
//! Defines the contract of the native health-data SDK the bridge drives:
//! client configuration, permission requests, reads, writes, background
//! sync, and the reactive status stream that reports sync progress.
//!
//! The SDK is an opaque asynchronous service. Hosts inject a platform
//! implementation (HealthKit on iOS, the desktop simulator in
//! `bridge-desktop`, or a mock in tests).

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;

/// Category of health data used as the unit of read, sync and permission
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Profile,
    Body,
    Workout,
    Activity,
    Sleep,
    Vitals(VitalsKind),
    Individual(IndividualKind),
    Nutrition(NutritionKind),
}

/// Vital-sign sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VitalsKind {
    Glucose,
    BloodPressure,
    HeartRate,
}

/// Individual metric sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndividualKind {
    Steps,
    ActiveEnergyBurned,
    BasalEnergyBurned,
    FloorsClimbed,
    DistanceWalkingRunning,
    Vo2Max,
    Weight,
    BodyFat,
}

/// Nutrition sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutritionKind {
    Water,
}

impl Resource {
    /// Every resource the SDK knows about.
    pub const ALL: [Resource; 17] = [
        Resource::Profile,
        Resource::Body,
        Resource::Workout,
        Resource::Activity,
        Resource::Sleep,
        Resource::Vitals(VitalsKind::Glucose),
        Resource::Vitals(VitalsKind::BloodPressure),
        Resource::Vitals(VitalsKind::HeartRate),
        Resource::Individual(IndividualKind::Steps),
        Resource::Individual(IndividualKind::ActiveEnergyBurned),
        Resource::Individual(IndividualKind::BasalEnergyBurned),
        Resource::Individual(IndividualKind::FloorsClimbed),
        Resource::Individual(IndividualKind::DistanceWalkingRunning),
        Resource::Individual(IndividualKind::Vo2Max),
        Resource::Individual(IndividualKind::Weight),
        Resource::Individual(IndividualKind::BodyFat),
        Resource::Nutrition(NutritionKind::Water),
    ];
}

/// Resources that may be used as a write target.
///
/// Kept as a separate type so that "readable but not writable" is a type
/// error rather than a runtime check on [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritableResource {
    Water,
}

impl WritableResource {
    pub const ALL: [WritableResource; 1] = [WritableResource::Water];

    /// The readable resource this write target corresponds to.
    pub fn as_resource(&self) -> Resource {
        match self {
            WritableResource::Water => Resource::Nutrition(NutritionKind::Water),
        }
    }
}

/// Data providers known to the SDK.
///
/// The registry is owned by the SDK: the bridge validates membership through
/// [`Provider::from_raw`] but never enumerates providers itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Oura,
    Fitbit,
    Garmin,
    Wahoo,
    Strava,
    Withings,
    Renpho,
    Peloton,
    Zwift,
    EightSleep,
    Whoop,
    AppleHealthKit,
    FreestyleLibre,
    AbbottLibreview,
    Dexcom,
    Hammerhead,
    IHealth,
    GoogleFit,
    Polar,
    Cronometer,
    Omron,
}

impl Provider {
    pub const ALL: [Provider; 21] = [
        Provider::Oura,
        Provider::Fitbit,
        Provider::Garmin,
        Provider::Wahoo,
        Provider::Strava,
        Provider::Withings,
        Provider::Renpho,
        Provider::Peloton,
        Provider::Zwift,
        Provider::EightSleep,
        Provider::Whoop,
        Provider::AppleHealthKit,
        Provider::FreestyleLibre,
        Provider::AbbottLibreview,
        Provider::Dexcom,
        Provider::Hammerhead,
        Provider::IHealth,
        Provider::GoogleFit,
        Provider::Polar,
        Provider::Cronometer,
        Provider::Omron,
    ];

    /// Raw identifier used by the SDK's backend.
    pub fn as_raw(&self) -> &'static str {
        match self {
            Provider::Oura => "oura",
            Provider::Fitbit => "fitbit",
            Provider::Garmin => "garmin",
            Provider::Wahoo => "wahoo",
            Provider::Strava => "strava",
            Provider::Withings => "withings",
            Provider::Renpho => "renpho",
            Provider::Peloton => "peloton",
            Provider::Zwift => "zwift",
            Provider::EightSleep => "eight_sleep",
            Provider::Whoop => "whoop",
            Provider::AppleHealthKit => "apple_health_kit",
            Provider::FreestyleLibre => "freestyle_libre",
            Provider::AbbottLibreview => "abbott_libreview",
            Provider::Dexcom => "dexcom",
            Provider::Hammerhead => "hammerhead",
            Provider::IHealth => "ihealth",
            Provider::GoogleFit => "google_fit",
            Provider::Polar => "polar",
            Provider::Cronometer => "cronometer",
            Provider::Omron => "omron",
        }
    }

    /// Look up a provider by its raw identifier. Matching is exact.
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_raw() == raw)
    }
}

/// Deployment tier of the SDK backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Dev,
    Sandbox,
    Production,
}

/// Data residency region of the SDK backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Eu,
    Us,
}

/// Backend environment: one of the six tier/region combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Environment {
    pub tier: Tier,
    pub region: Region,
}

impl Environment {
    pub fn new(tier: Tier, region: Region) -> Self {
        Self { tier, region }
    }
}

/// Governs whether sync is host-triggered or scheduled by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataPushMode {
    Manual,
    Automatic,
}

/// Settings for the on-device health data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthSourceConfig {
    pub background_delivery_enabled: bool,
    pub logs_enabled: bool,
    pub number_of_days_to_back_fill: u32,
    pub mode: DataPushMode,
}

/// Outcome of a permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionOutcome {
    Success,
    Failure(String),
    /// The health data source does not exist on this device.
    HealthKitNotAvailable,
}

/// Resource-specific sample to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataInput {
    Water { milliliters: i64 },
}

/// Opaque payload produced by the SDK.
///
/// `Raw` and `Text` are already serialized and must not be encoded again.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Raw(Bytes),
    Text(String),
    Json(serde_json::Value),
}

/// Data that was uploaded for one resource during a sync.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResourceData {
    pub payload: Payload,
}

impl ProcessedResourceData {
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }
}

/// Notification emitted by the SDK while syncing.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Syncing(Resource),
    SuccessSyncing(Resource, ProcessedResourceData),
    /// Carries the failure's description when one is available.
    FailedSyncing(Resource, Option<String>),
    NothingToSync(Resource),
    SyncingCompleted,
}

impl StatusEvent {
    /// Resource the event refers to, `None` for `SyncingCompleted`.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            StatusEvent::Syncing(resource)
            | StatusEvent::SuccessSyncing(resource, _)
            | StatusEvent::FailedSyncing(resource, _)
            | StatusEvent::NothingToSync(resource) => Some(*resource),
            StatusEvent::SyncingCompleted => None,
        }
    }
}

/// Health SDK trait
///
/// Abstracts the native health-data client. Every method maps to exactly one
/// SDK operation; the bridge never composes them.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::sdk::{HealthSdk, Resource, IndividualKind};
///
/// async fn steps_granted(sdk: &dyn HealthSdk) -> bool {
///     sdk.has_asked_for_permission(Resource::Individual(IndividualKind::Steps))
/// }
/// ```
#[async_trait::async_trait]
pub trait HealthSdk: Send + Sync {
    /// Configure the backend client.
    async fn configure_client(&self, api_key: &str, environment: Environment);

    /// Configure the on-device health data source.
    async fn configure_health_source(&self, config: HealthSourceConfig);

    /// Associate subsequent uploads with a user.
    async fn set_user_id(&self, user_id: Uuid);

    /// Drop all cached state and stop background delivery.
    async fn clean_up(&self);

    /// Whether the permission prompt for `resource` was already shown.
    fn has_asked_for_permission(&self, resource: Resource) -> bool;

    /// Whether the current user has connected `provider`.
    async fn is_user_connected(&self, provider: Provider) -> Result<bool>;

    /// Request read and write permissions.
    async fn ask(
        &self,
        read_resources: Vec<Resource>,
        write_resources: Vec<WritableResource>,
    ) -> PermissionOutcome;

    /// Start syncing the given resources. Progress is reported through
    /// [`HealthSdk::status`].
    fn sync_data(&self, resources: Vec<Resource>);

    /// Start syncing every resource the user granted.
    fn sync_all(&self);

    /// Write a sample covering `[start, end)`.
    async fn write(&self, input: DataInput, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<()>;

    /// Open a new stream of status events.
    ///
    /// The stream only observes events emitted after this call returns.
    fn status(&self) -> Box<dyn StatusStream>;
}

/// Stream of SDK status events
#[async_trait::async_trait]
pub trait StatusStream: Send {
    /// Get the next status event
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<StatusEvent>;
}
