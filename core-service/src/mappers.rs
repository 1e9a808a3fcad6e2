//! Wire-string mapping for the SDK's domain enums.
//!
//! Each enum has a static `(wire, value)` table used for decoding and an
//! exhaustive `match` used for encoding. Decoding is exact and
//! case-sensitive; a miss reports the offending raw string under the enum's
//! `Unsupported*` kind.

use bridge_traits::sdk::{
    DataPushMode, Environment, IndividualKind, NutritionKind, Provider, Region, Resource,
    StatusEvent, Tier, VitalsKind, WritableResource,
};
use serde_json::{json, Value};

use crate::codec::encode_payload;
use crate::error::{BridgeFailure, ErrorKind, Result};

pub const RESOURCES: [(&str, Resource); 17] = [
    ("profile", Resource::Profile),
    ("body", Resource::Body),
    ("workout", Resource::Workout),
    ("activity", Resource::Activity),
    ("sleep", Resource::Sleep),
    ("glucose", Resource::Vitals(VitalsKind::Glucose)),
    ("bloodPressure", Resource::Vitals(VitalsKind::BloodPressure)),
    ("heartRate", Resource::Vitals(VitalsKind::HeartRate)),
    ("steps", Resource::Individual(IndividualKind::Steps)),
    (
        "activeEnergyBurned",
        Resource::Individual(IndividualKind::ActiveEnergyBurned),
    ),
    (
        "basalEnergyBurned",
        Resource::Individual(IndividualKind::BasalEnergyBurned),
    ),
    (
        "floorsClimbed",
        Resource::Individual(IndividualKind::FloorsClimbed),
    ),
    (
        "distanceWalkingRunning",
        Resource::Individual(IndividualKind::DistanceWalkingRunning),
    ),
    ("vo2Max", Resource::Individual(IndividualKind::Vo2Max)),
    ("weight", Resource::Individual(IndividualKind::Weight)),
    ("bodyFat", Resource::Individual(IndividualKind::BodyFat)),
    ("water", Resource::Nutrition(NutritionKind::Water)),
];

pub const WRITABLE_RESOURCES: [(&str, WritableResource); 1] = [("water", WritableResource::Water)];

pub const REGIONS: [(&str, Region); 2] = [("eu", Region::Eu), ("us", Region::Us)];

pub const TIERS: [(&str, Tier); 3] = [
    ("dev", Tier::Dev),
    ("sandbox", Tier::Sandbox),
    ("production", Tier::Production),
];

pub const PUSH_MODES: [(&str, DataPushMode); 2] = [
    ("manual", DataPushMode::Manual),
    ("automatic", DataPushMode::Automatic),
];

fn lookup<T: Copy>(table: &[(&str, T)], raw: &str, kind: ErrorKind) -> Result<T> {
    table
        .iter()
        .find(|(wire, _)| *wire == raw)
        .map(|(_, value)| *value)
        .ok_or_else(|| BridgeFailure::new(kind, raw))
}

pub fn decode_resource(raw: &str) -> Result<Resource> {
    lookup(&RESOURCES, raw, ErrorKind::UnsupportedResource)
}

pub fn encode_resource(resource: Resource) -> &'static str {
    match resource {
        Resource::Profile => "profile",
        Resource::Body => "body",
        Resource::Workout => "workout",
        Resource::Activity => "activity",
        Resource::Sleep => "sleep",
        Resource::Vitals(kind) => match kind {
            VitalsKind::Glucose => "glucose",
            VitalsKind::BloodPressure => "bloodPressure",
            VitalsKind::HeartRate => "heartRate",
        },
        Resource::Individual(kind) => match kind {
            IndividualKind::Steps => "steps",
            IndividualKind::ActiveEnergyBurned => "activeEnergyBurned",
            IndividualKind::BasalEnergyBurned => "basalEnergyBurned",
            IndividualKind::FloorsClimbed => "floorsClimbed",
            IndividualKind::DistanceWalkingRunning => "distanceWalkingRunning",
            IndividualKind::Vo2Max => "vo2Max",
            IndividualKind::Weight => "weight",
            IndividualKind::BodyFat => "bodyFat",
        },
        Resource::Nutrition(kind) => match kind {
            NutritionKind::Water => "water",
        },
    }
}

/// Decode every entry, failing on the first unsupported one.
pub fn decode_resources<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Resource>> {
    raw.iter().map(|name| decode_resource(name.as_ref())).collect()
}

pub fn decode_writable_resource(raw: &str) -> Result<WritableResource> {
    lookup(&WRITABLE_RESOURCES, raw, ErrorKind::UnsupportedResource)
}

pub fn encode_writable_resource(resource: WritableResource) -> &'static str {
    match resource {
        WritableResource::Water => "water",
    }
}

pub fn decode_writable_resources<S: AsRef<str>>(raw: &[S]) -> Result<Vec<WritableResource>> {
    raw.iter()
        .map(|name| decode_writable_resource(name.as_ref()))
        .collect()
}

/// Providers are validated against the SDK's own registry.
pub fn decode_provider(raw: &str) -> Result<Provider> {
    Provider::from_raw(raw).ok_or_else(|| BridgeFailure::new(ErrorKind::UnsupportedProvider, raw))
}

pub fn encode_provider(provider: Provider) -> &'static str {
    provider.as_raw()
}

pub fn decode_region(raw: &str) -> Result<Region> {
    lookup(&REGIONS, raw, ErrorKind::UnsupportedRegion)
}

pub fn encode_region(region: Region) -> &'static str {
    match region {
        Region::Eu => "eu",
        Region::Us => "us",
    }
}

pub fn decode_tier(raw: &str) -> Result<Tier> {
    lookup(&TIERS, raw, ErrorKind::UnsupportedEnvironment)
}

pub fn encode_tier(tier: Tier) -> &'static str {
    match tier {
        Tier::Dev => "dev",
        Tier::Sandbox => "sandbox",
        Tier::Production => "production",
    }
}

/// Resolve a backend environment. The region is checked before the tier.
pub fn resolve_environment(region: &str, tier: &str) -> Result<Environment> {
    let region = decode_region(region)?;
    let tier = decode_tier(tier)?;
    Ok(Environment::new(tier, region))
}

pub fn decode_push_mode(raw: &str) -> Result<DataPushMode> {
    lookup(&PUSH_MODES, raw, ErrorKind::UnsupportedDataPushMode)
}

pub fn encode_push_mode(mode: DataPushMode) -> &'static str {
    match mode {
        DataPushMode::Manual => "manual",
        DataPushMode::Automatic => "automatic",
    }
}

/// Tag identifying a status event on the wire.
pub fn status_tag(event: &StatusEvent) -> &'static str {
    match event {
        StatusEvent::Syncing(_) => "syncing",
        StatusEvent::SuccessSyncing(_, _) => "successSyncing",
        StatusEvent::FailedSyncing(_, _) => "failedSyncing",
        StatusEvent::NothingToSync(_) => "nothingToSync",
        StatusEvent::SyncingCompleted => "syncingCompleted",
    }
}

/// Positional push arguments: `[tag, resource | null, detail | null]`.
pub fn status_arguments(event: &StatusEvent) -> Value {
    let tag = status_tag(event);
    let resource = event.resource().map(encode_resource);
    let detail = match event {
        StatusEvent::FailedSyncing(_, error) => error.clone(),
        StatusEvent::SuccessSyncing(_, data) => encode_payload(&data.payload),
        StatusEvent::Syncing(_) | StatusEvent::NothingToSync(_) | StatusEvent::SyncingCompleted => {
            None
        }
    };

    json!([tag, resource, detail])
}
