//! Method table, argument decoding and SDK execution for each call.
//!
//! Decoding is synchronous and never touches the SDK, so a call with bad
//! arguments fails before any side effect. Execution awaits exactly one SDK
//! operation and converts its outcome to a [`MethodResponse`].

use bridge_traits::sdk::{
    DataInput, Environment, HealthSdk, HealthSourceConfig, NutritionKind, PermissionOutcome,
    Provider, Resource, WritableResource,
};
use chrono::{DateTime, Utc};
use core_runtime::logging::redact_if_sensitive;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::args::Args;
use crate::call::MethodResponse;
use crate::error::{BridgeFailure, ErrorResult, Result};
use crate::mappers;

/// Every method the bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ConfigureClient,
    ConfigureHealthkit,
    SetUserId,
    CleanUp,
    HasAskedForPermission,
    IsUserConnected,
    Ask,
    SyncData,
    WriteHealthKitData,
    SubscribeToStatus,
    UnsubscribeFromStatus,
}

pub const METHODS: [(&str, Method); 11] = [
    ("configureClient", Method::ConfigureClient),
    ("configureHealthkit", Method::ConfigureHealthkit),
    ("setUserId", Method::SetUserId),
    ("cleanUp", Method::CleanUp),
    ("hasAskedForPermission", Method::HasAskedForPermission),
    ("isUserConnected", Method::IsUserConnected),
    ("ask", Method::Ask),
    ("syncData", Method::SyncData),
    ("writeHealthKitData", Method::WriteHealthKitData),
    ("subscribeToStatus", Method::SubscribeToStatus),
    ("unsubscribeFromStatus", Method::UnsubscribeFromStatus),
];

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        METHODS
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|(_, method)| *method)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::ConfigureClient => "configureClient",
            Method::ConfigureHealthkit => "configureHealthkit",
            Method::SetUserId => "setUserId",
            Method::CleanUp => "cleanUp",
            Method::HasAskedForPermission => "hasAskedForPermission",
            Method::IsUserConnected => "isUserConnected",
            Method::Ask => "ask",
            Method::SyncData => "syncData",
            Method::WriteHealthKitData => "writeHealthKitData",
            Method::SubscribeToStatus => "subscribeToStatus",
            Method::UnsubscribeFromStatus => "unsubscribeFromStatus",
        }
    }
}

/// Where a decoded call goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Handled by the status bridge.
    Status(StatusCommand),
    /// Executed against the SDK.
    Sdk(Operation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    Subscribe,
    Unsubscribe,
}

/// A fully decoded SDK operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ConfigureClient {
        api_key: String,
        environment: Environment,
    },
    ConfigureHealthSource(HealthSourceConfig),
    SetUserId(Uuid),
    CleanUp,
    HasAskedForPermission(Resource),
    IsUserConnected(Provider),
    Ask {
        read: Vec<Resource>,
        write: Vec<WritableResource>,
    },
    /// `None` syncs everything the user granted.
    SyncData(Option<Vec<Resource>>),
    Write {
        input: DataInput,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Decode the arguments of `method`.
pub fn route(method: Method, arguments: &Value) -> Result<Route> {
    let args = Args::new(method.name(), arguments);

    let operation = match method {
        Method::SubscribeToStatus => return Ok(Route::Status(StatusCommand::Subscribe)),
        Method::UnsubscribeFromStatus => return Ok(Route::Status(StatusCommand::Unsubscribe)),
        Method::ConfigureClient => decode_configure_client(args)?,
        Method::ConfigureHealthkit => decode_configure_healthkit(args)?,
        Method::SetUserId => decode_set_user_id(args)?,
        Method::CleanUp => Operation::CleanUp,
        Method::HasAskedForPermission => {
            Operation::HasAskedForPermission(mappers::decode_resource(args.single_string()?)?)
        }
        Method::IsUserConnected => {
            Operation::IsUserConnected(mappers::decode_provider(args.single_string()?)?)
        }
        Method::Ask => decode_ask(args)?,
        Method::SyncData => decode_sync_data(args)?,
        Method::WriteHealthKitData => decode_write(args)?,
    };

    Ok(Route::Sdk(operation))
}

fn decode_configure_client(args: Args<'_>) -> Result<Operation> {
    let args = args.positional(3)?;
    let api_key = args.string(0, "apiKey")?;
    let region = args.string(1, "region")?;
    let environment = args.string(2, "environment")?;

    Ok(Operation::ConfigureClient {
        api_key: api_key.to_string(),
        environment: mappers::resolve_environment(region, environment)?,
    })
}

fn decode_configure_healthkit(args: Args<'_>) -> Result<Operation> {
    let args = args.positional(4)?;
    let background_delivery_enabled = args.bool(0, "backgroundDeliveryEnabled")?;
    let logs_enabled = args.bool(1, "logsEnabled")?;
    let number_of_days_to_back_fill = args.u32(2, "numberOfDaysToBackFill")?;
    let mode = mappers::decode_push_mode(args.string(3, "mode")?)?;

    Ok(Operation::ConfigureHealthSource(HealthSourceConfig {
        background_delivery_enabled,
        logs_enabled,
        number_of_days_to_back_fill,
        mode,
    }))
}

fn decode_set_user_id(args: Args<'_>) -> Result<Operation> {
    let raw = args.single_string()?;
    let user_id = Uuid::parse_str(raw).map_err(|err| {
        BridgeFailure::invalid_arguments(format!("setUserId: malformed UUID {:?}: {}", raw, err))
    })?;
    Ok(Operation::SetUserId(user_id))
}

fn decode_ask(args: Args<'_>) -> Result<Operation> {
    let args = args.positional(2)?;
    let read = args.string_list(0, "readResources")?;
    let write = args.string_list(1, "writeResources")?;

    Ok(Operation::Ask {
        read: mappers::decode_resources(&read)?,
        write: mappers::decode_writable_resources(&write)?,
    })
}

fn decode_sync_data(args: Args<'_>) -> Result<Operation> {
    let resources = match args.optional_string_list()? {
        Some(names) => Some(mappers::decode_resources(&names)?),
        None => None,
    };
    Ok(Operation::SyncData(resources))
}

fn decode_write(args: Args<'_>) -> Result<Operation> {
    let args = args.positional(4)?;
    let resource = mappers::decode_resource(args.string(0, "resource")?)?;
    let value = args.f64(1, "value")?;
    let start = args.epoch_seconds(2, "startDate")?;
    let end = args.epoch_seconds(3, "endDate")?;

    Ok(Operation::Write {
        input: data_input(resource, value)?,
        start,
        end,
    })
}

/// Sample to write for `resource`. Only writable resources have one.
fn data_input(resource: Resource, value: f64) -> Result<DataInput> {
    match resource {
        Resource::Nutrition(NutritionKind::Water) => {
            if !(value.is_finite() && value >= 0.0 && value < i64::MAX as f64) {
                return Err(BridgeFailure::invalid_arguments(format!(
                    "writeHealthKitData: water volume must be a non-negative number of milliliters, got {}",
                    value
                )));
            }
            Ok(DataInput::Water {
                milliliters: value.trunc() as i64,
            })
        }
        other => Err(BridgeFailure::unsupported_resource(
            mappers::encode_resource(other),
        )),
    }
}

/// Run `operation` against the SDK.
pub async fn execute(sdk: &dyn HealthSdk, operation: Operation) -> MethodResponse {
    match operation {
        Operation::ConfigureClient {
            api_key,
            environment,
        } => {
            info!(
                api_key = %redact_if_sensitive("api_key", &api_key),
                region = mappers::encode_region(environment.region),
                environment = mappers::encode_tier(environment.tier),
                "Configuring client"
            );
            sdk.configure_client(&api_key, environment).await;
            MethodResponse::null()
        }
        Operation::ConfigureHealthSource(config) => {
            info!(
                mode = mappers::encode_push_mode(config.mode),
                background_delivery = config.background_delivery_enabled,
                "Configuring health source"
            );
            sdk.configure_health_source(config).await;
            MethodResponse::null()
        }
        Operation::SetUserId(user_id) => {
            sdk.set_user_id(user_id).await;
            MethodResponse::null()
        }
        Operation::CleanUp => {
            sdk.clean_up().await;
            MethodResponse::null()
        }
        Operation::HasAskedForPermission(resource) => {
            MethodResponse::Success(Value::Bool(sdk.has_asked_for_permission(resource)))
        }
        Operation::IsUserConnected(provider) => match sdk.is_user_connected(provider).await {
            Ok(connected) => MethodResponse::Success(Value::Bool(connected)),
            Err(err) => {
                error!(provider = provider.as_raw(), error = %err, "isUserConnected failed");
                BridgeFailure::from(err).into()
            }
        },
        Operation::Ask { read, write } => match sdk.ask(read, write).await {
            PermissionOutcome::Success => MethodResponse::null(),
            PermissionOutcome::Failure(message) => ErrorResult::permission_failure(message).into(),
            PermissionOutcome::HealthKitNotAvailable => {
                ErrorResult::health_kit_not_available().into()
            }
        },
        Operation::SyncData(Some(resources)) => {
            info!(count = resources.len(), "Starting scoped sync");
            sdk.sync_data(resources);
            MethodResponse::null()
        }
        Operation::SyncData(None) => {
            info!("Starting full sync");
            sdk.sync_all();
            MethodResponse::null()
        }
        Operation::Write { input, start, end } => match sdk.write(input, start, end).await {
            Ok(()) => MethodResponse::null(),
            Err(err) => {
                error!(error = %err, "Write failed");
                BridgeFailure::from(err).into()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::MockSdk;
    use bridge_traits::sdk::{DataPushMode, IndividualKind, Region, Tier};
    use bridge_traits::BridgeError;
    use mockall::predicate::eq;
    use serde_json::json;

    fn steps() -> Resource {
        Resource::Individual(IndividualKind::Steps)
    }

    fn decode(method: &str, arguments: Value) -> Result<Route> {
        route(Method::from_name(method).unwrap(), &arguments)
    }

    fn operation(method: &str, arguments: Value) -> Operation {
        match decode(method, arguments).unwrap() {
            Route::Sdk(operation) => operation,
            other => panic!("expected an SDK operation, got {:?}", other),
        }
    }

    fn failure_json(response: MethodResponse) -> Value {
        match response.to_wire().unwrap() {
            Value::String(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected JSON text, got {:?}", other),
        }
    }

    #[test]
    fn test_method_table_round_trip() {
        for (name, method) in METHODS {
            assert_eq!(Method::from_name(name), Some(method));
            assert_eq!(method.name(), name);
        }
        assert_eq!(Method::from_name("foo"), None);
        assert_eq!(Method::from_name("CleanUp"), None);
    }

    #[test]
    fn test_status_commands_ignore_arguments() {
        assert_eq!(
            decode("subscribeToStatus", json!({"x": 1})).unwrap(),
            Route::Status(StatusCommand::Subscribe)
        );
        assert_eq!(
            decode("unsubscribeFromStatus", Value::Null).unwrap(),
            Route::Status(StatusCommand::Unsubscribe)
        );
    }

    #[test]
    fn test_decode_configure_client() {
        assert_eq!(
            operation("configureClient", json!(["k", "eu", "sandbox"])),
            Operation::ConfigureClient {
                api_key: "k".to_string(),
                environment: Environment::new(Tier::Sandbox, Region::Eu),
            }
        );

        let err = decode("configureClient", json!(["k", "xx", "sandbox"])).unwrap_err();
        assert_eq!(err, BridgeFailure::new(ErrorKind::UnsupportedRegion, "xx"));

        let err = decode("configureClient", json!(["k", "us", "staging"])).unwrap_err();
        assert_eq!(
            err,
            BridgeFailure::new(ErrorKind::UnsupportedEnvironment, "staging")
        );
    }

    #[test]
    fn test_decode_configure_healthkit() {
        assert_eq!(
            operation("configureHealthkit", json!([true, false, 30, "automatic"])),
            Operation::ConfigureHealthSource(HealthSourceConfig {
                background_delivery_enabled: true,
                logs_enabled: false,
                number_of_days_to_back_fill: 30,
                mode: DataPushMode::Automatic,
            })
        );

        let err = decode("configureHealthkit", json!([true, false, 30, "sometimes"])).unwrap_err();
        assert_eq!(
            err,
            BridgeFailure::new(ErrorKind::UnsupportedDataPushMode, "sometimes")
        );

        let err = decode("configureHealthkit", json!([true, false, -3, "manual"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_decode_set_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(
            operation("setUserId", json!(id.to_string())),
            Operation::SetUserId(id)
        );

        let err = decode("setUserId", json!("not-a-uuid")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
        assert!(err.message.unwrap().contains("not-a-uuid"));
    }

    #[test]
    fn test_decode_ask_fails_on_any_bad_resource() {
        assert_eq!(
            operation("ask", json!([["steps"], ["water"]])),
            Operation::Ask {
                read: vec![steps()],
                write: vec![WritableResource::Water],
            }
        );

        let err = decode("ask", json!([["steps", "nope"], ["water"]])).unwrap_err();
        assert_eq!(err, BridgeFailure::unsupported_resource("nope"));

        let err = decode("ask", json!([["steps"], ["steps"]])).unwrap_err();
        assert_eq!(err, BridgeFailure::unsupported_resource("steps"));
    }

    #[test]
    fn test_decode_sync_data() {
        assert_eq!(operation("syncData", Value::Null), Operation::SyncData(None));
        assert_eq!(
            operation("syncData", json!(["steps", "sleep"])),
            Operation::SyncData(Some(vec![steps(), Resource::Sleep]))
        );

        let err = decode("syncData", json!(["bogus"])).unwrap_err();
        assert_eq!(err, BridgeFailure::unsupported_resource("bogus"));
    }

    #[test]
    fn test_decode_write() {
        let decoded = operation("writeHealthKitData", json!(["water", 250.7, 1_700_000_000, 1_700_000_600]));
        let Operation::Write { input, start, end } = decoded else {
            panic!("expected a write");
        };

        assert_eq!(input, DataInput::Water { milliliters: 250 });
        assert_eq!(start.timestamp(), 1_700_000_000);
        assert_eq!(end.timestamp(), 1_700_000_600);
    }

    #[test]
    fn test_decode_write_rejects_non_writable_resource() {
        let err = decode("writeHealthKitData", json!(["steps", 1.0, 0, 60])).unwrap_err();
        assert_eq!(err, BridgeFailure::unsupported_resource("steps"));

        let err = decode("writeHealthKitData", json!(["bogus", 1.0, 0, 60])).unwrap_err();
        assert_eq!(err, BridgeFailure::unsupported_resource("bogus"));

        let err = decode("writeHealthKitData", json!(["water", "lots", 0, 60])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_decode_write_rejects_out_of_range_volume() {
        for value in [json!(-5.0), json!(-0.5), json!(1e300)] {
            let err = decode("writeHealthKitData", json!(["water", value, 0, 60])).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArguments);
            assert!(err.message.unwrap().starts_with("writeHealthKitData:"));
        }

        let err = data_input(Resource::Nutrition(NutritionKind::Water), f64::NAN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);

        let decoded = operation("writeHealthKitData", json!(["water", 0, 0, 60]));
        let Operation::Write { input, .. } = decoded else {
            panic!("expected a write");
        };
        assert_eq!(input, DataInput::Water { milliliters: 0 });
    }

    #[tokio::test]
    async fn test_execute_configure_client() {
        let environment = Environment::new(Tier::Sandbox, Region::Eu);
        let mut sdk = MockSdk::new();
        sdk.expect_configure_client()
            .with(eq("k"), eq(environment))
            .times(1)
            .return_const(());

        let response = execute(
            &sdk,
            Operation::ConfigureClient {
                api_key: "k".to_string(),
                environment,
            },
        )
        .await;
        assert_eq!(response, MethodResponse::null());
    }

    #[tokio::test]
    async fn test_execute_has_asked_for_permission_is_verbatim() {
        let water = Resource::Nutrition(NutritionKind::Water);
        let mut sdk = MockSdk::new();
        sdk.expect_has_asked_for_permission()
            .with(eq(water))
            .return_const(true);

        let response = execute(&sdk, Operation::HasAskedForPermission(water)).await;
        assert_eq!(response, MethodResponse::Success(json!(true)));
    }

    #[tokio::test]
    async fn test_execute_is_user_connected() {
        let mut sdk = MockSdk::new();
        sdk.expect_is_user_connected()
            .with(eq(Provider::Oura))
            .returning(|_| Ok(false));

        let response = execute(&sdk, Operation::IsUserConnected(Provider::Oura)).await;
        assert_eq!(response, MethodResponse::Success(json!(false)));
    }

    #[tokio::test]
    async fn test_execute_is_user_connected_sdk_error() {
        let mut sdk = MockSdk::new();
        sdk.expect_is_user_connected()
            .returning(|_| Err(BridgeError::OperationFailed("offline".to_string())));

        let response = execute(&sdk, Operation::IsUserConnected(Provider::Garmin)).await;
        assert_eq!(
            failure_json(response),
            json!({"code": "Unknown error", "message": "Bridge operation failed: offline"})
        );
    }

    #[tokio::test]
    async fn test_execute_ask_outcomes() {
        let cases = [
            (PermissionOutcome::Success, None),
            (
                PermissionOutcome::Failure("denied".to_string()),
                Some(json!({"code": "failure", "message": "denied"})),
            ),
            (
                PermissionOutcome::HealthKitNotAvailable,
                Some(json!({"code": "healthKitNotAvailable", "message": "healthKitNotAvailable"})),
            ),
        ];

        for (outcome, expected) in cases {
            let mut sdk = MockSdk::new();
            sdk.expect_ask()
                .with(eq(vec![steps()]), eq(vec![WritableResource::Water]))
                .times(1)
                .return_const(outcome);

            let response = execute(
                &sdk,
                Operation::Ask {
                    read: vec![steps()],
                    write: vec![WritableResource::Water],
                },
            )
            .await;

            match expected {
                None => assert_eq!(response, MethodResponse::null()),
                Some(json) => assert_eq!(failure_json(response), json),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_sync_scopes() {
        let mut sdk = MockSdk::new();
        sdk.expect_sync_all().times(1).return_const(());
        sdk.expect_sync_data()
            .with(eq(vec![steps(), Resource::Sleep]))
            .times(1)
            .return_const(());

        assert_eq!(
            execute(&sdk, Operation::SyncData(None)).await,
            MethodResponse::null()
        );
        assert_eq!(
            execute(&sdk, Operation::SyncData(Some(vec![steps(), Resource::Sleep]))).await,
            MethodResponse::null()
        );
    }

    #[tokio::test]
    async fn test_execute_write() {
        let start = DateTime::from_timestamp(0, 0).unwrap();
        let end = DateTime::from_timestamp(60, 0).unwrap();
        let mut sdk = MockSdk::new();
        sdk.expect_write()
            .with(
                eq(DataInput::Water { milliliters: 500 }),
                eq(start),
                eq(end),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));

        let response = execute(
            &sdk,
            Operation::Write {
                input: DataInput::Water { milliliters: 500 },
                start,
                end,
            },
        )
        .await;
        assert_eq!(response, MethodResponse::null());
    }

    #[tokio::test]
    async fn test_execute_write_failure() {
        let mut sdk = MockSdk::new();
        sdk.expect_write()
            .returning(|_, _, _| Err(BridgeError::NotAvailable("HealthKit".to_string())));

        let response = execute(
            &sdk,
            Operation::Write {
                input: DataInput::Water { milliliters: 1 },
                start: DateTime::from_timestamp(0, 0).unwrap(),
                end: DateTime::from_timestamp(1, 0).unwrap(),
            },
        )
        .await;

        assert_eq!(failure_json(response)["code"], "Unknown error");
    }

    #[tokio::test]
    async fn test_execute_lifecycle_calls() {
        let id = Uuid::new_v4();
        let mut sdk = MockSdk::new();
        sdk.expect_set_user_id().with(eq(id)).times(1).return_const(());
        sdk.expect_clean_up().times(1).return_const(());
        sdk.expect_configure_health_source()
            .times(1)
            .return_const(());

        assert!(execute(&sdk, Operation::SetUserId(id)).await.is_success());
        assert!(execute(&sdk, Operation::CleanUp).await.is_success());
        assert!(execute(
            &sdk,
            Operation::ConfigureHealthSource(HealthSourceConfig {
                background_delivery_enabled: false,
                logs_enabled: true,
                number_of_days_to_back_fill: 7,
                mode: DataPushMode::Manual,
            })
        )
        .await
        .is_success());
    }
}
