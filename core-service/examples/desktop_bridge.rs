//! Desktop bridge walkthrough
//!
//! Drives the dispatcher against the desktop SDK simulator and prints the
//! status pushes a host would receive.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example desktop_bridge
//!
//! # JSON logs
//! cargo run -p core-service --example desktop_bridge -- json
//! ```

use bridge_traits::logging::LogLevel;
use bridge_traits::{IndividualKind, Payload, Resource};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{bootstrap_desktop, MethodCall};
use serde_json::json;
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug)
            .with_pii_redaction(true),
    )?;

    let mut bridge = bootstrap_desktop()?;
    bridge.sdk.queue_upload(
        Resource::Individual(IndividualKind::Steps),
        Payload::Text(r#"{"steps":[4200]}"#.to_string()),
    );

    let calls = [
        MethodCall::new("configureClient", json!(["sk_live_123", "eu", "sandbox"])),
        MethodCall::new("setUserId", json!("5f6c2b3e-2a1d-4c8e-9f7a-0b1c2d3e4f50")),
        MethodCall::new("ask", json!([["steps", "sleep"], ["water"]])),
        MethodCall::bare("subscribeToStatus"),
        MethodCall::new("syncData", json!(["steps", "sleep"])),
        MethodCall::new("hasAskedForPermission", json!("nonsense")),
        MethodCall::bare("foo"),
    ];

    for call in calls {
        let method = call.method.clone();
        let response = bridge.dispatcher.call(call).await;
        println!("{method:<24} -> {:?}", response.to_wire());
    }

    while let Ok(Some(push)) =
        tokio::time::timeout(Duration::from_millis(200), bridge.host_events.recv()).await
    {
        println!("push {} {}", push.method, push.arguments);
    }

    bridge.dispatcher.application_will_terminate();
    Ok(())
}
