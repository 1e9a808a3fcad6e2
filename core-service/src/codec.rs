//! Success payload encoding.
//!
//! Payloads that are already serialized pass through untouched; structured
//! values are serialized with `serde_json`, which leaves `/` unescaped and
//! writes `chrono` timestamps as RFC 3339.

use bridge_traits::Payload;
use serde::Serialize;
use tracing::warn;

/// Serialize `value` to JSON text, `None` on failure.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            warn!(error = %err, "Failed to encode value as JSON");
            None
        }
    }
}

/// Wire text of an SDK payload.
///
/// Raw bytes are taken as UTF-8 and yield `None` when they are not valid
/// UTF-8.
pub fn encode_payload(payload: &Payload) -> Option<String> {
    match payload {
        Payload::Raw(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Some(text.to_string()),
            Err(err) => {
                warn!(error = %err, len = bytes.len(), "Raw payload is not valid UTF-8");
                None
            }
        },
        Payload::Text(text) => Some(text.clone()),
        Payload::Json(value) => encode_json(value),
    }
}
