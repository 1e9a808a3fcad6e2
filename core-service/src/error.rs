//! Error taxonomy and the wire shapes failures are reported in.

use bridge_traits::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::codec::encode_json;

/// Category of a bridge failure.
///
/// The code of each kind is the tag hosts match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedRegion,
    UnsupportedEnvironment,
    UnsupportedResource,
    UnsupportedDataPushMode,
    UnsupportedProvider,
    UnsupportedBrand,
    UnsupportedKind,
    /// Arguments of the wrong shape or type, or a malformed identifier.
    InvalidArguments,
    /// Any other failure reported by the SDK.
    Sdk,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedRegion => "UnsupportedRegion",
            ErrorKind::UnsupportedEnvironment => "UnsupportedEnvironment",
            ErrorKind::UnsupportedResource => "UnsupportedResource",
            ErrorKind::UnsupportedDataPushMode => "UnsupportedDataPushMode",
            ErrorKind::UnsupportedProvider => "UnsupportedProvider",
            ErrorKind::UnsupportedBrand => "UnsupportedBrand",
            ErrorKind::UnsupportedKind => "UnsupportedKind",
            ErrorKind::InvalidArguments => "InvalidArguments",
            ErrorKind::Sdk => UNKNOWN_ERROR_CODE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const UNKNOWN_ERROR_CODE: &str = "Unknown error";

/// A typed failure raised while decoding or executing a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("<none>"))]
pub struct BridgeFailure {
    pub kind: ErrorKind,
    /// Offending raw value for `Unsupported*` kinds, a description otherwise.
    pub message: Option<String>,
}

impl BridgeFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn unsupported_resource(raw: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedResource, raw)
    }

    pub fn invalid_arguments(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments, description)
    }

    /// The `{code, message}` pair reported to the host.
    pub fn to_error_result(&self) -> ErrorResult {
        ErrorResult {
            code: self.kind.code().to_string(),
            message: self.message.clone(),
        }
    }
}

impl From<BridgeError> for BridgeFailure {
    fn from(err: BridgeError) -> Self {
        Self::new(ErrorKind::Sdk, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeFailure>;

/// Failure payload hosts receive on the success path, as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResult {
    pub fn new(code: impl Into<String>, message: Option<String>) -> Self {
        Self {
            code: code.into(),
            message,
        }
    }

    /// A failure outside the typed taxonomy.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(UNKNOWN_ERROR_CODE, Some(message.into()))
    }

    /// `ask` reported a failure.
    pub fn permission_failure(message: impl Into<String>) -> Self {
        Self::new("failure", Some(message.into()))
    }

    /// `ask` found no health store on the device.
    pub fn health_kit_not_available() -> Self {
        Self::new("healthKitNotAvailable", Some("healthKitNotAvailable".to_string()))
    }

    /// JSON text of this result, `None` if it cannot be serialized.
    pub fn to_json(&self) -> Option<String> {
        encode_json(self)
    }
}

/// Channel-level error, used for calls the bridge does not understand.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {}", .message.as_deref().unwrap_or_default())]
pub struct PlatformError {
    pub code: String,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl PlatformError {
    pub fn unsupported_method(method: &str) -> Self {
        Self {
            code: "Unsupported method".to_string(),
            message: Some(format!("Method not supported {}", method)),
            details: None,
        }
    }
}
