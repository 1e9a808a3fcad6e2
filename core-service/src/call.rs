//! Calls arriving from the host and the replies sent back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{BridgeFailure, ErrorResult, PlatformError};

/// A named invocation with positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// A call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }
}

/// Outcome of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// Value returned to the host verbatim.
    Success(Value),
    /// Typed failure, reported as an `ErrorResult` JSON string.
    Failure(ErrorResult),
    /// The method name is not known.
    Unsupported(PlatformError),
}

impl MethodResponse {
    pub fn null() -> Self {
        MethodResponse::Success(Value::Null)
    }

    /// Render the response the way the host channel expects it.
    ///
    /// Typed failures travel on the success path as JSON text; only an
    /// unknown method surfaces as a channel error.
    pub fn to_wire(self) -> Result<Value, PlatformError> {
        match self {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Failure(result) => {
                Ok(result.to_json().map(Value::String).unwrap_or(Value::Null))
            }
            MethodResponse::Unsupported(err) => Err(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }
}

impl From<BridgeFailure> for MethodResponse {
    fn from(failure: BridgeFailure) -> Self {
        MethodResponse::Failure(failure.to_error_result())
    }
}

impl From<ErrorResult> for MethodResponse {
    fn from(result: ErrorResult) -> Self {
        MethodResponse::Failure(result)
    }
}

/// Receiving half of a reply.
pub type ReplyReceiver = oneshot::Receiver<MethodResponse>;

/// Single-use reply handle.
///
/// `send` consumes the handle, so a call can be answered at most once.
#[derive(Debug)]
pub struct ReplySender {
    method: String,
    sender: oneshot::Sender<MethodResponse>,
}

impl ReplySender {
    pub fn channel(method: impl Into<String>) -> (Self, ReplyReceiver) {
        let (sender, receiver) = oneshot::channel();
        let reply = Self {
            method: method.into(),
            sender,
        };
        (reply, receiver)
    }

    pub fn send(self, response: MethodResponse) {
        if self.sender.send(response).is_err() {
            debug!(method = %self.method, "Reply dropped: caller is gone");
        }
    }
}
