//! Invocation request/reply contract
//!
//! Defines the descriptor sent to the invocation service, the reply it hands
//! back, and the [`Disposition`] the dispatcher derives from that reply.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::RequestError;

/// Descriptor naming the handler to launch and the action to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeRequest {
    id: Uuid,
    target: String,
    action: String,
}

impl InvokeRequest {
    /// Build a request, rejecting empty target or action identifiers
    pub fn new(
        target: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let target = target.into();
        let action = action.into();

        if target.is_empty() {
            return Err(RequestError::EmptyTarget);
        }
        if action.is_empty() {
            return Err(RequestError::EmptyAction);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            target,
            action,
        })
    }

    /// Correlation id for logs; not part of the invocation contract
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Target handler identifier
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Action identifier
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for InvokeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.action, self.target)
    }
}

/// Error classification carried by an invocation reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvokeReplyError {
    /// No error reported
    None,
    /// The named target is not installed or not registered
    NoTarget,
    /// The request was malformed or the action is unsupported
    BadRequest,
    /// The invocation service failed internally
    Internal,
    /// A classification this crate does not know about
    Other(i32),
}

/// Reply produced by the invocation service for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeTargetReply {
    error: InvokeReplyError,
}

impl InvokeTargetReply {
    /// Reply with the given classification
    pub fn new(error: InvokeReplyError) -> Self {
        Self { error }
    }

    /// Reply reporting no error
    pub fn success() -> Self {
        Self::new(InvokeReplyError::None)
    }

    /// The reply's error classification
    pub fn error(&self) -> InvokeReplyError {
        self.error
    }
}

/// Facility that launches a handler by name and action
///
/// Returning `None` means the service could not produce a reply object at all.
pub trait InvocationService: Send + Sync {
    /// Submit a request and return its reply, if any
    fn invoke(&self, request: &InvokeRequest) -> Option<InvokeTargetReply>;
}

/// Outcome of a single invocation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// The service reported that the target does not exist
    TargetNotFound,
    /// The service rejected the request
    BadRequest,
    /// The service failed internally
    InternalError,
    /// The request was handed over without a documented error
    Delivered,
    /// The service returned no reply object
    NoReply,
}

impl Disposition {
    /// Classify an (optional) reply
    pub fn from_reply(reply: Option<&InvokeTargetReply>) -> Self {
        match reply {
            Some(reply) => Self::from(reply.error()),
            None => Disposition::NoReply,
        }
    }

    /// Whether the attempt did not reach the target
    pub fn is_failure(&self) -> bool {
        !matches!(self, Disposition::Delivered)
    }
}

impl From<InvokeReplyError> for Disposition {
    fn from(error: InvokeReplyError) -> Self {
        match error {
            InvokeReplyError::NoTarget => Disposition::TargetNotFound,
            InvokeReplyError::BadRequest => Disposition::BadRequest,
            InvokeReplyError::Internal => Disposition::InternalError,
            InvokeReplyError::None | InvokeReplyError::Other(_) => Disposition::Delivered,
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Disposition::TargetNotFound => "target not found",
            Disposition::BadRequest => "bad request",
            Disposition::InternalError => "internal error",
            Disposition::Delivered => "delivered",
            Disposition::NoReply => "no reply",
        };
        f.write_str(text)
    }
}
