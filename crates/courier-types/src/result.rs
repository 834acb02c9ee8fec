//! # Operation Result Envelope
//!
//! The uniform success/failure envelope returned by every command and
//! query dispatch. Handlers express ordinary business failure ("order not
//! found") as a failure-classified envelope; errors and panics are
//! reserved for truly unexpected faults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status classification carried by an [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Success with a payload.
    Ok,
    /// Success; a new resource was created.
    Created,
    /// Success with nothing to return.
    NoContent,
    /// The request was malformed or failed validation.
    BadRequest,
    /// The addressed resource does not exist.
    NotFound,
    /// The request conflicts with current state.
    Conflict,
    /// An unexpected fault occurred during dispatch.
    InternalError,
}

impl OperationStatus {
    /// Whether this status classifies a successful outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Created | Self::NoContent)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Created => write!(f, "created"),
            Self::NoContent => write!(f, "no_content"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// The discriminated envelope every command/query dispatch produces.
///
/// Success carries an optional JSON payload; failure carries a
/// human-readable message. The envelope API never panics and never
/// returns `Result`: a payload that fails to serialize degrades to an
/// internal-error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl OperationResult {
    /// Success with a payload.
    #[must_use]
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        Self::success(OperationStatus::Ok, payload)
    }

    /// Success; a new resource was created.
    #[must_use]
    pub fn created<T: Serialize>(payload: &T) -> Self {
        Self::success(OperationStatus::Created, payload)
    }

    /// Success with nothing to return.
    #[must_use]
    pub fn no_content() -> Self {
        Self {
            status: OperationStatus::NoContent,
            payload: None,
            message: None,
        }
    }

    /// Failure: malformed or invalid request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(OperationStatus::BadRequest, message)
    }

    /// Failure: the addressed resource does not exist.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure(OperationStatus::NotFound, message)
    }

    /// Failure: the request conflicts with current state.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::failure(OperationStatus::Conflict, message)
    }

    /// Failure: an unexpected fault occurred during dispatch.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::failure(OperationStatus::InternalError, message)
    }

    fn success<T: Serialize>(status: OperationStatus, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self {
                status,
                payload: Some(value),
                message: None,
            },
            Err(e) => Self::internal_error(format!("failed to serialize response payload: {e}")),
        }
    }

    fn failure(status: OperationStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: None,
            message: Some(message.into()),
        }
    }

    /// Status classification of this envelope.
    #[must_use]
    pub fn status(&self) -> OperationStatus {
        self.status
    }

    /// Whether this envelope classifies a successful outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Human-readable failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Raw JSON payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Deserialize the payload into a concrete type.
    ///
    /// Returns `None` when the envelope has no payload or the payload does
    /// not match `T`.
    #[must_use]
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.payload
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
