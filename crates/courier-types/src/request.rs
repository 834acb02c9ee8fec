//! # Request Taxonomy
//!
//! Marker traits classifying every dispatchable request, plus the erased
//! per-dispatch context handed to pipeline behaviors.
//!
//! A type is a command, a query, or an event by tag - never by position in
//! a class hierarchy. The concrete runtime type (`TypeId`) is the sole
//! routing key; polymorphic request hierarchies are deliberately not
//! supported.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A request that expresses intent to change state.
///
/// Exactly one handler; dispatch returns an [`crate::OperationResult`]
/// envelope. The `Output` associated type declares the payload shape a
/// successful envelope is expected to carry.
pub trait Command: Send + Sync + 'static {
    /// The payload type a successful dispatch produces.
    type Output: Serialize;
}

/// A request that retrieves data without side effects.
///
/// Exactly one handler; dispatch returns an [`crate::OperationResult`]
/// envelope carrying `Output` on success.
pub trait Query: Send + Sync + 'static {
    /// The payload type a successful dispatch produces.
    type Output: Serialize;
}

/// A notification of a past occurrence.
///
/// Zero or more handlers; publishing returns nothing to the caller.
pub trait Event: Send + Sync + 'static {}

/// Routing discipline of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Single-dispatch, mutating.
    Command,
    /// Single-dispatch, read-only.
    Query,
    /// Multi-dispatch notification.
    Event,
}

impl RequestKind {
    /// Whether this kind routes to exactly one handler.
    #[must_use]
    pub fn is_single_dispatch(&self) -> bool {
        matches!(self, Self::Command | Self::Query)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Query => write!(f, "query"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// Erased per-dispatch view of a request.
///
/// Pipeline behaviors receive this instead of the concrete request type:
/// they can classify by [`RequestKind`], correlate log lines with the
/// dispatch id, or downcast via [`RequestContext::request_as`] to decide
/// whether a given request is in scope.
#[derive(Clone)]
pub struct RequestContext {
    kind: RequestKind,
    request_name: &'static str,
    request_type: TypeId,
    correlation_id: Uuid,
    payload: Arc<dyn Any + Send + Sync>,
}

impl RequestContext {
    /// Wrap a command for dispatch.
    #[must_use]
    pub fn command<C: Command>(command: C) -> Self {
        Self::erase(RequestKind::Command, command)
    }

    /// Wrap a query for dispatch.
    #[must_use]
    pub fn query<Q: Query>(query: Q) -> Self {
        Self::erase(RequestKind::Query, query)
    }

    /// Wrap an event for publishing.
    #[must_use]
    pub fn event<E: Event>(event: E) -> Self {
        Self::erase(RequestKind::Event, event)
    }

    fn erase<T: Send + Sync + 'static>(kind: RequestKind, request: T) -> Self {
        Self {
            kind,
            request_name: std::any::type_name::<T>(),
            request_type: TypeId::of::<T>(),
            correlation_id: Uuid::new_v4(),
            payload: Arc::new(request),
        }
    }

    /// Routing discipline of the wrapped request.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Fully-qualified type name of the wrapped request.
    #[must_use]
    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    /// The routing key: the wrapped request's concrete runtime type.
    #[must_use]
    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    /// Correlation id stamped on this dispatch (v4, unique per call).
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Downcast the wrapped request to a concrete type.
    ///
    /// Returns `None` when the dispatch carries a different request type.
    #[must_use]
    pub fn request_as<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// The erased request value.
    ///
    /// Behaviors should prefer [`RequestContext::request_as`].
    #[must_use]
    pub fn payload(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.payload)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("kind", &self.kind)
            .field("request_name", &self.request_name)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}
