//! # Handler Contracts
//!
//! Defines the traits a type must implement to participate in dispatch.
//!
//! The associated request type is the statically inspectable declaration
//! of which request a handler services; the registry extracts it at
//! registration time. One handler type binds to exactly one request type.
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use courier_types::{Command, CommandHandler, OperationResult};
//! use async_trait::async_trait;
//!
//! pub struct PlaceOrder { pub sku: String }
//! impl Command for PlaceOrder { type Output = u64; }
//!
//! pub struct PlaceOrderHandler { /* repositories, services, ... */ }
//!
//! #[async_trait]
//! impl CommandHandler for PlaceOrderHandler {
//!     type Command = PlaceOrder;
//!
//!     async fn handle(&self, command: &PlaceOrder) -> OperationResult {
//!         // business failure is an envelope, never an error
//!         OperationResult::created(&42u64)
//!     }
//! }
//! ```

use crate::request::{Command, Event, Query};
use crate::result::OperationResult;
use async_trait::async_trait;

/// A unit of logic servicing exactly one command type.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// The command type this handler services.
    type Command: Command;

    /// Execute the command.
    ///
    /// Ordinary business failures are returned as failure-classified
    /// envelopes; the handler body may suspend while awaiting external
    /// collaborators.
    async fn handle(&self, command: &Self::Command) -> OperationResult;
}

/// A unit of logic servicing exactly one query type.
#[async_trait]
pub trait QueryHandler: Send + Sync + 'static {
    /// The query type this handler services.
    type Query: Query;

    /// Execute the query. Must not mutate state.
    async fn handle(&self, query: &Self::Query) -> OperationResult;
}

/// A subscriber servicing exactly one event type.
///
/// Events return nothing to the publisher; an `Err` here signals an
/// unexpected infrastructure fault, which the mediator logs without
/// aborting sibling handlers.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// The event type this handler subscribes to.
    type Event: Event;

    /// React to the event.
    async fn handle(&self, event: &Self::Event) -> anyhow::Result<()>;
}
