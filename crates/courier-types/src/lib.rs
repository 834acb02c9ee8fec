//! # Courier Types - Shared Dispatch Contracts
//!
//! Defines the contracts every part of the dispatch runtime agrees on:
//!
//! - **Request taxonomy**: `Command`, `Query`, and `Event` marker traits
//!   plus the erased [`RequestContext`] view handed to pipeline behaviors
//! - **Handler contracts**: `CommandHandler`, `QueryHandler`, `EventHandler`
//! - **Result envelope**: the uniform [`OperationResult`] returned by every
//!   command/query dispatch
//! - **Error taxonomy**: registration, discovery, and load errors
//! - **Configuration**: [`DiscoveryConfig`] consumed by the discovery engine
//!
//! ## Routing Rules
//!
//! - A request's concrete runtime type is the sole routing key.
//! - Commands and queries bind to exactly one handler; events bind to zero
//!   or more.
//! - Business failures are expressed as failure-classified envelopes, never
//!   as errors; `Err`/panics are reserved for contract violations and
//!   infrastructure faults.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod errors;
pub mod handler;
pub mod request;
pub mod result;

// Re-export main types
pub use config::DiscoveryConfig;
pub use errors::{DiscoveryError, ModuleLoadError, RegistryError};
pub use handler::{CommandHandler, EventHandler, QueryHandler};
pub use request::{Command, Event, Query, RequestContext, RequestKind};
pub use result::{OperationResult, OperationStatus};
