//! # Courier Core - Mediation/Dispatch Engine
//!
//! Routes application requests (commands, queries, events) to their
//! registered handlers, composes cross-cutting pipeline behaviors around
//! handler execution, and discovers handlers at startup from a module
//! catalog with graceful degradation when parts of the catalog are broken.
//!
//! ## Control Flow
//!
//! ```text
//! ┌──────────────┐   discover()    ┌──────────────────┐
//! │ModuleCatalog │ ──────────────→ │ HandlerRegistry  │  (startup, once)
//! └──────────────┘                 └────────┬─────────┘
//!                                           │
//!                 execute()/publish()       ▼
//! ┌──────────┐   ┌───────────────────────────────────────────┐
//! │  Caller  │──→│ Mediator: behavior 1 → ... → behavior N → │──→ result
//! └──────────┘   │           resolved handler                │   envelope
//!                └───────────────────────────────────────────┘
//! ```
//!
//! ## Dispatch Rules
//!
//! - Commands/queries resolve exactly one handler; missing handlers and
//!   panics surface as internal-error envelopes, never raw errors.
//! - Events fan out to all subscribers sequentially, in registration
//!   order, with isolated failure domains per handler.
//! - The registry and behavior list are immutable after startup; dispatch
//!   takes no locks.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod catalog;
pub mod discovery;
pub mod mediator;
pub mod pipeline;
pub mod registry;

// Re-export main types
pub use catalog::{CatalogRoot, HandlerCandidate, ModuleCatalog};
pub use discovery::{DiscoveryEngine, DiscoveryReport};
pub use mediator::{Mediator, MediatorBuilder};
pub use pipeline::{Next, PipelineBehavior, TimeoutBehavior, TracingBehavior};
pub use registry::{Binding, HandlerInvoke, HandlerRegistry, HandlerSource};
