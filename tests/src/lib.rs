//! # Courier Test Suite
//!
//! Unified test crate containing cross-crate integration scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support/          # Shared orders domain fixtures
//! │   └── orders.rs
//! │
//! └── integration/      # Cross-crate scenarios
//!     ├── discovery_scenarios.rs
//!     ├── dispatch_flows.rs
//!     └── pipeline_order.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p courier-tests
//!
//! # By category
//! cargo test -p courier-tests integration::discovery_scenarios::
//! cargo test -p courier-tests integration::dispatch_flows::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
pub mod support;
