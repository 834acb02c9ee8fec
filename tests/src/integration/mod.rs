//! Cross-crate integration scenarios.

pub mod dispatch_flows;
