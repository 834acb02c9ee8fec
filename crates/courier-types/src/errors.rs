//! # Error Types
//!
//! Defines the error taxonomy used across the dispatch runtime.
//!
//! Only contract violations and infrastructure faults are errors here.
//! Ordinary business failure travels inside the
//! [`crate::OperationResult`] envelope, and a discovered type that merely
//! fails the handler shape check is skipped-and-logged data, not an error.

use thiserror::Error;

/// Errors raised by the handler registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two distinct handler types bound to the same command/query type.
    /// Fatal at registration time.
    #[error("duplicate binding for {request}: {existing} already bound, rejected {incoming}")]
    DuplicateBinding {
        /// The request type with conflicting bindings.
        request: &'static str,
        /// The handler type already bound.
        existing: &'static str,
        /// The handler type whose registration was rejected.
        incoming: &'static str,
    },

    /// A single-dispatch request has zero registered handlers.
    #[error("no handler bound for {request}")]
    NoHandlerFound {
        /// The request type that could not be resolved.
        request: &'static str,
    },
}

/// Errors raised while loading a module from the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModuleLoadError {
    /// No catalog root contains the specifier.
    #[error("module not found: {specifier}")]
    NotFound {
        /// The specifier that failed to resolve.
        specifier: String,
    },

    /// The module was found but its import failed.
    ///
    /// Typically an unrelated transitive dependency problem, not a defect
    /// in the handlers the module exports.
    #[error("failed to import {specifier}: {reason}")]
    ImportFailed {
        /// The specifier whose import failed.
        specifier: String,
        /// The causing error, rendered for logs.
        reason: String,
    },
}

/// Errors raised by the discovery engine as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Registration produced a fatal conflict.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Strict mode: every specifier produced zero handlers.
    #[error("no handlers discovered across {specifiers} specifier(s) in strict mode")]
    NoHandlersDiscovered {
        /// How many specifiers were scanned.
        specifiers: usize,
    },
}
