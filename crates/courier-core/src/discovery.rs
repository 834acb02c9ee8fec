//! # Discovery Engine
//!
//! Two-stage, partially fault-tolerant handler discovery.
//!
//! Given an ordered list of module specifiers, the engine populates a
//! [`HandlerRegistry`] with every handler it can load while staying
//! functional when arbitrary subsets of the catalog are broken:
//!
//! ```text
//! per specifier:
//!   Stage 1: whole-unit import ──ok──→ register exported candidates
//!      │ import failed
//!      ▼
//!   Stage 2: enumerate direct sub-units
//!      ├─ none found        → warn, specifier fully failed, continue
//!      └─ per sub-unit:
//!           import ok       → register its candidates
//!           import failed   → warn, skip, continue with siblings
//! ```
//!
//! A duplicate command/query binding is the one fatal condition: it is a
//! configuration defect, not a load failure, and aborts discovery.
//! Discovery runs to completion before the mediator is built; the registry
//! it returns is immutable from then on.

use crate::catalog::{CandidateInner, HandlerCandidate, ModuleCatalog};
use crate::registry::HandlerRegistry;
use courier_types::{DiscoveryConfig, DiscoveryError, ModuleLoadError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Aggregate counts from one discovery pass, for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Handlers actually registered (idempotent re-binds not counted).
    pub handlers_registered: usize,
    /// Specifiers processed.
    pub specifiers_scanned: usize,
    /// Specifiers that produced nothing: whole-unit import failed and no
    /// sub-units were found.
    pub specifiers_failed: usize,
    /// Sub-units successfully imported during Stage 2.
    pub subunits_loaded: usize,
    /// Sub-units whose independent import failed.
    pub subunits_skipped: usize,
    /// Candidates rejected by the handler shape check.
    pub candidates_rejected: usize,
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "registered {} handler(s) across {} specifier(s) \
             ({} failed, {} sub-units skipped, {} candidates rejected)",
            self.handlers_registered,
            self.specifiers_scanned,
            self.specifiers_failed,
            self.subunits_skipped,
            self.candidates_rejected,
        )
    }
}

/// Scans a [`ModuleCatalog`] and materializes the handler registry.
pub struct DiscoveryEngine<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> DiscoveryEngine<'a> {
    /// Create an engine over a populated catalog.
    #[must_use]
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Run a full discovery pass.
    ///
    /// Specifiers are processed in configuration order; results from all
    /// specifiers merge into one registry.
    ///
    /// # Errors
    ///
    /// - `DiscoveryError::Registry` when two distinct handler types bind
    ///   the same command/query type (fatal configuration defect).
    /// - `DiscoveryError::NoHandlersDiscovered` when strict mode is set
    ///   and the whole pass registered nothing.
    pub fn discover(
        &self,
        config: &DiscoveryConfig,
    ) -> Result<(HandlerRegistry, DiscoveryReport), DiscoveryError> {
        let mut registry = HandlerRegistry::new();
        let mut report = DiscoveryReport::default();

        for specifier in &config.specifiers {
            report.specifiers_scanned += 1;

            // Stage 1: whole-unit import.
            match self.catalog.load(specifier) {
                Ok(candidates) => {
                    let registered =
                        register_candidates(&mut registry, &mut report, specifier, candidates)?;
                    info!(
                        specifier = %specifier,
                        handlers = registered,
                        "Specifier scanned"
                    );
                }
                Err(cause) => {
                    debug!(
                        specifier = %specifier,
                        error = %cause,
                        "Whole-unit import failed, falling back to sub-units"
                    );
                    self.scan_subunits(specifier, &cause, &mut registry, &mut report)?;
                }
            }
        }

        info!(
            handlers = report.handlers_registered,
            specifiers = report.specifiers_scanned,
            failed = report.specifiers_failed,
            subunits_skipped = report.subunits_skipped,
            "Discovery complete"
        );

        if config.strict && report.handlers_registered == 0 {
            return Err(DiscoveryError::NoHandlersDiscovered {
                specifiers: config.specifiers.len(),
            });
        }

        Ok((registry, report))
    }

    /// Stage 2: treat the specifier as a container and import each direct
    /// sub-unit independently. A broken sub-unit never aborts its siblings.
    fn scan_subunits(
        &self,
        specifier: &str,
        cause: &ModuleLoadError,
        registry: &mut HandlerRegistry,
        report: &mut DiscoveryReport,
    ) -> Result<(), DiscoveryError> {
        let subunits = self.catalog.subunits(specifier);
        if subunits.is_empty() {
            warn!(
                specifier = %specifier,
                error = %cause,
                "Specifier failed to import and has no sub-units, treating as fully failed"
            );
            report.specifiers_failed += 1;
            return Ok(());
        }

        for subunit in subunits {
            match self.catalog.load(&subunit) {
                Ok(candidates) => {
                    let registered =
                        register_candidates(registry, report, &subunit, candidates)?;
                    report.subunits_loaded += 1;
                    debug!(
                        subunit = %subunit,
                        handlers = registered,
                        "Sub-unit imported"
                    );
                }
                Err(e) => {
                    warn!(
                        subunit = %subunit,
                        error = %e,
                        "Sub-unit failed to import, skipping"
                    );
                    report.subunits_skipped += 1;
                }
            }
        }
        Ok(())
    }
}

fn register_candidates(
    registry: &mut HandlerRegistry,
    report: &mut DiscoveryReport,
    unit: &str,
    candidates: Vec<HandlerCandidate>,
) -> Result<usize, DiscoveryError> {
    let mut registered = 0;
    for candidate in candidates {
        match candidate.into_inner() {
            CandidateInner::Binding(binding) => {
                if registry.bind(binding)? {
                    registered += 1;
                }
            }
            CandidateInner::Malformed { type_name, reason } => {
                debug!(
                    unit = %unit,
                    candidate = %type_name,
                    reason = %reason,
                    "Candidate rejected by handler shape check"
                );
                report.candidates_rejected += 1;
            }
        }
    }
    report.handlers_registered += registered;
    Ok(registered)
}
