//! # Module Catalog
//!
//! Explicit plugin registry the discovery engine scans: an ordered list of
//! named roots, each mapping dotted module specifiers to load closures.
//!
//! Loading a module yields the handler candidates it exports, or fails the
//! way a broken import would (typically an unrelated transitive dependency
//! problem, not a defect in the handlers themselves). A container module's
//! direct sub-units are enumerated by name prefix; when several roots
//! provide the same specifier, the first root wins.

use crate::registry::{Binding, HandlerSource};
use courier_types::{CommandHandler, EventHandler, ModuleLoadError, QueryHandler};
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type LoadFn = Arc<dyn Fn() -> Result<Vec<HandlerCandidate>, ModuleLoadError> + Send + Sync>;

/// A handler type exported by a module.
///
/// Well-formed candidates are built through the typed constructors, which
/// extract the serviced request type from the handler's associated type.
/// A module can also export a [`HandlerCandidate::malformed`] marker for a
/// type that looks handler-shaped but cannot be unambiguously associated
/// with one request type; discovery logs and skips those.
pub struct HandlerCandidate {
    inner: CandidateInner,
}

pub(crate) enum CandidateInner {
    Binding(Binding),
    Malformed { type_name: String, reason: String },
}

impl HandlerCandidate {
    /// A command handler export.
    pub fn command<H: CommandHandler>(source: HandlerSource<H>) -> Self {
        Self {
            inner: CandidateInner::Binding(Binding::command(source)),
        }
    }

    /// A query handler export.
    pub fn query<H: QueryHandler>(source: HandlerSource<H>) -> Self {
        Self {
            inner: CandidateInner::Binding(Binding::query(source)),
        }
    }

    /// An event handler export.
    pub fn event<H: EventHandler>(source: HandlerSource<H>) -> Self {
        Self {
            inner: CandidateInner::Binding(Binding::event(source)),
        }
    }

    /// A type that fails the handler shape check.
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            inner: CandidateInner::Malformed {
                type_name: type_name.into(),
                reason: reason.into(),
            },
        }
    }

    pub(crate) fn into_inner(self) -> CandidateInner {
        self.inner
    }
}

impl fmt::Debug for HandlerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            CandidateInner::Binding(binding) => {
                f.debug_tuple("HandlerCandidate").field(binding).finish()
            }
            CandidateInner::Malformed { type_name, reason } => f
                .debug_struct("Malformed")
                .field("type_name", type_name)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// One named root of the catalog (the analogue of a search-path entry).
pub struct CatalogRoot {
    name: String,
    entries: HashMap<String, LoadFn>,
}

impl CatalogRoot {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: HashMap::new(),
        }
    }

    /// Name of this root, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a loadable module under a dotted specifier.
    pub fn module<F>(&mut self, specifier: impl Into<String>, loader: F) -> &mut Self
    where
        F: Fn() -> Result<Vec<HandlerCandidate>, ModuleLoadError> + Send + Sync + 'static,
    {
        self.entries.insert(specifier.into(), Arc::new(loader));
        self
    }

    /// Register a module whose import always fails.
    ///
    /// Models a unit with a broken transitive dependency: it exists in the
    /// catalog, but loading it errors.
    pub fn broken(
        &mut self,
        specifier: impl Into<String>,
        reason: impl Into<String>,
    ) -> &mut Self {
        let specifier = specifier.into();
        let reason = reason.into();
        let failing = specifier.clone();
        self.entries.insert(
            specifier,
            Arc::new(move || {
                Err(ModuleLoadError::ImportFailed {
                    specifier: failing.clone(),
                    reason: reason.clone(),
                })
            }),
        );
        self
    }
}

/// Ordered collection of catalog roots.
#[derive(Default)]
pub struct ModuleCatalog {
    roots: Vec<CatalogRoot>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new root and return it for population.
    ///
    /// Roots are consulted in the order they were added.
    pub fn root(&mut self, name: impl Into<String>) -> &mut CatalogRoot {
        self.roots.push(CatalogRoot::new(name.into()));
        // Just pushed, cannot be empty.
        self.roots.last_mut().unwrap()
    }

    /// Whether any root contains the specifier.
    #[must_use]
    pub fn contains(&self, specifier: &str) -> bool {
        self.roots
            .iter()
            .any(|root| root.entries.contains_key(specifier))
    }

    /// Import a module and enumerate its exported candidates.
    ///
    /// The first root containing the specifier wins.
    ///
    /// # Errors
    ///
    /// `ModuleLoadError::NotFound` when no root contains the specifier, or
    /// whatever error the module's loader produces.
    pub fn load(&self, specifier: &str) -> Result<Vec<HandlerCandidate>, ModuleLoadError> {
        for root in &self.roots {
            if let Some(loader) = root.entries.get(specifier) {
                return loader();
            }
        }
        Err(ModuleLoadError::NotFound {
            specifier: specifier.to_string(),
        })
    }

    /// Enumerate the direct sub-units of a container specifier.
    ///
    /// `"orders.queries"` yields `"orders.queries.get_order"` but not
    /// `"orders.queries.reports.monthly"`. Names are merged across roots,
    /// de-duplicated, and sorted for deterministic scan order.
    #[must_use]
    pub fn subunits(&self, specifier: &str) -> Vec<String> {
        let prefix = format!("{specifier}.");
        let mut names = BTreeSet::new();
        for root in &self.roots {
            for name in root.entries.keys() {
                if let Some(rest) = name.strip_prefix(&prefix) {
                    if !rest.is_empty() && !rest.contains('.') {
                        names.insert(name.clone());
                    }
                }
            }
        }
        names.into_iter().collect()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots: Vec<_> = self
            .roots
            .iter()
            .map(|root| (root.name.as_str(), root.entries.len()))
            .collect();
        f.debug_struct("ModuleCatalog").field("roots", &roots).finish()
    }
}
