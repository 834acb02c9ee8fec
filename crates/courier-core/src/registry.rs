//! # Handler Registry
//!
//! Immutable lookup table from request type to handler binding, built once
//! by discovery (or by hand) before the mediator accepts calls.
//!
//! Commands and queries bind to exactly one handler; a second binding with
//! a different handler type is fatal at registration time, while re-binding
//! the same handler type is a no-op so that overlapping discovery scans
//! stay idempotent. Events accumulate bindings in registration order.

use courier_types::{
    CommandHandler, EventHandler, OperationResult, QueryHandler, RegistryError, RequestContext,
    RequestKind,
};
use futures::future::BoxFuture;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Erased async invocation of a resolved handler.
///
/// This is also the terminal link of a pipeline behavior chain.
pub type HandlerInvoke =
    Arc<dyn Fn(Arc<RequestContext>) -> BoxFuture<'static, OperationResult> + Send + Sync>;

/// Where handler instances come from.
///
/// The registry never constructs handlers itself: a binding either shares
/// one live instance across all dispatches or asks a factory for a fresh
/// instance per dispatch. This is the service-resolver boundary.
pub struct HandlerSource<H> {
    inner: SourceInner<H>,
}

enum SourceInner<H> {
    Instance(Arc<H>),
    Factory(Arc<dyn Fn() -> Arc<H> + Send + Sync>),
}

impl<H> HandlerSource<H> {
    /// Share one instance across all dispatches.
    pub fn instance(handler: H) -> Self {
        Self {
            inner: SourceInner::Instance(Arc::new(handler)),
        }
    }

    /// Share an already-constructed instance across all dispatches.
    pub fn shared(handler: Arc<H>) -> Self {
        Self {
            inner: SourceInner::Instance(handler),
        }
    }

    /// Produce a fresh instance per dispatch.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
    {
        Self {
            inner: SourceInner::Factory(Arc::new(move || Arc::new(factory()))),
        }
    }

    /// Produce a live handler instance for one dispatch.
    #[must_use]
    pub fn resolve(&self) -> Arc<H> {
        match &self.inner {
            SourceInner::Instance(handler) => Arc::clone(handler),
            SourceInner::Factory(factory) => factory(),
        }
    }
}

impl<H> Clone for HandlerSource<H> {
    fn clone(&self) -> Self {
        Self {
            inner: match &self.inner {
                SourceInner::Instance(handler) => SourceInner::Instance(Arc::clone(handler)),
                SourceInner::Factory(factory) => SourceInner::Factory(Arc::clone(factory)),
            },
        }
    }
}

/// A validated, erased handler registration.
///
/// Carries the routing key (the request's `TypeId`), the handler's type
/// identity for duplicate detection, and the erased async invoke closure
/// the pipeline terminates at.
#[derive(Clone)]
pub struct Binding {
    kind: RequestKind,
    request_name: &'static str,
    request_type: TypeId,
    handler_name: &'static str,
    handler_type: TypeId,
    invoke: HandlerInvoke,
}

impl Binding {
    /// Bind a command handler to its declared command type.
    pub fn command<H: CommandHandler>(source: HandlerSource<H>) -> Self {
        let invoke: HandlerInvoke = Arc::new(move |ctx: Arc<RequestContext>| {
            let handler = source.resolve();
            Box::pin(async move {
                match ctx.request_as::<H::Command>() {
                    Some(command) => handler.handle(command).await,
                    None => payload_mismatch::<H::Command>(&ctx),
                }
            })
        });
        Self {
            kind: RequestKind::Command,
            request_name: std::any::type_name::<H::Command>(),
            request_type: TypeId::of::<H::Command>(),
            handler_name: std::any::type_name::<H>(),
            handler_type: TypeId::of::<H>(),
            invoke,
        }
    }

    /// Bind a query handler to its declared query type.
    pub fn query<H: QueryHandler>(source: HandlerSource<H>) -> Self {
        let invoke: HandlerInvoke = Arc::new(move |ctx: Arc<RequestContext>| {
            let handler = source.resolve();
            Box::pin(async move {
                match ctx.request_as::<H::Query>() {
                    Some(query) => handler.handle(query).await,
                    None => payload_mismatch::<H::Query>(&ctx),
                }
            })
        });
        Self {
            kind: RequestKind::Query,
            request_name: std::any::type_name::<H::Query>(),
            request_type: TypeId::of::<H::Query>(),
            handler_name: std::any::type_name::<H>(),
            handler_type: TypeId::of::<H>(),
            invoke,
        }
    }

    /// Bind an event handler to its declared event type.
    ///
    /// The handler's `Err` is converted into an internal-error envelope so
    /// every chain produces the uniform envelope; the mediator logs it.
    pub fn event<H: EventHandler>(source: HandlerSource<H>) -> Self {
        let invoke: HandlerInvoke = Arc::new(move |ctx: Arc<RequestContext>| {
            let handler = source.resolve();
            Box::pin(async move {
                match ctx.request_as::<H::Event>() {
                    Some(event) => match handler.handle(event).await {
                        Ok(()) => OperationResult::no_content(),
                        Err(e) => OperationResult::internal_error(format!("{e:#}")),
                    },
                    None => payload_mismatch::<H::Event>(&ctx),
                }
            })
        });
        Self {
            kind: RequestKind::Event,
            request_name: std::any::type_name::<H::Event>(),
            request_type: TypeId::of::<H::Event>(),
            handler_name: std::any::type_name::<H>(),
            handler_type: TypeId::of::<H>(),
            invoke,
        }
    }

    /// Routing discipline of the bound request type.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Fully-qualified name of the bound request type.
    #[must_use]
    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    /// Fully-qualified name of the handler type.
    #[must_use]
    pub fn handler_name(&self) -> &'static str {
        self.handler_name
    }

    /// The erased invoke closure (the chain's terminal link).
    #[must_use]
    pub fn invoke(&self) -> HandlerInvoke {
        Arc::clone(&self.invoke)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind)
            .field("request", &self.request_name)
            .field("handler", &self.handler_name)
            .finish()
    }
}

// Unreachable when bindings are built via the typed constructors; kept as
// an envelope so a wiring bug surfaces as a classified failure, not a panic.
fn payload_mismatch<T>(ctx: &RequestContext) -> OperationResult {
    OperationResult::internal_error(format!(
        "dispatch payload {} is not the bound request type {}",
        ctx.request_name(),
        std::any::type_name::<T>(),
    ))
}

/// Lookup structure mapping a request type to its handler binding(s).
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    single: HashMap<TypeId, Binding>,
    multi: HashMap<TypeId, Vec<Binding>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding.
    ///
    /// Returns `Ok(true)` when the binding was added, `Ok(false)` when the
    /// identical handler type was already bound (idempotent no-op, so
    /// overlapping discovery scans are safe).
    ///
    /// # Errors
    ///
    /// `RegistryError::DuplicateBinding` when a command/query type already
    /// has a binding with a *different* handler type.
    pub fn bind(&mut self, binding: Binding) -> Result<bool, RegistryError> {
        match binding.kind {
            RequestKind::Command | RequestKind::Query => {
                match self.single.entry(binding.request_type) {
                    Entry::Occupied(existing) => {
                        if existing.get().handler_type == binding.handler_type {
                            return Ok(false);
                        }
                        Err(RegistryError::DuplicateBinding {
                            request: binding.request_name,
                            existing: existing.get().handler_name,
                            incoming: binding.handler_name,
                        })
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(binding);
                        Ok(true)
                    }
                }
            }
            RequestKind::Event => {
                let bindings = self.multi.entry(binding.request_type).or_default();
                if bindings
                    .iter()
                    .any(|bound| bound.handler_type == binding.handler_type)
                {
                    return Ok(false);
                }
                bindings.push(binding);
                Ok(true)
            }
        }
    }

    /// Explicitly append an event binding even when the same handler type
    /// is already subscribed to the event.
    ///
    /// A command/query binding is delegated to [`HandlerRegistry::bind`]
    /// unchanged; single-dispatch types never gain append semantics.
    ///
    /// # Errors
    ///
    /// `RegistryError::DuplicateBinding` when a delegated command/query
    /// binding conflicts with an existing one.
    pub fn append_event(&mut self, binding: Binding) -> Result<(), RegistryError> {
        if binding.kind != RequestKind::Event {
            self.bind(binding)?;
            return Ok(());
        }
        self.multi
            .entry(binding.request_type)
            .or_default()
            .push(binding);
        Ok(())
    }

    /// Resolve the single handler for a command/query dispatch.
    ///
    /// # Errors
    ///
    /// `RegistryError::NoHandlerFound` when zero bindings exist.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<&Binding, RegistryError> {
        self.single
            .get(&ctx.request_type())
            .ok_or(RegistryError::NoHandlerFound {
                request: ctx.request_name(),
            })
    }

    /// Resolve all handlers subscribed to an event, in registration order.
    ///
    /// An empty slice is the normal, silent zero-subscriber case.
    #[must_use]
    pub fn resolve_all(&self, ctx: &RequestContext) -> &[Binding] {
        self.multi
            .get(&ctx.request_type())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of bindings (single and event).
    #[must_use]
    pub fn len(&self) -> usize {
        self.single.len() + self.multi.values().map(Vec::len).sum::<usize>()
    }

    /// Whether the registry holds no bindings at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.values().all(Vec::is_empty)
    }

    /// Number of command/query bindings.
    #[must_use]
    pub fn single_bindings(&self) -> usize {
        self.single.len()
    }

    /// Number of event bindings across all event types.
    #[must_use]
    pub fn event_bindings(&self) -> usize {
        self.multi.values().map(Vec::len).sum()
    }
}
