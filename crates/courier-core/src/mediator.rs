//! # Mediator
//!
//! The public dispatch façade. An explicit, constructed value owned by the
//! application's composition root - no ambient global state.
//!
//! `execute`/`query` resolve exactly one handler and run it inside the
//! pipeline behavior chain; `publish` fans out to every subscribed event
//! handler sequentially, each inside its own independent chain, with
//! isolated failure domains per handler.
//!
//! The mediator is stateless per call: its only persistent state is the
//! immutable registry and behavior list built once at startup. Concurrent
//! calls share no mutable state and need no locking.

use crate::pipeline::{Next, PipelineBehavior};
use crate::registry::HandlerRegistry;
use courier_types::{Command, Event, OperationResult, Query, RequestContext};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Builder for a [`Mediator`].
///
/// Consumes the finished registry by value: discovery must have run to
/// completion before dispatch can begin.
pub struct MediatorBuilder {
    registry: HandlerRegistry,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
    wrap_event_handlers: bool,
}

impl MediatorBuilder {
    fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            behaviors: Vec::new(),
            wrap_event_handlers: true,
        }
    }

    /// Append a pipeline behavior. First registered = outermost wrapper.
    #[must_use]
    pub fn behavior<B: PipelineBehavior + 'static>(mut self, behavior: B) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    /// Whether `publish` wraps each event handler in the behavior chain
    /// (default) or invokes handlers bare.
    #[must_use]
    pub fn wrap_event_handlers(mut self, enabled: bool) -> Self {
        self.wrap_event_handlers = enabled;
        self
    }

    /// Finalize into an immutable mediator.
    #[must_use]
    pub fn build(self) -> Mediator {
        Mediator {
            registry: Arc::new(self.registry),
            behaviors: self.behaviors.into(),
            wrap_event_handlers: self.wrap_event_handlers,
        }
    }
}

/// Routes requests to their registered handlers through the behavior chain.
#[derive(Clone)]
pub struct Mediator {
    registry: Arc<HandlerRegistry>,
    behaviors: Arc<[Arc<dyn PipelineBehavior>]>,
    wrap_event_handlers: bool,
}

impl Mediator {
    /// Start building a mediator over a finished registry.
    #[must_use]
    pub fn builder(registry: HandlerRegistry) -> MediatorBuilder {
        MediatorBuilder::new(registry)
    }

    /// Dispatch a command to its single registered handler.
    ///
    /// Always returns a well-formed envelope: a missing handler or a panic
    /// escaping the chain is converted into an internal-error envelope,
    /// never surfaced raw.
    pub async fn execute<C: Command>(&self, command: C) -> OperationResult {
        self.dispatch_single(RequestContext::command(command)).await
    }

    /// Dispatch a query to its single registered handler.
    pub async fn query<Q: Query>(&self, query: Q) -> OperationResult {
        self.dispatch_single(RequestContext::query(query)).await
    }

    async fn dispatch_single(&self, ctx: RequestContext) -> OperationResult {
        let ctx = Arc::new(ctx);

        let binding = match self.registry.resolve(&ctx) {
            Ok(binding) => binding,
            Err(e) => {
                warn!(
                    correlation_id = %ctx.correlation_id(),
                    request = ctx.request_name(),
                    "No handler bound for request"
                );
                return OperationResult::internal_error(e.to_string());
            }
        };

        let next = Next::new(
            Arc::clone(&self.behaviors),
            Arc::clone(&ctx),
            binding.invoke(),
        );

        match AssertUnwindSafe(next.run()).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    request = ctx.request_name(),
                    panic = %panic_message(&panic),
                    "Dispatch panicked"
                );
                OperationResult::internal_error(format!(
                    "dispatch of {} panicked: {}",
                    ctx.request_name(),
                    panic_message(&panic)
                ))
            }
        }
    }

    /// Publish an event to every subscribed handler.
    ///
    /// Handlers run in registration order, sequentially, each inside its
    /// own chain. A failing or panicking handler is logged and never stops
    /// its siblings. Zero subscribers is a normal, silent no-op; nothing is
    /// returned to the caller either way.
    pub async fn publish<E: Event>(&self, event: E) {
        let ctx = Arc::new(RequestContext::event(event));
        let bindings = self.registry.resolve_all(&ctx);

        if bindings.is_empty() {
            debug!(
                correlation_id = %ctx.correlation_id(),
                event = ctx.request_name(),
                "Event published with no subscribers"
            );
            return;
        }

        for binding in bindings {
            let invoke = binding.invoke();
            let outcome = if self.wrap_event_handlers {
                let next = Next::new(Arc::clone(&self.behaviors), Arc::clone(&ctx), invoke);
                AssertUnwindSafe(next.run()).catch_unwind().await
            } else {
                AssertUnwindSafe(invoke(Arc::clone(&ctx))).catch_unwind().await
            };

            match outcome {
                Ok(result) if result.is_success() => {
                    debug!(
                        correlation_id = %ctx.correlation_id(),
                        event = ctx.request_name(),
                        handler = binding.handler_name(),
                        "Event handler completed"
                    );
                }
                Ok(result) => {
                    error!(
                        correlation_id = %ctx.correlation_id(),
                        event = ctx.request_name(),
                        handler = binding.handler_name(),
                        status = %result.status(),
                        message = result.message().unwrap_or(""),
                        "Event handler failed"
                    );
                }
                Err(panic) => {
                    error!(
                        correlation_id = %ctx.correlation_id(),
                        event = ctx.request_name(),
                        handler = binding.handler_name(),
                        panic = %panic_message(&panic),
                        "Event handler panicked"
                    );
                }
            }
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
