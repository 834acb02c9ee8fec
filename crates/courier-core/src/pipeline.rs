//! # Pipeline Behavior Chain
//!
//! Ordered interceptors composed around handler execution.
//!
//! Behaviors wrap the dispatch in registration order: the first registered
//! behavior is the outermost. Each behavior receives the erased
//! [`RequestContext`] and a [`Next`] continuation; it may inspect or
//! reject the request before `next.run()`, short-circuit by returning
//! without running `next`, or post-process the result on the way out.
//! Behaviors are global across all request types; applicability is a
//! runtime predicate inside each behavior.

use crate::registry::HandlerInvoke;
use async_trait::async_trait;
use courier_types::{OperationResult, RequestContext};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A cross-cutting interceptor around handler execution.
#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    /// Handle the dispatch, delegating to the rest of the chain via
    /// `next.run().await`. Returning without running `next` short-circuits
    /// every inner behavior and the handler itself.
    async fn handle(&self, ctx: &RequestContext, next: Next) -> OperationResult;
}

/// The zero-argument continuation invoking the remainder of the chain.
///
/// Consumed by `run`; the innermost continuation invokes the resolved
/// handler exactly once.
pub struct Next {
    behaviors: Arc<[Arc<dyn PipelineBehavior>]>,
    cursor: usize,
    ctx: Arc<RequestContext>,
    terminal: HandlerInvoke,
}

impl Next {
    pub(crate) fn new(
        behaviors: Arc<[Arc<dyn PipelineBehavior>]>,
        ctx: Arc<RequestContext>,
        terminal: HandlerInvoke,
    ) -> Self {
        Self {
            behaviors,
            cursor: 0,
            ctx,
            terminal,
        }
    }

    /// Invoke the remainder of the chain.
    pub fn run(self) -> BoxFuture<'static, OperationResult> {
        Box::pin(async move {
            match self.behaviors.get(self.cursor) {
                Some(behavior) => {
                    let behavior = Arc::clone(behavior);
                    let ctx = Arc::clone(&self.ctx);
                    let next = Self {
                        cursor: self.cursor + 1,
                        ..self
                    };
                    behavior.handle(&ctx, next).await
                }
                None => (self.terminal)(Arc::clone(&self.ctx)).await,
            }
        })
    }
}

/// Logs every dispatch with its correlation id, outcome, and elapsed time.
///
/// Applies to all request kinds.
#[derive(Debug, Default)]
pub struct TracingBehavior;

#[async_trait]
impl PipelineBehavior for TracingBehavior {
    async fn handle(&self, ctx: &RequestContext, next: Next) -> OperationResult {
        let started = Instant::now();
        debug!(
            correlation_id = %ctx.correlation_id(),
            request = ctx.request_name(),
            kind = %ctx.kind(),
            "Dispatch started"
        );

        let result = next.run().await;

        debug!(
            correlation_id = %ctx.correlation_id(),
            request = ctx.request_name(),
            status = %result.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dispatch finished"
        );
        result
    }
}

/// Races the rest of the chain against a deadline.
///
/// A dispatch that exceeds the limit is converted into an internal-error
/// envelope; the core defines no other timeout semantics.
#[derive(Debug)]
pub struct TimeoutBehavior {
    limit: Duration,
}

impl TimeoutBehavior {
    /// Create a behavior enforcing the given per-dispatch deadline.
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl PipelineBehavior for TimeoutBehavior {
    async fn handle(&self, ctx: &RequestContext, next: Next) -> OperationResult {
        match tokio::time::timeout(self.limit, next.run()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    correlation_id = %ctx.correlation_id(),
                    request = ctx.request_name(),
                    limit_ms = self.limit.as_millis() as u64,
                    "Dispatch exceeded deadline"
                );
                OperationResult::internal_error(format!(
                    "dispatch of {} exceeded the {:?} deadline",
                    ctx.request_name(),
                    self.limit
                ))
            }
        }
    }
}
