//! Handlers and the chain they run in.
//!
//! A request is served by an ordered list of handlers: the middlewares of
//! every matching group followed by the handlers of the matched route (or the
//! fallback handler). Each handler receives a [`Next`] holding the rest of the
//! list and decides itself whether and when the rest runs, which gives
//! middlewares natural before/after wrapping:
//!
//! ```
//! use nano_web::middleware_fn;
//!
//! let timing = middleware_fn(|ctx, next| {
//!     Box::pin(async move {
//!         let start = std::time::Instant::now();
//!         next.run(ctx).await;
//!         tracing::info!(elapsed = ?start.elapsed(), "request served");
//!     })
//! });
//! # let _ = timing;
//! ```
//!
//! A handler that never calls [`Next::run`] ends the chain.

use crate::context::Context;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut Context, next: Next<'_>);
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// The not yet executed remainder of a handler chain.
///
/// `Next` is consumed by [`Next::run`], so a handler can advance its chain at
/// most once.
pub struct Next<'a> {
    chain: &'a [&'a dyn Handler],
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [&'a dyn Handler]) -> Self {
        Self { chain }
    }

    /// Number of handlers that still wait to run.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }

    /// Runs the next handler, handing it the rest of the chain.
    ///
    /// Does nothing when the chain is exhausted.
    pub async fn run(self, ctx: &mut Context) {
        if let Some((handler, rest)) = self.chain.split_first() {
            handler.call(ctx, Next::new(rest)).await;
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").field("remaining", &self.chain.len()).finish()
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) {
        (**self).call(ctx, next).await;
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) {
        (**self).call(ctx, next).await;
    }
}

/// A terminal handler built from a synchronous closure.
pub struct HandlerFn<F> {
    f: F,
}

/// Creates a terminal handler from a closure, the chain ends after it.
///
/// # Example
/// ```
/// use http::StatusCode;
/// use nano_web::handler_fn;
///
/// let hello = handler_fn(|ctx| {
///     let name = ctx.param("name").unwrap_or("nobody").to_owned();
///     ctx.string(StatusCode::OK, format!("hello {name}"));
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Context) + Send + Sync,
{
    HandlerFn { f }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Context) + Send + Sync,
{
    async fn call(&self, ctx: &mut Context, _next: Next<'_>) {
        (self.f)(ctx);
    }
}

/// A handler built from an async closure that may advance the chain.
pub struct MiddlewareFn<F> {
    f: F,
}

/// Creates a handler from a closure receiving the context and the rest of the
/// chain, see the [module documentation](self) for an example.
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, ()> + Send + Sync,
{
    MiddlewareFn { f }
}

#[async_trait]
impl<F> Handler for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, ()> + Send + Sync,
{
    async fn call(&self, ctx: &mut Context, next: Next<'_>) {
        (self.f)(ctx, next).await;
    }
}

/// Boxes a list of handlers for [`crate::RouterGroup::route`].
///
/// ```
/// use nano_web::{handler_fn, handlers, Handler};
///
/// let chain: Vec<Box<dyn Handler>> = handlers![handler_fn(|_ctx| {}), handler_fn(|_ctx| {})];
/// assert_eq!(chain.len(), 2);
/// ```
#[macro_export]
macro_rules! handlers {
    ($($handler:expr),* $(,)?) => {
        vec![$(Box::new($handler) as Box<dyn $crate::Handler>),*]
    };
}
