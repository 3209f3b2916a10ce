use crate::context::Context;
use crate::handler::{Handler, Next};
use async_trait::async_trait;
use std::time::Instant;
use tracing::info;

/// Logs every request before and after the rest of its chain runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

pub fn logger() -> Logger {
    Logger
}

#[async_trait]
impl Handler for Logger {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) {
        let method = ctx.method().clone();
        let path = ctx.path().to_owned();
        let start = Instant::now();

        info!(%method, %path, "request received");
        next.run(ctx).await;
        info!(%method, %path, status = %ctx.response_status(), elapsed = ?start.elapsed(), "request served");
    }
}
