use crate::context::{Context, INTERNAL_SERVER_ERROR_BODY};
use crate::handler::{Handler, Next};
use async_trait::async_trait;
use futures::FutureExt;
use http::StatusCode;
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Maximum number of backtrace bytes logged for a recovered panic.
pub const BACKTRACE_LIMIT: usize = 1024;

/// Turns a panic raised by the rest of the chain into a `500` response.
///
/// Anything the chain wrote before panicking is discarded. Without it a
/// panicking handler tears down the task serving the connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery;

pub fn recovery() -> Recovery {
    Recovery
}

#[async_trait]
impl Handler for Recovery {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) {
        let Err(panic) = AssertUnwindSafe(next.run(ctx)).catch_unwind().await else {
            return;
        };

        let backtrace = Backtrace::force_capture().to_string();
        error!(
            cause = panic_message(&*panic),
            backtrace = truncate(&backtrace, BACKTRACE_LIMIT),
            "[recovered] handler panicked"
        );

        ctx.reset_response();
        ctx.string(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Cuts `text` to at most `limit` bytes on a char boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
