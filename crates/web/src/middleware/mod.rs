//! Middlewares shipped with the crate.
//!
//! Both are plain [`crate::Handler`]s, register them with
//! [`crate::Engine::use_middleware`] or on a [`crate::RouterGroup`].

mod logger;
mod recovery;

pub use logger::{logger, Logger};
pub use recovery::{recovery, Recovery, BACKTRACE_LIMIT};
