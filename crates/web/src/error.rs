use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while registering routes and handlers.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("default handler has been registered")]
    DefaultHandlerExists,
}

/// Errors raised while reading the request body.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("read request body error: {source}")]
    Read {
        #[source]
        source: BoxError,
    },
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("engine must be set")]
    MissingEngine,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("bind server error: {source}")]
    Bind {
        #[source]
        source: io::Error,
    },
}
