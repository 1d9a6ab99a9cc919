//! Error types for the FIXR API client.
//!
//! # Design
//! The remote service reports business failures inside 2xx bodies, so
//! `Server` is the variant most callers end up matching on. Every domain
//! operation wraps whatever went wrong in a `Context` layer naming the
//! operation; the helpers on `ApiError` look through those layers.

use thiserror::Error;

use crate::http::HttpMethod;

/// Boxed underlying failure from the HTTP transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A network-level failure: connection refused, timeout, TLS, etc.
#[derive(Debug, Error)]
#[error("error executing request: {0}")]
pub struct TransportError(pub BoxError);

impl TransportError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// A booking precondition that failed before any request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("ticket selection has sold out")]
    SoldOut,

    #[error("ticket selection has expired")]
    Expired,

    #[error("cannot purchase more than the maximum ({max})")]
    MaximumExceeded { max: i64 },
}

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be built, usually because the URL is malformed.
    #[error("error creating {method} request for {url:?}: {reason}")]
    RequestConstruction {
        method: HttpMethod,
        url: String,
        reason: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("payload encoding failed")]
    Encoding(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON for the expected type.
    #[error("JSON decoding failed: {0}")]
    Decode(serde_json::Error),

    /// A well-formed response that carried a non-empty error message.
    #[error("{0}")]
    Server(String),

    #[error(transparent)]
    Validation(#[from] BookingRejection),

    /// An inner error tagged with the operation that produced it.
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub(crate) fn context(self, context: &'static str) -> Self {
        ApiError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// The error with all `Context` layers peeled off.
    pub fn root(&self) -> &ApiError {
        match self {
            ApiError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The message the server embedded in its response, if that is what failed.
    pub fn server_message(&self) -> Option<&str> {
        match self.root() {
            ApiError::Server(message) => Some(message),
            _ => None,
        }
    }

    /// The local booking rejection, if that is what failed.
    pub fn rejection(&self) -> Option<BookingRejection> {
        match self.root() {
            ApiError::Validation(rejection) => Some(*rejection),
            _ => None,
        }
    }
}
