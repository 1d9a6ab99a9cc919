//! Response envelope: decode a body, then surface any embedded error.
//!
//! # Design
//! The service signals business failures inside otherwise successful
//! bodies, so HTTP status is ignored here and the embedded error field is
//! the only failure signal. Each response type implements `Envelope` for its
//! own field; there is no shared base struct.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{Booking, Event, Profile, PromoCode};

/// A decodable response that may carry a server-reported error.
pub trait Envelope: DeserializeOwned {
    /// The embedded error message, if present and non-empty.
    fn extract_error(&self) -> Option<&str>;

    fn clear_error(&mut self);
}

/// Parse `body` into `T`, then fail with `ApiError::Server` if the value
/// carries an embedded error. The error field is cleared either way.
pub fn decode<T: Envelope>(body: &str) -> Result<T, ApiError> {
    let mut value: T = serde_json::from_str(body).map_err(ApiError::Decode)?;
    let reported = value.extract_error().map(str::to_owned);
    value.clear_error();
    match reported {
        Some(message) => {
            tracing::warn!(%message, "server reported an error");
            Err(ApiError::Server(message))
        }
        None => Ok(value),
    }
}

fn non_empty(error: &Option<String>) -> Option<&str> {
    error.as_deref().filter(|message| !message.is_empty())
}

impl Envelope for Profile {
    fn extract_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

impl Envelope for Event {
    fn extract_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

impl Envelope for PromoCode {
    fn extract_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

impl Envelope for Booking {
    fn extract_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.event.clear_error();
    }
}
