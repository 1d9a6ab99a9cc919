//! Blocking client for the FIXR ticketing API.
//!
//! # Overview
//! Log a user on, look up events and promo codes, and book tickets. Every
//! call is a single blocking HTTP round-trip through a `Transport`; the
//! default one is backed by `ureq`.
//!
//! # Design
//! - The service reports business errors inside 200 bodies. `envelope`
//!   decodes every response and turns a non-empty embedded error field into
//!   `ApiError::Server`, so callers only ever see fully populated values or
//!   an error.
//! - `dispatch::Dispatcher` owns header policy: user agent, auth token, and
//!   the exact-case `FIXR-*` version headers taken from `ClientConfig`.
//! - Booking preconditions are checked locally before any request, and paid
//!   bookings carry a fresh purchase key.
//!
//! ```no_run
//! use fixr_core::Client;
//!
//! # fn main() -> Result<(), fixr_core::ApiError> {
//! let mut client = Client::new("ada@example.com");
//! client.logon("hunter2")?;
//! let event = client.event(123)?;
//! if let Some(ticket) = event.tickets.first() {
//!     let booking = client.book(ticket, 1, None)?;
//!     println!("booked for {}: {}", booking.name, booking.pdf);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod key;
pub mod payload;
pub mod types;

pub use client::{booking_payload, check_booking, Client};
pub use config::{ClientConfig, Endpoints};
pub use dispatch::Dispatcher;
pub use envelope::Envelope;
pub use error::{ApiError, BookingRejection, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use key::purchase_key;
pub use payload::Payload;
pub use types::{Booking, Event, Profile, PromoCode, StripeUser, Ticket};
