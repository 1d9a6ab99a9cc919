//! Domain DTOs for the FIXR API.
//!
//! # Design
//! Each response type carries its own optional error field under whatever
//! key the service uses for it (`message` for most, `detail` for events).
//! The field is private: it only exists so `envelope::decode` can inspect
//! and clear it, and a value handed back to a caller always has it empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Opaque payment profile attached to a user. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StripeUser(pub Map<String, Value>);

/// User profile as returned by login and `user/me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, rename = "magic_login_url", deserialize_with = "null_as_default")]
    pub magic_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auth_token: String,
    #[serde(default)]
    pub stripe_user: Option<StripeUser>,
    #[serde(default, rename = "message", skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

/// An event and its ticket tiers, in the order the server lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickets: Vec<Ticket>,
    #[serde(default, rename = "detail", skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl Event {
    pub fn ticket(&self, id: u64) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| ticket.id == id)
    }
}

/// A ticket tier snapshot. Flags reflect the moment the event was fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booking_fee: f64,
    #[serde(default, rename = "max_per_user", deserialize_with = "null_as_default")]
    pub max: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sold_out: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expired: bool,
    /// Not yet on sale. Time dependent, so only the server decides on it.
    #[serde(default, rename = "not_yet_valid", deserialize_with = "null_as_default")]
    pub invalid: bool,
}

impl Ticket {
    pub fn total_price(&self) -> f64 {
        self.price + self.booking_fee
    }

    pub fn is_free(&self) -> bool {
        self.total_price() <= 0.0
    }
}

/// A promotional code valid for one ticket tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booking_fee: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, rename = "max_per_user", deserialize_with = "null_as_default")]
    pub max: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remaining: i64,
    #[serde(default, rename = "message", skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

/// The result of a completed booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: Event,
    #[serde(default, rename = "user_full_name", deserialize_with = "null_as_default")]
    pub name: String,
    /// URL or encoded document; not interpreted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pdf: String,
    /// Service-defined state code; not interpreted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: i64,
    #[serde(default, rename = "message", skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}
