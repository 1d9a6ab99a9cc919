//! Purchase keys for paid bookings.
//!
//! The booking endpoint uses the key to tell purchase attempts apart, so a
//! key must never repeat. Each one is a random (v4) UUID drawn from the OS
//! CSPRNG, rendered as 32 lowercase hex characters.

use uuid::Uuid;

pub const PURCHASE_KEY_LEN: usize = 32;

pub fn purchase_key() -> String {
    Uuid::new_v4().simple().to_string()
}
