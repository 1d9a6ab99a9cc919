//! Session state and the public FIXR operations.
//!
//! # Design
//! `Client` owns the user's email, the profile returned by login (auth
//! token included) and a `Dispatcher`. Login decodes into a fresh `Profile`
//! and only replaces the stored one on success, so a failed login leaves
//! the session untouched and no error text is ever stored on the client.
//!
//! Operations that change the session take `&mut self`; everything else
//! takes `&self`. Share a client across threads behind a lock.

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ApiError, BookingRejection};
use crate::http::{Transport, UreqTransport};
use crate::key::purchase_key;
use crate::payload::Payload;
use crate::types::{Booking, Event, Profile, PromoCode, StripeUser, Ticket};

/// A FIXR user session.
#[derive(Debug)]
pub struct Client<T = UreqTransport> {
    email: String,
    profile: Profile,
    dispatcher: Dispatcher<T>,
}

impl Client<UreqTransport> {
    /// A client for `email` against the production API.
    pub fn new(email: &str) -> Self {
        Self::with_config(email, ClientConfig::default())
    }

    pub fn with_config(email: &str, config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(email, config, transport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(email: &str, config: ClientConfig, transport: T) -> Self {
        Self {
            email: email.to_string(),
            profile: Profile::default(),
            dispatcher: Dispatcher::new(config, transport),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.profile.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.profile.last_name
    }

    pub fn magic_url(&self) -> &str {
        &self.profile.magic_url
    }

    /// Empty until `logon` succeeds.
    pub fn auth_token(&self) -> &str {
        &self.profile.auth_token
    }

    pub fn stripe_user(&self) -> Option<&StripeUser> {
        self.profile.stripe_user.as_ref()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_logged_in(&self) -> bool {
        !self.profile.auth_token.is_empty()
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Authenticate with email and password, filling in the profile and
    /// auth token on success.
    pub fn logon(&mut self, password: &str) -> Result<(), ApiError> {
        let body = Payload::new()
            .with("email", self.email.as_str())
            .with("password", password)
            .build()?;
        let url = self.dispatcher.config().endpoints.login();
        let profile: Profile = self
            .dispatcher
            .post(&url, body, None)
            .map_err(|err| err.context("error logging on"))?;

        self.profile = profile;
        tracing::info!(email = %self.email, "logged on");
        Ok(())
    }

    /// Re-fetch the logged in user's profile. The auth token is kept unless
    /// the response carries a new one.
    pub fn me(&mut self) -> Result<&Profile, ApiError> {
        let url = self.dispatcher.config().endpoints.me();
        let mut profile: Profile = self
            .dispatcher
            .get(&url, Some(self.profile.auth_token.as_str()))
            .map_err(|err| err.context("error getting profile"))?;

        if profile.auth_token.is_empty() {
            profile.auth_token = std::mem::take(&mut self.profile.auth_token);
        }
        self.profile = profile;
        Ok(&self.profile)
    }

    pub fn event(&self, id: u64) -> Result<Event, ApiError> {
        let url = self.dispatcher.config().endpoints.event(id);
        self.dispatcher
            .get(&url, None)
            .map_err(|err| err.context("error getting event"))
    }

    /// Look up a promotional code for a ticket tier. The result can be
    /// passed to `book`.
    pub fn promo(&self, ticket_id: u64, code: &str) -> Result<PromoCode, ApiError> {
        let url = self.dispatcher.config().endpoints.promo(ticket_id, code);
        self.dispatcher
            .get(&url, Some(self.profile.auth_token.as_str()))
            .map_err(|err| err.context("error getting promo code"))
    }

    /// Book `amount` tickets of one tier, optionally with a promo code.
    ///
    /// Sold out, expired and over-maximum selections are rejected before
    /// anything is sent.
    pub fn book(
        &self,
        ticket: &Ticket,
        amount: u32,
        promo: Option<&PromoCode>,
    ) -> Result<Booking, ApiError> {
        let body = booking_payload(ticket, amount, promo)?.build()?;
        let url = self.dispatcher.config().endpoints.booking();
        self.dispatcher
            .post(&url, body, Some(self.profile.auth_token.as_str()))
            .map_err(|err| err.context("error booking ticket"))
    }
}

/// Check a selection against the ticket's flags and cap.
///
/// `not_yet_valid` is deliberately ignored: it flips when a tier goes on
/// sale, so only the server can answer it at booking time.
pub fn check_booking(ticket: &Ticket, amount: u32) -> Result<(), BookingRejection> {
    let rejection = if ticket.sold_out {
        Some(BookingRejection::SoldOut)
    } else if ticket.expired {
        Some(BookingRejection::Expired)
    } else if i64::from(amount) > ticket.max {
        Some(BookingRejection::MaximumExceeded { max: ticket.max })
    } else {
        None
    };
    match rejection {
        Some(rejection) => {
            tracing::debug!(ticket_id = ticket.id, amount, %rejection, "booking rejected locally");
            Err(rejection)
        }
        None => Ok(()),
    }
}

/// The validated booking body. Paid tickets get a fresh purchase key.
pub fn booking_payload(
    ticket: &Ticket,
    amount: u32,
    promo: Option<&PromoCode>,
) -> Result<Payload, ApiError> {
    check_booking(ticket, amount)?;

    let mut payload = Payload::new()
        .with("ticket_id", ticket.id)
        .with("amount", amount);
    if !ticket.is_free() {
        payload.insert("purchase_key", purchase_key());
    }
    if let Some(promo) = promo {
        payload.insert("promo_code", promo.code.as_str());
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::Value;

    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Replays queued bodies in order and records every request.
    #[derive(Default)]
    struct Scripted {
        bodies: RefCell<VecDeque<&'static str>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn with(bodies: &[&'static str]) -> Self {
            Self {
                bodies: RefCell::new(bodies.iter().copied().collect()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.borrow().clone()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request.clone());
            let body = self.bodies.borrow_mut().pop_front().unwrap_or("{}");
            Ok(HttpResponse {
                status: 200,
                body: body.to_string(),
            })
        }
    }

    fn client(transport: &Scripted) -> Client<&Scripted> {
        let config = ClientConfig::default().with_api_base("http://localhost:3000");
        Client::with_transport("ada@example.com", config, transport)
    }

    fn body_of(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_deref().unwrap()).unwrap()
    }

    fn paid_ticket() -> Ticket {
        Ticket {
            id: 11,
            name: "General".to_string(),
            currency: "GBP".to_string(),
            price: 10.0,
            booking_fee: 1.0,
            max: 4,
            ..Ticket::default()
        }
    }

    const LOGIN_OK: &str = r#"{"first_name":"Ada","last_name":"Lovelace","auth_token":"tok-1",
        "magic_login_url":"https://fixr.co/magic/abc","stripe_user":{"id":"cus_1"}}"#;

    #[test]
    fn logon_populates_session() {
        let transport = Scripted::with(&[LOGIN_OK]);
        let mut client = client(&transport);
        assert!(!client.is_logged_in());

        client.logon("hunter2").unwrap();
        assert_eq!(client.auth_token(), "tok-1");
        assert_eq!(client.first_name(), "Ada");
        assert_eq!(client.last_name(), "Lovelace");
        assert_eq!(client.magic_url(), "https://fixr.co/magic/abc");
        assert_eq!(client.stripe_user().unwrap().0["id"], "cus_1");
        assert!(client.profile().error.is_none());

        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/user/authenticate/with-email");
        assert!(req.header("Authorization").is_none());
        let body = body_of(req);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["password"], "hunter2");
    }

    #[test]
    fn failed_logon_leaves_session_untouched() {
        let transport = Scripted::with(&[r#"{"message":"Invalid email or password"}"#]);
        let mut client = client(&transport);

        let err = client.logon("wrong").unwrap_err();
        assert_eq!(err.to_string(), "error logging on: Invalid email or password");
        assert!(!client.is_logged_in());
        assert_eq!(client.profile(), &Profile::default());
    }

    #[test]
    fn no_residual_error_after_logon() {
        let transport = Scripted::with(&[
            r#"{"message":"Invalid email or password"}"#,
            LOGIN_OK,
            r#"{"id":5,"name":"Launch","tickets":[]}"#,
        ]);
        let mut client = client(&transport);
        assert!(client.logon("wrong").is_err());
        client.logon("hunter2").unwrap();

        let event = client.event(5).unwrap();
        assert_eq!(event.name, "Launch");
    }

    #[test]
    fn event_is_unauthenticated() {
        let transport = Scripted::with(&[LOGIN_OK, r#"{"id":5,"tickets":[{"id":1},{"id":2}]}"#]);
        let mut client = client(&transport);
        client.logon("hunter2").unwrap();

        let event = client.event(5).unwrap();
        assert_eq!(event.tickets.len(), 2);
        let req = &transport.requests()[1];
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/event/5");
        assert!(req.header("Authorization").is_none());
    }

    #[test]
    fn event_error_uses_detail() {
        let transport = Scripted::with(&[r#"{"detail":"Not found."}"#]);
        let err = client(&transport).event(404).unwrap_err();
        assert_eq!(err.to_string(), "error getting event: Not found.");
    }

    #[test]
    fn promo_is_authenticated() {
        let transport =
            Scripted::with(&[LOGIN_OK, r#"{"code":"SAVE10","price":9.0,"remaining":3}"#]);
        let mut client = client(&transport);
        client.logon("hunter2").unwrap();

        let promo = client.promo(11, "SAVE10").unwrap();
        assert_eq!(promo.code, "SAVE10");
        assert_eq!(promo.remaining, 3);
        let req = &transport.requests()[1];
        assert_eq!(req.url, "http://localhost:3000/promo_code/11/SAVE10");
        assert_eq!(req.header("Authorization"), Some("Token tok-1"));
    }

    #[test]
    fn promo_before_logon_sends_empty_token() {
        let transport =
            Scripted::with(&[r#"{"message":"Authentication credentials were not provided."}"#]);
        let err = client(&transport).promo(11, "SAVE10").unwrap_err();
        assert_eq!(
            err.server_message(),
            Some("Authentication credentials were not provided.")
        );
        assert!(err.to_string().starts_with("error getting promo code: "));
        assert_eq!(transport.requests()[0].header("Authorization"), Some("Token "));
    }

    #[test]
    fn sold_out_wins_over_everything() {
        let transport = Scripted::default();
        let ticket = Ticket {
            sold_out: true,
            expired: true,
            ..paid_ticket()
        };
        let err = client(&transport).book(&ticket, 99, None).unwrap_err();
        assert_eq!(err.rejection(), Some(BookingRejection::SoldOut));
        assert!(err.to_string().contains("sold out"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn expired_is_rejected() {
        let transport = Scripted::default();
        let ticket = Ticket {
            expired: true,
            ..paid_ticket()
        };
        let err = client(&transport).book(&ticket, 1, None).unwrap_err();
        assert!(err.to_string().contains("expired"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn over_maximum_is_rejected_without_network() {
        let transport = Scripted::default();
        let ticket = Ticket {
            max: 3,
            ..paid_ticket()
        };
        let err = client(&transport).book(&ticket, 5, None).unwrap_err();
        assert_eq!(err.rejection(), Some(BookingRejection::MaximumExceeded { max: 3 }));
        assert!(err.to_string().contains("(3)"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn not_yet_valid_is_left_to_the_server() {
        let transport = Scripted::with(&[r#"{"message":"Tickets are not on sale yet"}"#]);
        let ticket = Ticket {
            invalid: true,
            ..paid_ticket()
        };
        let err = client(&transport).book(&ticket, 1, None).unwrap_err();
        assert_eq!(err.to_string(), "error booking ticket: Tickets are not on sale yet");
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn free_ticket_has_no_purchase_key() {
        let transport = Scripted::with(&[r#"{"user_full_name":"Ada Lovelace","state":1}"#]);
        let ticket = Ticket {
            price: 0.0,
            booking_fee: 0.0,
            ..paid_ticket()
        };
        let booking = client(&transport).book(&ticket, 2, None).unwrap();
        assert_eq!(booking.name, "Ada Lovelace");

        let req = &transport.requests()[0];
        assert_eq!(req.url, "http://localhost:3000/booking");
        let body = body_of(req);
        assert_eq!(body["ticket_id"], 11);
        assert_eq!(body["amount"], 2);
        assert!(body.get("purchase_key").is_none());
        assert!(body.get("promo_code").is_none());
    }

    #[test]
    fn paid_ticket_gets_a_fresh_key_each_time() {
        let transport = Scripted::with(&[LOGIN_OK, "{}", "{}"]);
        let mut client = client(&transport);
        client.logon("hunter2").unwrap();
        let ticket = paid_ticket();
        client.book(&ticket, 1, None).unwrap();
        client.book(&ticket, 1, None).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].header("Authorization"), Some("Token tok-1"));
        let first = body_of(&requests[1])["purchase_key"].as_str().unwrap().to_string();
        let second = body_of(&requests[2])["purchase_key"].as_str().unwrap().to_string();
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn booking_fee_alone_makes_a_ticket_paid() {
        let ticket = Ticket {
            price: 0.0,
            booking_fee: 0.5,
            ..paid_ticket()
        };
        assert!(booking_payload(&ticket, 1, None).unwrap().contains("purchase_key"));
    }

    #[test]
    fn promo_code_is_forwarded() {
        let transport = Scripted::with(&["{}"]);
        let promo = PromoCode {
            code: "SAVE10".to_string(),
            ..PromoCode::default()
        };
        client(&transport).book(&paid_ticket(), 1, Some(&promo)).unwrap();
        assert_eq!(body_of(&transport.requests()[0])["promo_code"], "SAVE10");
    }

    #[test]
    fn amount_equal_to_max_is_allowed() {
        assert!(check_booking(&paid_ticket(), 4).is_ok());
        assert!(check_booking(&paid_ticket(), 5).is_err());
    }

    #[test]
    fn me_refreshes_profile_and_keeps_token() {
        let transport =
            Scripted::with(&[LOGIN_OK, r#"{"first_name":"Augusta","last_name":"King"}"#]);
        let mut client = client(&transport);
        client.logon("hunter2").unwrap();

        let profile = client.me().unwrap();
        assert_eq!(profile.first_name, "Augusta");
        assert_eq!(client.auth_token(), "tok-1");
        assert!(client.stripe_user().is_none());
        let req = &transport.requests()[1];
        assert_eq!(req.url, "http://localhost:3000/user/me");
        assert_eq!(req.header("Authorization"), Some("Token tok-1"));
    }

    #[test]
    fn failed_me_keeps_existing_profile() {
        let transport = Scripted::with(&[LOGIN_OK, r#"{"message":"Invalid token."}"#]);
        let mut client = client(&transport);
        client.logon("hunter2").unwrap();

        let err = client.me().unwrap_err();
        assert_eq!(err.to_string(), "error getting profile: Invalid token.");
        assert_eq!(client.first_name(), "Ada");
        assert_eq!(client.auth_token(), "tok-1");
    }
}
