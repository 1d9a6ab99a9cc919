use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter2";
pub const EVENT_ID: u64 = 100;
pub const FREE_TICKET: u64 = 1;
pub const PAID_TICKET: u64 = 2;
pub const SOLD_OUT_TICKET: u64 = 3;
pub const UPCOMING_TICKET: u64 = 4;
pub const PROMO_CODE: &str = "SAVE10";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub currency: String,
    pub price: f64,
    pub booking_fee: f64,
    pub max_per_user: u32,
    pub sold_out: bool,
    pub expired: bool,
    pub not_yet_valid: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub name: String,
    pub tickets: Vec<Ticket>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Promo {
    pub code: String,
    pub price: f64,
    pub booking_fee: f64,
    pub currency: String,
    pub max_per_user: u32,
    pub remaining: u32,
}

#[derive(Clone, Debug)]
struct User {
    password: String,
    first_name: String,
    last_name: String,
    token: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

/// A booking request as received, kept so tests can inspect what was sent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub ticket_id: u64,
    pub amount: u32,
    pub purchase_key: Option<String>,
    pub promo_code: Option<String>,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    events: HashMap<u64, Event>,
    promos: HashMap<(u64, String), Promo>,
    purchase_keys: HashSet<String>,
    bookings: Vec<BookingRequest>,
}

impl Store {
    /// One user, one event with a free, a paid, a sold out and a not yet
    /// on sale tier, and one promo code on the paid tier.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.users.insert(
            EMAIL.to_string(),
            User {
                password: PASSWORD.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                token: Uuid::new_v4().simple().to_string(),
            },
        );

        let tier = |id: u64, name: &str, price: f64, booking_fee: f64| Ticket {
            id,
            name: name.to_string(),
            kind: 0,
            currency: "GBP".to_string(),
            price,
            booking_fee,
            max_per_user: 4,
            sold_out: false,
            expired: false,
            not_yet_valid: false,
        };
        store.events.insert(
            EVENT_ID,
            Event {
                id: EVENT_ID,
                name: "Launch Night".to_string(),
                tickets: vec![
                    tier(FREE_TICKET, "Free entry", 0.0, 0.0),
                    tier(PAID_TICKET, "General admission", 10.0, 1.0),
                    Ticket {
                        sold_out: true,
                        ..tier(SOLD_OUT_TICKET, "Early bird", 5.0, 0.5)
                    },
                    Ticket {
                        not_yet_valid: true,
                        ..tier(UPCOMING_TICKET, "Final release", 15.0, 1.5)
                    },
                ],
            },
        );

        store.promos.insert(
            (PAID_TICKET, PROMO_CODE.to_string()),
            Promo {
                code: PROMO_CODE.to_string(),
                price: 9.0,
                booking_fee: 1.0,
                currency: "GBP".to_string(),
                max_per_user: 2,
                remaining: 25,
            },
        );
        store
    }

    fn user_by_token(&self, token: &str) -> Option<&User> {
        self.users.values().find(|user| user.token == token)
    }

    fn ticket(&self, id: u64) -> Option<(&Event, &Ticket)> {
        self.events
            .values()
            .find_map(|event| event.tickets.iter().find(|t| t.id == id).map(|t| (event, t)))
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/user/authenticate/with-email", post(login))
        .route("/user/me", get(me))
        .route("/event/{id}", get(get_event))
        .route("/promo_code/{ticket_id}/{code}", get(get_promo))
        .route("/booking", post(book).get(list_bookings))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Business errors come back in the body, mostly with a 200 status.
fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn not_authenticated() -> Response {
    message(
        StatusCode::OK,
        "Authentication credentials were not provided.",
    )
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Token ")
}

fn profile_json(user: &User) -> serde_json::Value {
    json!({
        "first_name": user.first_name,
        "last_name": user.last_name,
        "auth_token": user.token,
        "magic_login_url": format!("https://fixr.co/magic/{}", user.token),
        "stripe_user": { "id": "cus_mock", "cards": [] },
    })
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Response {
    let store = db.read().await;
    match store.users.get(&input.email) {
        Some(user) if user.password == input.password => Json(profile_json(user)).into_response(),
        _ => message(StatusCode::BAD_REQUEST, "Invalid email or password"),
    }
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    match bearer(&headers).and_then(|token| store.user_by_token(token)) {
        Some(user) => {
            let mut body = profile_json(user);
            // `user/me` does not hand the token back.
            body["auth_token"] = json!("");
            Json(body).into_response()
        }
        None => not_authenticated(),
    }
}

async fn get_event(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.events.get(&id) {
        Some(event) => Json(event.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

async fn get_promo(
    State(db): State<Db>,
    Path((ticket_id, code)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    let store = db.read().await;
    if bearer(&headers).and_then(|token| store.user_by_token(token)).is_none() {
        return not_authenticated();
    }
    match store.promos.get(&(ticket_id, code)) {
        Some(promo) => Json(promo.clone()).into_response(),
        None => message(StatusCode::OK, "Promo code not found"),
    }
}

async fn book(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<BookingRequest>,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = bearer(&headers)
        .and_then(|token| store.user_by_token(token))
        .cloned()
    else {
        return not_authenticated();
    };
    let Some((event, ticket)) = store.ticket(input.ticket_id) else {
        return message(StatusCode::OK, "Ticket not found");
    };
    let (event, ticket) = (event.clone(), ticket.clone());

    if ticket.not_yet_valid {
        return message(StatusCode::OK, "Tickets are not on sale yet");
    }
    if ticket.sold_out {
        return message(StatusCode::OK, "Ticket selection has sold out");
    }
    if input.amount > ticket.max_per_user {
        return message(StatusCode::OK, "Maximum tickets per user exceeded");
    }
    if let Some(code) = &input.promo_code {
        if !store.promos.contains_key(&(ticket.id, code.clone())) {
            return message(StatusCode::OK, "Promo code not found");
        }
    }
    if ticket.price + ticket.booking_fee > 0.0 {
        match &input.purchase_key {
            None => return message(StatusCode::OK, "A purchase key is required"),
            Some(key) if !store.purchase_keys.insert(key.clone()) => {
                return message(StatusCode::OK, "Duplicate purchase attempt")
            }
            Some(_) => {}
        }
    }

    tracing::info!(ticket_id = ticket.id, amount = input.amount, "booking recorded");
    store.bookings.push(input);
    Json(json!({
        "event": event,
        "user_full_name": format!("{} {}", user.first_name, user.last_name),
        "pdf": format!("https://fixr.co/pdf/{}", Uuid::new_v4()),
        "state": 1,
    }))
    .into_response()
}

async fn list_bookings(State(db): State<Db>) -> Json<Vec<BookingRequest>> {
    Json(db.read().await.bookings.clone())
}
