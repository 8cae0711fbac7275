#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cinema_booking::config::{
    AppConfig, AuthConfig, CheckoutConfig, CircuitBreakerConfig, Config, FeatureFlags, GraphqlConfig,
    LogFormat, OrdersConfig,
};
use cinema_booking::middleware::SessionClaims;
use cinema_booking::models::{SeatKey, SessionUser, ShowingRef};
use cinema_booking::AppState;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "test-session-secret";
pub const START_TIME: &str = "2024-05-06T18:00:00";

pub fn test_config(server: &MockServer) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "warn".to_string(),
            log_format: LogFormat::Pretty,
        },
        graphql: GraphqlConfig { url: format!("{}/graphql", server.uri()), timeout_seconds: 5 },
        auth: AuthConfig {
            session_secret: SECRET.to_string(),
            sign_in_path: "/api/auth/signin".to_string(),
        },
        orders: OrdersConfig { url: server.uri() },
        circuit_breaker: CircuitBreakerConfig { failure_threshold: 5, timeout_seconds: 60 },
        checkout: CheckoutConfig { ttl_seconds: 900, sweep_interval_seconds: 60, busy_ttl_seconds: 1800 },
        features: FeatureFlags { enable_mail: false },
    }
}

pub fn state(server: &MockServer) -> Arc<AppState> {
    AppState::new(test_config(server)).expect("app state")
}

pub fn user(id: &str) -> SessionUser {
    SessionUser { id: id.to_string(), username: Username().fake(), email: SafeEmail().fake() }
}

pub fn token(user: &SessionUser) -> String {
    let claims = SessionClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).expect("token")
}

pub fn showing() -> ShowingRef {
    ShowingRef {
        cinema_id: "cinema-1".to_string(),
        movie_id: "movie-1".to_string(),
        day: "Monday".to_string(),
        start_time: START_TIME.to_string(),
    }
}

pub fn seat(row: i32, column: i32) -> SeatKey {
    SeatKey::new("Left", row, column)
}

/// Зал из одной секции 2x4; `taken` - занятые места (ряд, колонка).
pub fn schedule_item_body(price: f64, taken: &[(i32, i32)]) -> Value {
    let seats: Vec<Value> = (1..=2)
        .flat_map(|row| (1..=4).map(move |column| (row, column)))
        .map(|(row, column)| {
            json!({
                "seatGroup": "Left",
                "row": row,
                "column": column,
                "isTaken": taken.contains(&(row, column)),
            })
        })
        .collect();

    json!({
        "data": {
            "scheduleItem": {
                "duration": 125,
                "startTime": START_TIME,
                "price": price,
                "seats": [{ "groupName": "Left", "rows": 2, "columns": 4, "seats": seats }]
            }
        }
    })
}

pub fn graphql(operation: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains(operation))
}

pub async fn mount_showing(server: &MockServer, price: f64, taken: &[(i32, i32)]) {
    graphql("GetScheduleItem")
        .respond_with(ResponseTemplate::new(200).set_body_json(schedule_item_body(price, taken)))
        .mount(server)
        .await;
    graphql("GetMovieById")
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "data": { "fetchMovie": { "title": "Dune: Part Two", "description": null } } }),
        ))
        .mount(server)
        .await;
    graphql("FindCinema")
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "data": { "fetchCinema": { "name": "Cineplexx", "location": "Skopje" } } }),
        ))
        .mount(server)
        .await;
}

pub fn availability_body(taken: bool) -> Value {
    json!({ "data": { "checkSeatsAvailability": { "areSeatsTaken": taken } } })
}

pub fn booked_body(ticket_id: &str) -> Value {
    json!({
        "data": {
            "bookSeats": {
                "ticket": { "id": ticket_id },
                "success": true,
                "message": "Seats are booked successfully"
            }
        }
    })
}

pub fn rejected_body(message: &str) -> Value {
    json!({ "data": { "bookSeats": { "ticket": null, "success": false, "message": message } } })
}

pub fn ticket_json(id: &str, user_id: &str, seats: &[SeatKey]) -> Value {
    json!({
        "id": id,
        "user": user_id,
        "movie": { "title": "Dune: Part Two", "description": "Paul joins the Fremen" },
        "cinema": { "name": "Cineplexx", "location": "Skopje" },
        "duration": 125,
        "startTime": START_TIME,
        "seats": seats,
        "reservedAt": "2024-05-01T09:30:00.123456"
    })
}

pub async fn mount_ticket(server: &MockServer, id: &str, user_id: &str, seats: &[SeatKey]) {
    graphql("FetchTicket")
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "data": { "fetchTicket": ticket_json(id, user_id, seats) } }),
        ))
        .mount(server)
        .await;
}

pub fn delayed(body: Value, millis: u64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .set_delay(Duration::from_millis(millis))
}
