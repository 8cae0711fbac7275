use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::BookingError;
use crate::middleware::AuthUser;
use crate::models::{SeatKey, ShowingRef};
use crate::services::checkout::PaymentSignal;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkouts", post(start_checkout))
        .route("/checkouts/{id}", get(get_checkout).delete(abandon_checkout))
        .route("/checkouts/{id}/seats/toggle", post(toggle_seat))
        .route("/checkouts/{id}/proceed", post(proceed_to_payment))
        .route("/checkouts/{id}/payment", post(confirm_payment))
        .route("/checkouts/{id}/confirmation", get(get_confirmation))
}

// POST /api/checkouts
async fn start_checkout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(showing): Json<ShowingRef>,
) -> Result<impl IntoResponse, BookingError> {
    let view = state.checkouts.start(&user, showing).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

// GET /api/checkouts/{id}
async fn get_checkout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkouts.view(&user, id).await?))
}

// POST /api/checkouts/{id}/seats/toggle
async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(seat): Json<SeatKey>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkouts.toggle(&user, id, seat).await?))
}

// POST /api/checkouts/{id}/proceed
async fn proceed_to_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkouts.proceed_to_payment(&user, id).await?))
}

// POST /api/checkouts/{id}/payment
async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(signal): Json<PaymentSignal>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkouts.confirm_payment(&user, id, signal).await?))
}

// GET /api/checkouts/{id}/confirmation
async fn get_confirmation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkouts.confirmation(&user, id).await?))
}

// DELETE /api/checkouts/{id}
async fn abandon_checkout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    state.checkouts.abandon(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
