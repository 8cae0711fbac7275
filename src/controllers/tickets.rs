use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::BookingError;
use crate::middleware::AuthUser;
use crate::models::Ticket;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets/{id}", get(get_ticket))
        .route("/users/{id}/tickets", get(get_user_tickets))
}

// GET /api/tickets/{id}
async fn get_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, BookingError> {
    Ok(Json(state.tickets.ticket(&user, &id).await?))
}

// GET /api/users/{id}/tickets
async fn get_user_tickets(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Ticket>>, BookingError> {
    Ok(Json(state.tickets.user_tickets(&user, &user_id).await?))
}
