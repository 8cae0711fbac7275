pub mod checkouts;
pub mod showings;
pub mod tickets;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(showings::routes())
        .merge(checkouts::routes())
        .merge(tickets::routes())
}
