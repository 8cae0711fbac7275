pub mod config;
pub mod controllers;
pub mod error;
pub mod format;
pub mod graphql_client;
pub mod middleware;
pub mod models;
pub mod remote;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::graphql_client::{ApiError, CinemaApiClient};
use crate::services::{notification::MailNotifier, tickets::TicketService, workflow::CheckoutService};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub api: CinemaApiClient,
    pub checkouts: CheckoutService,
    pub tickets: TicketService,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, ApiError> {
        let api = CinemaApiClient::from_config(&config.graphql, &config.circuit_breaker)?;
        let notifier = MailNotifier::new(&config.orders, &config.features)?;

        Ok(Arc::new(Self {
            checkouts: CheckoutService::new(api.clone(), notifier),
            tickets: TicketService::new(api.clone()),
            api,
            config,
        }))
    }
}

/// Полный роутер приложения: служебные маршруты + `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
