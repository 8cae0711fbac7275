use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::graphql_client::ApiError;

pub const EMPTY_SELECTION: &str = "Please select at least one seat";
pub const SEATS_UNAVAILABLE: &str =
    "Some of the selected seats are no longer available. Please select other seats.";
pub const CHECK_FAILED: &str =
    "There was an error checking seat availability. Please try again.";
pub const BOOKING_FAILED: &str =
    "We could not confirm your booking. Please check your tickets before trying again.";

/// Ошибки сценария бронирования. Каждая превращается в понятный
/// пользователю ответ, ни одна не роняет обработчик.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BookingError {
    /// Отклонено локально, до любого удалённого вызова
    #[error("{0}")]
    Validation(String),
    /// Часть выбранных мест уже занята
    #[error("{0}")]
    Conflict(String),
    /// Сервер отказал в бронировании, причина от сервера
    #[error("{0}")]
    Rejected(String),
    /// Сеть или ошибка удалённого сервиса
    #[error("{0}")]
    Transport(String),
    #[error("sign in required")]
    Unauthorized { sign_in_url: String },
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Такое же действие уже выполняется
    #[error("{0}")]
    Busy(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("payment was not confirmed")]
    PaymentNotConfirmed,
}

impl BookingError {
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "validation",
            BookingError::Conflict(_) => "conflict",
            BookingError::Rejected(_) => "rejected",
            BookingError::Transport(_) => "transport",
            BookingError::Unauthorized { .. } => "unauthorized",
            BookingError::Forbidden(_) => "forbidden",
            BookingError::NotFound(_) => "not_found",
            BookingError::Busy(_) => "busy",
            BookingError::InvalidState(_) => "invalid_state",
            BookingError::PaymentNotConfirmed => "payment_not_confirmed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Conflict(_) | BookingError::Rejected(_) | BookingError::InvalidState(_) => {
                StatusCode::CONFLICT
            }
            BookingError::Transport(_) => StatusCode::BAD_GATEWAY,
            BookingError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Busy(_) => StatusCode::TOO_MANY_REQUESTS,
            BookingError::PaymentNotConfirmed => StatusCode::PAYMENT_REQUIRED,
        }
    }
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BookingError::Validation(errors.to_string())
    }
}

impl From<ApiError> for BookingError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => BookingError::NotFound(format!("{what} not found")),
            other => {
                error!("Remote call failed: {}", other);
                BookingError::Transport(
                    "The cinema service is unavailable right now. Please try again.".to_string(),
                )
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sign_in_url: Option<String>,
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }

        let sign_in_url = match &self {
            BookingError::Unauthorized { sign_in_url } => Some(sign_in_url.clone()),
            _ => None,
        };
        let body = ErrorBody { error: self.kind(), message: self.to_string(), sign_in_url };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(BookingError::Validation(EMPTY_SELECTION.into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(BookingError::Conflict(SEATS_UNAVAILABLE.into()).status(), StatusCode::CONFLICT);
        assert_eq!(BookingError::Rejected("Seat taken".into()).status(), StatusCode::CONFLICT);
        assert_eq!(BookingError::Transport(CHECK_FAILED.into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            BookingError::Unauthorized { sign_in_url: "/login".into() }.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(BookingError::Busy("busy".into()).status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn rejection_keeps_server_reason_verbatim() {
        assert_eq!(BookingError::Rejected("Seat taken".into()).to_string(), "Seat taken");
    }

    #[test]
    fn api_not_found_stays_not_found() {
        let err: BookingError = ApiError::NotFound("ticket").into();
        assert_eq!(err, BookingError::NotFound("ticket not found".to_string()));
    }
}
