use tracing::{error, info, warn};

use crate::error::{BookingError, BOOKING_FAILED, EMPTY_SELECTION};
use crate::graphql_client::{BookingReply, CinemaApiClient};
use crate::models::{SeatKey, ShowingRef};

/// Фиксация брони после подтверждённой оплаты. Сервер либо занимает все
/// места и выпускает билет, либо отклоняет весь выбор целиком.
///
/// Повторов нет: если ответ потерялся, бронь могла пройти на сервере,
/// и повтор привёл бы к двойному бронированию.
#[derive(Clone)]
pub struct BookingSubmitter {
    api: CinemaApiClient,
}

impl BookingSubmitter {
    pub fn new(api: CinemaApiClient) -> Self {
        Self { api }
    }

    /// Возвращает id выпущенного билета.
    pub async fn submit(
        &self,
        showing: &ShowingRef,
        seats: &[SeatKey],
        user_id: &str,
        duration: i32,
    ) -> Result<String, BookingError> {
        if seats.is_empty() {
            return Err(BookingError::Validation(EMPTY_SELECTION.to_string()));
        }

        match self.api.book_seats(showing, seats, user_id, duration).await {
            Ok(BookingReply::Booked { ticket_id, message }) => {
                info!(
                    ticket_id = %ticket_id,
                    user_id,
                    seats = seats.len(),
                    "Seats booked: {}",
                    message.as_deref().unwrap_or("ok")
                );
                Ok(ticket_id)
            }
            Ok(BookingReply::Rejected { reason }) => {
                warn!(user_id, seats = seats.len(), "Booking rejected: {}", reason);
                Err(BookingError::Rejected(reason))
            }
            Err(e) => {
                error!(user_id, "Booking request failed, outcome unknown: {}", e);
                Err(BookingError::Transport(BOOKING_FAILED.to_string()))
            }
        }
    }
}
