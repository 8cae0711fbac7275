use tracing::{info, warn};

use crate::error::{BookingError, CHECK_FAILED, EMPTY_SELECTION};
use crate::graphql_client::CinemaApiClient;
use crate::models::{SeatKey, ShowingRef};

/// Проверка "прямо перед оплатой", что выбранные места ещё свободны.
/// Ничего не блокирует: между проверкой и бронированием места могут
/// занять, решает результат `bookSeats`.
#[derive(Clone)]
pub struct AvailabilityChecker {
    api: CinemaApiClient,
}

impl AvailabilityChecker {
    pub fn new(api: CinemaApiClient) -> Self {
        Self { api }
    }

    /// `Ok(true)`, если хотя бы одно место уже занято.
    pub async fn check(&self, showing: &ShowingRef, seats: &[SeatKey]) -> Result<bool, BookingError> {
        if seats.is_empty() {
            return Err(BookingError::Validation(EMPTY_SELECTION.to_string()));
        }

        match self.api.check_seats_availability(showing, seats).await {
            Ok(any_taken) => {
                info!(
                    cinema_id = %showing.cinema_id,
                    movie_id = %showing.movie_id,
                    seats = seats.len(),
                    any_taken,
                    "Seat availability checked"
                );
                Ok(any_taken)
            }
            Err(e) => {
                warn!("Seat availability check failed: {}", e);
                Err(BookingError::Transport(CHECK_FAILED.to_string()))
            }
        }
    }
}
