//! checkout.rs
//!
//! Оформление одного посещения: выбор мест → проверка → оплата →
//! бронирование → подтверждение.
//!
//! Переходы:
//! - `Selecting → Checking` при переходе к оплате (выбор не пуст);
//! - `Checking → Paying` если места свободны;
//! - `Checking → Selecting` если места заняты или проверка не удалась;
//! - `Paying → Booking` только по подтверждённой оплате;
//! - `Booking → Confirmed` при выпуске билета;
//! - `Booking → Selecting` при отказе сервера (выбор не трогаем);
//! - `Booking → Error` при сбое транспорта. Исход неизвестен, состояние конечное.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{BookingError, EMPTY_SELECTION, SEATS_UNAVAILABLE};
use crate::format::{format_duration, format_start_time};
use crate::models::{CinemaInfo, Money, MovieInfo, ScheduleItem, SeatKey, ShowingRef};
use crate::remote::Remote;
use crate::services::selection::{SeatGroupView, SeatSelector, Toggle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub checkout_id: Uuid,
    pub movie_title: Option<String>,
    pub cinema_name: Option<String>,
    pub cinema_location: Option<String>,
    pub day: String,
    pub start_time: String,
    pub start_time_label: String,
    pub duration: i32,
    pub duration_label: String,
    pub seats: Vec<SeatKey>,
    pub price_per_seat: Money,
    pub total_price: Money,
    pub selection_digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub ticket_id: String,
    pub payment_method: String,
    pub seats: Vec<SeatKey>,
    /// Куда браузеру перейти после брони
    pub redirect: String,
}

/// Сигнал от платёжного провайдера (capture в PayPal) или кнопки "оплатить".
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSignal {
    pub confirmed: bool,
    #[validate(length(min = 1, max = 32, message = "payment method is required"))]
    pub method: String,
    #[serde(default)]
    pub selection_digest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Selecting,
    Checking,
    Paying(PaymentSummary),
    Booking,
    Confirmed(Confirmation),
    Error,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Selecting => "selecting",
            Phase::Checking => "checking",
            Phase::Paying(_) => "paying",
            Phase::Booking => "booking",
            Phase::Confirmed(_) => "confirmed",
            Phase::Error => "error",
        }
    }
}

/// Что нужно для удалённого вызова, снятое под блокировкой.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub attempt: u64,
    pub showing: ShowingRef,
    pub seats: Vec<SeatKey>,
    pub duration: i32,
    pub payment_method: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub id: Uuid,
    pub user_id: String,
    pub showing: ShowingRef,
    pub duration: i32,
    pub movie: Option<MovieInfo>,
    pub cinema: Option<CinemaInfo>,
    pub selector: SeatSelector,
    pub phase: Phase,
    pub availability: Option<Remote<bool>>,
    pub booking: Option<Remote<String>>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    attempt: u64,
    last_activity: Instant,
}

impl Checkout {
    /// `showing.start_time` заменяется на время из ответа сервера, дальше
    /// проверка и бронь идут с ним.
    pub fn new(
        user_id: &str,
        showing: ShowingRef,
        item: ScheduleItem,
        movie: Option<MovieInfo>,
        cinema: Option<CinemaInfo>,
    ) -> Self {
        let showing = ShowingRef { start_time: item.start_time.clone(), ..showing };
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            showing,
            duration: item.duration,
            movie,
            cinema,
            selector: SeatSelector::new(item.price, item.seat_groups),
            phase: Phase::Selecting,
            availability: None,
            booking: None,
            message: None,
            created_at: Utc::now(),
            attempt: 0,
            last_activity: Instant::now(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Checking | Phase::Booking)
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn invalid_state(&self, expected: &'static str) -> BookingError {
        BookingError::InvalidState(format!(
            "Checkout is {}, expected {}",
            self.phase.name(),
            expected
        ))
    }

    fn require(&self, expected: &'static str, ok: bool) -> Result<(), BookingError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid_state(expected))
        }
    }

    pub fn toggle(&mut self, key: &SeatKey) -> Result<Toggle, BookingError> {
        self.require("selecting", self.phase == Phase::Selecting)?;
        self.touch();
        let outcome = self.selector.toggle(key)?;
        self.message = None;
        Ok(outcome)
    }

    pub fn begin_check(&mut self) -> Result<RemoteRequest, BookingError> {
        self.require("selecting", self.phase == Phase::Selecting)?;
        self.touch();
        if self.selector.is_empty() {
            self.message = Some(EMPTY_SELECTION.to_string());
            return Err(BookingError::Validation(EMPTY_SELECTION.to_string()));
        }

        self.attempt += 1;
        self.phase = Phase::Checking;
        self.availability = Some(Remote::Pending);
        self.message = None;
        Ok(self.remote_request(String::new()))
    }

    pub fn finish_check(
        &mut self,
        attempt: u64,
        result: Result<bool, BookingError>,
    ) -> Result<PaymentSummary, BookingError> {
        self.require("checking", self.phase == Phase::Checking && attempt == self.attempt)?;
        self.touch();

        match result {
            Ok(false) => {
                let summary = self.payment_summary();
                self.availability = Some(Remote::Success(false));
                self.phase = Phase::Paying(summary.clone());
                info!(checkout_id = %self.id, total = %summary.total_price, "Checkout moved to payment");
                Ok(summary)
            }
            Ok(true) => {
                // Выбор не сбрасываем, пользователь снимет места сам
                self.availability = Some(Remote::Success(true));
                self.phase = Phase::Selecting;
                self.message = Some(SEATS_UNAVAILABLE.to_string());
                warn!(checkout_id = %self.id, "Selected seats are no longer available");
                Err(BookingError::Conflict(SEATS_UNAVAILABLE.to_string()))
            }
            Err(e) => {
                self.availability = Some(Remote::Failure(e.to_string()));
                self.phase = Phase::Selecting;
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn begin_booking(&mut self, signal: &PaymentSignal) -> Result<RemoteRequest, BookingError> {
        let digest = match &self.phase {
            Phase::Paying(summary) => summary.selection_digest.clone(),
            _ => return Err(self.invalid_state("paying")),
        };
        self.touch();

        if let Some(expected) = &signal.selection_digest {
            if *expected != digest {
                return Err(BookingError::InvalidState(
                    "The paid selection does not match the checkout".to_string(),
                ));
            }
        }
        if !signal.confirmed {
            warn!(checkout_id = %self.id, method = %signal.method, "Payment was not confirmed");
            return Err(BookingError::PaymentNotConfirmed);
        }

        self.attempt += 1;
        self.phase = Phase::Booking;
        self.booking = Some(Remote::Pending);
        self.message = None;
        Ok(self.remote_request(signal.method.clone()))
    }

    pub fn finish_booking(
        &mut self,
        request: &RemoteRequest,
        result: Result<String, BookingError>,
    ) -> Result<Confirmation, BookingError> {
        self.require("booking", self.phase == Phase::Booking && request.attempt == self.attempt)?;
        self.touch();

        match result {
            Ok(ticket_id) => {
                let confirmation = Confirmation {
                    redirect: success_redirect(&ticket_id, &request.payment_method),
                    ticket_id: ticket_id.clone(),
                    payment_method: request.payment_method.clone(),
                    seats: request.seats.clone(),
                };
                self.booking = Some(Remote::Success(ticket_id));
                self.phase = Phase::Confirmed(confirmation.clone());
                Ok(confirmation)
            }
            Err(BookingError::Rejected(reason)) => {
                self.booking = Some(Remote::Failure(reason.clone()));
                self.phase = Phase::Selecting;
                self.message = Some(reason.clone());
                Err(BookingError::Rejected(reason))
            }
            Err(e) => {
                self.booking = Some(Remote::Failure(e.to_string()));
                self.phase = Phase::Error;
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn remote_request(&self, payment_method: String) -> RemoteRequest {
        RemoteRequest {
            attempt: self.attempt,
            showing: self.showing.clone(),
            seats: self.selector.selected(),
            duration: self.duration,
            payment_method,
        }
    }

    fn payment_summary(&self) -> PaymentSummary {
        PaymentSummary {
            checkout_id: self.id,
            movie_title: self.movie.as_ref().map(|m| m.title.clone()),
            cinema_name: self.cinema.as_ref().map(|c| c.name.clone()),
            cinema_location: self.cinema.as_ref().and_then(|c| c.location.clone()),
            day: self.showing.day.clone(),
            start_time: self.showing.start_time.clone(),
            start_time_label: format_start_time(&self.showing.start_time),
            duration: self.duration,
            duration_label: format_duration(self.duration),
            seats: self.selector.selected(),
            price_per_seat: self.selector.price(),
            total_price: self.selector.total(),
            selection_digest: self.selector.fingerprint(),
        }
    }

    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            id: self.id,
            phase: self.phase.name(),
            created_at: self.created_at,
            showing: self.showing.clone(),
            movie_title: self.movie.as_ref().map(|m| m.title.clone()),
            cinema_name: self.cinema.as_ref().map(|c| c.name.clone()),
            duration_label: format_duration(self.duration),
            start_time_label: format_start_time(&self.showing.start_time),
            price_per_seat: self.selector.price(),
            total_price: self.selector.total(),
            selected_seats: self.selector.selected(),
            seat_groups: self.selector.view(),
            availability: self.availability.clone(),
            booking: self.booking.clone(),
            message: self.message.clone(),
            payment: match &self.phase {
                Phase::Paying(summary) => Some(summary.clone()),
                _ => None,
            },
            confirmation: match &self.phase {
                Phase::Confirmed(confirmation) => Some(confirmation.clone()),
                _ => None,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessQuery<'a> {
    id: &'a str,
    payment_method: &'a str,
}

pub fn success_redirect(ticket_id: &str, payment_method: &str) -> String {
    let query = serde_urlencoded::to_string(SuccessQuery { id: ticket_id, payment_method })
        .unwrap_or_default();
    format!("/success?{query}")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub id: Uuid,
    pub phase: &'static str,
    pub created_at: DateTime<Utc>,
    pub showing: ShowingRef,
    pub movie_title: Option<String>,
    pub cinema_name: Option<String>,
    pub duration_label: String,
    pub start_time_label: String,
    pub price_per_seat: Money,
    pub total_price: Money,
    pub selected_seats: Vec<SeatKey>,
    pub seat_groups: Vec<SeatGroupView>,
    pub availability: Option<Remote<bool>>,
    pub booking: Option<Remote<String>>,
    pub message: Option<String>,
    pub payment: Option<PaymentSummary>,
    pub confirmation: Option<Confirmation>,
}
