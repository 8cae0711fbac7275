//! workflow.rs
//!
//! Сервисный слой сценария бронирования. Блокировка хранилища держится
//! только на время перехода состояния, удалённые вызовы идут без неё.
//! Если пока шёл запрос оформление удалили (пользователь ушёл со страницы),
//! запрос не отменяется, а его результат отбрасывается.

use std::collections::BTreeSet;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::BookingError;
use crate::format::format_date_time;
use crate::graphql_client::CinemaApiClient;
use crate::models::{SeatKey, SessionUser, ShowingRef, Ticket};
use crate::services::availability::AvailabilityChecker;
use crate::services::booking::BookingSubmitter;
use crate::services::checkout::{
    Checkout, CheckoutView, Confirmation, PaymentSignal, PaymentSummary, Phase,
};
use crate::services::notification::MailNotifier;
use crate::store::{CheckoutStore, InFlightRegistry, Operation};

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationView {
    pub ticket: Ticket,
    /// Места из отправленной брони, а не из ответа сервера
    pub seats: Vec<SeatKey>,
    pub payment_method: String,
    pub reserved_at_label: String,
}

#[derive(Clone)]
pub struct CheckoutService {
    api: CinemaApiClient,
    checker: AvailabilityChecker,
    submitter: BookingSubmitter,
    notifier: MailNotifier,
    store: CheckoutStore,
    in_flight: InFlightRegistry,
}

impl CheckoutService {
    pub fn new(api: CinemaApiClient, notifier: MailNotifier) -> Self {
        Self {
            checker: AvailabilityChecker::new(api.clone()),
            submitter: BookingSubmitter::new(api.clone()),
            api,
            notifier,
            store: CheckoutStore::new(),
            in_flight: InFlightRegistry::default(),
        }
    }

    pub fn store(&self) -> &CheckoutStore {
        &self.store
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Новое оформление: загружаем сеанс с картой мест. Название фильма и
    /// кинотеатра нужны только для сводки, их ошибки не мешают выбору мест.
    pub async fn start(&self, user: &SessionUser, showing: ShowingRef) -> Result<CheckoutView, BookingError> {
        showing.validate()?;

        let (item, movie, cinema) = futures::join!(
            self.api.fetch_schedule_item(&showing),
            self.api.fetch_movie(&showing.movie_id),
            self.api.fetch_cinema(&showing.cinema_id),
        );
        let item = item?;
        let movie = movie
            .map_err(|e| warn!(movie_id = %showing.movie_id, "Movie details unavailable: {}", e))
            .ok();
        let cinema = cinema
            .map_err(|e| warn!(cinema_id = %showing.cinema_id, "Cinema details unavailable: {}", e))
            .ok();

        let checkout = Checkout::new(&user.id, showing, item, movie, cinema);
        let view = checkout.view();
        info!(checkout_id = %checkout.id, user_id = %user.id, "Checkout started");
        self.store.insert(checkout).await;
        Ok(view)
    }

    pub async fn view(&self, user: &SessionUser, id: Uuid) -> Result<CheckoutView, BookingError> {
        self.store.read(id, &user.id, |checkout| Ok(checkout.view())).await
    }

    pub async fn toggle(&self, user: &SessionUser, id: Uuid, seat: SeatKey) -> Result<CheckoutView, BookingError> {
        seat.validate()?;
        self.store
            .update(id, &user.id, |checkout| {
                checkout.toggle(&seat)?;
                Ok(checkout.view())
            })
            .await
    }

    /// Переход к оплате: проверка доступности прямо перед оплатой.
    pub async fn proceed_to_payment(&self, user: &SessionUser, id: Uuid) -> Result<PaymentSummary, BookingError> {
        let guard = self.in_flight.try_acquire(&user.id, Operation::AvailabilityCheck)?;
        let request = self.store.update(id, &user.id, |checkout| checkout.begin_check()).await?;

        // Запрос и переход живут в своей задаче: обрыв соединения клиента
        // не отменяет ни вызов, ни запись результата
        let service = self.clone();
        let user_id = user.id.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let result = service.checker.check(&request.showing, &request.seats).await;
            service
                .store
                .update(id, &user_id, |checkout| checkout.finish_check(request.attempt, result))
                .await
                .map_err(|e| discarded(id, "availability check", e))
        });
        joined(id, task).await
    }

    /// Подтверждённая оплата → бронирование.
    pub async fn confirm_payment(
        &self,
        user: &SessionUser,
        id: Uuid,
        signal: PaymentSignal,
    ) -> Result<Confirmation, BookingError> {
        signal.validate()?;
        let guard = self.in_flight.try_acquire(&user.id, Operation::Booking)?;
        let request = self.store.update(id, &user.id, |checkout| checkout.begin_booking(&signal)).await?;

        info!(checkout_id = %id, method = %request.payment_method, seats = request.seats.len(), "Payment confirmed, booking seats");
        let service = self.clone();
        let user = user.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let result = service
                .submitter
                .submit(&request.showing, &request.seats, &user.id, request.duration)
                .await;

            if let Ok(ticket_id) = &result {
                // Билет уже выпущен, даже если пользователь ушёл со страницы
                service
                    .notifier
                    .spawn_ticket_mail(service.api.clone(), user.email.clone(), ticket_id.clone());
            }

            service
                .store
                .update(id, &user.id, |checkout| checkout.finish_booking(&request, result))
                .await
                .map_err(|e| discarded(id, "booking", e))
        });
        joined(id, task).await
    }

    /// Экран подтверждения: билет плюс ровно те места, что были отправлены.
    pub async fn confirmation(&self, user: &SessionUser, id: Uuid) -> Result<ConfirmationView, BookingError> {
        let confirmation = self
            .store
            .read(id, &user.id, |checkout| match &checkout.phase {
                Phase::Confirmed(confirmation) => Ok(confirmation.clone()),
                other => Err(BookingError::InvalidState(format!(
                    "Checkout is {}, expected confirmed",
                    other.name()
                ))),
            })
            .await?;

        let ticket = self.api.fetch_ticket(&confirmation.ticket_id).await?;
        if !ticket.belongs_to(&user.id) {
            return Err(BookingError::Forbidden("This ticket belongs to another user".to_string()));
        }

        let booked: BTreeSet<_> = confirmation.seats.iter().collect();
        let issued: BTreeSet<_> = ticket.seats.iter().collect();
        if booked != issued {
            warn!(ticket_id = %ticket.id, "Issued ticket seats differ from the submitted selection");
        }

        Ok(ConfirmationView {
            reserved_at_label: format_date_time(&ticket.reserved_at),
            ticket,
            seats: confirmation.seats,
            payment_method: confirmation.payment_method,
        })
    }

    /// Уход со страницы: выбор выбрасывается, запрос в полёте не отменяется.
    pub async fn abandon(&self, user: &SessionUser, id: Uuid) -> Result<(), BookingError> {
        let checkout = self.store.remove(id, &user.id).await?;
        info!(checkout_id = %id, phase = checkout.phase.name(), "Checkout abandoned");
        Ok(())
    }
}

async fn joined<T>(id: Uuid, task: JoinHandle<Result<T, BookingError>>) -> Result<T, BookingError> {
    task.await.unwrap_or_else(|e| {
        error!(checkout_id = %id, "Checkout task failed: {}", e);
        Err(BookingError::Transport("The request could not be completed. Please try again.".to_string()))
    })
}

fn discarded(id: Uuid, what: &str, err: BookingError) -> BookingError {
    if let BookingError::NotFound(_) = err {
        warn!(checkout_id = %id, "Checkout was abandoned, discarding {} result", what);
    }
    err
}
