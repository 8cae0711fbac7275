//! Клиент удалённого GraphQL API кинотеатров.
//!
//! Все операции с местами и билетами выполняются сервером. Отсюда мы
//! только читаем сеансы и билеты и вызываем две мутации:
//! `checkSeatsAvailability` (чтение) и `bookSeats` (единственная запись).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::{CircuitBreakerConfig, GraphqlConfig};
use crate::models::{CinemaInfo, MovieInfo, ScheduleDay, ScheduleItem, SeatKey, ShowingRef, Ticket};
use crate::services::circuit_breaker::CircuitBreaker;

const SCHEDULE_ITEM_QUERY: &str = r#"
query GetScheduleItem($cinemaId: String!, $movieId: String!, $day: String!, $startTime: String!) {
    scheduleItem(cinemaId: $cinemaId, movieId: $movieId, day: $day, startTime: $startTime) {
        duration
        startTime
        price
        seats {
            groupName
            rows
            columns
            seats { seatGroup row column isTaken }
        }
    }
}
"#;

const CINEMA_SCHEDULE_QUERY: &str = r#"
query GetCinemaSchedule($cinemaId: String!) {
    schedules(cinemaId: $cinemaId) {
        scheduleDays {
            day
            scheduleItems { movieId startTime duration price }
        }
    }
}
"#;

const CHECK_SEATS_MUTATION: &str = r#"
mutation CheckSeatsAvailability($cinemaId: String!, $movieId: String!, $scheduleDay: String!, $startTime: String!, $seats: [SeatInputType!]!) {
    checkSeatsAvailability(cinemaId: $cinemaId, movieId: $movieId, scheduleDay: $scheduleDay, startTime: $startTime, seats: $seats) {
        areSeatsTaken
    }
}
"#;

const BOOK_SEATS_MUTATION: &str = r#"
mutation BookSeats($cinemaId: String!, $movieId: String!, $seats: [SeatInputType!]!, $startTime: String!, $scheduleDay: String!, $userId: String!, $duration: Int!) {
    bookSeats(cinemaId: $cinemaId, movieId: $movieId, seats: $seats, scheduleDay: $scheduleDay, startTime: $startTime, userId: $userId, duration: $duration) {
        ticket { id }
        success
        message
    }
}
"#;

const FETCH_TICKET_QUERY: &str = r#"
query FetchTicket($id: String!) {
    fetchTicket(id: $id) {
        id
        user
        movie { title description }
        cinema { name location }
        duration
        startTime
        seats { seatGroup row column }
        reservedAt
    }
}
"#;

const TICKETS_BY_USER_QUERY: &str = r#"
query FetchUserTickets($userId: String!) {
    ticketsByUser(userId: $userId) {
        id
        user
        movie { title description }
        cinema { name location }
        duration
        startTime
        seats { seatGroup row column }
        reservedAt
    }
}
"#;

const FETCH_MOVIE_QUERY: &str = r#"
query GetMovieById($id: String!) {
    fetchMovie(movieId: $id) { title description }
}
"#;

const FETCH_CINEMA_QUERY: &str = r#"
query FindCinema($cinemaId: String!) {
    fetchCinema(cinemaId: $cinemaId) { name location }
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Circuit breaker is open - cinema API temporarily unavailable")]
    CircuitOpen,
    #[error("Cinema API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cinema API returned status {0}")]
    Status(u16),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("Cinema API response is missing {0}")]
    MissingData(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApiError {
    /// Сбой транспорта, который учитывает Circuit Breaker.
    /// Ошибки уровня GraphQL означают, что сервер жив.
    fn is_transport(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// Результат мутации `bookSeats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingReply {
    Booked { ticket_id: String, message: Option<String> },
    Rejected { reason: String },
}

// --- Модели запросов и ответов GraphQL ---

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleItemVariables<'a> {
    cinema_id: &'a str,
    movie_id: &'a str,
    day: &'a str,
    start_time: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatsVariables<'a> {
    cinema_id: &'a str,
    movie_id: &'a str,
    schedule_day: &'a str,
    start_time: &'a str,
    seats: &'a [SeatKey],
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i32>,
}

#[derive(Serialize)]
struct IdVariables<'a> {
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserVariables<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CinemaVariables<'a> {
    cinema_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleItemData {
    schedule_item: Option<ScheduleItem>,
}

#[derive(Deserialize)]
struct SchedulesData {
    #[serde(default)]
    schedules: Option<Vec<CinemaSchedule>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CinemaSchedule {
    #[serde(default)]
    schedule_days: Vec<ScheduleDay>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckSeatsData {
    check_seats_availability: Option<CheckSeatsPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckSeatsPayload {
    are_seats_taken: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookSeatsData {
    book_seats: Option<BookSeatsPayload>,
}

#[derive(Deserialize)]
struct BookSeatsPayload {
    ticket: Option<TicketRef>,
    success: Option<bool>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct TicketRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchTicketData {
    fetch_ticket: Option<Ticket>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketsByUserData {
    #[serde(default)]
    tickets_by_user: Option<Vec<Ticket>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchMovieData {
    fetch_movie: Option<MovieInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchCinemaData {
    fetch_cinema: Option<CinemaInfo>,
}

/// Клиент API кинотеатров. Все сетевые вызовы проходят через `CircuitBreaker`.
#[derive(Clone)]
pub struct CinemaApiClient {
    endpoint: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl CinemaApiClient {
    pub fn from_config(
        graphql: &GraphqlConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(graphql.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            endpoint: graphql.url.clone(),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                breaker.timeout_seconds,
            )),
        })
    }

    /// Выполняет операцию, пропуская её через Circuit Breaker.
    async fn execute_with_circuit_breaker<F, T>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking cinema API request");
            return Err(ApiError::CircuitOpen);
        }

        match operation.await {
            Ok(result) => {
                self.circuit_breaker.record_success();
                Ok(result)
            }
            Err(e) if e.is_transport() => {
                error!("Cinema API request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn execute<V, D>(&self, operation_name: &'static str, query: &str, variables: V) -> Result<D, ApiError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        debug!(operation = operation_name, "Sending GraphQL request");

        let request = GraphqlRequest { query, variables };
        let operation = async {
            let response = self.http_client.post(&self.endpoint).json(&request).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Status(status.as_u16()));
            }
            let body = response.json::<GraphqlResponse<D>>().await?;
            Ok(body)
        };

        let body = self.execute_with_circuit_breaker(operation).await?;

        if !body.errors.is_empty() {
            let message = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            if message.to_lowercase().contains("not found") {
                return Err(ApiError::NotFound(operation_name));
            }
            return Err(ApiError::GraphQl(message));
        }

        body.data.ok_or(ApiError::MissingData("data"))
    }

    /// Все дни расписания кинотеатра. Нет расписания - пустой список.
    pub async fn fetch_schedules(&self, cinema_id: &str) -> Result<Vec<ScheduleDay>, ApiError> {
        let data: SchedulesData = self
            .execute("schedules", CINEMA_SCHEDULE_QUERY, CinemaVariables { cinema_id })
            .await?;
        Ok(data
            .schedules
            .unwrap_or_default()
            .into_iter()
            .flat_map(|schedule| schedule.schedule_days)
            .collect())
    }

    pub async fn fetch_schedule_item(&self, showing: &ShowingRef) -> Result<ScheduleItem, ApiError> {
        let variables = ScheduleItemVariables {
            cinema_id: &showing.cinema_id,
            movie_id: &showing.movie_id,
            day: &showing.day,
            start_time: &showing.start_time,
        };
        let data: ScheduleItemData = self.execute("showing", SCHEDULE_ITEM_QUERY, variables).await?;
        data.schedule_item.ok_or(ApiError::NotFound("showing"))
    }

    /// `true`, если хотя бы одно из мест уже занято. Места не блокируются.
    pub async fn check_seats_availability(
        &self,
        showing: &ShowingRef,
        seats: &[SeatKey],
    ) -> Result<bool, ApiError> {
        let variables = SeatsVariables {
            cinema_id: &showing.cinema_id,
            movie_id: &showing.movie_id,
            schedule_day: &showing.day,
            start_time: &showing.start_time,
            seats,
            user_id: None,
            duration: None,
        };
        let data: CheckSeatsData = self
            .execute("checkSeatsAvailability", CHECK_SEATS_MUTATION, variables)
            .await?;

        data.check_seats_availability
            .and_then(|payload| payload.are_seats_taken)
            .ok_or(ApiError::MissingData("areSeatsTaken"))
    }

    pub async fn book_seats(
        &self,
        showing: &ShowingRef,
        seats: &[SeatKey],
        user_id: &str,
        duration: i32,
    ) -> Result<BookingReply, ApiError> {
        let variables = SeatsVariables {
            cinema_id: &showing.cinema_id,
            movie_id: &showing.movie_id,
            schedule_day: &showing.day,
            start_time: &showing.start_time,
            seats,
            user_id: Some(user_id),
            duration: Some(duration),
        };
        let data: BookSeatsData = self.execute("bookSeats", BOOK_SEATS_MUTATION, variables).await?;
        let payload = data.book_seats.ok_or(ApiError::MissingData("bookSeats"))?;

        match (payload.success, payload.ticket) {
            (Some(true), Some(ticket)) => Ok(BookingReply::Booked {
                ticket_id: ticket.id,
                message: payload.message,
            }),
            // Успех без билета: исход неизвестен, повторять нельзя
            (Some(true), None) => Err(ApiError::MissingData("ticket")),
            _ => Ok(BookingReply::Rejected {
                reason: payload
                    .message
                    .unwrap_or_else(|| "The seats could not be booked".to_string()),
            }),
        }
    }

    pub async fn fetch_ticket(&self, id: &str) -> Result<Ticket, ApiError> {
        let data: FetchTicketData = self
            .execute("ticket", FETCH_TICKET_QUERY, IdVariables { id })
            .await?;
        data.fetch_ticket.ok_or(ApiError::NotFound("ticket"))
    }

    pub async fn tickets_by_user(&self, user_id: &str) -> Result<Vec<Ticket>, ApiError> {
        let data: TicketsByUserData = self
            .execute("tickets", TICKETS_BY_USER_QUERY, UserVariables { user_id })
            .await?;
        Ok(data.tickets_by_user.unwrap_or_default())
    }

    pub async fn fetch_movie(&self, movie_id: &str) -> Result<MovieInfo, ApiError> {
        let data: FetchMovieData = self
            .execute("movie", FETCH_MOVIE_QUERY, IdVariables { id: movie_id })
            .await?;
        data.fetch_movie.ok_or(ApiError::NotFound("movie"))
    }

    pub async fn fetch_cinema(&self, cinema_id: &str) -> Result<CinemaInfo, ApiError> {
        let data: FetchCinemaData = self
            .execute("cinema", FETCH_CINEMA_QUERY, CinemaVariables { cinema_id })
            .await?;
        data.fetch_cinema.ok_or(ApiError::NotFound("cinema"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_variables_use_graphql_names() {
        let seats = vec![SeatKey::new("A", 1, 2)];
        let variables = SeatsVariables {
            cinema_id: "c1",
            movie_id: "m1",
            schedule_day: "Monday",
            start_time: "2024-05-06T18:00:00",
            seats: &seats,
            user_id: Some("u1"),
            duration: Some(120),
        };
        let json = serde_json::to_value(&variables).unwrap();
        assert_eq!(json["scheduleDay"], "Monday");
        assert_eq!(json["seats"][0]["seatGroup"], "A");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["duration"], 120);
    }

    #[test]
    fn availability_variables_omit_booking_fields() {
        let variables = SeatsVariables {
            cinema_id: "c1",
            movie_id: "m1",
            schedule_day: "Monday",
            start_time: "2024-05-06T18:00:00",
            seats: &[],
            user_id: None,
            duration: None,
        };
        let json = serde_json::to_value(&variables).unwrap();
        assert!(json.get("userId").is_none());
        assert!(json.get("duration").is_none());
    }

    #[test]
    fn only_network_failures_trip_the_breaker() {
        assert!(ApiError::Status(503).is_transport());
        assert!(!ApiError::Status(400).is_transport());
        assert!(!ApiError::GraphQl("boom".into()).is_transport());
        assert!(!ApiError::NotFound("ticket").is_transport());
    }
}
