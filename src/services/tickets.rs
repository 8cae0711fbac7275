use tracing::info;

use crate::error::BookingError;
use crate::graphql_client::CinemaApiClient;
use crate::models::{SessionUser, Ticket};

/// Просмотр билетов. Чужие билеты не отдаются даже частично.
#[derive(Clone)]
pub struct TicketService {
    api: CinemaApiClient,
}

impl TicketService {
    pub fn new(api: CinemaApiClient) -> Self {
        Self { api }
    }

    pub async fn ticket(&self, user: &SessionUser, id: &str) -> Result<Ticket, BookingError> {
        let ticket = self.api.fetch_ticket(id).await?;
        if !ticket.belongs_to(&user.id) {
            return Err(BookingError::Forbidden(
                "You do not have permission to view this ticket".to_string(),
            ));
        }
        Ok(ticket)
    }

    /// История заказов, новые сверху.
    pub async fn user_tickets(&self, user: &SessionUser, user_id: &str) -> Result<Vec<Ticket>, BookingError> {
        if user.id != user_id {
            return Err(BookingError::Forbidden(
                "You do not have permission to view these tickets".to_string(),
            ));
        }

        let mut tickets = self.api.tickets_by_user(user_id).await?;
        tickets.sort_by(|a, b| b.reserved_at.cmp(&a.reserved_at));
        info!(user_id, count = tickets.len(), "Loaded ticket history");
        Ok(tickets)
    }
}
