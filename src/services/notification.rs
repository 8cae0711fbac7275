use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{FeatureFlags, OrdersConfig};
use crate::format::{format_date_time, format_start_time};
use crate::graphql_client::CinemaApiClient;
use crate::models::Ticket;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub fn compose_ticket_mail(to: &str, ticket: &Ticket) -> MailRequest {
    let seats = ticket
        .seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let text = format!(
        "Thank you for your order! Here are your ticket details:\n\
         Movie: {}\n\
         Cinema: {}\n\
         Starts: {}\n\
         Seats: {}\n\
         Reserved At: {}",
        ticket.movie.title,
        ticket.cinema.name,
        format_start_time(&ticket.start_time),
        seats,
        format_date_time(&ticket.reserved_at),
    );

    MailRequest { to: to.to_string(), subject: "Ordered successfully".to_string(), text }
}

/// Письмо с билетом через сервис заказов. Отправка "выстрелил и забыл":
/// ошибка письма не влияет на результат брони.
#[derive(Clone)]
pub struct MailNotifier {
    http_client: reqwest::Client,
    endpoint: String,
    enabled: bool,
}

impl MailNotifier {
    pub fn new(orders: &OrdersConfig, features: &FeatureFlags) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http_client,
            endpoint: format!("{}/api/orders/sendMail", orders.url.trim_end_matches('/')),
            enabled: features.enable_mail,
        })
    }

    pub async fn send(&self, mail: &MailRequest) -> Result<(), reqwest::Error> {
        self.http_client
            .post(&self.endpoint)
            .json(mail)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Загружает билет и отправляет письмо в фоне.
    pub fn spawn_ticket_mail(&self, api: CinemaApiClient, to: String, ticket_id: String) {
        if !self.enabled {
            return;
        }
        let notifier = self.clone();
        tokio::spawn(async move {
            let ticket = match api.fetch_ticket(&ticket_id).await {
                Ok(ticket) => ticket,
                Err(e) => {
                    warn!(ticket_id = %ticket_id, "Skipping confirmation mail, ticket not loaded: {}", e);
                    return;
                }
            };
            let mail = compose_ticket_mail(&to, &ticket);
            match notifier.send(&mail).await {
                Ok(()) => info!(ticket_id = %ticket_id, "Confirmation mail sent"),
                Err(e) => error!(ticket_id = %ticket_id, "Failed to send confirmation mail: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CinemaInfo, MovieInfo, SeatKey};
    use chrono::NaiveDate;

    #[test]
    fn mail_lists_every_seat() {
        let ticket = Ticket {
            id: "t-1".into(),
            user: "u-1".into(),
            movie: MovieInfo { title: "Dune".into(), description: None },
            cinema: CinemaInfo { name: "Cineplexx".into(), location: Some("Skopje".into()) },
            duration: Some(155),
            start_time: "2024-05-06T18:00:00".into(),
            seats: vec![SeatKey::new("Left", 2, 3), SeatKey::new("Left", 2, 4)],
            reserved_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };

        let mail = compose_ticket_mail("fan@example.com", &ticket);
        assert_eq!(mail.subject, "Ordered successfully");
        assert!(mail.text.contains("Movie: Dune"));
        assert!(mail.text.contains("Seats: Left: Row 2 - Column 3, Left: Row 2 - Column 4"));
        assert!(mail.text.contains("Reserved At: 2024-05-01 - 09:30"));
        assert!(mail.text.contains("Starts: 2024-05-06 - 18:00"));
    }
}
