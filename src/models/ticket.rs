use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SeatKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaInfo {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Билет, выпущенный сервером после успешного бронирования.
/// С нашей стороны неизменяем.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub user: String,
    pub movie: MovieInfo,
    pub cinema: CinemaInfo,
    #[serde(default)]
    pub duration: Option<i32>,
    pub start_time: String,
    pub seats: Vec<SeatKey>,
    pub reserved_at: NaiveDateTime,
}

impl Ticket {
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user == user_id
    }
}
