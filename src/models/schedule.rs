use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Money, SeatGroup};

/// Ссылка на конкретный сеанс. Сеанс не имеет суррогатного id и
/// адресуется составным ключом.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShowingRef {
    #[validate(length(min = 1, message = "cinemaId must not be empty"))]
    pub cinema_id: String,
    #[validate(length(min = 1, message = "movieId must not be empty"))]
    pub movie_id: String,
    #[validate(length(min = 1, message = "day must not be empty"))]
    pub day: String,
    #[validate(length(min = 1, message = "startTime must not be empty"))]
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    /// Длительность в минутах
    pub duration: i32,
    pub start_time: String,
    pub price: Money,
    #[serde(rename = "seats", default)]
    pub seat_groups: Vec<SeatGroup>,
}

/// Расписание кинотеатра: дни и сеансы в них.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub day: String,
    #[serde(default)]
    pub schedule_items: Vec<ScheduleListing>,
}

/// Сеанс в списке расписания, без карты мест.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListing {
    pub movie_id: String,
    pub start_time: String,
    pub duration: i32,
    #[serde(default)]
    pub price: Option<Money>,
}
