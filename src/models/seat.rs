use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Составной ключ места: группа (секция зала), ряд и колонка.
/// Места сравниваются только по ключу, не по ссылке.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatKey {
    #[validate(length(min = 1, message = "seatGroup must not be empty"))]
    pub seat_group: String,
    #[validate(range(min = 1, message = "row starts at 1"))]
    pub row: i32,
    #[validate(range(min = 1, message = "column starts at 1"))]
    pub column: i32,
}

impl SeatKey {
    pub fn new(seat_group: impl Into<String>, row: i32, column: i32) -> Self {
        Self { seat_group: seat_group.into(), row, column }
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: Row {} - Column {}", self.seat_group, self.row, self.column)
    }
}

/// Место в том виде, в каком его вернул сервер при последней загрузке.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_group: String,
    pub row: i32,
    pub column: i32,
    #[serde(default)]
    pub is_taken: bool,
}

impl Seat {
    pub fn key(&self) -> SeatKey {
        SeatKey::new(self.seat_group.clone(), self.row, self.column)
    }
}

/// Прямоугольная сетка мест одной секции зала.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatGroup {
    pub group_name: String,
    pub rows: i32,
    pub columns: i32,
    #[serde(default)]
    pub seats: Vec<Seat>,
}
