use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

use crate::error::BookingError;
use crate::models::{Money, SeatGroup, SeatKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Место занято, выбор не изменился
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub seat_group: String,
    pub row: i32,
    pub column: i32,
    pub is_taken: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatGroupView {
    pub group_name: String,
    pub rows: i32,
    pub columns: i32,
    pub seats: Vec<SeatView>,
}

/// Выбор мест на один сеанс. Живёт только в рамках одного оформления.
///
/// Занятое место никогда не попадает в выбор, а итог всегда равен
/// `price * |selection|`.
#[derive(Debug, Clone)]
pub struct SeatSelector {
    price: Money,
    groups: Vec<SeatGroup>,
    /// ключ -> занято ли место на момент загрузки
    seat_map: HashMap<SeatKey, bool>,
    selection: BTreeSet<SeatKey>,
    total: Money,
}

impl SeatSelector {
    pub fn new(price: Money, groups: Vec<SeatGroup>) -> Self {
        let seat_map = groups
            .iter()
            .flat_map(|group| group.seats.iter())
            .map(|seat| (seat.key(), seat.is_taken))
            .collect();

        Self {
            price,
            groups,
            seat_map,
            selection: BTreeSet::new(),
            total: Money::ZERO,
        }
    }

    pub fn toggle(&mut self, key: &SeatKey) -> Result<Toggle, BookingError> {
        let is_taken = *self
            .seat_map
            .get(key)
            .ok_or_else(|| BookingError::Validation(format!("Seat {key} does not exist")))?;

        let outcome = if is_taken {
            Toggle::Ignored
        } else if self.selection.remove(key) {
            Toggle::Removed
        } else {
            self.selection.insert(key.clone());
            Toggle::Added
        };

        self.total = self.price.times(self.selection.len());
        Ok(outcome)
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn contains(&self, key: &SeatKey) -> bool {
        self.selection.contains(key)
    }

    /// Выбранные места в стабильном порядке (группа, ряд, колонка).
    pub fn selected(&self) -> Vec<SeatKey> {
        self.selection.iter().cloned().collect()
    }

    /// Отпечаток выбора: одинаковый набор мест даёт одинаковую строку
    /// независимо от порядка кликов.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for key in &self.selection {
            hasher.update(key.seat_group.as_bytes());
            hasher.update([0u8]);
            hasher.update(key.row.to_be_bytes());
            hasher.update(key.column.to_be_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn view(&self) -> Vec<SeatGroupView> {
        self.groups
            .iter()
            .map(|group| SeatGroupView {
                group_name: group.group_name.clone(),
                rows: group.rows,
                columns: group.columns,
                seats: group
                    .seats
                    .iter()
                    .map(|seat| SeatView {
                        seat_group: seat.seat_group.clone(),
                        row: seat.row,
                        column: seat.column,
                        is_taken: seat.is_taken,
                        selected: self.contains(&seat.key()),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Seat;

    fn seat(group: &str, row: i32, column: i32, is_taken: bool) -> Seat {
        Seat { seat_group: group.to_string(), row, column, is_taken }
    }

    fn selector() -> SeatSelector {
        let group = SeatGroup {
            group_name: "Left".to_string(),
            rows: 1,
            columns: 3,
            seats: vec![
                seat("Left", 1, 1, false),
                seat("Left", 1, 2, true),
                seat("Left", 1, 3, false),
            ],
        };
        SeatSelector::new(Money::from_major(12.5), vec![group])
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selector = selector();
        let key = SeatKey::new("Left", 1, 1);

        assert_eq!(selector.toggle(&key).unwrap(), Toggle::Added);
        assert!(selector.contains(&key));
        assert_eq!(selector.total().to_string(), "12.50");

        assert_eq!(selector.toggle(&key).unwrap(), Toggle::Removed);
        assert!(selector.is_empty());
        assert_eq!(selector.total(), Money::ZERO);
    }

    #[test]
    fn taken_seat_is_ignored() {
        let mut selector = selector();
        let taken = SeatKey::new("Left", 1, 2);

        assert_eq!(selector.toggle(&taken).unwrap(), Toggle::Ignored);
        assert_eq!(selector.toggle(&taken).unwrap(), Toggle::Ignored);
        assert!(!selector.contains(&taken));
        assert_eq!(selector.len(), 0);
    }

    #[test]
    fn unknown_seat_is_a_validation_error() {
        let mut selector = selector();
        let err = selector.toggle(&SeatKey::new("Right", 1, 1)).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn two_seats_at_twelve_fifty_cost_twenty_five() {
        let mut selector = selector();
        selector.toggle(&SeatKey::new("Left", 1, 1)).unwrap();
        selector.toggle(&SeatKey::new("Left", 1, 3)).unwrap();
        assert_eq!(selector.total().to_string(), "25.00");
    }

    #[test]
    fn fingerprint_ignores_click_order() {
        let mut first = selector();
        first.toggle(&SeatKey::new("Left", 1, 1)).unwrap();
        first.toggle(&SeatKey::new("Left", 1, 3)).unwrap();

        let mut second = selector();
        second.toggle(&SeatKey::new("Left", 1, 3)).unwrap();
        second.toggle(&SeatKey::new("Left", 1, 1)).unwrap();

        assert_eq!(first.fingerprint(), second.fingerprint());
        second.toggle(&SeatKey::new("Left", 1, 1)).unwrap();
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn view_marks_selected_seats() {
        let mut selector = selector();
        selector.toggle(&SeatKey::new("Left", 1, 3)).unwrap();
        let view = selector.view();
        let selected: Vec<_> = view[0].seats.iter().filter(|s| s.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].column, 3);
    }
}
