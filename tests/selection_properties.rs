use cinema_booking::models::{Money, Seat, SeatGroup, SeatKey};
use cinema_booking::services::selection::{SeatSelector, Toggle};
use proptest::prelude::*;

const ROWS: i32 = 4;
const COLUMNS: i32 = 6;

fn hall(taken: &[bool]) -> Vec<SeatGroup> {
    let seats = (0..ROWS * COLUMNS)
        .map(|i| Seat {
            seat_group: "Main".to_string(),
            row: i / COLUMNS + 1,
            column: i % COLUMNS + 1,
            is_taken: taken[i as usize],
        })
        .collect();
    vec![SeatGroup { group_name: "Main".to_string(), rows: ROWS, columns: COLUMNS, seats }]
}

fn key(index: usize) -> SeatKey {
    let i = index as i32;
    SeatKey::new("Main", i / COLUMNS + 1, i % COLUMNS + 1)
}

fn taken_layout() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(0.3), (ROWS * COLUMNS) as usize)
}

fn click_sequence() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..(ROWS * COLUMNS) as usize, 0..64)
}

proptest! {
    #[test]
    fn taken_seats_never_enter_selection(taken in taken_layout(), clicks in click_sequence()) {
        let mut selector = SeatSelector::new(Money::from_cents(1250), hall(&taken));
        for index in clicks {
            let outcome = selector.toggle(&key(index)).unwrap();
            if taken[index] {
                prop_assert_eq!(outcome, Toggle::Ignored);
            }
        }
        for seat in selector.selected() {
            let index = ((seat.row - 1) * COLUMNS + seat.column - 1) as usize;
            prop_assert!(!taken[index]);
        }
    }

    #[test]
    fn total_is_price_times_selected(
        cents in 0i64..100_000,
        taken in taken_layout(),
        clicks in click_sequence(),
    ) {
        let price = Money::from_cents(cents);
        let mut selector = SeatSelector::new(price, hall(&taken));
        for index in clicks {
            selector.toggle(&key(index)).unwrap();
            prop_assert_eq!(selector.total().cents(), cents * selector.len() as i64);
        }
    }

    #[test]
    fn double_toggle_restores_selection(
        taken in taken_layout(),
        clicks in click_sequence(),
        extra in 0..(ROWS * COLUMNS) as usize,
    ) {
        let mut selector = SeatSelector::new(Money::from_cents(500), hall(&taken));
        for index in clicks {
            selector.toggle(&key(index)).unwrap();
        }
        let before = selector.selected();
        let fingerprint = selector.fingerprint();

        selector.toggle(&key(extra)).unwrap();
        selector.toggle(&key(extra)).unwrap();

        prop_assert_eq!(selector.selected(), before);
        prop_assert_eq!(selector.fingerprint(), fingerprint);
    }

    #[test]
    fn selection_order_does_not_change_fingerprint(
        distinct in prop::collection::hash_set(0..(ROWS * COLUMNS) as usize, 0..12),
    ) {
        let mut clicks: Vec<usize> = distinct.into_iter().collect();
        let free = vec![false; (ROWS * COLUMNS) as usize];
        let mut forward = SeatSelector::new(Money::from_cents(500), hall(&free));
        for index in &clicks {
            forward.toggle(&key(*index)).unwrap();
        }
        clicks.reverse();
        let mut backward = SeatSelector::new(Money::from_cents(500), hall(&free));
        for index in &clicks {
            backward.toggle(&key(*index)).unwrap();
        }
        prop_assert_eq!(forward.fingerprint(), backward.fingerprint());
    }
}

#[test]
fn unknown_seat_is_rejected() {
    let mut selector = SeatSelector::new(Money::from_cents(500), hall(&[false; 24]));
    assert!(selector.toggle(&SeatKey::new("Balcony", 1, 1)).is_err());
    assert!(selector.toggle(&SeatKey::new("Main", ROWS + 1, 1)).is_err());
    assert!(selector.is_empty());
}
