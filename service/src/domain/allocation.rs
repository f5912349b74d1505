//! [`RoomNumber`] allocation.

use std::collections::HashSet;

use crate::domain::{room_type::RoomNumber, Reservation};

/// Picks a [`RoomNumber`] not held by any of the `overlapping`
/// [`Reservation`]s.
///
/// The `preferred` [`RoomNumber`] is picked if it's one of the
/// `room_numbers` and is still free. Otherwise, the first free one of the
/// `room_numbers` is picked, so the allocation follows their declared order.
///
/// [`None`] is returned if every [`RoomNumber`] is taken.
#[must_use]
pub fn allocate<'n>(
    room_numbers: &'n [RoomNumber],
    overlapping: &[Reservation],
    preferred: Option<&RoomNumber>,
) -> Option<&'n RoomNumber> {
    let occupied = overlapping
        .iter()
        .filter(|r| r.is_active())
        .filter_map(|r| r.room_number.as_ref())
        .collect::<HashSet<_>>();

    preferred
        .and_then(|p| room_numbers.iter().find(|n| *n == p))
        .filter(|n| !occupied.contains(n))
        .or_else(|| room_numbers.iter().find(|n| !occupied.contains(n)))
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        reservation::{tests_support::reservation, Board, Status, Stay},
        room_type::RoomNumber,
        Reservation,
    };

    use super::allocate;

    fn numbers(ns: &[&str]) -> Vec<RoomNumber> {
        ns.iter().map(|n| RoomNumber::new(*n).unwrap()).collect()
    }

    fn holding(number: &str) -> Reservation {
        let stay = Stay::new(
            "2025-03-01".parse().unwrap(),
            "2025-03-03".parse().unwrap(),
        )
        .unwrap();
        reservation(stay, Board::HalfBoard, Some(number))
    }

    #[test]
    fn picks_first_free_in_declared_order() {
        let rooms = numbers(&["103", "101", "102"]);

        assert_eq!(allocate(&rooms, &[], None), Some(&rooms[0]));
        assert_eq!(
            allocate(&rooms, &[holding("103")], None),
            Some(&rooms[1]),
        );
        assert_eq!(
            allocate(&rooms, &[holding("103"), holding("101")], None),
            Some(&rooms[2]),
        );
    }

    #[test]
    fn fails_when_all_taken() {
        let rooms = numbers(&["101", "102"]);

        assert_eq!(
            allocate(&rooms, &[holding("101"), holding("102")], None),
            None,
        );
        assert_eq!(allocate(&[], &[], None), None);
    }

    #[test]
    fn releases_canceled() {
        let rooms = numbers(&["101"]);
        let mut canceled = holding("101");
        canceled.status = Status::Canceled;

        assert_eq!(allocate(&rooms, &[canceled], None), Some(&rooms[0]));
    }

    #[test]
    fn keeps_preferred_if_free() {
        let rooms = numbers(&["101", "102", "103"]);
        let preferred = RoomNumber::new("102").unwrap();

        assert_eq!(
            allocate(&rooms, &[], Some(&preferred)),
            Some(&rooms[1]),
        );
        assert_eq!(
            allocate(&rooms, &[holding("102")], Some(&preferred)),
            Some(&rooms[0]),
        );

        let foreign = RoomNumber::new("999").unwrap();
        assert_eq!(allocate(&rooms, &[], Some(&foreign)), Some(&rooms[0]));
    }
}
