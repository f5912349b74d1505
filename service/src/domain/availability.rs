//! Capacity checks of a [`RoomType`].
//!
//! [`RoomType`]: crate::domain::RoomType

use crate::domain::{
    reservation::{Board, Stay},
    Reservation,
};

/// Checks whether the provided `stay` fits into `total_rooms` alongside the
/// `existing` [`Reservation`]s of the same room type.
///
/// Every day of the `stay` is checked separately: the time [`Block`] the
/// `stay` requests on that day is compared against the time each of the
/// `existing` [`Reservation`]s holds, and the day is fully booked once the
/// number of intersections reaches the `total_rooms`.
///
/// Canceled [`Reservation`]s occupy nothing.
///
/// [`Block`]: crate::domain::reservation::stay::Block
#[must_use]
pub fn is_available(
    total_rooms: u16,
    stay: Stay,
    board: Board,
    existing: &[Reservation],
) -> bool {
    let total_rooms = usize::from(total_rooms);
    stay.days().all(|day| {
        let block = stay.block_on(day, board);
        let occupied = existing
            .iter()
            .filter(|r| r.is_active())
            .filter(|r| r.stay.extent_on(day, r.board).overlaps(block))
            .count();
        occupied < total_rooms
    })
}

/// Counts how many of `total_rooms` remain free if the `overlapping`
/// [`Reservation`]s are taken into account, ignoring the time of day.
///
/// May be negative if more [`Reservation`]s than rooms exist.
#[must_use]
pub fn available_count(total_rooms: u16, overlapping: &[Reservation]) -> i32 {
    let occupied = overlapping.iter().filter(|r| r.is_active()).count();
    i32::from(total_rooms)
        .saturating_sub(i32::try_from(occupied).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::reservation::{
        tests_support::reservation, Board, Reservation, Status, Stay,
    };

    use super::{available_count, is_available};

    fn stay(check_in: &str, check_out: &str) -> Stay {
        Stay::new(
            check_in.parse::<Date>().unwrap(),
            check_out.parse::<Date>().unwrap(),
        )
        .unwrap()
    }

    fn booked(check_in: &str, check_out: &str, board: Board) -> Reservation {
        reservation(stay(check_in, check_out), board, None)
    }

    #[test]
    fn empty_room_type_is_available() {
        for (check_in, check_out) in [
            ("2025-03-01", "2025-03-02"),
            ("2025-03-01", "2025-03-10"),
            ("2024-02-28", "2024-03-01"),
        ] {
            for board in Board::ALL {
                let s = stay(check_in, check_out);
                assert!(is_available(1, s, *board, &[]));
            }
        }
    }

    #[test]
    fn no_rooms_is_never_available() {
        assert!(!is_available(
            0,
            stay("2025-03-01", "2025-03-02"),
            Board::RoomOnly,
            &[],
        ));
    }

    #[test]
    fn overlapping_stay_exhausts_single_room() {
        let existing = [booked("2025-03-01", "2025-03-03", Board::FullBoard)];

        assert!(!is_available(
            1,
            stay("2025-03-02", "2025-03-04"),
            Board::HalfBoard,
            &existing,
        ));
        assert!(is_available(
            2,
            stay("2025-03-02", "2025-03-04"),
            Board::HalfBoard,
            &existing,
        ));
    }

    #[test]
    fn departure_morning_does_not_block_full_board_arrival() {
        // Existing half-board stay is left by 08:00 of 2025-03-03, while the
        // full-board arrival happens at 19:00 of the same day.
        let existing = [booked("2025-03-01", "2025-03-03", Board::HalfBoard)];

        assert!(is_available(
            1,
            stay("2025-03-03", "2025-03-05"),
            Board::FullBoard,
            &existing,
        ));
    }

    #[test]
    fn departure_day_is_free_for_next_arrival() {
        let existing = [booked("2025-03-01", "2025-03-03", Board::FullBoard)];

        assert!(is_available(
            1,
            stay("2025-03-03", "2025-03-04"),
            Board::HalfBoard,
            &existing,
        ));
    }

    #[test]
    fn ignores_canceled() {
        let mut canceled = booked("2025-03-01", "2025-03-05", Board::HalfBoard);
        canceled.status = Status::Canceled;
        let existing = [canceled];

        assert!(is_available(
            1,
            stay("2025-03-02", "2025-03-03"),
            Board::HalfBoard,
            &existing,
        ));
        assert_eq!(available_count(1, &existing), 1);
    }

    #[test]
    fn counts_up_to_capacity() {
        let n = 3;
        let mut existing = vec![];
        for _ in 0..n {
            assert!(is_available(
                n,
                stay("2025-06-10", "2025-06-12"),
                Board::HalfBoard,
                &existing,
            ));
            existing.push(booked("2025-06-10", "2025-06-12", Board::HalfBoard));
        }

        assert!(!is_available(
            n,
            stay("2025-06-11", "2025-06-13"),
            Board::RoomOnly,
            &existing,
        ));
    }

    #[test]
    fn counts_available_rooms_coarsely() {
        let existing = [
            booked("2025-03-01", "2025-03-03", Board::HalfBoard),
            booked("2025-03-02", "2025-03-04", Board::FullBoard),
        ];

        assert_eq!(available_count(5, &existing), 3);
        assert_eq!(available_count(1, &existing), -1);
        assert_eq!(available_count(0, &[]), 0);
    }
}
