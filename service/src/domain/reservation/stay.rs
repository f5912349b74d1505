//! [`Stay`] definitions.

use std::iter;

use common::Date;
use time::{Duration, PrimitiveDateTime};

use super::Board;

/// Nights spent in a room, from the check-in date until the check-out date.
///
/// Check-out is always strictly after check-in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stay {
    /// [`Date`] of the check-in.
    check_in: Date,

    /// [`Date`] of the check-out.
    check_out: Date,
}

impl Stay {
    /// Creates a new [`Stay`] if the `check_out` goes after the `check_in`.
    #[must_use]
    pub fn new(check_in: Date, check_out: Date) -> Option<Self> {
        (check_out > check_in).then_some(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in [`Date`] of this [`Stay`].
    #[must_use]
    pub const fn check_in(self) -> Date {
        self.check_in
    }

    /// Returns the check-out [`Date`] of this [`Stay`].
    #[must_use]
    pub const fn check_out(self) -> Date {
        self.check_out
    }

    /// Returns the number of nights in this [`Stay`].
    #[must_use]
    pub fn nights(self) -> u32 {
        u32::try_from(self.check_in.days_until(self.check_out)).unwrap_or(1)
    }

    /// Returns the days of this [`Stay`], from the check-in day inclusive up
    /// to the check-out day exclusive.
    pub fn days(self) -> impl Iterator<Item = Date> {
        iter::successors(Some(self.check_in), |d| d.next())
            .take_while(move |d| *d < self.check_out)
    }

    /// Checks whether this [`Stay`] shares any day with the `other` one,
    /// ignoring the time of day.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        !(other.check_out <= self.check_in || other.check_in >= self.check_out)
    }

    /// Indicates whether the provided `day` is the last night of this
    /// [`Stay`].
    fn is_last_night(self, day: Date) -> bool {
        day.next() == Some(self.check_out)
    }

    /// Returns the [`Block`] of time this [`Stay`] requests a room for on the
    /// provided `day`.
    ///
    /// - The arrival day is occupied from the check-in time until midnight.
    /// - The last night is occupied from midnight until the check-out time of
    ///   the next day.
    /// - Any other day is occupied entirely.
    #[must_use]
    pub fn block_on(self, day: Date, board: Board) -> Block {
        if day == self.check_in {
            Block {
                start: day.at(board.check_in_time()),
                end: end_of(day),
            }
        } else if self.is_last_night(day) {
            Block {
                start: day.at_midnight(),
                end: self.check_out.at(board.check_out_time()),
            }
        } else {
            Block {
                start: day.at_midnight(),
                end: end_of(day),
            }
        }
    }

    /// Returns the [`Block`] of time this [`Stay`] holds a room for, as seen
    /// by another [`Stay`] on the provided `day`.
    ///
    /// Spans the whole [`Stay`], narrowed to the check-in time if the `day`
    /// is the arrival day, and to the check-out time if the `day` is the last
    /// night.
    #[must_use]
    pub fn extent_on(self, day: Date, board: Board) -> Block {
        Block {
            start: if day == self.check_in {
                self.check_in.at(board.check_in_time())
            } else {
                self.check_in.at_midnight()
            },
            end: if self.is_last_night(day) {
                self.check_out.at(board.check_out_time())
            } else {
                self.check_out.at_midnight()
            },
        }
    }
}

/// Returns the midnight following the provided `day`.
fn end_of(day: Date) -> PrimitiveDateTime {
    day.at_midnight().saturating_add(Duration::DAY)
}

/// Half-open interval of time a room is occupied for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Block {
    /// Start of this [`Block`], inclusive.
    pub start: PrimitiveDateTime,

    /// End of this [`Block`], exclusive.
    pub end: PrimitiveDateTime,
}

impl Block {
    /// Checks whether this [`Block`] intersects with the `other` one.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use time::macros::datetime;

    use crate::domain::reservation::Board;

    use super::{Block, Stay};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> Stay {
        Stay::new(date(check_in), date(check_out)).unwrap()
    }

    #[test]
    fn requires_check_out_after_check_in() {
        assert!(Stay::new(date("2025-03-01"), date("2025-03-02")).is_some());
        assert!(Stay::new(date("2025-03-01"), date("2025-03-01")).is_none());
        assert!(Stay::new(date("2025-03-02"), date("2025-03-01")).is_none());
    }

    #[test]
    fn counts_nights_and_days() {
        let s = stay("2025-02-27", "2025-03-02");

        assert_eq!(s.nights(), 3);
        assert_eq!(
            s.days().collect::<Vec<_>>(),
            [date("2025-02-27"), date("2025-02-28"), date("2025-03-01")],
        );
        assert_eq!(stay("2025-03-01", "2025-03-02").days().count(), 1);
    }

    #[test]
    fn overlaps_by_dates() {
        let s = stay("2025-03-02", "2025-03-04");

        assert!(s.overlaps(stay("2025-03-01", "2025-03-03")));
        assert!(s.overlaps(stay("2025-03-03", "2025-03-05")));
        assert!(s.overlaps(stay("2025-03-01", "2025-03-06")));
        assert!(!s.overlaps(stay("2025-03-01", "2025-03-02")));
        assert!(!s.overlaps(stay("2025-03-04", "2025-03-05")));
    }

    #[test]
    fn blocks_arrival_day_from_check_in_time() {
        let s = stay("2025-03-01", "2025-03-04");

        assert_eq!(
            s.block_on(date("2025-03-01"), Board::FullBoard),
            Block {
                start: datetime!(2025-03-01 19:00),
                end: datetime!(2025-03-02 0:00),
            },
        );
        assert_eq!(
            s.block_on(date("2025-03-01"), Board::HalfBoard).start,
            datetime!(2025-03-01 14:00),
        );
    }

    #[test]
    fn blocks_last_night_until_check_out_time() {
        let s = stay("2025-03-01", "2025-03-04");

        assert_eq!(
            s.block_on(date("2025-03-03"), Board::FullBoard),
            Block {
                start: datetime!(2025-03-03 0:00),
                end: datetime!(2025-03-04 12:00),
            },
        );
        assert_eq!(
            s.block_on(date("2025-03-03"), Board::RoomOnly).end,
            datetime!(2025-03-04 8:00),
        );
    }

    #[test]
    fn blocks_middle_day_entirely() {
        let s = stay("2025-03-01", "2025-03-04");

        assert_eq!(
            s.block_on(date("2025-03-02"), Board::FullBoard),
            Block {
                start: datetime!(2025-03-02 0:00),
                end: datetime!(2025-03-03 0:00),
            },
        );
    }

    #[test]
    fn single_night_is_an_arrival_day() {
        let s = stay("2025-03-01", "2025-03-02");

        assert_eq!(
            s.block_on(date("2025-03-01"), Board::HalfBoard),
            Block {
                start: datetime!(2025-03-01 14:00),
                end: datetime!(2025-03-02 0:00),
            },
        );
    }

    #[test]
    fn extends_over_whole_stay() {
        let s = stay("2025-03-01", "2025-03-03");

        assert_eq!(
            s.extent_on(date("2025-03-01"), Board::FullBoard),
            Block {
                start: datetime!(2025-03-01 19:00),
                end: datetime!(2025-03-03 0:00),
            },
        );
        assert_eq!(
            s.extent_on(date("2025-03-02"), Board::FullBoard),
            Block {
                start: datetime!(2025-03-01 0:00),
                end: datetime!(2025-03-03 12:00),
            },
        );
        assert_eq!(
            s.extent_on(date("2025-03-05"), Board::HalfBoard),
            Block {
                start: datetime!(2025-03-01 0:00),
                end: datetime!(2025-03-03 0:00),
            },
        );
    }

    #[test]
    fn blocks_overlap_half_open() {
        let morning = Block {
            start: datetime!(2025-03-01 0:00),
            end: datetime!(2025-03-01 8:00),
        };
        let evening = Block {
            start: datetime!(2025-03-01 19:00),
            end: datetime!(2025-03-02 0:00),
        };
        let touching = Block {
            start: datetime!(2025-03-01 8:00),
            end: datetime!(2025-03-01 19:00),
        };

        assert!(!morning.overlaps(evening));
        assert!(!evening.overlaps(morning));
        assert!(!morning.overlaps(touching));
        assert!(!touching.overlaps(evening));
        assert!(morning.overlaps(morning));
    }
}
