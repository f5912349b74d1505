//! [`Recurrence`] definitions.

use std::str::FromStr;

use common::{define_kind, Date};
use derive_more::{Display, Into};

use super::Stay;

define_kind! {
    #[doc = "Rule repeating a single booking request over several stays."]
    enum Recurrence {
        #[doc = "Every occurrence repeats the original dates."]
        None = 0,

        #[doc = "Occurrences are one day apart."]
        Daily = 1,

        #[doc = "Occurrences are one week apart."]
        Weekly = 2,

        #[doc = "Occurrences are one calendar month apart."]
        Monthly = 3,
    }
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::None
    }
}

impl Recurrence {
    /// Returns the `i`-th occurrence of the `base` [`Stay`].
    ///
    /// The `0`-th occurrence is the `base` itself. [`Recurrence::None`]
    /// repeats the `base` dates for every occurrence.
    ///
    /// [`None`] is returned if the shifted dates don't form a [`Stay`]
    /// anymore (a calendar overflow, or a monthly shift clamping both dates
    /// onto the same day).
    ///
    /// [`None`]: Option::None
    #[must_use]
    pub fn occurrence(self, base: Stay, i: u16) -> Option<Stay> {
        if i == 0 {
            return Some(base);
        }

        let shift = |date: Date| match self {
            Self::None => Some(date),
            Self::Daily => date.add_days(i64::from(i)),
            Self::Weekly => date.add_days(i64::from(i) * 7),
            Self::Monthly => date.add_months(u32::from(i)),
        };
        Stay::new(shift(base.check_in())?, shift(base.check_out())?)
    }
}

/// Number of times a booking request repeats according to its
/// [`Recurrence`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct RecurrenceCount(u16);

impl RecurrenceCount {
    /// Maximum allowed [`RecurrenceCount`].
    pub const MAX: u16 = 365;

    /// Creates a new [`RecurrenceCount`] if the provided `count` doesn't
    /// exceed the [`RecurrenceCount::MAX`].
    #[must_use]
    pub fn new(count: u16) -> Option<Self> {
        (count <= Self::MAX).then_some(Self(count))
    }

    /// Returns the value of this [`RecurrenceCount`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns the number of stays to book.
    ///
    /// Zero means a single stay without any repetitions.
    #[must_use]
    pub fn occurrences(self) -> u16 {
        self.0.max(1)
    }
}

impl FromStr for RecurrenceCount {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `RecurrenceCount`")
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::reservation::Stay;

    use super::{Recurrence, RecurrenceCount};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> Stay {
        Stay::new(date(check_in), date(check_out)).unwrap()
    }

    fn check_ins(r: Recurrence, base: Stay, count: u16) -> Vec<Date> {
        (0..RecurrenceCount::new(count).unwrap().occurrences())
            .map(|i| r.occurrence(base, i).unwrap().check_in())
            .collect()
    }

    #[test]
    fn zeroth_occurrence_is_base() {
        let base = stay("2025-01-31", "2025-02-02");

        for r in Recurrence::ALL {
            assert_eq!(r.occurrence(base, 0), Some(base));
        }
    }

    #[test]
    fn repeats_weekly() {
        let base = stay("2025-04-01", "2025-04-03");

        assert_eq!(
            check_ins(Recurrence::Weekly, base, 3),
            [date("2025-04-01"), date("2025-04-08"), date("2025-04-15")],
        );
        assert_eq!(
            Recurrence::Weekly.occurrence(base, 2),
            Some(stay("2025-04-15", "2025-04-17")),
        );
    }

    #[test]
    fn repeats_daily() {
        let base = stay("2025-12-30", "2025-12-31");

        assert_eq!(
            Recurrence::Daily.occurrence(base, 2),
            Some(stay("2026-01-01", "2026-01-02")),
        );
    }

    #[test]
    fn repeats_monthly() {
        let base = stay("2025-01-15", "2025-01-18");

        assert_eq!(
            Recurrence::Monthly.occurrence(base, 1),
            Some(stay("2025-02-15", "2025-02-18")),
        );
        assert_eq!(
            Recurrence::Monthly.occurrence(base, 12),
            Some(stay("2026-01-15", "2026-01-18")),
        );
    }

    #[test]
    fn monthly_clamping_may_collapse_stay() {
        let base = stay("2025-01-30", "2025-01-31");

        assert_eq!(Recurrence::Monthly.occurrence(base, 1), None);
        assert_eq!(
            Recurrence::Monthly.occurrence(base, 2),
            Some(stay("2025-03-30", "2025-03-31")),
        );
    }

    #[test]
    fn none_duplicates_base_dates() {
        let base = stay("2025-04-01", "2025-04-03");

        assert_eq!(
            check_ins(Recurrence::None, base, 3),
            [date("2025-04-01"); 3],
        );
    }

    #[test]
    fn count_bounds() {
        assert_eq!(RecurrenceCount::default().occurrences(), 1);
        assert_eq!(RecurrenceCount::new(1).unwrap().occurrences(), 1);
        assert_eq!(RecurrenceCount::new(365).unwrap().occurrences(), 365);
        assert!(RecurrenceCount::new(366).is_none());
        assert!("-1".parse::<RecurrenceCount>().is_err());
    }
}
