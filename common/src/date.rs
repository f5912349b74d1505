//! Calendar [`Date`] utilities.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
use time::{format_description::FormatItem, macros::format_description};

use crate::DateTimeOf;

/// Format of a [`Date`] in its string representation (ISO 8601).
const FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without time-of-day and offset.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] out of the provided `year`, `month` and `day`.
    ///
    /// [`None`] is returned if such a calendar date doesn't exist.
    #[must_use]
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the current [`Date`] in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Returns the number of days from this [`Date`] to the `other` one.
    ///
    /// Negative if the `other` [`Date`] is earlier.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    /// Returns this [`Date`] shifted by the provided number of `days`.
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }

    /// Returns this [`Date`] shifted by the provided number of calendar
    /// `months`.
    ///
    /// If the resulting month is shorter, the day is clamped to its last day
    /// (so `2025-01-31` plus one month is `2025-02-28`).
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn add_months(self, months: u32) -> Option<Self> {
        let total = i64::from(self.0.year()) * 12
            + i64::from(u8::from(self.0.month()) - 1)
            + i64::from(months);
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u8::try_from(total.rem_euclid(12) + 1).ok()?;
        let month = time::Month::try_from(month).ok()?;
        let day = self.0.day().min(month.length(year));
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the next [`Date`] after this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Returns the date and time of this [`Date`] at the provided `time`.
    #[must_use]
    pub const fn at(self, time: time::Time) -> time::PrimitiveDateTime {
        self.0.with_time(time)
    }

    /// Returns the date and time of the beginning of this [`Date`].
    #[must_use]
    pub fn at_midnight(self) -> time::PrimitiveDateTime {
        self.0.midnight()
    }

    /// Returns the [`DateTimeOf`] of the beginning of this [`Date`] in UTC.
    #[must_use]
    pub fn start_utc<Of: ?Sized>(self) -> DateTimeOf<Of> {
        DateTimeOf::from_utc(self.at_midnight())
    }
}

impl From<time::Date> for Date {
    fn from(d: time::Date) -> Self {
        Self(d)
    }
}

impl From<Date> for time::Date {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s.trim(), FORMAT)
            .map(Self)
            .map_err(ParseError)
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

#[cfg(feature = "postgres")]
mod postgres {
    //! Module providing integration with [`postgres_types`] crate.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };

    use super::Date;

    impl FromSql<'_> for Date {
        accepts!(DATE);

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            time::Date::from_sql(ty, raw).map(Self)
        }
    }

    impl ToSql for Date {
        accepts!(DATE);
        to_sql_checked!();

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
            self.0.to_sql(ty, w)
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}
