//! [`Reservation`] definitions.

pub mod recurrence;
pub mod stay;

use std::{sync::LazyLock, time::Duration};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::macros::time;
use uuid::Uuid;

use crate::domain::room_type::{self, RoomNumber};

pub use self::{
    recurrence::{Recurrence, RecurrenceCount},
    stay::Stay,
};

/// Booking of a [`RoomType`] for a [`Stay`].
///
/// [`RoomType`]: crate::domain::RoomType
#[derive(Clone, Debug)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// ID of the user who made this [`Reservation`], if any.
    pub user_id: Option<UserId>,

    /// ID of the reserved [`RoomType`].
    ///
    /// [`RoomType`]: crate::domain::RoomType
    pub room_type_id: room_type::Id,

    /// [`Guest`] this [`Reservation`] is made for.
    pub guest: Guest,

    /// [`Stay`] of this [`Reservation`].
    pub stay: Stay,

    /// Payment method of this [`Reservation`].
    pub pay_by: PayBy,

    /// Meal plan of this [`Reservation`].
    pub board: Board,

    /// Total cost of this [`Reservation`].
    pub total_cost: Money,

    /// [`Status`] of this [`Reservation`].
    pub status: Status,

    /// Note left by an administrator, if any.
    pub admin_note: Option<Note>,

    /// [`Recurrence`] this [`Reservation`] was created with.
    pub recurrence: Recurrence,

    /// [`RecurrenceCount`] this [`Reservation`] was created with.
    pub recurrence_count: RecurrenceCount,

    /// [`RoomNumber`] allocated for this [`Reservation`].
    pub room_number: Option<RoomNumber>,

    /// [`DateTime`] when this [`Reservation`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Reservation`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Reservation {
    /// Indicates whether this [`Reservation`] still occupies a room.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != Status::Canceled
    }

    /// Checks whether this [`Reservation`] can be canceled at the provided
    /// moment, giving at least the `notice` before the check-in.
    ///
    /// The check-in is considered to happen at the start of its day in UTC.
    #[must_use]
    pub fn is_cancelable_at<Of: ?Sized>(
        &self,
        now: DateTimeOf<Of>,
        notice: Duration,
    ) -> bool {
        now + notice <= self.stay.check_in().start_utc()
    }
}

/// ID of a [`Reservation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// ID of a user, as issued by the user service.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct UserId(String);

impl UserId {
    /// Creates a new [`UserId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (id.trim() == id && !id.is_empty() && id.len() <= 128)
            .then_some(Self(id))
    }
}

impl FromStr for UserId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `UserId`")
    }
}

/// Contact details of a guest staying under a [`Reservation`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Guest {
    /// First [`Name`] of this [`Guest`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Guest`].
    pub last_name: Name,

    /// [`Email`] of this [`Guest`].
    pub email: Email,

    /// [`Phone`] of this [`Guest`].
    pub phone: Phone,

    /// [`Country`] this [`Guest`] lives in.
    pub country: Country,

    /// Person the booking is made for, if not the [`Guest`] itself.
    pub book_for: Option<BookFor>,

    /// Indicator whether the stay is work-related.
    pub is_work_related: bool,

    /// Special request of this [`Guest`], if any.
    pub special_request: Option<Note>,
}

/// Name of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.chars().count() <= 25
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Country of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Country(String);

impl Country {
    /// Creates a new [`Country`] if the given `country` is valid.
    #[must_use]
    pub fn new(country: impl Into<String>) -> Option<Self> {
        let country = country.into();
        Self::check(&country).then_some(Self(country))
    }

    /// Checks whether the given `country` is a valid [`Country`].
    fn check(country: impl AsRef<str>) -> bool {
        let country = country.as_ref();
        country.trim() == country
            && !country.is_empty()
            && country.chars().count() <= 25
    }
}

impl FromStr for Country {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Country`")
    }
}

/// Email address of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 100 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\d +()-]{7,20}$").expect("valid regex")
        });

        let number = number.as_ref();
        number.trim() == number
            && number.chars().any(|c| c.is_ascii_digit())
            && REGEX.is_match(number)
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Person a [`Reservation`] is booked for.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct BookFor(String);

impl BookFor {
    /// Creates a new [`BookFor`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.chars().count() <= 50)
            .then_some(Self(name))
    }
}

impl FromStr for BookFor {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `BookFor`")
    }
}

/// Payment method of a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PayBy(String);

impl PayBy {
    /// Creates a new [`PayBy`] if the given `method` is valid.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Option<Self> {
        let method = method.into();
        (method.trim() == method
            && !method.is_empty()
            && method.chars().count() <= 50)
            .then_some(Self(method))
    }
}

impl FromStr for PayBy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PayBy`")
    }
}

/// Free-form note attached to a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.trim() == text && !text.is_empty() && text.chars().count() <= 500)
            .then_some(Self(text))
    }

    /// Creates a new optional [`Note`] out of the provided raw `text`,
    /// trimming it.
    ///
    /// [`None`] is returned if nothing remains after trimming.
    ///
    /// # Errors
    ///
    /// If the trimmed `text` is too long.
    pub fn trimmed(text: &str) -> Result<Option<Self>, &'static str> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Self::new(text).map(Some).ok_or("invalid `Note`")
    }
}

define_kind! {
    #[doc = "Status of a [`Reservation`]."]
    enum Status {
        #[doc = "[`Reservation`] is booked and awaits its guest."]
        Active = 1,

        #[doc = "[`Reservation`] is canceled and occupies no room."]
        Canceled = 2,

        #[doc = "Guest of a [`Reservation`] has checked in."]
        CheckedIn = 3,

        #[doc = "[`Reservation`] is completed."]
        Completed = 4,
    }
}

define_kind! {
    #[doc = "Meal plan of a [`Reservation`]."]
    enum Board {
        #[doc = "Breakfast, lunch and dinner."]
        FullBoard = 1,

        #[doc = "Breakfast and dinner."]
        HalfBoard = 2,

        #[doc = "No meals."]
        RoomOnly = 3,
    }
}

impl Board {
    /// Label of the [`Board::FullBoard`].
    pub const FULL_BOARD: &'static str = "Full Board";

    /// Label of the [`Board::HalfBoard`].
    pub const HALF_BOARD: &'static str = "Half Board";

    /// Label of the [`Board::RoomOnly`].
    pub const ROOM_ONLY: &'static str = "Room Only";

    /// Parses a [`Board`] from its human-readable label.
    ///
    /// Any unknown label means [`Board::RoomOnly`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            Self::FULL_BOARD => Self::FullBoard,
            Self::HALF_BOARD => Self::HalfBoard,
            _ => Self::RoomOnly,
        }
    }

    /// Returns the human-readable label of this [`Board`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullBoard => Self::FULL_BOARD,
            Self::HalfBoard => Self::HALF_BOARD,
            Self::RoomOnly => Self::ROOM_ONLY,
        }
    }

    /// Returns the time of the arrival day a room starts being occupied at.
    ///
    /// Full-board guests are served a dinner, so they arrive later.
    #[must_use]
    pub const fn check_in_time(self) -> time::Time {
        match self {
            Self::FullBoard => time!(19:00),
            Self::HalfBoard | Self::RoomOnly => time!(14:00),
        }
    }

    /// Returns the time of the departure day a room stops being occupied at.
    ///
    /// Full-board guests are served a breakfast, so they leave later.
    #[must_use]
    pub const fn check_out_time(self) -> time::Time {
        match self {
            Self::FullBoard => time!(12:00),
            Self::HalfBoard | Self::RoomOnly => time!(8:00),
        }
    }
}

/// [`DateTime`] when a [`Reservation`] was created.
pub type CreationDateTime = DateTimeOf<(Reservation, unit::Creation)>;

/// [`DateTime`] when a [`Reservation`] was modified.
pub type ModificationDateTime = DateTimeOf<(Reservation, unit::Modification)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use time::macros::datetime;

    use super::{
        Board, Email, Name, Note, Phone, Recurrence, RecurrenceCount,
        Reservation, Stay,
    };
    use crate::domain::reservation::tests_support::reservation;

    const NOTICE: Duration = Duration::from_secs(48 * 60 * 60);

    fn at(dt: time::PrimitiveDateTime) -> DateTime {
        DateTime::from_utc(dt)
    }

    fn booked(check_in: &str, check_out: &str) -> Reservation {
        let stay =
            Stay::new(check_in.parse().unwrap(), check_out.parse().unwrap())
                .unwrap();
        reservation(stay, Board::HalfBoard, Some("101"))
    }

    #[test]
    fn validates_guest_fields() {
        assert!(Name::new("Ana").is_some());
        assert!(Name::new("Zoë").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" Ana").is_none());
        assert!(Name::new("a".repeat(26)).is_none());

        assert!(Email::new("guest@hotel.com").is_some());
        assert!(Email::new("guest@hotel").is_none());
        assert!(Email::new("guest.hotel.com").is_none());
        assert!(Email::new(format!("{}@hotel.com", "a".repeat(95))).is_none());

        assert!(Phone::new("+94 (11) 234-5678").is_some());
        assert!(Phone::new("0112345678").is_some());
        assert!(Phone::new("12345").is_none());
        assert!(Phone::new("call me").is_none());
    }

    #[test]
    fn trims_notes() {
        assert_eq!(Note::trimmed("   ").unwrap(), None);
        assert_eq!(
            Note::trimmed("  late arrival ").unwrap(),
            Note::new("late arrival"),
        );
        assert!(Note::trimmed(&"a".repeat(501)).is_err());
    }

    #[test]
    fn parses_board_labels() {
        assert_eq!(Board::from_label("Full Board"), Board::FullBoard);
        assert_eq!(Board::from_label("Half Board"), Board::HalfBoard);
        assert_eq!(Board::from_label(""), Board::RoomOnly);
        assert_eq!(Board::from_label("full board"), Board::RoomOnly);
        assert_eq!(Board::from_label("Room Only"), Board::RoomOnly);
        for board in Board::ALL {
            assert_eq!(Board::from_label(board.label()), *board);
        }
    }

    #[test]
    fn allows_cancellation_exactly_at_notice() {
        let r = booked("2025-03-03", "2025-03-05");

        assert!(r.is_cancelable_at(at(datetime!(2025-03-01 00:00)), NOTICE));
        assert!(r.is_cancelable_at(at(datetime!(2025-02-20 10:00)), NOTICE));
    }

    #[test]
    fn refuses_cancellation_within_notice() {
        let r = booked("2025-03-03", "2025-03-05");

        assert!(!r.is_cancelable_at(
            at(datetime!(2025-03-01 00:00:36)),
            NOTICE,
        ));
        assert!(!r.is_cancelable_at(at(datetime!(2025-03-02 12:00)), NOTICE));
        assert!(!r.is_cancelable_at(at(datetime!(2025-03-04 12:00)), NOTICE));
    }

    #[test]
    fn canceled_is_not_active() {
        let mut r = booked("2025-03-03", "2025-03-05");
        assert!(r.is_active());

        r.status = super::Status::Canceled;
        assert!(!r.is_active());

        assert_eq!(r.recurrence, Recurrence::None);
        assert_eq!(r.recurrence_count, RecurrenceCount::default());
    }
}
