//! [`Reservation`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{
    command,
    domain::{
        self,
        reservation::{Board, Guest, Note, RecurrenceCount, Stay},
    },
    read,
};
use uuid::Uuid;

use crate::{api::scalar, define_error, Context, Error};

/// A reservation of a room.
#[derive(Clone, Debug, From)]
pub struct Reservation(domain::Reservation);

/// A reservation of a room.
#[graphql_object(context = Context)]
impl Reservation {
    /// Unique identifier of this `Reservation`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Identifier of the user who made this `Reservation`, if known.
    pub fn user_id(&self) -> Option<UserId> {
        self.0.user_id.clone().map(Into::into)
    }

    /// Identifier of the reserved room type.
    pub fn room_type_id(&self) -> RoomTypeId {
        self.0.room_type_id.into()
    }

    /// First name of the guest.
    pub fn first_name(&self) -> String {
        self.0.guest.first_name.to_string()
    }

    /// Last name of the guest.
    pub fn last_name(&self) -> String {
        self.0.guest.last_name.to_string()
    }

    /// Email address of the guest.
    pub fn email(&self) -> String {
        self.0.guest.email.to_string()
    }

    /// Phone number of the guest.
    pub fn phone(&self) -> String {
        self.0.guest.phone.to_string()
    }

    /// Country of the guest.
    pub fn country(&self) -> String {
        self.0.guest.country.to_string()
    }

    /// Person this `Reservation` is booked for, if not the guest.
    pub fn book_for(&self) -> Option<String> {
        self.0.guest.book_for.as_ref().map(ToString::to_string)
    }

    /// Indicates whether the stay is work related.
    pub fn is_work_related(&self) -> bool {
        self.0.guest.is_work_related
    }

    /// Special request of the guest.
    pub fn special_request(&self) -> Option<String> {
        self.0.guest.special_request.as_ref().map(ToString::to_string)
    }

    /// Arrival `Date`.
    pub fn check_in(&self) -> Date {
        self.0.stay.check_in()
    }

    /// Departure `Date`.
    pub fn check_out(&self) -> Date {
        self.0.stay.check_out()
    }

    /// Payment method.
    pub fn pay_by(&self) -> String {
        self.0.pay_by.to_string()
    }

    /// Meal plan: `Full Board`, `Half Board` or `Room Only`.
    pub fn board(&self) -> &str {
        self.0.board.label()
    }

    /// Total cost of the whole stay.
    pub fn total_cost(&self) -> Money {
        self.0.total_cost
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Note left by an administrator.
    pub fn admin_note(&self) -> Option<String> {
        self.0.admin_note.as_ref().map(ToString::to_string)
    }

    /// Rule this `Reservation` was repeated with.
    pub fn recurrence(&self) -> Recurrence {
        self.0.recurrence.into()
    }

    /// Number of times this `Reservation` was repeated.
    pub fn recurrence_count(&self) -> i32 {
        self.0.recurrence_count.get().into()
    }

    /// Number of the allocated room.
    pub fn room_number(&self) -> Option<String> {
        self.0.room_number.as_ref().map(ToString::to_string)
    }

    /// `DateTime` when this `Reservation` was created.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Reservation` was modified last time.
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Booking details of a `Reservation`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ReservationInput")]
pub struct Input {
    /// Identifier of the user making the `Reservation`.
    pub user_id: Option<UserId>,

    /// Identifier of the room type to reserve.
    pub room_type_id: RoomTypeId,

    /// First name of the guest.
    pub first_name: GuestName,

    /// Last name of the guest.
    pub last_name: GuestName,

    /// Email address of the guest.
    pub email: GuestEmail,

    /// Phone number of the guest.
    pub phone: GuestPhone,

    /// Country of the guest.
    pub country: GuestCountry,

    /// Person the `Reservation` is booked for, if not the guest.
    pub book_for: Option<BookFor>,

    /// Indicates whether the stay is work related.
    pub is_work_related: Option<bool>,

    /// Special request of the guest.
    pub special_request: Option<String>,

    /// Arrival `Date`.
    pub check_in: Date,

    /// Departure `Date`.
    pub check_out: Date,

    /// Payment method.
    pub pay_by: PayBy,

    /// Meal plan: `Full Board` or `Half Board`, anything else meaning no
    /// meals.
    pub board: String,

    /// Rule to repeat the stay with.
    pub recurrence: Option<Recurrence>,

    /// Number of stays to book, zero meaning a single one.
    pub recurrence_count: Option<i32>,
}

impl Input {
    /// Converts this [`Input`] into a [`command::CreateReservation`].
    ///
    /// # Errors
    ///
    /// If this [`Input`] doesn't describe a valid booking.
    pub fn into_create(self) -> Result<command::CreateReservation, Error> {
        let stay = self.stay()?;
        let recurrence_count = self.recurrence_count()?;
        let recurrence = self.recurrence.unwrap_or_default().into();
        Ok(command::CreateReservation {
            user_id: self.user_id.clone().map(Into::into),
            room_type_id: self.room_type_id.into(),
            stay,
            pay_by: self.pay_by.clone().into(),
            board: Board::from_label(&self.board),
            recurrence,
            recurrence_count,
            guest: self.into_guest()?,
        })
    }

    /// Converts this [`Input`] into a [`command::UpdateReservation`] of the
    /// `Reservation` with the provided [`Id`].
    ///
    /// # Errors
    ///
    /// If this [`Input`] doesn't describe a valid booking.
    pub fn into_update(
        self,
        id: Id,
    ) -> Result<command::UpdateReservation, Error> {
        Ok(command::UpdateReservation {
            reservation_id: id.into(),
            room_type_id: self.room_type_id.into(),
            stay: self.stay()?,
            pay_by: self.pay_by.clone().into(),
            board: Board::from_label(&self.board),
            guest: self.into_guest()?,
        })
    }

    /// Returns the [`Stay`] described by this [`Input`].
    fn stay(&self) -> Result<Stay, Error> {
        Stay::new(self.check_in, self.check_out)
            .ok_or_else(|| InputError::InvalidStay.into())
    }

    /// Returns the [`RecurrenceCount`] described by this [`Input`].
    fn recurrence_count(&self) -> Result<RecurrenceCount, Error> {
        self.recurrence_count
            .map_or(Some(RecurrenceCount::default()), |n| {
                u16::try_from(n).ok().and_then(RecurrenceCount::new)
            })
            .ok_or_else(|| InputError::InvalidRecurrenceCount.into())
    }

    /// Extracts the [`Guest`] described by this [`Input`].
    fn into_guest(self) -> Result<Guest, Error> {
        let special_request = self
            .special_request
            .as_deref()
            .map(Note::trimmed)
            .transpose()
            .map_err(|_| Error::from(InputError::InvalidSpecialRequest))?
            .flatten();
        Ok(Guest {
            first_name: self.first_name.into(),
            last_name: self.last_name.into(),
            email: self.email.into(),
            phone: self.phone.into(),
            country: self.country.into(),
            book_for: self.book_for.map(Into::into),
            is_work_related: self.is_work_related.unwrap_or_default(),
            special_request,
        })
    }
}

/// Outcome of checking whether a stay can be booked.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct Availability {
    /// Indicates whether the stay can be booked.
    pub is_available: bool,

    /// Number of rooms not taken by other reservations on these dates.
    pub available_room_count: i32,
}

impl From<read::Availability> for Availability {
    fn from(a: read::Availability) -> Self {
        Self {
            is_available: a.is_available,
            available_room_count: a.available_room_count,
        }
    }
}

/// Outcome of canceling a `Reservation`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct CancellationResult {
    /// Indicates whether the `Reservation` has been canceled.
    pub success: bool,

    /// Human-readable explanation of the outcome.
    pub message: String,
}

impl From<command::Cancellation> for CancellationResult {
    fn from(c: command::Cancellation) -> Self {
        Self {
            success: c.is_success(),
            message: c.to_string(),
        }
    }
}

/// Unique identifier of a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::Id)]
#[into(domain::reservation::Id)]
#[graphql(name = "ReservationId", transparent)]
pub struct Id(Uuid);

/// Unique identifier of a room type.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::room_type::Id)]
#[into(domain::room_type::Id)]
#[graphql(name = "RoomTypeId", transparent)]
pub struct RoomTypeId(Uuid);

/// Identifier of a user making a `Reservation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserId",
    with = scalar::Via::<domain::reservation::UserId>,
)]
pub struct UserId(domain::reservation::UserId);

/// First or last name of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestName",
    with = scalar::Via::<domain::reservation::Name>,
)]
pub struct GuestName(domain::reservation::Name);

/// Email address of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestEmail",
    with = scalar::Via::<domain::reservation::Email>,
)]
pub struct GuestEmail(domain::reservation::Email);

/// Phone number of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestPhone",
    with = scalar::Via::<domain::reservation::Phone>,
)]
pub struct GuestPhone(domain::reservation::Phone);

/// Country of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestCountry",
    with = scalar::Via::<domain::reservation::Country>,
)]
pub struct GuestCountry(domain::reservation::Country);

/// Person a `Reservation` is booked for.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BookFor",
    with = scalar::Via::<domain::reservation::BookFor>,
)]
pub struct BookFor(domain::reservation::BookFor);

/// Payment method of a `Reservation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PayBy",
    with = scalar::Via::<domain::reservation::PayBy>,
)]
pub struct PayBy(domain::reservation::PayBy);

/// Status of a `Reservation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationStatus")]
pub enum Status {
    /// Booked and awaiting its guest.
    Active,

    /// Canceled, occupying no room.
    Canceled,

    /// Guest has checked in.
    CheckedIn,

    /// Completed.
    Completed,
}

impl From<domain::reservation::Status> for Status {
    fn from(status: domain::reservation::Status) -> Self {
        use domain::reservation::Status as S;
        match status {
            S::Active => Self::Active,
            S::Canceled => Self::Canceled,
            S::CheckedIn => Self::CheckedIn,
            S::Completed => Self::Completed,
        }
    }
}

impl From<Status> for domain::reservation::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => Self::Active,
            Status::Canceled => Self::Canceled,
            Status::CheckedIn => Self::CheckedIn,
            Status::Completed => Self::Completed,
        }
    }
}

/// Rule repeating a `Reservation` over several stays.
#[derive(Clone, Copy, Debug, Default, GraphQLEnum)]
pub enum Recurrence {
    /// Every stay repeats the original dates.
    #[default]
    None,

    /// Stays are one day apart.
    Daily,

    /// Stays are one week apart.
    Weekly,

    /// Stays are one calendar month apart.
    Monthly,
}

impl From<domain::reservation::Recurrence> for Recurrence {
    fn from(r: domain::reservation::Recurrence) -> Self {
        use domain::reservation::Recurrence as R;
        match r {
            R::None => Self::None,
            R::Daily => Self::Daily,
            R::Weekly => Self::Weekly,
            R::Monthly => Self::Monthly,
        }
    }
}

impl From<Recurrence> for domain::reservation::Recurrence {
    fn from(r: Recurrence) -> Self {
        match r {
            Recurrence::None => Self::None,
            Recurrence::Daily => Self::Daily,
            Recurrence::Weekly => Self::Weekly,
            Recurrence::Monthly => Self::Monthly,
        }
    }
}

define_error! {
    enum InputError {
        #[code = "INVALID_STAY"]
        #[status = BAD_REQUEST]
        #[message = "`checkOut` must be after `checkIn`"]
        InvalidStay,

        #[code = "INVALID_RECURRENCE_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "`recurrenceCount` must be between 0 and 365"]
        InvalidRecurrenceCount,

        #[code = "INVALID_SPECIAL_REQUEST"]
        #[status = BAD_REQUEST]
        #[message = "`specialRequest` must not exceed 500 characters"]
        InvalidSpecialRequest,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Date;
    use service::domain::{
        self,
        reservation::{Board, Recurrence},
    };

    use super::Input;

    fn input() -> Input {
        Input {
            user_id: None,
            room_type_id: domain::room_type::Id::new().into(),
            first_name: domain::reservation::Name::new("Ana").unwrap().into(),
            last_name: domain::reservation::Name::new("Perera")
                .unwrap()
                .into(),
            email: domain::reservation::Email::new("ana@example.com")
                .unwrap()
                .into(),
            phone: domain::reservation::Phone::new("0112345678")
                .unwrap()
                .into(),
            country: domain::reservation::Country::new("Sri Lanka")
                .unwrap()
                .into(),
            book_for: None,
            is_work_related: None,
            special_request: Some("  late arrival ".to_owned()),
            check_in: Date::from_str("2025-04-01").unwrap(),
            check_out: Date::from_str("2025-04-03").unwrap(),
            pay_by: domain::reservation::PayBy::new("Card").unwrap().into(),
            board: "Half Board".to_owned(),
            recurrence: None,
            recurrence_count: None,
        }
    }

    #[test]
    fn builds_single_booking_by_default() {
        let cmd = input().into_create().unwrap();

        assert_eq!(cmd.recurrence, Recurrence::None);
        assert_eq!(cmd.recurrence_count.occurrences(), 1);
        assert!(!cmd.guest.is_work_related);
        assert_eq!(
            cmd.guest.special_request.map(|n| n.to_string()).as_deref(),
            Some("late arrival"),
        );
    }

    #[test]
    fn drops_blank_special_request() {
        let cmd = Input {
            special_request: Some("   ".to_owned()),
            ..input()
        }
        .into_create()
        .unwrap();

        assert!(cmd.guest.special_request.is_none());
    }

    #[test]
    fn rejects_invalid_input() {
        let inverted = Input {
            check_out: Date::from_str("2025-04-01").unwrap(),
            ..input()
        };
        assert_eq!(inverted.into_create().unwrap_err().code, "INVALID_STAY");

        let too_many = Input {
            recurrence_count: Some(366),
            ..input()
        };
        assert_eq!(
            too_many.into_create().unwrap_err().code,
            "INVALID_RECURRENCE_COUNT",
        );

        let negative = Input {
            recurrence_count: Some(-1),
            ..input()
        };
        assert_eq!(
            negative.into_create().unwrap_err().code,
            "INVALID_RECURRENCE_COUNT",
        );

        let long = Input {
            special_request: Some("a".repeat(501)),
            ..input()
        };
        assert_eq!(
            long.into_create().unwrap_err().code,
            "INVALID_SPECIAL_REQUEST",
        );
    }

    #[test]
    fn reads_board_label() {
        let half = input().into_create().unwrap();
        assert_eq!(half.board, Board::HalfBoard);

        let full = Input {
            board: "Full Board".to_owned(),
            ..input()
        };
        assert_eq!(full.into_create().unwrap().board, Board::FullBoard);

        let unknown = Input {
            board: "All Inclusive".to_owned(),
            ..input()
        };
        assert_eq!(unknown.into_create().unwrap().board, Board::RoomOnly);
    }
}
