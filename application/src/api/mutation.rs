//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{
    command::{self, Command as _},
    domain::reservation::Note,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Books the room type for the provided stay.
    ///
    /// With a recurrence, every occurrence of the stay is booked, or none of
    /// them. The first booked `Reservation` is returned.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STAY` - `checkOut` is not after `checkIn`;
    /// - `INVALID_RECURRENCE_COUNT` - `recurrenceCount` is out of range;
    /// - `INVALID_RECURRENCE` - some occurrence is not a valid stay;
    /// - `ROOM_TYPE_NOT_EXISTS` - the room type does not exist;
    /// - `NOT_AVAILABLE` - the room type is fully booked on some dates;
    /// - `NO_ROOM_NUMBER` - every room of the room type is taken.
    #[tracing::instrument(
        skip_all,
        fields(
            board = %input.board,
            check_in = %input.check_in,
            check_out = %input.check_out,
            gql.name = "createReservation",
            otel.name = Self::SPAN_NAME,
            room_type_id = %input.room_type_id,
        ),
    )]
    pub async fn create_reservation(
        input: api::reservation::Input,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let cmd = input.into_create().map_err(ctx.error())?;
        ctx.service()
            .execute(cmd)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the booking details of the specified `Reservation`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` does not exist;
    /// - `INVALID_STAY` - `checkOut` is not after `checkIn`;
    /// - `ROOM_TYPE_NOT_EXISTS` - the room type does not exist;
    /// - `NOT_AVAILABLE` - the room type is fully booked on the new dates;
    /// - `NO_ROOM_NUMBER` - every room of the room type is taken.
    #[tracing::instrument(
        skip_all,
        fields(
            board = %input.board,
            check_in = %input.check_in,
            check_out = %input.check_out,
            gql.name = "updateReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
            room_type_id = %input.room_type_id,
        ),
    )]
    pub async fn update_reservation(
        id: api::reservation::Id,
        input: api::reservation::Input,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let cmd = input.into_update(id).map_err(ctx.error())?;
        ctx.service()
            .execute(cmd)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sets the status of the specified `Reservation`, along with a note of
    /// an administrator.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` does not exist;
    /// - `INVALID_ADMIN_NOTE` - `adminNote` is too long.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateReservationStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn update_reservation_status(
        id: api::reservation::Id,
        status: api::reservation::Status,
        admin_note: Option<String>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let admin_note = admin_note
            .as_deref()
            .map(Note::trimmed)
            .transpose()
            .map_err(|_| StatusError::InvalidAdminNote.into())
            .map_err(ctx.error())?
            .flatten();

        ctx.service()
            .execute(command::UpdateReservationStatus {
                reservation_id: id.into(),
                status: status.into(),
                admin_note,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the specified `Reservation`.
    ///
    /// Refusals are reported in the result rather than as errors.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::reservation::CancellationResult, Error> {
        ctx.service()
            .execute(command::CancelReservation {
                reservation_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum StatusError {
        #[code = "INVALID_ADMIN_NOTE"]
        #[status = BAD_REQUEST]
        #[message = "`adminNote` must not exceed 500 characters"]
        InvalidAdminNote,
    }
}

impl AsError for command::create_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use http::StatusCode as S;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Directory(e) => e.try_as_error(),
            Self::RoomTypeNotExists(_) => Some(Error::new(
                "ROOM_TYPE_NOT_EXISTS",
                S::BAD_REQUEST,
                self,
            )),
            Self::InvalidOccurrence(_) => {
                Some(Error::new("INVALID_RECURRENCE", S::BAD_REQUEST, self))
            }
            Self::NotAvailable(_) => {
                Some(Error::new("NOT_AVAILABLE", S::BAD_REQUEST, self))
            }
            Self::NoRoomNumber => {
                Some(Error::new("NO_ROOM_NUMBER", S::BAD_REQUEST, self))
            }
            Self::CostOutOfRange => None,
        }
    }
}

impl AsError for command::update_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use http::StatusCode as S;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Directory(e) => e.try_as_error(),
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::NotExists.into())
            }
            Self::RoomTypeNotExists(_) => Some(Error::new(
                "ROOM_TYPE_NOT_EXISTS",
                S::BAD_REQUEST,
                self,
            )),
            Self::NotAvailable(_) => {
                Some(Error::new("NOT_AVAILABLE", S::BAD_REQUEST, self))
            }
            Self::NoRoomNumber => {
                Some(Error::new("NO_ROOM_NUMBER", S::BAD_REQUEST, self))
            }
            Self::CostOutOfRange => None,
        }
    }
}

impl AsError for command::update_reservation_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::cancel_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
