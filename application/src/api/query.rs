//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{
    domain::reservation::{Board, Stay},
    query::{self, availability},
    Query as _,
};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Reservation` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(query::reservation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all `Reservation`s made by the specified user, ordered by
    /// their check-in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservations",
            otel.name = Self::SPAN_NAME,
            user_id = %user_id,
        ),
    )]
    pub async fn reservations(
        user_id: api::reservation::UserId,
        ctx: &Context,
    ) -> Result<Vec<api::Reservation>, Error> {
        ctx.service()
            .execute(query::reservations::ByUser::by(user_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns all the existing `Reservation`s, ordered by their check-in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "allReservations",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn all_reservations(
        ctx: &Context,
    ) -> Result<Vec<api::Reservation>, Error> {
        ctx.service()
            .execute(query::reservations::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Checks whether the specified room type can be booked for the provided
    /// dates on the provided meal plan (`Full Board` or `Half Board`,
    /// anything else meaning no meals).
    ///
    /// A `Reservation` being changed may be excluded, so it doesn't compete
    /// with its own new dates.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STAY` - `checkOut` is not after `checkIn`.
    #[tracing::instrument(
        skip_all,
        fields(
            board = %board,
            check_in = %check_in,
            check_out = %check_out,
            exclude = ?exclude_reservation_id.map(|id| id.to_string()),
            gql.name = "availability",
            otel.name = Self::SPAN_NAME,
            room_type_id = %room_type_id,
        ),
    )]
    pub async fn availability(
        room_type_id: api::reservation::RoomTypeId,
        check_in: Date,
        check_out: Date,
        board: String,
        exclude_reservation_id: Option<api::reservation::Id>,
        ctx: &Context,
    ) -> Result<api::reservation::Availability, Error> {
        let stay = stay(check_in, check_out).map_err(ctx.error())?;
        ctx.service()
            .execute(availability::CheckAvailability {
                room_type_id: room_type_id.into(),
                stay,
                board: Board::from_label(&board),
                exclude: exclude_reservation_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Counts rooms of the specified room type not taken by any
    /// `Reservation` on the provided dates.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STAY` - `checkOut` is not after `checkIn`.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "availableRoomCount",
            otel.name = Self::SPAN_NAME,
            room_type_id = %room_type_id,
        ),
    )]
    pub async fn available_room_count(
        room_type_id: api::reservation::RoomTypeId,
        check_in: Date,
        check_out: Date,
        ctx: &Context,
    ) -> Result<i32, Error> {
        let stay = stay(check_in, check_out).map_err(ctx.error())?;
        ctx.service()
            .execute(availability::AvailableCount {
                room_type_id: room_type_id.into(),
                stay,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }
}

/// Builds a [`Stay`] out of the provided dates.
fn stay(check_in: Date, check_out: Date) -> Result<Stay, Error> {
    Stay::new(check_in, check_out)
        .ok_or_else(|| api::reservation::InputError::InvalidStay.into())
}

impl AsError for availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Directory(e) => e.try_as_error(),
        }
    }
}
