//! [`Command`] for canceling a [`Reservation`].

use std::time::Duration;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        reservation::{self, Status},
        room_type, Reservation, RoomType,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for canceling a [`Reservation`] by its guest.
///
/// A [`Reservation`] may be canceled only if its check-in is at least the
/// configured notice away.
#[derive(Clone, Copy, Debug, From)]
pub struct CancelReservation {
    /// ID of the [`Reservation`] to cancel.
    pub reservation_id: reservation::Id,
}

/// Outcome of a [`CancelReservation`] [`Command`].
#[derive(Clone, Debug, Display)]
pub enum Cancellation {
    /// [`Reservation`] is canceled.
    #[display("Reservation canceled successfully.")]
    Canceled(Reservation),

    /// [`Reservation`] doesn't exist.
    #[display("Reservation not found.")]
    NotFound,

    /// Check-in of the [`Reservation`] is too close.
    #[display(
        "Cannot cancel within {} hours of check-in.",
        notice.as_secs() / 3600,
    )]
    TooLate {
        /// Notice required before the check-in.
        notice: Duration,
    },
}

impl Cancellation {
    /// Indicates whether the [`Reservation`] has been canceled.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }
}

impl<Db, Dir> Command<CancelReservation> for Service<Db, Dir>
where
    Db: Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<RoomType, room_type::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Cancellation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CancelReservation { reservation_id }: CancelReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let notice = self.config().cancellation_notice;

        let Some(found) = self
            .database()
            .execute(Select(By::<Option<Reservation>, _>::new(
                reservation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(Cancellation::NotFound);
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `RoomType`.
        tx.execute(Lock(By::<RoomType, _>::new(found.room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Some(mut reservation) = tx
            .execute(Select(By::<Option<Reservation>, _>::new(
                reservation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(Cancellation::NotFound);
        };

        let now = DateTime::now();
        if !reservation.is_cancelable_at(now, notice) {
            log::debug!(
                "refused to cancel `Reservation({reservation_id})` checking \
                 in on {}",
                reservation.stay.check_in(),
            );
            return Ok(Cancellation::TooLate { notice });
        }

        reservation.status = Status::Canceled;
        reservation.updated_at = now.coerce();
        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Cancellation::Canceled(reservation))
    }
}

/// Error of [`CancelReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
