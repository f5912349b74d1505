//! [`Command`] for updating a [`reservation::Status`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, Note},
        room_type, Reservation, RoomType,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`reservation::Status`] by an administrator.
///
/// Any [`reservation::Status`] may be set, whatever the current one is.
#[derive(Clone, Debug)]
pub struct UpdateReservationStatus {
    /// ID of the [`Reservation`] to update.
    pub reservation_id: reservation::Id,

    /// New [`reservation::Status`].
    pub status: reservation::Status,

    /// New [`Note`] of an administrator, replacing the previous one.
    pub admin_note: Option<Note>,
}

impl<Db, Dir> Command<UpdateReservationStatus> for Service<Db, Dir>
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
    /// Updated [`Reservation`], if it exists.
    type Ok = Option<Reservation>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateReservationStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateReservationStatus {
            reservation_id,
            status,
            admin_note,
        } = cmd;

        let Some(found) = self
            .database()
            .execute(Select(By::<Option<Reservation>, _>::new(
                reservation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(None);
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
            return Ok(None);
        };

        reservation.status = status;
        reservation.admin_note = admin_note;
        reservation.updated_at = DateTime::now().coerce();
        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Some(reservation))
    }
}

/// Error of [`UpdateReservationStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
