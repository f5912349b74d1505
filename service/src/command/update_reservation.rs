//! [`Command`] for changing an existing [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        allocation, availability, pricing,
        reservation::{self, Board, Guest, PayBy, Stay},
        room_type, Reservation, RoomType,
    },
    infra::{database, directory, Database, Directory},
    read::reservation::Overlapping,
    Service,
};

use super::Command;

/// [`Command`] for changing an existing [`Reservation`].
///
/// Every booking detail is replaced, so the [`Reservation`] is re-checked
/// against the others as if it was a new one, and its cost is recomputed.
#[derive(Clone, Debug)]
pub struct UpdateReservation {
    /// ID of the [`Reservation`] to change.
    pub reservation_id: reservation::Id,

    /// ID of the new [`RoomType`].
    pub room_type_id: room_type::Id,

    /// New [`Guest`].
    pub guest: Guest,

    /// New [`Stay`].
    pub stay: Stay,

    /// New payment method.
    pub pay_by: PayBy,

    /// New meal plan.
    pub board: Board,
}

impl<Db, Dir> Command<UpdateReservation> for Service<Db, Dir>
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
        > + Database<
            Select<By<Vec<Reservation>, Overlapping>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Dir: Directory<
        Select<By<Option<RoomType>, room_type::Id>>,
        Ok = Option<RoomType>,
        Err = Traced<directory::Error>,
    >,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateReservation {
            reservation_id,
            room_type_id,
            guest,
            stay,
            pay_by,
            board,
        } = cmd;

        _ = self
            .database()
            .execute(Select(By::<Option<Reservation>, _>::new(
                reservation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let room_type = self
            .directory()
            .execute(Select(By::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomTypeNotExists(room_type_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `RoomType`.
        tx.execute(Lock(By::<RoomType, _>::new(room_type.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(
                reservation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let overlapping = tx
            .execute(Select(By::new(Overlapping {
                room_type_id: room_type.id,
                stay,
                exclude: Some(reservation_id),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if !availability::is_available(
            room_type.total_rooms,
            stay,
            board,
            &overlapping,
        ) {
            return Err(tracerr::new!(E::NotAvailable(stay)));
        }
        let current = reservation
            .room_number
            .as_ref()
            .filter(|_| reservation.room_type_id == room_type.id);
        let room_number = allocation::allocate(
            &room_type.room_numbers,
            &overlapping,
            current,
        )
        .ok_or(E::NoRoomNumber)
        .map_err(tracerr::wrap!())?
        .clone();

        reservation.room_type_id = room_type.id;
        reservation.guest = guest;
        reservation.stay = stay;
        reservation.pay_by = pay_by;
        reservation.board = board;
        reservation.total_cost = pricing::total_cost(&room_type, stay, board)
            .ok_or(E::CostOutOfRange)
            .map_err(tracerr::wrap!())?;
        reservation.room_number = Some(room_number);
        reservation.updated_at = DateTime::now().coerce();

        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`UpdateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Directory`] error.
    #[display("`Directory` operation failed: {_0}")]
    #[from]
    Directory(directory::Error),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("Reservation not found.")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`RoomType`] with the provided ID does not exist.
    #[display("Room type not found")]
    RoomTypeNotExists(#[error(not(source))] room_type::Id),

    /// [`RoomType`] is fully booked for the new [`Stay`].
    #[display("Selected room type is not available for the new dates.")]
    NotAvailable(#[error(not(source))] Stay),

    /// Every [`RoomNumber`] of the [`RoomType`] is taken for the [`Stay`].
    ///
    /// [`RoomNumber`]: room_type::RoomNumber
    #[display("No available room numbers for the selected type and dates.")]
    NoRoomNumber,

    /// Total cost of the new [`Stay`] doesn't fit into [`Money`].
    ///
    /// [`Money`]: common::Money
    #[display("Total cost of the stay is out of range")]
    CostOutOfRange,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Handler as _, Money};

    use crate::{
        command::tests_support::{booking, room_type_of, service, stay},
        domain::{
            reservation::{self, tests_support::guest, Board, PayBy, Stay},
            room_type, RoomType,
        },
    };

    use super::{ExecutionError, UpdateReservation};

    fn change(
        reservation_id: reservation::Id,
        room_type_id: room_type::Id,
        stay: Stay,
        board: Board,
    ) -> UpdateReservation {
        UpdateReservation {
            reservation_id,
            room_type_id,
            guest: guest(),
            stay,
            pay_by: PayBy::new("Cash").unwrap(),
            board,
        }
    }

    #[tokio::test]
    async fn moves_stay_without_competing_with_itself() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let created = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let updated = svc
            .execute(change(
                created.id,
                rt.id,
                stay("2025-03-02", "2025-03-05"),
                Board::FullBoard,
            ))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.stay, stay("2025-03-02", "2025-03-05"));
        assert_eq!(updated.board, Board::FullBoard);
        assert_eq!(updated.pay_by.to_string(), "Cash");
        assert_eq!(updated.total_cost, Money::from_str("35000").unwrap());
        assert_eq!(updated.room_number.unwrap().to_string(), "101");
        assert_eq!(updated.status, created.status);
    }

    #[tokio::test]
    async fn keeps_current_room_number_when_free() {
        let rt = room_type_of(2, &["101", "102"]);
        let svc = service([rt.clone()]);
        let cmd =
            booking(rt.id, stay("2025-03-01", "2025-03-03"), Board::HalfBoard);
        _ = svc.execute(cmd.clone()).await.unwrap();
        let second = svc.execute(cmd).await.unwrap();
        assert_eq!(second.room_number.as_ref().unwrap().to_string(), "102");

        let updated = svc
            .execute(change(
                second.id,
                rt.id,
                stay("2025-03-05", "2025-03-06"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        assert_eq!(updated.room_number.unwrap().to_string(), "102");
    }

    #[tokio::test]
    async fn moves_to_another_room_type() {
        let from = room_type_of(1, &["101"]);
        let to = room_type_of(1, &["201"]);
        let svc = service([from.clone(), to.clone()]);
        let created = svc
            .execute(booking(
                from.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let updated = svc
            .execute(change(
                created.id,
                to.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        assert_eq!(updated.room_type_id, to.id);
        assert_eq!(updated.room_number.unwrap().to_string(), "201");

        // The previous room is released.
        let again = svc
            .execute(booking(
                from.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();
        assert_eq!(again.room_number.unwrap().to_string(), "101");
    }

    #[tokio::test]
    async fn refuses_stay_taken_by_others() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        _ = svc
            .execute(booking(
                rt.id,
                stay("2025-03-05", "2025-03-07"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();
        let mine = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let err = svc
            .execute(change(
                mine.id,
                rt.id,
                stay("2025-03-04", "2025-03-06"),
                Board::HalfBoard,
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_ref().to_string(),
            "Selected room type is not available for the new dates.",
        );
    }

    #[tokio::test]
    async fn refuses_unknown_reservation() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);

        let err = svc
            .execute(change(
                reservation::Id::new(),
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ReservationNotExists(_),
        ));
        assert_eq!(err.as_ref().to_string(), "Reservation not found.");
    }

    #[tokio::test]
    async fn refuses_cost_out_of_range() {
        let rt = room_type_of(1, &["101"]);
        let pricey = RoomType {
            price: Money::from_str("50000000000000000000000000000").unwrap(),
            ..room_type_of(1, &["201"])
        };
        let svc = service([rt.clone(), pricey.clone()]);
        let created = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let err = svc
            .execute(change(
                created.id,
                pricey.id,
                stay("2025-03-01", "2025-03-03"),
                Board::RoomOnly,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CostOutOfRange));
    }

    #[tokio::test]
    async fn refuses_unknown_room_type() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let created = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let err = svc
            .execute(change(
                created.id,
                room_type::Id::new(),
                stay("2025-03-01", "2025-03-03"),
                Board::HalfBoard,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoomTypeNotExists(_),
        ));
    }
}
