//! [`Command`] for creating a new [`Reservation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        allocation, availability, pricing,
        reservation::{
            self, Board, Guest, PayBy, Recurrence, RecurrenceCount, Status,
            Stay,
        },
        room_type, Reservation, RoomType,
    },
    infra::{database, directory, Database, Directory},
    read::reservation::Overlapping,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Reservation`].
///
/// With a [`Recurrence`], one [`Reservation`] is created per occurrence,
/// either all of them or none.
#[derive(Clone, Debug)]
pub struct CreateReservation {
    /// ID of the user making a new [`Reservation`], if known.
    pub user_id: Option<reservation::UserId>,

    /// ID of the [`RoomType`] to reserve.
    pub room_type_id: room_type::Id,

    /// [`Guest`] of a new [`Reservation`].
    pub guest: Guest,

    /// [`Stay`] of the first occurrence.
    pub stay: Stay,

    /// Payment method of a new [`Reservation`].
    pub pay_by: PayBy,

    /// Meal plan of a new [`Reservation`].
    pub board: Board,

    /// [`Recurrence`] to repeat the [`Stay`] with.
    pub recurrence: Recurrence,

    /// Number of occurrences of the [`Stay`].
    pub recurrence_count: RecurrenceCount,
}

impl<Db, Dir> Command<CreateReservation> for Service<Db, Dir>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<RoomType, room_type::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Reservation>, Overlapping>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Dir: Directory<
        Select<By<Option<RoomType>, room_type::Id>>,
        Ok = Option<RoomType>,
        Err = Traced<directory::Error>,
    >,
{
    /// First of the created [`Reservation`]s.
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReservation {
            user_id,
            room_type_id,
            guest,
            stay,
            pay_by,
            board,
            recurrence,
            recurrence_count,
        } = cmd;

        let room_type = self
            .directory()
            .execute(Select(By::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomTypeNotExists(room_type_id))
            .map_err(tracerr::wrap!())?;

        let occurrence = |i| {
            recurrence
                .occurrence(stay, i)
                .ok_or(E::InvalidOccurrence(i))
                .map_err(tracerr::wrap!())
        };
        let first_stay = occurrence(0)?;
        let rest = (1..recurrence_count.occurrences())
            .map(occurrence)
            .collect::<Result<Vec<_>, _>>()?;

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

        let now = DateTime::now();
        let draft = |stay| Reservation {
            id: reservation::Id::new(),
            user_id: user_id.clone(),
            room_type_id: room_type.id,
            guest: guest.clone(),
            stay,
            pay_by: pay_by.clone(),
            board,
            total_cost: Money::ZERO,
            status: Status::Active,
            admin_note: None,
            recurrence,
            recurrence_count,
            room_number: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let first = book(&tx, &room_type, draft(first_stay)).await?;
        for stay in rest {
            _ = book(&tx, &room_type, draft(stay)).await?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(first)
    }
}

/// Allocates a room to the provided `draft` [`Reservation`] of the
/// `room_type`, prices it and inserts it inside the provided `tx`.
async fn book<Tx>(
    tx: &Tx,
    room_type: &RoomType,
    mut draft: Reservation,
) -> Result<Reservation, Traced<ExecutionError>>
where
    Tx: Database<
            Select<By<Vec<Reservation>, Overlapping>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>,
{
    use ExecutionError as E;

    let stay = draft.stay;
    let overlapping = tx
        .execute(Select(By::new(Overlapping {
            room_type_id: room_type.id,
            stay,
            exclude: None,
        })))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

    if !availability::is_available(
        room_type.total_rooms,
        stay,
        draft.board,
        &overlapping,
    ) {
        return Err(tracerr::new!(E::NotAvailable(stay)));
    }
    let room_number =
        allocation::allocate(&room_type.room_numbers, &overlapping, None)
            .ok_or(E::NoRoomNumber)
            .map_err(tracerr::wrap!())?;

    draft.total_cost = pricing::total_cost(room_type, stay, draft.board)
        .ok_or(E::CostOutOfRange)
        .map_err(tracerr::wrap!())?;
    draft.room_number = Some(room_number.clone());

    tx.execute(Insert(draft.clone()))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

    Ok(draft)
}

/// Error of [`CreateReservation`] [`Command`] execution.
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

    /// [`RoomType`] with the provided ID does not exist.
    #[display("Room type not found")]
    RoomTypeNotExists(#[error(not(source))] room_type::Id),

    /// Occurrence with the provided index falls outside the calendar or
    /// collapses into a zero-night [`Stay`].
    #[display("Occurrence #{_0} of the recurrence is not a valid stay")]
    InvalidOccurrence(#[error(not(source))] u16),

    /// [`RoomType`] is fully booked for the [`Stay`].
    #[display(
        "Room is not available for {} to {}",
        _0.check_in(),
        _0.check_out(),
    )]
    NotAvailable(#[error(not(source))] Stay),

    /// Every [`RoomNumber`] of the [`RoomType`] is taken for the [`Stay`].
    ///
    /// [`RoomNumber`]: room_type::RoomNumber
    #[display("No available room numbers for the selected type and dates.")]
    NoRoomNumber,

    /// Total cost of a [`Stay`] doesn't fit into [`Money`].
    #[display("Total cost of the stay is out of range")]
    CostOutOfRange,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{
        operations::{By, Select, Update},
        Date, Handler as _, Money,
    };

    use crate::{
        command::tests_support::{
            booking, room_type_of, service, stay, TestService,
        },
        domain::{
            reservation::{Board, Recurrence, RecurrenceCount, Status},
            room_type, Reservation, RoomType,
        },
    };

    use super::{CreateReservation, ExecutionError};

    fn recurring(
        cmd: CreateReservation,
        recurrence: Recurrence,
        count: u16,
    ) -> CreateReservation {
        CreateReservation {
            recurrence,
            recurrence_count: RecurrenceCount::new(count).unwrap(),
            ..cmd
        }
    }

    async fn all(svc: &TestService) -> Vec<Reservation> {
        svc.database()
            .execute(Select(By::<Vec<Reservation>, ()>::new(())))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creates_active_reservation() {
        let rt = room_type_of(2, &["101", "102"]);
        let svc = service([rt.clone()]);

        let r = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-02"),
                Board::FullBoard,
            ))
            .await
            .unwrap();

        assert_eq!(r.status, Status::Active);
        assert_eq!(r.room_type_id, rt.id);
        assert_eq!(r.total_cost, Money::from_str("12000").unwrap());
        assert_eq!(r.room_number.unwrap().to_string(), "101");
        assert_eq!(all(&svc).await.len(), 1);
    }

    #[tokio::test]
    async fn charges_multi_night_stay() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);

        let r = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-04"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        assert_eq!(r.total_cost, Money::from_str("33000").unwrap());
    }

    #[tokio::test]
    async fn refuses_unknown_room_type() {
        let svc = service([]);

        let err = svc
            .execute(booking(
                room_type::Id::new(),
                stay("2025-03-01", "2025-03-02"),
                Board::HalfBoard,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoomTypeNotExists(_),
        ));
        assert_eq!(err.as_ref().to_string(), "Room type not found");
    }

    #[tokio::test]
    async fn refuses_cost_out_of_range() {
        let rt = RoomType {
            price: Money::from_str("50000000000000000000000000000").unwrap(),
            ..room_type_of(1, &["101"])
        };
        let svc = service([rt.clone()]);

        let err = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::RoomOnly,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CostOutOfRange));
        assert!(all(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn refuses_overlapping_stay_in_single_room() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        _ = svc
            .execute(booking(
                rt.id,
                stay("2025-03-01", "2025-03-03"),
                Board::FullBoard,
            ))
            .await
            .unwrap();

        let err = svc
            .execute(booking(
                rt.id,
                stay("2025-03-02", "2025-03-04"),
                Board::HalfBoard,
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_ref().to_string(),
            "Room is not available for 2025-03-02 to 2025-03-04",
        );
        assert_eq!(all(&svc).await.len(), 1);
    }

    #[tokio::test]
    async fn never_books_past_capacity() {
        let rt = room_type_of(3, &["101", "102", "103"]);
        let svc = service([rt.clone()]);
        let cmd =
            booking(rt.id, stay("2025-03-01", "2025-03-03"), Board::HalfBoard);

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let r = svc.execute(cmd.clone()).await.unwrap();
            numbers.push(r.room_number.unwrap().to_string());
        }
        let err = svc.execute(cmd).await.unwrap_err();

        assert_eq!(numbers, ["101", "102", "103"]);
        assert!(matches!(err.as_ref(), ExecutionError::NotAvailable(_)));
    }

    #[tokio::test]
    async fn refuses_when_room_numbers_run_out() {
        let rt = room_type_of(2, &["101"]);
        let svc = service([rt.clone()]);
        let cmd =
            booking(rt.id, stay("2025-03-01", "2025-03-03"), Board::HalfBoard);
        _ = svc.execute(cmd.clone()).await.unwrap();

        let err = svc.execute(cmd).await.unwrap_err();

        assert_eq!(
            err.as_ref().to_string(),
            "No available room numbers for the selected type and dates.",
        );
    }

    #[tokio::test]
    async fn canceled_reservation_frees_its_room() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let cmd =
            booking(rt.id, stay("2025-03-01", "2025-03-03"), Board::HalfBoard);
        let mut first = svc.execute(cmd.clone()).await.unwrap();
        first.status = Status::Canceled;
        svc.database()
            .execute(Update(first))
            .await
            .unwrap();

        let second = svc.execute(cmd).await.unwrap();

        assert_eq!(second.room_number.unwrap().to_string(), "101");
    }

    #[tokio::test]
    async fn books_weekly_occurrences() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let cmd = recurring(
            booking(rt.id, stay("2025-04-01", "2025-04-03"), Board::HalfBoard),
            Recurrence::Weekly,
            3,
        );

        let first = svc.execute(cmd).await.unwrap();

        assert_eq!(first.stay, stay("2025-04-01", "2025-04-03"));
        let check_ins = all(&svc)
            .await
            .into_iter()
            .map(|r| r.stay.check_in())
            .collect::<Vec<_>>();
        assert_eq!(
            check_ins,
            ["2025-04-01", "2025-04-08", "2025-04-15"]
                .map(|d| Date::from_str(d).unwrap()),
        );
    }

    #[tokio::test]
    async fn books_all_occurrences_or_none() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        _ = svc
            .execute(booking(
                rt.id,
                stay("2025-04-15", "2025-04-16"),
                Board::HalfBoard,
            ))
            .await
            .unwrap();

        let err = svc
            .execute(recurring(
                booking(
                    rt.id,
                    stay("2025-04-01", "2025-04-03"),
                    Board::HalfBoard,
                ),
                Recurrence::Weekly,
                3,
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_ref().to_string(),
            "Room is not available for 2025-04-15 to 2025-04-17",
        );
        assert_eq!(all(&svc).await.len(), 1);
    }

    #[tokio::test]
    async fn repeats_same_dates_without_recurrence() {
        let rt = room_type_of(2, &["101", "102"]);
        let svc = service([rt.clone()]);

        _ = svc
            .execute(recurring(
                booking(
                    rt.id,
                    stay("2025-04-01", "2025-04-03"),
                    Board::HalfBoard,
                ),
                Recurrence::None,
                2,
            ))
            .await
            .unwrap();

        let numbers = all(&svc)
            .await
            .into_iter()
            .filter_map(|r| r.room_number.map(|n| n.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(numbers.len(), 2);
        assert_ne!(numbers[0], numbers[1]);
    }

    #[tokio::test]
    async fn refuses_collapsing_monthly_occurrence() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);

        let err = svc
            .execute(recurring(
                booking(
                    rt.id,
                    stay("2025-01-30", "2025-01-31"),
                    Board::HalfBoard,
                ),
                Recurrence::Monthly,
                2,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidOccurrence(1),
        ));
        assert!(all(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_bookings_respect_capacity() {
        let rt = room_type_of(2, &["101", "102"]);
        let svc = service([rt.clone()]);
        let cmd =
            booking(rt.id, stay("2025-03-01", "2025-03-03"), Board::HalfBoard);

        let results = futures::future::join_all(
            (0..5).map(|_| svc.execute(cmd.clone())),
        )
        .await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(all(&svc).await.len(), 2);
    }
}
