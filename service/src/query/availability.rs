//! [`Query`]s of a [`RoomType`] capacity.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        availability,
        reservation::{self, Board, Stay},
        room_type, Reservation, RoomType,
    },
    infra::{database, directory, Database, Directory},
    read::{self, reservation::Overlapping},
    Service,
};

use super::Query;

/// [`Query`] checking whether a [`Stay`] can be booked in a [`RoomType`].
#[derive(Clone, Copy, Debug)]
pub struct CheckAvailability {
    /// ID of the [`RoomType`] to check.
    pub room_type_id: room_type::Id,

    /// [`Stay`] to check.
    pub stay: Stay,

    /// [`Board`] the [`Stay`] is requested on.
    pub board: Board,

    /// ID of the [`Reservation`] being changed, if any.
    ///
    /// Such a [`Reservation`] doesn't compete with the requested [`Stay`].
    pub exclude: Option<reservation::Id>,
}

impl<Db, Dir> Query<CheckAvailability> for Service<Db, Dir>
where
    Db: Database<
        Select<By<Vec<Reservation>, Overlapping>>,
        Ok = Vec<Reservation>,
        Err = Traced<database::Error>,
    >,
    Dir: Directory<
        Select<By<Option<RoomType>, room_type::Id>>,
        Ok = Option<RoomType>,
        Err = Traced<directory::Error>,
    >,
{
    type Ok = read::Availability;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: CheckAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckAvailability {
            room_type_id,
            stay,
            board,
            exclude,
        } = query;

        let Some(room_type) = self
            .directory()
            .execute(Select(By::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(read::Availability {
                is_available: false,
                available_room_count: 0,
            });
        };

        let overlapping = self
            .database()
            .execute(Select(By::new(Overlapping {
                room_type_id,
                stay,
                exclude: None,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let available_room_count = availability::available_count(
            room_type.total_rooms,
            &overlapping,
        );
        let competing = overlapping
            .into_iter()
            .filter(|r| Some(r.id) != exclude)
            .collect::<Vec<_>>();

        Ok(read::Availability {
            is_available: availability::is_available(
                room_type.total_rooms,
                stay,
                board,
                &competing,
            ),
            available_room_count,
        })
    }
}

/// [`Query`] counting rooms of a [`RoomType`] not taken by any
/// [`Reservation`] overlapping a [`Stay`], ignoring the time of day.
///
/// Zero is returned for an unknown [`RoomType`].
#[derive(Clone, Copy, Debug)]
pub struct AvailableCount {
    /// ID of the [`RoomType`] to count rooms of.
    pub room_type_id: room_type::Id,

    /// [`Stay`] to count rooms for.
    pub stay: Stay,
}

impl<Db, Dir> Query<AvailableCount> for Service<Db, Dir>
where
    Db: Database<
        Select<By<Vec<Reservation>, Overlapping>>,
        Ok = Vec<Reservation>,
        Err = Traced<database::Error>,
    >,
    Dir: Directory<
        Select<By<Option<RoomType>, room_type::Id>>,
        Ok = Option<RoomType>,
        Err = Traced<directory::Error>,
    >,
{
    type Ok = i32;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        AvailableCount {
            room_type_id,
            stay,
        }: AvailableCount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Some(room_type) = self
            .directory()
            .execute(Select(By::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(0);
        };

        let overlapping = self
            .database()
            .execute(Select(By::new(Overlapping {
                room_type_id,
                stay,
                exclude: None,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(availability::available_count(
            room_type.total_rooms,
            &overlapping,
        ))
    }
}

/// Error of [`CheckAvailability`] or [`AvailableCount`] [`Query`] execution.
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
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Handler as _};

    use crate::{
        command::tests_support::{room_type_of, service, stay},
        domain::{
            reservation::{tests_support::reservation, Board, Status},
            room_type, Reservation,
        },
        read::Availability,
    };

    use super::{AvailableCount, CheckAvailability};

    fn booked(
        room_type_id: room_type::Id,
        check_in: &str,
        check_out: &str,
        board: Board,
    ) -> Reservation {
        let mut r = reservation(stay(check_in, check_out), board, None);
        r.room_type_id = room_type_id;
        r
    }

    #[tokio::test]
    async fn reports_unknown_room_type_unavailable() {
        let svc = service([]);

        let availability = svc
            .execute(CheckAvailability {
                room_type_id: room_type::Id::new(),
                stay: stay("2025-03-01", "2025-03-03"),
                board: Board::HalfBoard,
                exclude: None,
            })
            .await
            .unwrap();
        assert_eq!(
            availability,
            Availability {
                is_available: false,
                available_room_count: 0,
            },
        );

        let count = svc
            .execute(AvailableCount {
                room_type_id: room_type::Id::new(),
                stay: stay("2025-03-01", "2025-03-03"),
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn single_room_blocked_by_overlapping_stay() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let existing =
            booked(rt.id, "2025-03-01", "2025-03-03", Board::FullBoard);
        svc.database().execute(Insert(existing)).await.unwrap();

        let availability = svc
            .execute(CheckAvailability {
                room_type_id: rt.id,
                stay: stay("2025-03-02", "2025-03-04"),
                board: Board::HalfBoard,
                exclude: None,
            })
            .await
            .unwrap();

        assert!(!availability.is_available);
        assert_eq!(availability.available_room_count, 0);
    }

    #[tokio::test]
    async fn excluded_reservation_does_not_compete() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let existing =
            booked(rt.id, "2025-03-01", "2025-03-03", Board::FullBoard);
        let id = existing.id;
        svc.database().execute(Insert(existing)).await.unwrap();

        let availability = svc
            .execute(CheckAvailability {
                room_type_id: rt.id,
                stay: stay("2025-03-02", "2025-03-04"),
                board: Board::HalfBoard,
                exclude: Some(id),
            })
            .await
            .unwrap();

        assert!(availability.is_available);
        // Counting ignores the excluded reservation.
        assert_eq!(availability.available_room_count, 0);
    }

    #[tokio::test]
    async fn counts_by_dates_only() {
        let rt = room_type_of(3, &["101", "102", "103"]);
        let svc = service([rt.clone()]);
        let mut canceled =
            booked(rt.id, "2025-03-01", "2025-03-05", Board::HalfBoard);
        canceled.status = Status::Canceled;
        for r in [
            booked(rt.id, "2025-03-01", "2025-03-03", Board::FullBoard),
            booked(rt.id, "2025-03-02", "2025-03-04", Board::HalfBoard),
            booked(rt.id, "2025-03-04", "2025-03-06", Board::HalfBoard),
            booked(
                room_type::Id::new(),
                "2025-03-01",
                "2025-03-04",
                Board::RoomOnly,
            ),
            canceled,
        ] {
            svc.database().execute(Insert(r)).await.unwrap();
        }

        let count = svc
            .execute(AvailableCount {
                room_type_id: rt.id,
                stay: stay("2025-03-02", "2025-03-03"),
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn reports_overbooking_as_negative_count() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        for _ in 0..3 {
            let r =
                booked(rt.id, "2025-03-01", "2025-03-03", Board::HalfBoard);
            svc.database().execute(Insert(r)).await.unwrap();
        }

        let count = svc
            .execute(AvailableCount {
                room_type_id: rt.id,
                stay: stay("2025-03-01", "2025-03-03"),
            })
            .await
            .unwrap();

        assert_eq!(count, -2);
    }

    #[tokio::test]
    async fn arrival_after_departure_fits_single_room() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let existing =
            booked(rt.id, "2025-03-01", "2025-03-03", Board::HalfBoard);
        svc.database().execute(Insert(existing)).await.unwrap();

        let availability = svc
            .execute(CheckAvailability {
                room_type_id: rt.id,
                stay: stay("2025-03-03", "2025-03-05"),
                board: Board::FullBoard,
                exclude: None,
            })
            .await
            .unwrap();

        assert!(availability.is_available);
        assert_eq!(availability.available_room_count, 1);
    }

    #[tokio::test]
    async fn lookup_by_query_is_database_backed() {
        let rt = room_type_of(1, &["101"]);
        let svc = service([rt.clone()]);
        let r = booked(rt.id, "2025-03-01", "2025-03-03", Board::HalfBoard);
        let id = r.id;
        svc.database().execute(Insert(r)).await.unwrap();

        let found = svc
            .execute(crate::query::reservation::ById::by(id))
            .await
            .unwrap();

        assert_eq!(found.map(|r| r.id), Some(id));
    }
}
