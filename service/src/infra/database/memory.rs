//! In-process [`Database`] implementation.

use std::{collections::HashMap, future::Future, sync::Arc};

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracerr::Traced;

use crate::{
    domain::{reservation, room_type, Reservation, RoomType},
    infra::{database, Database},
    read,
};

/// In-process [`Database`] keeping everything in memory.
///
/// Changes made in a [`Tx`] become visible to others only once committed.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// [`Memory`] [`Database`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] has been committed already.
    #[display("`Tx` is already committed")]
    AlreadyCommitted,
}

/// Data shared by all the clients of the same [`Memory`] database.
#[derive(Debug, Default)]
struct Storage {
    /// Committed [`Reservation`]s.
    reservations: RwLock<HashMap<reservation::Id, Reservation>>,

    /// Locks serializing [`Tx`]s upon the same [`RoomType`].
    room_type_locks: Mutex<HashMap<room_type::Id, Arc<Mutex<()>>>>,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// [`Storage`] of this client.
    storage: Arc<Storage>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Storage`] to commit into.
    storage: Arc<Storage>,

    /// State of this [`Tx`], or [`None`] once committed.
    state: Arc<Mutex<Option<TxState>>>,
}

/// Uncommitted state of a [`Tx`].
#[derive(Debug, Default)]
struct TxState {
    /// [`Reservation`]s written in the [`Tx`].
    written: HashMap<reservation::Id, Reservation>,

    /// Locks held until the [`Tx`] ends.
    locks: Vec<OwnedMutexGuard<()>>,
}

/// Generic [`Memory`] connection.
pub trait Connection {
    /// Returns all the [`Reservation`]s visible through this [`Connection`].
    ///
    /// # Errors
    ///
    /// If this [`Connection`] cannot be used anymore.
    fn reservations(
        &self,
    ) -> impl Future<
        Output = Result<Vec<Reservation>, Traced<database::Error>>,
    >;

    /// Stores the provided [`Reservation`], replacing the one with the same
    /// ID.
    ///
    /// # Errors
    ///
    /// If this [`Connection`] cannot be used anymore.
    fn store(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<(), Traced<database::Error>>>;
}

impl Connection for NonTx {
    async fn reservations(
        &self,
    ) -> Result<Vec<Reservation>, Traced<database::Error>> {
        Ok(self.storage.reservations.read().await.values().cloned().collect())
    }

    async fn store(
        &self,
        reservation: Reservation,
    ) -> Result<(), Traced<database::Error>> {
        _ = self
            .storage
            .reservations
            .write()
            .await
            .insert(reservation.id, reservation);
        Ok(())
    }
}

impl Tx {
    /// Creates a new [`Tx`] upon the provided [`Storage`].
    fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            state: Arc::new(Mutex::new(Some(TxState::default()))),
        }
    }

    /// Holds the lock of the provided [`RoomType`] until this [`Tx`] ends.
    async fn lock(
        &self,
        id: room_type::Id,
    ) -> Result<(), Traced<database::Error>> {
        let lock = Arc::clone(
            self.storage
                .room_type_locks
                .lock()
                .await
                .entry(id)
                .or_default(),
        );

        let guard = lock.lock_owned().await;

        self.state
            .lock()
            .await
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::AlreadyCommitted))
            .map_err(tracerr::map_from)?
            .locks
            .push(guard);
        Ok(())
    }

    /// Commits this [`Tx`], releasing all its locks.
    async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let TxState { written, locks } = self
            .state
            .lock()
            .await
            .take()
            .ok_or_else(|| tracerr::new!(Error::AlreadyCommitted))
            .map_err(tracerr::map_from)?;

        self.storage.reservations.write().await.extend(written);
        drop(locks);
        Ok(())
    }
}

impl Connection for Tx {
    async fn reservations(
        &self,
    ) -> Result<Vec<Reservation>, Traced<database::Error>> {
        let state = self.state.lock().await;
        let state = state
            .as_ref()
            .ok_or_else(|| tracerr::new!(Error::AlreadyCommitted))
            .map_err(tracerr::map_from)?;

        let mut all = self.storage.reservations.read().await.clone();
        all.extend(state.written.iter().map(|(id, r)| (*id, r.clone())));
        Ok(all.into_values().collect())
    }

    async fn store(
        &self,
        reservation: Reservation,
    ) -> Result<(), Traced<database::Error>> {
        _ = self
            .state
            .lock()
            .await
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::AlreadyCommitted))
            .map_err(tracerr::map_from)?
            .written
            .insert(reservation.id, reservation);
        Ok(())
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::new(Arc::clone(&self.0.storage))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await.map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<RoomType, room_type::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<RoomType, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .lock(by.into_inner())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .reservations()
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .find(|r| r.id == id))
    }
}

impl<C> Database<Select<By<Vec<Reservation>, read::reservation::Overlapping>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Reservation>, read::reservation::Overlapping>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let mut found = self
            .0
            .reservations()
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|r| selector.matches(r))
            .collect::<Vec<_>>();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }
}

impl<C> Database<Select<By<Vec<Reservation>, reservation::UserId>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, reservation::UserId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let mut found = self
            .0
            .reservations()
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|r| r.user_id.as_ref() == Some(&user_id))
            .collect::<Vec<_>>();
        found.sort_by_key(|r| r.stay.check_in());
        Ok(found)
    }
}

impl<C> Database<Select<By<Vec<Reservation>, ()>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Reservation>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut all =
            self.0.reservations().await.map_err(tracerr::wrap!())?;
        all.sort_by_key(|r| r.stay.check_in());
        Ok(all)
    }
}

impl<C> Database<Insert<Reservation>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.store(reservation).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Reservation>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(reservation): Update<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.store(reservation).await.map_err(tracerr::wrap!())
    }
}
