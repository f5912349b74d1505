//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction begins lazily, on the first operation performed by this
/// client, and holds its [`connection::Tx`] until committed or dropped.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to take the [`Connection`] from.
    non_tx: NonTx,

    /// Lazily begun [`connection::Tx`].
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            non_tx: client,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the underlying [`connection::Tx`] of this [`Tx`] client,
    /// beginning it if necessary.
    async fn connection(
        &self,
    ) -> Result<MutexGuard<'_, Option<connection::Tx>>, Traced<database::Error>>
    {
        let mut tx = self.tx.lock().await;
        if tx.is_none() {
            let conn =
                self.non_tx.connection().await.map_err(tracerr::wrap!())?;
            *tx = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(tx)
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.commit().await.map_err(tracerr::wrap!())
        } else {
            // Nothing has been done in this `Tx`.
            Ok(())
        }
    }
}

/// Runs the provided operation upon the [`connection::Tx`] of a [`Tx`]
/// client.
macro_rules! with_tx {
    ($client:expr, |$conn:ident| $op:expr) => {{
        let guard = $client.connection().await.map_err(tracerr::wrap!())?;
        let $conn = guard
            .as_ref()
            .expect("`connection::Tx` is begun by `Tx::connection()`");
        $op.await.map_err(tracerr::wrap!())
    }};
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        with_tx!(self, |conn| conn.query(stmt, params))
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        with_tx!(self, |conn| conn.query_opt(stmt, params))
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        with_tx!(self, |conn| conn.exec(stmt, params))
    }
}
