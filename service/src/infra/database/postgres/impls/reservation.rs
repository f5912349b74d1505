//! [`Reservation`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        reservation::{self, Guest, RecurrenceCount, Status, Stay},
        room_type, Reservation, RoomType,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, Tx},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `reservations` table, in the order [`from_row()`] expects
/// them.
macro_rules! columns {
    () => {
        "id, user_id, room_type_id, \
         first_name, last_name, email, phone, country, \
         book_for, is_work_related, special_request, \
         check_in, check_out, pay_by, board, total_cost, \
         status, admin_note, recurrence, recurrence_count, room_number, \
         created_at, updated_at"
    };
}

/// Maps the provided [`Row`] of the `reservations` table to a
/// [`Reservation`].
fn from_row(row: &Row) -> Reservation {
    Reservation {
        id: row.get("id"),
        user_id: row.get("user_id"),
        room_type_id: row.get("room_type_id"),
        guest: Guest {
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            phone: row.get("phone"),
            country: row.get("country"),
            book_for: row.get("book_for"),
            is_work_related: row.get("is_work_related"),
            special_request: row.get("special_request"),
        },
        stay: Stay::new(row.get("check_in"), row.get("check_out"))
            .expect("`reservations_stay_check` constraint violated"),
        pay_by: row.get("pay_by"),
        board: row.get("board"),
        total_cost: row.get("total_cost"),
        status: row.get("status"),
        admin_note: row.get("admin_note"),
        recurrence: row.get("recurrence"),
        recurrence_count: u16::try_from(
            row.get::<_, i16>("recurrence_count"),
        )
        .ok()
        .and_then(RecurrenceCount::new)
        .expect("`reservations_recurrence_count_check` constraint violated"),
        room_number: row.get("room_number"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reservation::Id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM reservations \
              WHERE id = $1::UUID \
              LIMIT 1",
        );
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Reservation>, read::reservation::Overlapping>>>
    for Postgres<C>
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
        let read::reservation::Overlapping {
            room_type_id,
            stay,
            exclude,
        } = by.into_inner();
        let (check_in, check_out) = (stay.check_in(), stay.check_out());

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM reservations \
              WHERE room_type_id = $1::UUID \
                AND status <> $2::INT2 \
                AND check_in < $4::DATE \
                AND check_out > $3::DATE \
                AND ($5::UUID IS NULL OR id <> $5::UUID) \
              ORDER BY created_at ASC",
        );
        Ok(self
            .query(
                SQL,
                &[
                    &room_type_id,
                    &Status::Canceled,
                    &check_in,
                    &check_out,
                    &exclude,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Reservation>, reservation::UserId>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, reservation::UserId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: reservation::UserId = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM reservations \
              WHERE user_id = $1::VARCHAR \
              ORDER BY check_in ASC, created_at ASC",
        );
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Reservation>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Reservation>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM reservations \
              ORDER BY check_in ASC, created_at ASC",
        );
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Reservation>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<Reservation>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(reservation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Reservation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(reservation): Update<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        let Reservation {
            id,
            user_id,
            room_type_id,
            guest:
                Guest {
                    first_name,
                    last_name,
                    email,
                    phone,
                    country,
                    book_for,
                    is_work_related,
                    special_request,
                },
            stay,
            pay_by,
            board,
            total_cost,
            status,
            admin_note,
            recurrence,
            recurrence_count,
            room_number,
            created_at,
            updated_at,
        } = reservation;

        let (check_in, check_out) = (stay.check_in(), stay.check_out());
        let recurrence_count = i16::try_from(recurrence_count.get())
            .expect("`RecurrenceCount::MAX` fits into `INT2`");

        const SQL: &str = concat!(
            "INSERT INTO reservations (",
            columns!(),
            ") VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                $8::VARCHAR, \
                $9::VARCHAR, $10::BOOL, $11::VARCHAR, \
                $12::DATE, $13::DATE, $14::VARCHAR, $15::INT2, \
                $16::NUMERIC, \
                $17::INT2, $18::VARCHAR, $19::INT2, $20::INT2, \
                $21::VARCHAR, \
                $22::TIMESTAMPTZ, $23::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET user_id = EXCLUDED.user_id, \
                room_type_id = EXCLUDED.room_type_id, \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                country = EXCLUDED.country, \
                book_for = EXCLUDED.book_for, \
                is_work_related = EXCLUDED.is_work_related, \
                special_request = EXCLUDED.special_request, \
                check_in = EXCLUDED.check_in, \
                check_out = EXCLUDED.check_out, \
                pay_by = EXCLUDED.pay_by, \
                board = EXCLUDED.board, \
                total_cost = EXCLUDED.total_cost, \
                status = EXCLUDED.status, \
                admin_note = EXCLUDED.admin_note, \
                recurrence = EXCLUDED.recurrence, \
                recurrence_count = EXCLUDED.recurrence_count, \
                room_number = EXCLUDED.room_number, \
                updated_at = EXCLUDED.updated_at",
        );
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &room_type_id,
                &first_name,
                &last_name,
                &email,
                &phone,
                &country,
                &book_for,
                &is_work_related,
                &special_request,
                &check_in,
                &check_out,
                &pay_by,
                &board,
                &total_cost,
                &status,
                &admin_note,
                &recurrence,
                &recurrence_count,
                &room_number,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Lock<By<RoomType, room_type::Id>>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<RoomType, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room_type::Id = by.into_inner();

        // Touching the row keeps it locked until the transaction ends.
        const SQL: &str = "\
            INSERT INTO room_types_lock (id) \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
