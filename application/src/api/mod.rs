//! GraphQL API definitions.

mod mutation;
mod query;
pub mod reservation;
pub mod scalar;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{mutation::Mutation, query::Query, reservation::Reservation};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum ReservationError {
        #[code = "RESERVATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Reservation not found."]
        NotExists,
    }
}
