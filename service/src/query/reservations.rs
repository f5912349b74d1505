//! [`Query`] collection related to the multiple [`Reservation`]s.

use common::operations::By;

use crate::domain::{reservation, Reservation};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Reservation`]s made by a user, ordered by their
/// check-in dates.
pub type ByUser = DatabaseQuery<By<Vec<Reservation>, reservation::UserId>>;

/// Queries all the [`Reservation`]s, ordered by their check-in dates.
pub type All = DatabaseQuery<By<Vec<Reservation>, ()>>;
