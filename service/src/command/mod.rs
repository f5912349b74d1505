//! [`Command`] definition.

pub mod cancel_reservation;
pub mod create_reservation;
pub mod update_reservation;
pub mod update_reservation_status;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_reservation::{CancelReservation, Cancellation},
    create_reservation::CreateReservation,
    update_reservation::UpdateReservation,
    update_reservation_status::UpdateReservationStatus,
};
