//! Domain definitions.

pub mod allocation;
pub mod availability;
pub mod pricing;
pub mod reservation;
pub mod room_type;

pub use self::{reservation::Reservation, room_type::RoomType};
