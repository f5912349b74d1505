//! Read entities definitions.

pub mod reservation;

pub use self::reservation::Availability;
