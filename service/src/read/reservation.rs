//! [`Reservation`]-related read definitions.

use crate::domain::{
    reservation::{self, Stay},
    room_type, Reservation,
};

/// Selector of non-canceled [`Reservation`]s of a room type whose [`Stay`]
/// shares at least a day with the provided one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Overlapping {
    /// ID of the room type to select [`Reservation`]s of.
    pub room_type_id: room_type::Id,

    /// [`Stay`] to select overlapping [`Reservation`]s for.
    pub stay: Stay,

    /// ID of the [`Reservation`] to leave out, if any.
    pub exclude: Option<reservation::Id>,
}

impl Overlapping {
    /// Checks whether the provided [`Reservation`] matches this selector.
    #[must_use]
    pub fn matches(&self, r: &Reservation) -> bool {
        r.room_type_id == self.room_type_id
            && r.is_active()
            && r.stay.overlaps(self.stay)
            && Some(r.id) != self.exclude
    }
}

/// Capacity of a room type for a [`Stay`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Availability {
    /// Indicator whether the [`Stay`] can be booked.
    pub is_available: bool,

    /// Number of rooms not taken by any overlapping [`Reservation`].
    ///
    /// Counted by dates only, so may disagree with the
    /// [`Availability::is_available`].
    pub available_room_count: i32,
}
