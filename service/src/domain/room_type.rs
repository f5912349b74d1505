//! [`RoomType`] definitions.

use common::{Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::reservation::Board;

/// Category of interchangeable physical rooms sharing price and features.
#[derive(Clone, Debug)]
pub struct RoomType {
    /// ID of this [`RoomType`].
    pub id: Id,

    /// [`Name`] of this [`RoomType`].
    pub name: Name,

    /// Total number of physical rooms of this [`RoomType`].
    pub total_rooms: u16,

    /// [`RoomNumber`]s to allocate reservations from, in their preference
    /// order.
    ///
    /// May differ in length from the [`RoomType::total_rooms`].
    pub room_numbers: Vec<RoomNumber>,

    /// Nightly price of this [`RoomType`].
    pub price: Money,

    /// Discount applied to the nightly [`RoomType::price`].
    pub discount: Percent,

    /// [`MealPrices`] of this [`RoomType`].
    pub meals: MealPrices,
}

impl RoomType {
    /// Creates a placeholder [`RoomType`] with zero capacity.
    ///
    /// Used instead of a real [`RoomType`] whenever it cannot be retrieved,
    /// so any availability check upon it fails.
    #[must_use]
    pub fn unavailable(id: Id) -> Self {
        Self {
            id,
            name: Name(Name::UNAVAILABLE.into()),
            total_rooms: 0,
            room_numbers: Vec::new(),
            price: Money::ZERO,
            discount: Percent::default(),
            meals: MealPrices::default(),
        }
    }

    /// Returns the nightly price of this [`RoomType`] with its discount
    /// applied.
    #[must_use]
    pub fn base_price_after_discount(&self) -> Money {
        self.discount.apply_discount(self.price)
    }
}

/// ID of a [`RoomType`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`RoomType`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// [`Name`] of a [`RoomType::unavailable()`].
    pub const UNAVAILABLE: &'static str = "Room Service Unavailable";

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Label of a concrete physical room of a [`RoomType`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct RoomNumber(String);

impl RoomNumber {
    /// Creates a new [`RoomNumber`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Checks whether the given `num` is a valid [`RoomNumber`].
    fn check(num: impl AsRef<str>) -> bool {
        let num = num.as_ref();
        num.trim() == num && !num.is_empty() && num.len() <= 10
    }
}

impl FromStr for RoomNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `RoomNumber`")
    }
}

/// Prices of the meals served in a [`RoomType`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MealPrices {
    /// Price of a breakfast.
    pub breakfast: Money,

    /// Price of a lunch.
    pub lunch: Money,

    /// Price of a dinner.
    pub dinner: Money,
}

impl MealPrices {
    /// Returns the cost of meals for a single night on the provided [`Board`].
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn per_night(self, board: Board) -> Option<Money> {
        match board {
            Board::FullBoard => self
                .breakfast
                .checked_add(self.lunch)?
                .checked_add(self.dinner),
            Board::HalfBoard => self.breakfast.checked_add(self.dinner),
            Board::RoomOnly => Some(Money::ZERO),
        }
    }

    /// Returns the cost of meals for the arrival night of a multi-night stay.
    ///
    /// Always a breakfast with a dinner, whatever [`Board`] is chosen.
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn arrival_night(self) -> Option<Money> {
        self.breakfast.checked_add(self.dinner)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Money, Percent};

    use crate::domain::reservation::Board;

    use super::{Id, MealPrices, RoomNumber, RoomType};

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn validates_room_number() {
        assert!(RoomNumber::new("101").is_some());
        assert!(RoomNumber::new("A-1201").is_some());

        assert!(RoomNumber::new("").is_none());
        assert!(RoomNumber::new(" 101").is_none());
        assert!(RoomNumber::new("12345678901").is_none());
    }

    #[test]
    fn discounts_base_price() {
        let mut room_type = RoomType::unavailable(Id::new());
        room_type.price = money("10000");
        room_type.discount = Percent::from_str("10").unwrap();

        assert_eq!(room_type.base_price_after_discount(), money("9000"));
    }

    #[test]
    fn unavailable_has_no_capacity() {
        let id = Id::new();
        let room_type = RoomType::unavailable(id);

        assert_eq!(room_type.id, id);
        assert_eq!(room_type.total_rooms, 0);
        assert!(room_type.room_numbers.is_empty());
        assert_eq!(
            AsRef::<str>::as_ref(&room_type.name),
            "Room Service Unavailable",
        );
        assert_eq!(room_type.base_price_after_discount(), Money::ZERO);
    }

    #[test]
    fn prices_meals_per_board() {
        let meals = MealPrices {
            breakfast: money("1000"),
            lunch: money("1500"),
            dinner: money("2000"),
        };

        assert_eq!(meals.per_night(Board::FullBoard), Some(money("4500")));
        assert_eq!(meals.per_night(Board::HalfBoard), Some(money("3000")));
        assert_eq!(meals.per_night(Board::RoomOnly), Some(Money::ZERO));
        assert_eq!(meals.arrival_night(), Some(money("3000")));
    }
}
