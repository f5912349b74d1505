//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
use rust_decimal::Decimal;

use crate::Money;

/// Floating-point percentage.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided values is
    /// not less than `0` and not greater than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Reduces the provided [`Money`] by this [`Percent`], so `price * (1 -
    /// percent / 100)` is returned.
    #[must_use]
    pub fn apply_discount(self, price: Money) -> Money {
        let rest = Decimal::ONE - self.0 / Decimal::ONE_HUNDRED;
        price
            .amount()
            .checked_mul(rest)
            .and_then(Money::new)
            .unwrap_or(Money::ZERO)
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}
