//! Cost calculation of a [`Stay`].

use common::Money;

use crate::domain::{
    reservation::{Board, Stay},
    RoomType,
};

/// Calculates the total cost of the provided `stay` in the `room_type` on
/// the `board`.
///
/// A single night costs the discounted room price plus the meals of the
/// `board`. Longer stays charge the arrival night's meals as a breakfast with
/// a dinner, and every further night's meals by the `board`, while the
/// discounted room price is charged for every night.
///
/// [`None`] is returned if the cost doesn't fit into [`Money`].
#[must_use]
pub fn total_cost(
    room_type: &RoomType,
    stay: Stay,
    board: Board,
) -> Option<Money> {
    let nights = stay.nights().max(1);
    let room = room_type.base_price_after_discount();
    let meals = room_type.meals;

    if nights == 1 {
        return room.checked_add(meals.per_night(board)?);
    }

    meals
        .arrival_night()?
        .checked_add(meals.per_night(board)?.checked_mul(nights - 1)?)?
        .checked_add(room.checked_mul(nights)?)
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Money, Percent};

    use crate::domain::{
        reservation::{Board, Stay},
        room_type::{self, MealPrices},
        RoomType,
    };

    use super::total_cost;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> Stay {
        Stay::new(check_in.parse().unwrap(), check_out.parse().unwrap())
            .unwrap()
    }

    fn room_type() -> RoomType {
        RoomType {
            price: money("10000"),
            discount: Percent::from_str("10").unwrap(),
            meals: MealPrices {
                breakfast: money("1000"),
                lunch: money("1000"),
                dinner: money("1000"),
            },
            ..RoomType::unavailable(room_type::Id::new())
        }
    }

    #[test]
    fn single_night() {
        let rt = room_type();
        let one = stay("2025-03-01", "2025-03-02");

        assert_eq!(
            total_cost(&rt, one, Board::FullBoard),
            Some(money("12000")),
        );
        assert_eq!(
            total_cost(&rt, one, Board::HalfBoard),
            Some(money("11000")),
        );
        assert_eq!(total_cost(&rt, one, Board::RoomOnly), Some(money("9000")));
    }

    #[test]
    fn two_nights() {
        let rt = room_type();
        let two = stay("2025-03-01", "2025-03-03");

        // (1000 + 1000) + 1 * 3000 + 9000 * 2
        assert_eq!(
            total_cost(&rt, two, Board::FullBoard),
            Some(money("23000")),
        );
        // (1000 + 1000) + 1 * 2000 + 9000 * 2
        assert_eq!(
            total_cost(&rt, two, Board::HalfBoard),
            Some(money("22000")),
        );
    }

    #[test]
    fn three_nights_half_board() {
        let rt = room_type();
        let three = stay("2025-03-01", "2025-03-04");

        assert_eq!(
            total_cost(&rt, three, Board::HalfBoard),
            Some(money("33000")),
        );
    }

    /// Documented current behavior: the arrival night of a multi-night stay
    /// is charged a breakfast with a dinner even without any meal plan.
    #[test]
    fn arrival_night_meals_charged_without_board() {
        let rt = room_type();
        let two = stay("2025-03-01", "2025-03-03");

        assert_eq!(total_cost(&rt, two, Board::RoomOnly), Some(money("20000")));
    }

    #[test]
    fn is_deterministic() {
        let rt = room_type();
        let s = stay("2025-12-30", "2026-01-04");

        assert_eq!(
            total_cost(&rt, s, Board::FullBoard),
            total_cost(&rt, s, Board::FullBoard),
        );
        assert_eq!(total_cost(&rt, s, Board::FullBoard), Some(money("59000")));
    }

    #[test]
    fn applies_no_discount_when_zero() {
        let rt = RoomType {
            discount: Percent::default(),
            ..room_type()
        };

        assert_eq!(
            total_cost(&rt, stay("2025-03-01", "2025-03-02"), Board::RoomOnly),
            Some(money("10000")),
        );
    }

    #[test]
    fn refuses_overflowing_cost() {
        let rt = RoomType {
            price: money("50000000000000000000000000000"),
            discount: Percent::default(),
            ..room_type()
        };
        let two = stay("2025-03-01", "2025-03-03");

        assert_eq!(total_cost(&rt, two, Board::RoomOnly), None);

        let rt = RoomType {
            meals: MealPrices {
                breakfast: rt.price,
                ..rt.meals
            },
            ..rt
        };
        let one = stay("2025-03-01", "2025-03-02");
        assert_eq!(total_cost(&rt, one, Board::FullBoard), None);
        assert_eq!(total_cost(&rt, one, Board::HalfBoard), None);
    }
}
