//! Exchange trading rules
//!
//! Pure validation of prices and quantities against venue microstructure:
//! tick size, lot size, order-size bounds, and the notional floor. The
//! engine consults these before an order may touch the book; converted
//! market orders at extreme prices skip the price and notional checks.

use types::numeric::{notional, Price, Quantity};

/// Venue microstructure parameters.
///
/// `tick_size` and `lot_size` must be at least 1; `max_quantity` must be at
/// least `min_quantity`. The defaults accept any positive integer price and
/// quantity up to one million lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRules {
    /// Minimum price increment in ticks
    pub tick_size: i64,
    /// Minimum quantity increment in lots
    pub lot_size: u64,
    /// Smallest accepted order size
    pub min_quantity: Quantity,
    /// Largest accepted order size
    pub max_quantity: Quantity,
    /// Minimum order value (price times quantity)
    pub min_notional: i128,
}

impl Default for ExchangeRules {
    fn default() -> Self {
        Self {
            tick_size: 1,
            lot_size: 1,
            min_quantity: Quantity::new(1),
            max_quantity: Quantity::new(1_000_000),
            min_notional: 0,
        }
    }
}

impl ExchangeRules {
    /// A price is valid when positive and on a tick boundary.
    pub fn is_valid_price(&self, price: Price) -> bool {
        let ticks = price.as_i64();
        ticks > 0 && ticks % self.tick_size == 0
    }

    /// A quantity is valid when inside the size bounds and on a lot
    /// boundary.
    pub fn is_valid_quantity(&self, quantity: Quantity) -> bool {
        quantity >= self.min_quantity
            && quantity <= self.max_quantity
            && quantity.as_u64() % self.lot_size == 0
    }

    /// An order's value must meet the notional floor. The product is
    /// computed in i128 so it cannot overflow.
    pub fn is_valid_notional(&self, price: Price, quantity: Quantity) -> bool {
        notional(price, quantity) >= self.min_notional
    }

    /// All three checks together.
    pub fn is_valid_order(&self, price: Price, quantity: Quantity) -> bool {
        self.is_valid_price(price)
            && self.is_valid_quantity(quantity)
            && self.is_valid_notional(price, quantity)
    }

    /// Round a price down to the nearest tick boundary.
    pub fn round_to_tick(&self, price: Price) -> Price {
        if self.tick_size <= 1 {
            return price;
        }
        Price::new((price.as_i64() / self.tick_size) * self.tick_size)
    }

    /// Round a quantity down to the nearest lot boundary.
    pub fn round_to_lot(&self, quantity: Quantity) -> Quantity {
        if self.lot_size <= 1 {
            return quantity;
        }
        Quantity::new((quantity.as_u64() / self.lot_size) * self.lot_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_rules() -> ExchangeRules {
        ExchangeRules {
            tick_size: 5,
            lot_size: 10,
            min_quantity: Quantity::new(10),
            max_quantity: Quantity::new(1_000),
            min_notional: 1_000,
        }
    }

    #[test]
    fn test_default_accepts_simple_orders() {
        let rules = ExchangeRules::default();
        assert!(rules.is_valid_order(Price::new(1), Quantity::new(1)));
        assert!(rules.is_valid_order(Price::new(100), Quantity::new(999_999)));
    }

    #[test]
    fn test_price_must_be_positive() {
        let rules = ExchangeRules::default();
        assert!(!rules.is_valid_price(Price::new(0)));
        assert!(!rules.is_valid_price(Price::new(-100)));
    }

    #[test]
    fn test_price_tick_conformance() {
        let rules = strict_rules();
        assert!(rules.is_valid_price(Price::new(100)));
        assert!(!rules.is_valid_price(Price::new(103)));
    }

    #[test]
    fn test_quantity_bounds() {
        let rules = strict_rules();
        assert!(rules.is_valid_quantity(Quantity::new(20)));
        assert!(!rules.is_valid_quantity(Quantity::new(5))); // below min
        assert!(!rules.is_valid_quantity(Quantity::new(2_000))); // above max
        assert!(!rules.is_valid_quantity(Quantity::new(15))); // off lot
    }

    #[test]
    fn test_notional_floor() {
        let rules = strict_rules();
        // 150 * 10 = 1500 >= 1000
        assert!(rules.is_valid_notional(Price::new(150), Quantity::new(10)));
        // 50 * 10 = 500 < 1000
        assert!(!rules.is_valid_notional(Price::new(50), Quantity::new(10)));
    }

    #[test]
    fn test_notional_no_overflow() {
        let rules = ExchangeRules::default();
        // Would overflow i64; must not panic or wrap negative
        assert!(rules.is_valid_notional(Price::new(i64::MAX - 1), Quantity::new(1_000_000)));
    }

    #[test]
    fn test_round_to_tick() {
        let rules = strict_rules();
        assert_eq!(rules.round_to_tick(Price::new(103)), Price::new(100));
        assert_eq!(rules.round_to_tick(Price::new(100)), Price::new(100));
    }

    #[test]
    fn test_round_to_lot() {
        let rules = strict_rules();
        assert_eq!(rules.round_to_lot(Quantity::new(17)), Quantity::new(10));
        assert_eq!(rules.round_to_lot(Quantity::new(20)), Quantity::new(20));
    }

    #[test]
    fn test_round_passthrough_at_unit() {
        let rules = ExchangeRules::default();
        assert_eq!(rules.round_to_tick(Price::new(103)), Price::new(103));
        assert_eq!(rules.round_to_lot(Quantity::new(17)), Quantity::new(17));
    }
}
