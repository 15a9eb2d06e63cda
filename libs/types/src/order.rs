//! Order lifecycle types
//!
//! An order is a mutable record owned by the book. Its id and initial
//! quantity never change; the remaining quantity only decreases, through
//! `fill`. The single permitted type transition is Market to
//! GoodTillCancel, performed by the engine when it converts an unpriced
//! market order into an aggressive limit order.

use crate::errors::OrderError;
use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// How an order behaves once it reaches the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Rests until completely filled or explicitly cancelled
    GoodTillCancel,
    /// Rests until the configured daily reset instant, then is cancelled
    GoodForDay,
    /// Fills entirely and immediately, or not at all
    FillOrKill,
    /// Fills what it can immediately, the remainder is cancelled
    ImmediateOrCancel,
    /// Unpriced, accepts any available counter-price
    Market,
}

/// A single order.
///
/// `price` is `None` only for a market order that has not yet been
/// converted; every resting order carries a concrete price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_type: OrderType,
    pub order_id: OrderId,
    pub side: Side,
    pub price: Option<Price>,
    pub initial_quantity: Quantity,
    pub remaining_quantity: Quantity,
}

impl Order {
    /// Create a priced order
    pub fn new(
        order_type: OrderType,
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_type,
            order_id,
            side,
            price: Some(price),
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    /// Create an unpriced market order
    pub fn market(order_id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self {
            order_type: OrderType::Market,
            order_id,
            side,
            price: None,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    /// Execute part of the order, decreasing the remaining quantity.
    ///
    /// Refuses a fill larger than what remains; the order is untouched on
    /// failure. Filling zero is permitted and does nothing.
    pub fn fill(&mut self, quantity: Quantity) -> Result<(), OrderError> {
        if quantity > self.remaining_quantity {
            return Err(OrderError::FillExceedsRemaining {
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }
        self.remaining_quantity -= quantity;
        Ok(())
    }

    /// Convert a Market order into a GoodTillCancel order at `price`.
    ///
    /// Used by the engine to turn an unpriced market order into an
    /// aggressive limit order before matching. Any other order type is
    /// refused without mutation.
    pub fn to_good_till_cancel(&mut self, price: Price) -> Result<(), OrderError> {
        if self.order_type != OrderType::Market {
            return Err(OrderError::NotAMarketOrder {
                order_type: self.order_type,
            });
        }
        self.price = Some(price);
        self.order_type = OrderType::GoodTillCancel;
        Ok(())
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Quantity executed so far
    pub fn filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }
}

/// Cancel-and-replace request for an existing order.
///
/// A modification never edits the resting order in place: the engine
/// cancels the original and submits a fresh order built from this request,
/// so the replacement joins the back of its new price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderModify {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderModify {
    pub fn new(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side,
            price,
            quantity,
        }
    }

    /// Build the replacement order, keeping the original's type
    pub fn into_order(self, order_type: OrderType) -> Order {
        Order::new(order_type, self.order_id, self.side, self.price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gtc_buy(id: u64, price: i64, qty: u64) -> Order {
        Order::new(
            OrderType::GoodTillCancel,
            OrderId::new(id),
            Side::Buy,
            Price::new(price),
            Quantity::new(qty),
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_creation() {
        let order = gtc_buy(1, 100, 50);
        assert_eq!(order.remaining_quantity, Quantity::new(50));
        assert_eq!(order.filled_quantity(), Quantity::zero());
        assert!(!order.is_filled());
    }

    #[test]
    fn test_order_fill() {
        let mut order = gtc_buy(1, 100, 50);

        order.fill(Quantity::new(30)).unwrap();
        assert_eq!(order.remaining_quantity, Quantity::new(20));
        assert_eq!(order.filled_quantity(), Quantity::new(30));
        assert!(!order.is_filled());

        order.fill(Quantity::new(20)).unwrap();
        assert!(order.is_filled());
    }

    #[test]
    fn test_order_overfill_refused() {
        let mut order = gtc_buy(1, 100, 50);

        let err = order.fill(Quantity::new(100)).unwrap_err();
        assert_eq!(
            err,
            OrderError::FillExceedsRemaining {
                requested: Quantity::new(100),
                remaining: Quantity::new(50),
            }
        );
        // No mutation on failure
        assert_eq!(order.remaining_quantity, Quantity::new(50));
    }

    #[test]
    fn test_fill_zero_is_noop() {
        let mut order = gtc_buy(1, 100, 50);
        order.fill(Quantity::zero()).unwrap();
        assert_eq!(order.remaining_quantity, Quantity::new(50));
    }

    #[test]
    fn test_market_order_is_unpriced() {
        let order = Order::market(OrderId::new(2), Side::Sell, Quantity::new(10));
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, None);
    }

    #[test]
    fn test_market_conversion() {
        let mut order = Order::market(OrderId::new(2), Side::Buy, Quantity::new(10));
        order.to_good_till_cancel(Price::MAX).unwrap();
        assert_eq!(order.order_type, OrderType::GoodTillCancel);
        assert_eq!(order.price, Some(Price::MAX));
    }

    #[test]
    fn test_conversion_refused_for_limit_order() {
        let mut order = gtc_buy(1, 100, 50);
        let err = order.to_good_till_cancel(Price::new(105)).unwrap_err();
        assert_eq!(
            err,
            OrderError::NotAMarketOrder {
                order_type: OrderType::GoodTillCancel,
            }
        );
        // Price and type unchanged
        assert_eq!(order.price, Some(Price::new(100)));
        assert_eq!(order.order_type, OrderType::GoodTillCancel);
    }

    #[test]
    fn test_modify_into_order_keeps_type() {
        let modify = OrderModify::new(
            OrderId::new(7),
            Side::Sell,
            Price::new(110),
            Quantity::new(25),
        );
        let order = modify.into_order(OrderType::GoodForDay);

        assert_eq!(order.order_type, OrderType::GoodForDay);
        assert_eq!(order.order_id, OrderId::new(7));
        assert_eq!(order.price, Some(Price::new(110)));
        assert_eq!(order.initial_quantity, Quantity::new(25));
    }

    #[test]
    fn test_order_serialization() {
        let order = gtc_buy(9, 101, 7);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
