//! Trade execution records
//!
//! A trade is a symmetric pair: one record for the buy side, one for the
//! sell side. Each side carries its own order id and its own price, which
//! is the price that order carried when the match happened. When an
//! aggressive buy at 105 lifts a resting sell at 100, the bid record says
//! 105 and the ask record says 100.

use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// One side of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInfo {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

impl TradeInfo {
    pub fn new(order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            price,
            quantity,
        }
    }
}

/// A full transaction including both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub bid: TradeInfo,
    pub ask: TradeInfo,
}

impl Trade {
    pub fn new(bid: TradeInfo, ask: TradeInfo) -> Self {
        Self { bid, ask }
    }
}

/// Trades produced by a single book operation, in execution order
pub type Trades = Vec<Trade>;
