//! Error taxonomy for the order book
//!
//! All rejections are reported as values; nothing in the engine unwinds
//! across its public boundary.

use crate::numeric::Quantity;
use crate::order::OrderType;
use thiserror::Error;

/// Why an incoming order was rejected by exchange-rule validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    #[error("order id already exists in the book")]
    DuplicateOrderId,

    #[error("price does not conform to tick size")]
    InvalidPrice,

    #[error("quantity does not conform to lot size")]
    InvalidQuantity,

    #[error("quantity below exchange minimum")]
    BelowMinQuantity,

    #[error("quantity above exchange maximum")]
    AboveMaxQuantity,

    #[error("order value below minimum notional")]
    BelowMinNotional,

    #[error("unsupported order type")]
    InvalidOrderType,

    #[error("market order against an empty book")]
    EmptyBook,
}

/// Errors from direct order mutation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    #[error("fill of {requested} exceeds remaining quantity {remaining}")]
    FillExceedsRemaining {
        requested: Quantity,
        remaining: Quantity,
    },

    #[error("cannot convert {order_type:?} to GoodTillCancel, only Market orders convert")]
    NotAMarketOrder { order_type: OrderType },
}

/// Errors from day-reset clock configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    #[error("invalid reset time {hour:02}:{minute:02}, hour must be 0-23 and minute 0-59")]
    InvalidResetTime { hour: u32, minute: u32 },
}
