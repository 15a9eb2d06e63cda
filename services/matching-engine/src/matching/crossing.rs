//! Crossing detection logic
//!
//! Determines when a bid and an ask can trade based on price alone.

use types::numeric::Price;
use types::order::Side;

/// Check if a bid and an ask can match at the given prices.
///
/// A buy matches a sell exactly when the bid price is at or above the ask
/// price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order crosses a resting order on the opposite side.
pub fn incoming_can_match(side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match side {
        Side::Buy => incoming_price >= resting_price,
        Side::Sell => incoming_price <= resting_price,
    }
}
