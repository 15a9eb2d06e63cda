//! Order book infrastructure module
//!
//! Contains the order arena, price levels, bid book, and ask book, plus the
//! aggregated depth view returned to readers.

pub(crate) mod ask_book;
pub(crate) mod bid_book;
pub(crate) mod price_level;

pub(crate) use ask_book::AskBook;
pub(crate) use bid_book::BidBook;
pub(crate) use price_level::{OrderArena, OrderNode};

use serde::{Deserialize, Serialize};
use types::numeric::{Price, Quantity};

/// Aggregated information for a single price level: the total remaining
/// quantity across all orders resting at that price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Complete market depth view of the order book.
///
/// Bids are sorted best (highest) price first, asks best (lowest) price
/// first, so the touch is at index 0 on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDepth {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}
