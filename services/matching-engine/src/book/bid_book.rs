//! Bid (buy-side) order book
//!
//! Buy orders keyed by price, iterated best (highest) price first. BTreeMap
//! keeps iteration order deterministic and best-price access O(log P).

use std::collections::BTreeMap;
use types::numeric::Price;

use super::price_level::{OrderArena, PriceLevel};
use super::LevelInfo;

/// Bid side of the book. The highest price is the best bid.
#[derive(Debug, Default)]
pub(crate) struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link an already-allocated order node into its price level, creating
    /// the level if needed. The order joins the back of the FIFO queue.
    pub fn insert(&mut self, arena: &mut OrderArena, idx: usize, price: Price) {
        self.levels.entry(price).or_default().push_back(arena, idx);
    }

    /// Unlink an order node from its level without touching the price
    /// entry. Callers erase the entry separately once they are done
    /// processing the level.
    pub fn unlink(&mut self, arena: &mut OrderArena, idx: usize, price: Price) {
        if let Some(level) = self.levels.get_mut(&price) {
            level.unlink(arena, idx);
        }
    }

    /// Drop the price entry if its queue has drained.
    pub fn erase_level_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Best (highest) bid price, if any.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Arena index of the first order at `price` in time priority.
    pub fn front_at(&self, price: Price) -> Option<usize> {
        self.levels.get(&price).and_then(|l| l.front())
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Price levels in matching order (best first).
    pub fn levels_best_first(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().rev().map(|(price, level)| (*price, level))
    }

    /// Aggregated depth, best price first.
    pub fn depth(&self) -> Vec<LevelInfo> {
        self.levels
            .iter()
            .rev()
            .map(|(price, level)| LevelInfo {
                price: *price,
                quantity: level.total_quantity(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
