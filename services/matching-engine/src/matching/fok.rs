//! Fill plan for all-or-nothing orders
//!
//! A FillOrKill order must either execute in full immediately or leave the
//! book untouched. Instead of matching and rolling back, the engine first
//! builds a plan here without mutating anything, and only executes it once
//! the plan covers the whole incoming quantity.

use types::numeric::{Price, Quantity};
use types::order::Side;

use crate::book::{AskBook, BidBook, OrderArena};
use crate::matching::crossing;

/// The resting orders a full fill would consume, in match order.
#[derive(Debug)]
pub(crate) struct FillPlan {
    /// (arena index, quantity to take) per resting order
    pub fills: Vec<(usize, Quantity)>,
    /// Quantity the opposite side could not cover at crossing prices
    pub unfilled: Quantity,
}

impl FillPlan {
    pub fn is_complete(&self) -> bool {
        self.unfilled.is_zero()
    }
}

/// Walk the opposite side in best-price order, FIFO within each level,
/// accumulating fills until the incoming quantity is covered or prices stop
/// crossing. Read-only: the book and arena are untouched.
pub(crate) fn plan(
    side: Side,
    price: Price,
    quantity: Quantity,
    bids: &BidBook,
    asks: &AskBook,
    arena: &OrderArena,
) -> FillPlan {
    let mut remaining = quantity;
    let mut fills = Vec::new();

    match side {
        Side::Buy => {
            'levels: for (ask_price, level) in asks.levels_best_first() {
                if !crossing::can_match(price, ask_price) {
                    break;
                }
                for idx in level.iter(arena) {
                    let take = remaining.min(arena[idx].order.remaining_quantity);
                    fills.push((idx, take));
                    remaining -= take;
                    if remaining.is_zero() {
                        break 'levels;
                    }
                }
            }
        }
        Side::Sell => {
            'levels: for (bid_price, level) in bids.levels_best_first() {
                if !crossing::can_match(bid_price, price) {
                    break;
                }
                for idx in level.iter(arena) {
                    let take = remaining.min(arena[idx].order.remaining_quantity);
                    fills.push((idx, take));
                    remaining -= take;
                    if remaining.is_zero() {
                        break 'levels;
                    }
                }
            }
        }
    }

    FillPlan {
        fills,
        unfilled: remaining,
    }
}
