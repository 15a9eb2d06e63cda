//! Order book core
//!
//! The `Orderbook` owns every resting order and keeps two views of them
//! coherent at all times: the price-ordered bid/ask ladders and the
//! id-keyed order index. Every insertion writes both; every removal path
//! touches both. The order index maps each id to the arena slot of its
//! node, and the node's intrusive links are the position handle that makes
//! cancellation O(1) without scanning the price level.
//!
//! Matching is price-time priority: the best bid and best ask trade while
//! their prices cross, FIFO within a level, and the book is never left
//! crossed when an operation returns.

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use types::errors::{ClockError, RejectReason};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderModify, OrderType, Side};
use types::trade::{Trade, TradeInfo, Trades};

use crate::book::{AskBook, BidBook, BookDepth, OrderArena, OrderNode};
use crate::clock::DayClock;
use crate::feed::{
    BookSnapshotMessage, FeedError, FeedStats, MarketDataMessage, NewOrderMessage,
};
use crate::matching::{crossing, fok};
use crate::rules::ExchangeRules;

/// First id used for orders synthesized from book snapshots. High enough
/// that venue-assigned ids cannot collide with it.
pub const SYNTHETIC_ID_BASE: u64 = 1 << 56;

/// Limit order book with price-time priority matching.
///
/// Not thread-safe: the book is a single-owner component and all
/// operations take `&mut self`. Callers needing concurrency serialize
/// access externally.
pub struct Orderbook {
    /// Storage for every resting order
    arena: OrderArena,
    /// Order id to arena slot, the O(1) cancellation path
    orders: HashMap<OrderId, usize>,
    /// Buy side, best (highest) price first
    bids: BidBook,
    /// Sell side, best (lowest) price first
    asks: AskBook,
    /// Daily reset clock for GoodForDay orders
    clock: DayClock,
    /// Venue validation rules
    rules: ExchangeRules,
    /// Market data processing statistics
    stats: FeedStats,
    /// Last snapshot sequence number seen on the feed
    last_sequence_number: u64,
    /// Whether an initial snapshot has been applied
    initialized: bool,
}

impl Orderbook {
    pub fn new() -> Self {
        Self::with_clock(DayClock::default())
    }

    /// Create a book with a caller-supplied day-reset clock.
    pub fn with_clock(clock: DayClock) -> Self {
        Self {
            arena: OrderArena::new(),
            orders: HashMap::new(),
            bids: BidBook::new(),
            asks: AskBook::new(),
            clock,
            rules: ExchangeRules::default(),
            stats: FeedStats::new(),
            last_sequence_number: 0,
            initialized: false,
        }
    }

    /// Configure venue trading rules.
    pub fn set_exchange_rules(&mut self, rules: ExchangeRules) {
        self.rules = rules;
    }

    /// Current venue trading rules.
    pub fn exchange_rules(&self) -> &ExchangeRules {
        &self.rules
    }

    /// Change the instant at which GoodForDay orders expire.
    pub fn set_day_reset_time(&mut self, hour: u32, minute: u32) -> Result<(), ClockError> {
        self.clock.set_reset_time(hour, minute)
    }

    /// Submit an order and attempt to match it.
    ///
    /// Market orders are converted to aggressive limit orders first; a
    /// market order against an empty opposite side is dropped. Returns the
    /// trades produced, empty when the order was rejected.
    pub fn add_order(&mut self, mut order: Order) -> Trades {
        self.check_and_reset_day();

        if order.order_type == OrderType::Market {
            let converted = match order.side {
                Side::Buy if !self.asks.is_empty() => {
                    order.to_good_till_cancel(Price::MAX).is_ok()
                }
                Side::Sell if !self.bids.is_empty() => {
                    order.to_good_till_cancel(Price::MIN).is_ok()
                }
                _ => false,
            };
            if !converted {
                debug!(
                    order_id = %order.order_id,
                    reason = %RejectReason::EmptyBook,
                    "order rejected"
                );
                return Trades::new();
            }
        }

        let order_id = order.order_id;
        let order_type = order.order_type;

        let price = match self.validate_order(&order) {
            Ok(price) => price,
            Err(reason) => {
                debug!(order_id = %order_id, %reason, "order rejected");
                return Trades::new();
            }
        };

        // An IOC that cannot trade at all is dropped without resting
        if order_type == OrderType::ImmediateOrCancel && !self.can_match(order.side, price) {
            return Trades::new();
        }

        // All-or-nothing orders never enter the book
        if order_type == OrderType::FillOrKill {
            return self.match_fill_or_kill(order, price);
        }

        self.insert_resting(order);
        let trades = self.match_orders();

        // An IOC remainder never rests. Cancelling by id is correct no
        // matter where the match loop left the order.
        if order_type == OrderType::ImmediateOrCancel {
            self.cancel_order(order_id);
        }

        trades
    }

    /// Remove an order from the book. Unknown ids are a no-op.
    pub fn cancel_order(&mut self, order_id: OrderId) {
        let Some(idx) = self.orders.remove(&order_id) else {
            return;
        };
        let side = self.arena[idx].order.side;
        let price = self.resting_price(idx);
        match side {
            Side::Buy => {
                self.bids.unlink(&mut self.arena, idx, price);
                self.bids.erase_level_if_empty(price);
            }
            Side::Sell => {
                self.asks.unlink(&mut self.arena, idx, price);
                self.asks.erase_level_if_empty(price);
            }
        }
        self.arena.remove(idx);
    }

    /// Replace an existing order with new parameters.
    ///
    /// Cancel-and-replace: the replacement keeps the original's type but
    /// joins the back of its new price level, so time priority is lost.
    /// Unknown ids produce no trades and no change.
    pub fn modify_order(&mut self, modify: OrderModify) -> Trades {
        self.check_and_reset_day();

        let Some(&idx) = self.orders.get(&modify.order_id) else {
            return Trades::new();
        };
        let order_type = self.arena[idx].order.order_type;
        self.cancel_order(modify.order_id);
        self.add_order(modify.into_order(order_type))
    }

    /// Number of resting orders.
    pub fn size(&self) -> usize {
        self.orders.len()
    }

    /// Aggregated quantity per price level on both sides.
    pub fn depth(&self) -> BookDepth {
        BookDepth {
            bids: self.bids.depth(),
            asks: self.asks.depth(),
        }
    }

    /// Apply one market data message, updating statistics and latency.
    ///
    /// Failures increment the error counter and return false; they never
    /// unwind.
    pub fn process_market_data(&mut self, message: &MarketDataMessage) -> bool {
        let start = Instant::now();
        match self.apply_message(message) {
            Ok(()) => {
                self.stats.messages_processed += 1;
                self.stats.record_latency(start.elapsed());
                true
            }
            Err(err) => {
                warn!(kind = message.kind_label(), %err, "market data message failed");
                self.stats.errors += 1;
                false
            }
        }
    }

    /// Apply messages in order, returning how many succeeded.
    pub fn process_market_data_batch(&mut self, messages: &[MarketDataMessage]) -> usize {
        messages
            .iter()
            .filter(|message| self.process_market_data(message))
            .count()
    }

    /// Market data processing statistics.
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Clear all statistics counters and latency aggregates.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Whether an initial snapshot has been applied. Incremental updates
    /// before that point may describe orders the book has never seen.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sequence number of the last snapshot applied.
    pub fn last_sequence_number(&self) -> u64 {
        self.last_sequence_number
    }

    // ---- validation ----

    /// Validate an order against the book and the venue rules, returning
    /// its concrete price on success. Converted market orders at extreme
    /// prices skip the price and notional checks.
    fn validate_order(&self, order: &Order) -> Result<Price, RejectReason> {
        if self.orders.contains_key(&order.order_id) {
            return Err(RejectReason::DuplicateOrderId);
        }

        let Some(price) = order.price else {
            // Unpriced orders of a priced type never come out of the
            // public constructors, but the field is public
            return Err(RejectReason::InvalidOrderType);
        };
        let converted_market = price.is_extreme();

        if !converted_market && !self.rules.is_valid_price(price) {
            return Err(RejectReason::InvalidPrice);
        }

        if !self.rules.is_valid_quantity(order.remaining_quantity) {
            let quantity = order.remaining_quantity;
            return Err(if quantity < self.rules.min_quantity {
                RejectReason::BelowMinQuantity
            } else if quantity > self.rules.max_quantity {
                RejectReason::AboveMaxQuantity
            } else {
                RejectReason::InvalidQuantity
            });
        }

        if !converted_market && !self.rules.is_valid_notional(price, order.remaining_quantity) {
            return Err(RejectReason::BelowMinNotional);
        }

        Ok(price)
    }

    /// Whether an order at `price` could trade against the opposite side.
    fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self
                .asks
                .best_price()
                .is_some_and(|ask| crossing::can_match(price, ask)),
            Side::Sell => self
                .bids
                .best_price()
                .is_some_and(|bid| crossing::can_match(bid, price)),
        }
    }

    // ---- book mutation ----

    /// Allocate an order in the arena, link it at the back of its price
    /// level, and index it by id.
    fn insert_resting(&mut self, order: Order) {
        let order_id = order.order_id;
        let side = order.side;
        let price = order.price.expect("resting order has a price");
        let idx = self.arena.insert(OrderNode::new(order));
        match side {
            Side::Buy => self.bids.insert(&mut self.arena, idx, price),
            Side::Sell => self.asks.insert(&mut self.arena, idx, price),
        }
        self.orders.insert(order_id, idx);
    }

    /// Price a resting order is linked at.
    fn resting_price(&self, idx: usize) -> Price {
        self.arena[idx].order.price.expect("resting order has a price")
    }

    /// Fill a resting order in place, keeping the level aggregate in step,
    /// and remove it from all three indexes once fully filled. The level
    /// entry itself is left for the caller to erase.
    fn fill_resting(&mut self, side: Side, price: Price, idx: usize, quantity: Quantity) {
        match side {
            Side::Buy => {
                if let Some(level) = self.bids.level_mut(price) {
                    level.reduce_total(quantity);
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.level_mut(price) {
                    level.reduce_total(quantity);
                }
            }
        }

        // quantity is clamped to this order's remainder before the call
        if self.arena[idx].order.fill(quantity).is_err() {
            unreachable!("matched quantity exceeds resting remainder");
        }

        if self.arena[idx].order.is_filled() {
            let order_id = self.arena[idx].order.order_id;
            match side {
                Side::Buy => self.bids.unlink(&mut self.arena, idx, price),
                Side::Sell => self.asks.unlink(&mut self.arena, idx, price),
            }
            self.orders.remove(&order_id);
            self.arena.remove(idx);
        }
    }

    // ---- matching ----

    /// Drain the crossing region of the book.
    ///
    /// Outer loop: while both sides are non-empty and the best prices
    /// cross. Inner loop: trade the two head orders FIFO until one level
    /// drains. Emptied price entries are erased only after the inner loop,
    /// never mid-drain.
    fn match_orders(&mut self) -> Trades {
        let mut trades = Trades::with_capacity(self.orders.len());

        loop {
            let (bid_price, ask_price) =
                match (self.bids.best_price(), self.asks.best_price()) {
                    (Some(bid), Some(ask)) => (bid, ask),
                    _ => break,
                };
            if bid_price < ask_price {
                break;
            }

            loop {
                let (bid_idx, ask_idx) =
                    match (self.bids.front_at(bid_price), self.asks.front_at(ask_price)) {
                        (Some(bid), Some(ask)) => (bid, ask),
                        _ => break,
                    };

                let quantity = self.arena[bid_idx]
                    .order
                    .remaining_quantity
                    .min(self.arena[ask_idx].order.remaining_quantity);

                // Each side records its own resting price
                trades.push(Trade::new(
                    TradeInfo::new(self.arena[bid_idx].order.order_id, bid_price, quantity),
                    TradeInfo::new(self.arena[ask_idx].order.order_id, ask_price, quantity),
                ));

                self.fill_resting(Side::Buy, bid_price, bid_idx, quantity);
                self.fill_resting(Side::Sell, ask_price, ask_idx, quantity);
            }

            self.bids.erase_level_if_empty(bid_price);
            self.asks.erase_level_if_empty(ask_price);
        }

        trades
    }

    /// All-or-nothing path: plan against the opposite side without
    /// touching it, then execute only if the whole quantity is covered.
    /// The incoming order never enters the book.
    fn match_fill_or_kill(&mut self, mut order: Order, price: Price) -> Trades {
        let plan = fok::plan(
            order.side,
            price,
            order.remaining_quantity,
            &self.bids,
            &self.asks,
            &self.arena,
        );

        if !plan.is_complete() {
            debug!(
                order_id = %order.order_id,
                unfilled = %plan.unfilled,
                "fill-or-kill cannot be fully filled"
            );
            return Trades::new();
        }

        let resting_side = order.side.opposite();
        let mut trades = Trades::with_capacity(plan.fills.len());

        for (idx, quantity) in plan.fills {
            let resting_id = self.arena[idx].order.order_id;
            let resting_price = self.resting_price(idx);

            trades.push(match order.side {
                Side::Buy => Trade::new(
                    TradeInfo::new(order.order_id, price, quantity),
                    TradeInfo::new(resting_id, resting_price, quantity),
                ),
                Side::Sell => Trade::new(
                    TradeInfo::new(resting_id, resting_price, quantity),
                    TradeInfo::new(order.order_id, price, quantity),
                ),
            });

            // The plan covers exactly the incoming quantity
            if order.fill(quantity).is_err() {
                unreachable!("fill plan exceeds incoming quantity");
            }
            self.fill_resting(resting_side, resting_price, idx, quantity);
            match resting_side {
                Side::Buy => self.bids.erase_level_if_empty(resting_price),
                Side::Sell => self.asks.erase_level_if_empty(resting_price),
            }
        }

        trades
    }

    // ---- daily reset ----

    fn check_and_reset_day(&mut self) {
        if self.clock.should_reset_day() {
            self.cancel_good_for_day_orders();
            self.clock.mark_reset_occurred();
        }
    }

    fn cancel_good_for_day_orders(&mut self) {
        // Materialize ids first; cancelling mutates the index being walked
        let expired: Vec<OrderId> = self
            .orders
            .iter()
            .filter(|(_, &idx)| self.arena[idx].order.order_type == OrderType::GoodForDay)
            .map(|(&order_id, _)| order_id)
            .collect();

        if !expired.is_empty() {
            info!(count = expired.len(), "daily reset, cancelling GoodForDay orders");
        }
        for order_id in expired {
            self.cancel_order(order_id);
        }
    }

    // ---- market data ----

    fn apply_message(&mut self, message: &MarketDataMessage) -> Result<(), FeedError> {
        match message {
            MarketDataMessage::NewOrder(msg) => self.apply_new_order(msg),
            MarketDataMessage::Cancel(msg) => {
                self.cancel_order(msg.order_id);
                self.stats.cancellations += 1;
            }
            MarketDataMessage::Modify(msg) => {
                self.modify_order(OrderModify::new(
                    msg.order_id,
                    msg.side,
                    msg.new_price,
                    msg.new_quantity,
                ));
                self.stats.modifications += 1;
            }
            MarketDataMessage::Trade(msg) => {
                // Informational only, never reconciled against book state
                debug!(
                    buy_order_id = %msg.buy_order_id,
                    sell_order_id = %msg.sell_order_id,
                    quantity = %msg.quantity,
                    "trade report"
                );
                self.stats.trades += 1;
            }
            MarketDataMessage::Snapshot(msg) => self.apply_snapshot(msg)?,
        }
        Ok(())
    }

    fn apply_new_order(&mut self, msg: &NewOrderMessage) {
        let order = if msg.order_type == OrderType::Market {
            Order::market(msg.order_id, msg.side, msg.quantity)
        } else {
            Order::new(msg.order_type, msg.order_id, msg.side, msg.price, msg.quantity)
        };
        let trades = self.add_order(order);
        self.stats.new_orders += 1;
        self.stats.trades += trades.len() as u64;
    }

    /// Rebuild the whole book from an aggregated snapshot.
    ///
    /// The book is cleared first, then one GoodTillCancel order per
    /// non-empty level is synthesized with ids from the reserved range. A
    /// failure partway leaves a partially rebuilt book; the next snapshot
    /// replaces it wholesale.
    fn apply_snapshot(&mut self, msg: &BookSnapshotMessage) -> Result<(), FeedError> {
        debug!(
            sequence = msg.sequence_number,
            bid_levels = msg.bids.len(),
            ask_levels = msg.asks.len(),
            "rebuilding book from snapshot"
        );

        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.arena.clear();

        let mut next_id = SYNTHETIC_ID_BASE;
        for level in &msg.bids {
            if level.quantity.is_zero() {
                continue;
            }
            if level.price.as_i64() <= 0 {
                return Err(FeedError::InvalidSnapshotLevel { price: level.price });
            }
            self.insert_resting(Order::new(
                OrderType::GoodTillCancel,
                OrderId::new(next_id),
                Side::Buy,
                level.price,
                level.quantity,
            ));
            next_id += 1;
        }
        for level in &msg.asks {
            if level.quantity.is_zero() {
                continue;
            }
            if level.price.as_i64() <= 0 {
                return Err(FeedError::InvalidSnapshotLevel { price: level.price });
            }
            self.insert_resting(Order::new(
                OrderType::GoodTillCancel,
                OrderId::new(next_id),
                Side::Sell,
                level.price,
                level.quantity,
            ));
            next_id += 1;
        }

        // Gap detection is reporting only; no retransmission is requested
        if self.initialized && msg.sequence_number > self.last_sequence_number + 1 {
            self.stats.sequence_gaps += 1;
            warn!(
                expected = self.last_sequence_number + 1,
                received = msg.sequence_number,
                "sequence gap detected in snapshot feed"
            );
        }

        self.initialized = true;
        self.last_sequence_number = msg.sequence_number;
        self.stats.snapshots += 1;
        Ok(())
    }
}

impl Default for Orderbook {
    fn default() -> Self {
        Self::new()
    }
}
