//! Market data messages and processing statistics
//!
//! Message definitions for an external exchange feed: incremental updates
//! (new orders, cancellations, modifications, trades) and full book
//! snapshots for recovery and synchronization. The engine consumes these
//! through `Orderbook::process_market_data`.
//!
//! Timestamps are Unix nanoseconds from the exchange clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};

/// Incremental update: a new order added to the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderMessage {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub order_type: OrderType,
    pub timestamp: i64,
}

/// Incremental update: an order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderMessage {
    pub order_id: OrderId,
    pub timestamp: i64,
}

/// Incremental update: an order's price or quantity changed.
///
/// Applied as cancel-and-replace, so the order loses time priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderMessage {
    pub order_id: OrderId,
    pub side: Side,
    pub new_price: Price,
    pub new_quantity: Quantity,
    pub timestamp: i64,
}

/// Incremental update: a trade between two orders. Informational only;
/// the engine counts it without reconciling against book state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeMessage {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: i64,
}

/// Aggregated data for one price level in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: u32,
}

/// Full order book snapshot.
///
/// Used for initial book construction and recovery after feed gaps. The
/// sequence number lets a consumer spot missed increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshotMessage {
    pub bids: Vec<SnapshotLevel>,
    pub asks: Vec<SnapshotLevel>,
    pub timestamp: i64,
    pub sequence_number: u64,
}

/// Any market data message, dispatched by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketDataMessage {
    NewOrder(NewOrderMessage),
    Cancel(CancelOrderMessage),
    Modify(ModifyOrderMessage),
    Trade(TradeMessage),
    Snapshot(BookSnapshotMessage),
}

impl MarketDataMessage {
    /// Message kind as a string label for logging.
    pub fn kind_label(&self) -> &'static str {
        match self {
            MarketDataMessage::NewOrder(_) => "NewOrder",
            MarketDataMessage::Cancel(_) => "Cancel",
            MarketDataMessage::Modify(_) => "Modify",
            MarketDataMessage::Trade(_) => "Trade",
            MarketDataMessage::Snapshot(_) => "Snapshot",
        }
    }
}

/// Errors surfaced while applying a market data message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("snapshot level with non-positive price {price}")]
    InvalidSnapshotLevel { price: Price },
}

/// Statistics for market data processing.
///
/// Counters by message kind, error and sequence-gap counts, and
/// processing-latency aggregates. Latency fields only cover successfully
/// applied messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStats {
    pub messages_processed: u64,
    pub new_orders: u64,
    pub cancellations: u64,
    pub modifications: u64,
    pub trades: u64,
    pub snapshots: u64,
    pub errors: u64,
    pub sequence_gaps: u64,
    pub total_processing_time: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for FeedStats {
    fn default() -> Self {
        Self {
            messages_processed: 0,
            new_orders: 0,
            cancellations: 0,
            modifications: 0,
            trades: 0,
            snapshots: 0,
            errors: 0,
            sequence_gaps: 0,
            total_processing_time: Duration::ZERO,
            min_latency: Duration::MAX,
            max_latency: Duration::ZERO,
        }
    }
}

impl FeedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one successful message's latency into the aggregates.
    pub fn record_latency(&mut self, latency: Duration) {
        self.total_processing_time += latency;
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
    }

    /// Average processing latency in microseconds, 0.0 before any message.
    pub fn average_latency_micros(&self) -> f64 {
        if self.messages_processed == 0 {
            return 0.0;
        }
        self.total_processing_time.as_micros() as f64 / self.messages_processed as f64
    }

    /// Clear all counters and timing aggregates.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
