//! Market data ingestion: snapshots, incremental updates, statistics, and
//! the daily GoodForDay purge.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Local, TimeZone};
use matching_engine::clock::{DayClock, TimeSource};
use matching_engine::feed::{
    BookSnapshotMessage, CancelOrderMessage, MarketDataMessage, ModifyOrderMessage,
    NewOrderMessage, SnapshotLevel, TradeMessage,
};
use matching_engine::Orderbook;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

const TS: i64 = 1_708_123_456_789_000_000;

fn level(price: i64, quantity: u64, order_count: u32) -> SnapshotLevel {
    SnapshotLevel {
        price: Price::new(price),
        quantity: Quantity::new(quantity),
        order_count,
    }
}

fn snapshot(sequence_number: u64) -> MarketDataMessage {
    MarketDataMessage::Snapshot(BookSnapshotMessage {
        bids: vec![level(100, 500, 3), level(99, 300, 2), level(98, 450, 4)],
        asks: vec![level(101, 400, 2), level(102, 350, 3), level(103, 500, 4)],
        timestamp: TS,
        sequence_number,
    })
}

fn new_order(id: u64, side: Side, price: i64, quantity: u64) -> MarketDataMessage {
    MarketDataMessage::NewOrder(NewOrderMessage {
        order_id: OrderId::new(id),
        side,
        price: Price::new(price),
        quantity: Quantity::new(quantity),
        order_type: OrderType::GoodTillCancel,
        timestamp: TS,
    })
}

#[test]
fn snapshot_initializes_the_book() {
    let mut book = Orderbook::new();
    assert!(!book.is_initialized());

    assert!(book.process_market_data(&snapshot(1000)));

    assert!(book.is_initialized());
    assert_eq!(book.last_sequence_number(), 1000);
    // One synthetic order per level
    assert_eq!(book.size(), 6);

    let depth = book.depth();
    assert_eq!(depth.bids[0].price, Price::new(100));
    assert_eq!(depth.bids[0].quantity, Quantity::new(500));
    assert_eq!(depth.asks[0].price, Price::new(101));
    assert_eq!(depth.asks[0].quantity, Quantity::new(400));

    assert_eq!(book.stats().snapshots, 1);
    assert_eq!(book.stats().messages_processed, 1);
}

#[test]
fn snapshot_replaces_previous_book() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));
    book.process_market_data(&new_order(5001, Side::Buy, 100, 250));
    assert_eq!(book.size(), 7);

    let replacement = MarketDataMessage::Snapshot(BookSnapshotMessage {
        bids: vec![level(95, 100, 1)],
        asks: vec![level(96, 100, 1)],
        timestamp: TS,
        sequence_number: 1001,
    });
    book.process_market_data(&replacement);

    assert_eq!(book.size(), 2);
    assert_eq!(book.depth().bids[0].price, Price::new(95));
    assert_eq!(book.last_sequence_number(), 1001);
}

#[test]
fn snapshot_skips_empty_levels() {
    let mut book = Orderbook::new();
    let msg = MarketDataMessage::Snapshot(BookSnapshotMessage {
        bids: vec![level(100, 500, 3), level(99, 0, 0)],
        asks: vec![level(101, 400, 2)],
        timestamp: TS,
        sequence_number: 1,
    });

    assert!(book.process_market_data(&msg));
    assert_eq!(book.size(), 2);
    assert_eq!(book.depth().bids.len(), 1);
}

#[test]
fn synthetic_ids_do_not_collide_with_feed_ids() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));

    // A venue id equal to a small integer must still be insertable
    assert!(book.process_market_data(&new_order(1, Side::Buy, 100, 50)));
    assert_eq!(book.depth().bids[0].quantity, Quantity::new(550));
}

#[test]
fn incremental_updates_flow_through_the_book() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));

    // Join the best bid
    book.process_market_data(&new_order(5001, Side::Buy, 100, 250));
    assert_eq!(book.depth().bids[0].quantity, Quantity::new(750));

    // A crossing sell trades against it
    book.process_market_data(&new_order(5002, Side::Sell, 100, 150));
    assert_eq!(book.depth().bids[0].quantity, Quantity::new(600));
    assert_eq!(book.stats().trades, 1);

    // Cancel the rest of the joined order
    book.process_market_data(&MarketDataMessage::Cancel(CancelOrderMessage {
        order_id: OrderId::new(5001),
        timestamp: TS,
    }));
    // 500 synthetic minus the 150 traded
    assert_eq!(book.depth().bids[0].quantity, Quantity::new(350));

    let stats = book.stats();
    assert_eq!(stats.new_orders, 2);
    assert_eq!(stats.cancellations, 1);
    assert_eq!(stats.messages_processed, 4);
    assert_eq!(stats.errors, 0);
}

#[test]
fn modify_message_moves_an_order() {
    let mut book = Orderbook::new();
    book.process_market_data(&new_order(1, Side::Buy, 100, 50));

    book.process_market_data(&MarketDataMessage::Modify(ModifyOrderMessage {
        order_id: OrderId::new(1),
        side: Side::Buy,
        new_price: Price::new(98),
        new_quantity: Quantity::new(75),
        timestamp: TS,
    }));

    let depth = book.depth();
    assert_eq!(depth.bids[0].price, Price::new(98));
    assert_eq!(depth.bids[0].quantity, Quantity::new(75));
    assert_eq!(book.stats().modifications, 1);
}

#[test]
fn cancel_of_unknown_order_still_counts() {
    let mut book = Orderbook::new();
    assert!(book.process_market_data(&MarketDataMessage::Cancel(CancelOrderMessage {
        order_id: OrderId::new(404),
        timestamp: TS,
    })));
    assert_eq!(book.stats().cancellations, 1);
    assert_eq!(book.stats().errors, 0);
}

#[test]
fn trade_messages_are_informational() {
    let mut book = Orderbook::new();
    book.process_market_data(&new_order(1, Side::Buy, 100, 50));
    let size_before = book.size();

    book.process_market_data(&MarketDataMessage::Trade(TradeMessage {
        buy_order_id: OrderId::new(1),
        sell_order_id: OrderId::new(2),
        price: Price::new(100),
        quantity: Quantity::new(50),
        timestamp: TS,
    }));

    // The book is not reconciled against trade reports
    assert_eq!(book.size(), size_before);
    assert_eq!(book.stats().trades, 1);
}

#[test]
fn batch_processing_applies_in_order() {
    let mut book = Orderbook::new();

    let mut batch = vec![snapshot(1000)];
    for i in 0..100u64 {
        let (side, price) = if i % 2 == 0 {
            (Side::Buy, 99)
        } else {
            (Side::Sell, 102)
        };
        batch.push(new_order(2000 + i, side, price, 50));
    }

    let succeeded = book.process_market_data_batch(&batch);
    assert_eq!(succeeded, batch.len());
    assert_eq!(book.stats().messages_processed as usize, batch.len());
    assert_eq!(book.size(), 106);
}

#[test]
fn corrupt_snapshot_level_reports_an_error() {
    let mut book = Orderbook::new();
    let msg = MarketDataMessage::Snapshot(BookSnapshotMessage {
        bids: vec![level(-5, 100, 1)],
        asks: vec![],
        timestamp: TS,
        sequence_number: 1,
    });

    assert!(!book.process_market_data(&msg));
    assert_eq!(book.stats().errors, 1);
    assert_eq!(book.stats().messages_processed, 0);
    // A failed snapshot still cleared the book; the next good one heals it
    assert!(book.process_market_data(&snapshot(2)));
    assert_eq!(book.size(), 6);
}

#[test]
fn sequence_gaps_are_counted_not_repaired() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));
    assert_eq!(book.stats().sequence_gaps, 0);

    // 1001 is contiguous
    book.process_market_data(&snapshot(1001));
    assert_eq!(book.stats().sequence_gaps, 0);

    // 1005 skips three
    book.process_market_data(&snapshot(1005));
    assert_eq!(book.stats().sequence_gaps, 1);
    assert_eq!(book.last_sequence_number(), 1005);
}

#[test]
fn stats_reset_clears_everything() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));
    book.process_market_data(&new_order(1, Side::Buy, 100, 50));
    assert!(book.stats().messages_processed > 0);

    book.reset_stats();
    let stats = book.stats();
    assert_eq!(stats.messages_processed, 0);
    assert_eq!(stats.new_orders, 0);
    assert_eq!(stats.snapshots, 0);
    assert_eq!(stats.average_latency_micros(), 0.0);
}

#[test]
fn latency_is_tracked_per_message() {
    let mut book = Orderbook::new();
    book.process_market_data(&snapshot(1000));
    book.process_market_data(&new_order(1, Side::Buy, 100, 50));

    let stats = book.stats();
    assert!(stats.min_latency <= stats.max_latency);
    assert!(stats.total_processing_time >= stats.max_latency);
}

/// Time source the test advances by hand.
struct ManualTime(Rc<Cell<DateTime<Local>>>);

impl TimeSource for ManualTime {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}

fn book_at(hour: u32, minute: u32) -> (Orderbook, Rc<Cell<DateTime<Local>>>) {
    let start = Local.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap();
    let handle = Rc::new(Cell::new(start));
    let clock = DayClock::with_source(15, 59, Box::new(ManualTime(handle.clone()))).unwrap();
    (Orderbook::with_clock(clock), handle)
}

fn set_time(handle: &Rc<Cell<DateTime<Local>>>, hour: u32, minute: u32) {
    handle.set(Local.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap());
}

#[test]
fn good_for_day_orders_expire_at_the_reset_instant() {
    let (mut book, time) = book_at(9, 0);

    book.add_order(Order::new(
        OrderType::GoodForDay,
        OrderId::new(1),
        Side::Buy,
        Price::new(100),
        Quantity::new(10),
    ));
    book.add_order(Order::new(
        OrderType::GoodForDay,
        OrderId::new(2),
        Side::Sell,
        Price::new(110),
        Quantity::new(10),
    ));
    book.add_order(Order::new(
        OrderType::GoodTillCancel,
        OrderId::new(3),
        Side::Sell,
        Price::new(120),
        Quantity::new(10),
    ));
    assert_eq!(book.size(), 3);

    // Before the reset instant nothing expires
    set_time(&time, 15, 58);
    book.add_order(Order::new(
        OrderType::GoodTillCancel,
        OrderId::new(4),
        Side::Buy,
        Price::new(90),
        Quantity::new(10),
    ));
    assert_eq!(book.size(), 4);

    // The next operation past the instant purges both GoodForDay orders
    set_time(&time, 16, 0);
    book.add_order(Order::new(
        OrderType::GoodTillCancel,
        OrderId::new(5),
        Side::Buy,
        Price::new(91),
        Quantity::new(10),
    ));
    assert_eq!(book.size(), 3);
    // And only once per instant
    book.cancel_order(OrderId::new(5));
    book.add_order(Order::new(
        OrderType::GoodForDay,
        OrderId::new(6),
        Side::Buy,
        Price::new(92),
        Quantity::new(10),
    ));
    assert_eq!(book.size(), 3);
}

#[test]
fn day_reset_time_is_validated() {
    let mut book = Orderbook::new();
    assert!(book.set_day_reset_time(24, 0).is_err());
    assert!(book.set_day_reset_time(12, 60).is_err());
    assert!(book.set_day_reset_time(16, 30).is_ok());
}
