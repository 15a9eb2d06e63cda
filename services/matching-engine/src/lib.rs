//! Matching Engine
//!
//! Central limit order book with price-time priority matching and market
//! data ingestion.
//!
//! **Performance targets:**
//! - Add (non-matching): O(log P) in the number of price levels
//! - Cancel: O(1) lookup and unlink, plus O(log P) when a level empties
//! - Match loop: linear in orders touched, no work on untouched levels
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced; FIFO within a price level
//! - Every resting order is indexed by id and linked in exactly one level
//! - The resting book is never crossed between operations
//! - FillOrKill executes entirely or leaves the book untouched
//!
//! The engine is a single-owner component: all operations take `&mut self`
//! and run to completion on the caller's thread. Callers that need
//! concurrency serialize access externally.

pub mod book;
pub mod clock;
pub mod engine;
pub mod feed;
pub mod matching;
pub mod rules;

pub use engine::Orderbook;
