//! Integer price and quantity types
//!
//! Prices are signed integers in ticks (smallest representable increment,
//! e.g. cents) and quantities are unsigned integers in lots. Integer
//! representation keeps comparisons exact and arithmetic deterministic;
//! there is no floating point anywhere in the book.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Price in integer ticks.
///
/// Signed so the full range is available as "match anything" sentinels for
/// converted market orders: a converted market buy carries `Price::MAX`, a
/// converted market sell `Price::MIN`. Exchange validation skips orders at
/// these extremes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Lowest representable price, used by converted market sells
    pub const MIN: Price = Price(i64::MIN);
    /// Highest representable price, used by converted market buys
    pub const MAX: Price = Price(i64::MAX);

    /// Create a Price from raw ticks
    pub const fn new(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick value
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether this is one of the extreme sentinel prices a market order
    /// is converted to before matching.
    pub const fn is_extreme(&self) -> bool {
        self.0 == i64::MAX || self.0 == i64::MIN
    }
}

impl From<i64> for Price {
    fn from(ticks: i64) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity in integer lots. Cannot be negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Create a Quantity from raw lots
    pub const fn new(lots: u64) -> Self {
        Self(lots)
    }

    /// The zero quantity
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the raw lot value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if the quantity is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtraction that returns None instead of wrapping below zero
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(
            self.0 >= rhs.0,
            "Quantity subtraction would result in negative"
        );
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl From<u64> for Quantity {
    fn from(lots: u64) -> Self {
        Self(lots)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order value (price times quantity), widened to i128 so the product of a
/// large price and a large quantity cannot overflow.
pub fn notional(price: Price, quantity: Quantity) -> i128 {
    price.as_i64() as i128 * quantity.as_u64() as i128
}
