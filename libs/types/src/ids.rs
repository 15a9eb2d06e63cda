//! Unique identifier types for book entities
//!
//! Order ids are plain 64-bit integers assigned by the caller (or by the
//! feed). The engine never generates ids for caller orders; it only reserves
//! a high range for orders synthesized from book snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an order.
///
/// A wide unsigned integer so the id space survives the lifetime of a
/// trading session without reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create an OrderId from a raw integer
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw integer value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_roundtrip() {
        let id = OrderId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(OrderId::from(42), id);
    }

    #[test]
    fn test_order_id_ordering() {
        assert!(OrderId::new(1) < OrderId::new(2));
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::new(1337);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "1337");

        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
