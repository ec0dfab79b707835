// ============================================================================
// Order Domain Model
// ============================================================================

use crate::numeric::{Price, Volume};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Caller-assigned order identifier, unique among resting orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh random identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an order of this side trades against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// An order as stored in the book or reported back to the caller.
///
/// Orders are immutable values. A partial fill of a resting order replaces
/// it with a new `Order` carrying the reduced volume, at the same queue
/// position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub volume: Volume,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, side: Side, volume: Volume, price: Price) -> Self {
        Self::with_timestamp(id, side, volume, price, Utc::now())
    }

    pub fn with_timestamp(
        id: OrderId,
        side: Side,
        volume: Volume,
        price: Price,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            side,
            volume,
            price,
            timestamp,
        }
    }

    pub fn buy(id: impl Into<OrderId>, volume: Volume, price: Price) -> Self {
        Self::new(id.into(), Side::Buy, volume, price)
    }

    pub fn sell(id: impl Into<OrderId>, volume: Volume, price: Price) -> Self {
        Self::new(id.into(), Side::Sell, volume, price)
    }

    /// Copy of this order with a different volume, keeping id, price and
    /// original creation time.
    pub fn with_volume(&self, volume: Volume) -> Self {
        Self {
            volume,
            ..self.clone()
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {}",
            self.id, self.side, self.volume, self.price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_order_creation() {
        let order = Order::buy("buy-1", Decimal::from(10), Decimal::from(50));

        assert_eq!(order.id, OrderId::from("buy-1"));
        assert!(order.is_buy());
        assert!(!order.is_sell());
        assert_eq!(order.volume, Decimal::from(10));
        assert_eq!(order.price, Decimal::from(50));
    }

    #[test]
    fn test_with_volume_keeps_identity() {
        let order = Order::sell(7u64, Decimal::from(25), Decimal::new(455, 1));
        let reduced = order.with_volume(Decimal::from(5));

        assert_eq!(reduced.id, order.id);
        assert_eq!(reduced.price, order.price);
        assert_eq!(reduced.timestamp, order.timestamp);
        assert_eq!(reduced.volume, Decimal::from(5));
    }

    #[test]
    fn test_order_id_conversions() {
        assert_eq!(OrderId::from(42u64).as_str(), "42");
        assert_eq!(OrderId::from("abc".to_string()).to_string(), "abc");
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn test_display() {
        let order = Order::sell("s-1", Decimal::from(3), Decimal::new(1005, 1));
        assert_eq!(order.to_string(), "s-1 SELL 3 @ 100.5");
    }
}
