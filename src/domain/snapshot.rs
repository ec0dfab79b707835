// ============================================================================
// Depth and Order Book Snapshots
// ============================================================================

use crate::numeric::{Price, Volume};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregate resting volume at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceVolume {
    pub price: Price,
    pub volume: Volume,
}

impl PriceVolume {
    pub fn new(price: Price, volume: Volume) -> Self {
        Self { price, volume }
    }
}

impl From<(Price, Volume)> for PriceVolume {
    fn from((price, volume): (Price, Volume)) -> Self {
        Self { price, volume }
    }
}

/// Full book depth, each side ordered from best to worst price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Depth {
    /// Ask levels, lowest price first
    pub asks: Vec<PriceVolume>,
    /// Bid levels, highest price first
    pub bids: Vec<PriceVolume>,
}

impl Depth {
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    pub fn total_bid_volume(&self) -> Volume {
        self.bids.iter().map(|level| level.volume).sum()
    }

    pub fn total_ask_volume(&self) -> Volume {
        self.asks.iter().map(|level| level.volume).sum()
    }
}

/// Immutable top-of-book view truncated to a number of levels.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub instrument: String,
    /// Bid levels, best first
    pub bids: Vec<PriceVolume>,
    /// Ask levels, best first
    pub asks: Vec<PriceVolume>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn new(instrument: String) -> Self {
        Self {
            instrument,
            bids: Vec::new(),
            asks: Vec::new(),
            spread: None,
            mid_price: None,
        }
    }

    pub fn with_depth(instrument: String, bids: Vec<PriceVolume>, asks: Vec<PriceVolume>) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => (
                ask.price.checked_sub(bid.price),
                bid.price
                    .checked_add(ask.price)
                    .and_then(|sum| sum.checked_div(Decimal::TWO)),
            ),
            _ => (None, None),
        };

        Self {
            instrument,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Render the snapshot as JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv(price: i64, volume: i64) -> PriceVolume {
        PriceVolume::new(Decimal::from(price), Decimal::from(volume))
    }

    #[test]
    fn test_order_book_snapshot() {
        let snapshot = OrderBookSnapshot::with_depth(
            "BTC-USD".to_string(),
            vec![pv(50000, 1)],
            vec![pv(50100, 2)],
        );

        assert_eq!(snapshot.best_bid(), Some(Decimal::from(50000)));
        assert_eq!(snapshot.best_ask(), Some(Decimal::from(50100)));
        assert_eq!(snapshot.spread, Some(Decimal::from(100)));
        assert_eq!(snapshot.mid_price, Some(Decimal::from(50050)));
    }

    #[test]
    fn test_one_sided_snapshot_has_no_spread() {
        let snapshot = OrderBookSnapshot::with_depth("X".to_string(), vec![pv(10, 1)], Vec::new());
        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.mid_price, None);
        assert!(OrderBookSnapshot::new("X".to_string()).bids.is_empty());
    }

    #[test]
    fn test_depth_totals() {
        let depth = Depth {
            asks: vec![pv(101, 2), pv(102, 3)],
            bids: vec![pv(99, 4)],
        };
        assert_eq!(depth.best_ask(), Some(Decimal::from(101)));
        assert_eq!(depth.best_bid(), Some(Decimal::from(99)));
        assert_eq!(depth.total_ask_volume(), Decimal::from(5));
        assert_eq!(depth.total_bid_volume(), Decimal::from(4));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_to_json() {
        let snapshot = OrderBookSnapshot::with_depth("X".to_string(), vec![pv(10, 1)], vec![pv(12, 1)]);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"instrument\":\"X\""));
    }
}
