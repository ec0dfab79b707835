// ============================================================================
// Order Book Side
// One market side: price index, price lookup table and aggregates
// ============================================================================

use super::order_queue::QueueHandle;
use super::price_level::PriceLevel;
use super::price_tree::PriceTree;
use super::{Order, Side};
use crate::numeric::{Price, Volume};
use rust_decimal::Decimal;
use slab::Slab;
use std::collections::HashMap;

type LevelKey = usize;

/// Bids or asks.
///
/// A price level is present in the tree and in the lookup table exactly
/// when its queue holds at least one order.
#[derive(Debug)]
pub struct OrderBookSide {
    side: Side,
    levels: Slab<PriceLevel>,
    tree: PriceTree<LevelKey>,
    prices: HashMap<Price, LevelKey>,
    volume: Volume,
    len: usize,
    depth: usize,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: Slab::new(),
            tree: PriceTree::new(),
            prices: HashMap::new(),
            volume: Decimal::ZERO,
            len: 0,
            depth: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Aggregate resting volume
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Number of distinct price levels
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.prices.get(&price).map(|&key| &self.levels[key])
    }

    pub fn get(&self, price: Price, handle: QueueHandle) -> Option<&Order> {
        self.level(price)?.get(handle)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append an order to the level at its price, creating the level on
    /// first use.
    pub fn add(&mut self, order: Order) -> QueueHandle {
        let price = order.price;
        let key = match self.prices.get(&price) {
            Some(&key) => key,
            None => {
                let key = self.levels.insert(PriceLevel::new(price));
                self.prices.insert(price, key);
                self.tree.put(price, key);
                self.depth += 1;
                key
            },
        };

        self.len += 1;
        self.volume += order.volume;
        self.levels[key].add(order)
    }

    /// Detach the order at `handle`, dropping its level when it empties.
    pub fn remove(&mut self, price: Price, handle: QueueHandle) -> Option<Order> {
        let key = *self.prices.get(&price)?;
        let level = &mut self.levels[key];
        let order = level.remove(handle)?;

        if level.is_empty() {
            self.prices.remove(&price);
            self.tree.remove(price);
            self.levels.remove(key);
            self.depth -= 1;
        }

        self.len -= 1;
        self.volume -= order.volume;
        Some(order)
    }

    /// Replace the order at `handle` in place, keeping time priority.
    pub fn update(&mut self, price: Price, handle: QueueHandle, order: Order) -> Option<QueueHandle> {
        let key = *self.prices.get(&price)?;
        let level = &mut self.levels[key];
        let previous = level.get(handle)?.volume;
        let updated = level.update(handle, order)?;

        let current = level.get(updated)?.volume;
        self.volume = self.volume - previous + current;
        Some(updated)
    }

    // ========================================================================
    // Price walks
    // ========================================================================

    pub fn min_price_level(&self) -> Option<&PriceLevel> {
        if self.depth == 0 {
            return None;
        }
        self.tree.min().map(|(_, &key)| &self.levels[key])
    }

    pub fn max_price_level(&self) -> Option<&PriceLevel> {
        if self.depth == 0 {
            return None;
        }
        self.tree.max().map(|(_, &key)| &self.levels[key])
    }

    /// Nearest level strictly below `price`
    pub fn less_than(&self, price: Price) -> Option<&PriceLevel> {
        self.tree.less_than(price).map(|(_, &key)| &self.levels[key])
    }

    /// Nearest level strictly above `price`
    pub fn greater_than(&self, price: Price) -> Option<&PriceLevel> {
        self.tree.greater_than(price).map(|(_, &key)| &self.levels[key])
    }

    /// Most aggressive level: highest bid or lowest ask.
    pub fn best_level(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.max_price_level(),
            Side::Sell => self.min_price_level(),
        }
    }

    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(PriceLevel::price)
    }

    /// Next level after `price` moving away from the best price.
    pub fn next_worse(&self, price: Price) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.less_than(price),
            Side::Sell => self.greater_than(price),
        }
    }

    /// Levels from best to worst.
    pub fn levels(&self) -> Levels<'_> {
        Levels {
            side: self,
            cursor: self.best_level(),
        }
    }

    /// Up to `max_levels` (price, volume) pairs from best to worst.
    pub fn get_depth(&self, max_levels: usize) -> Vec<(Price, Volume)> {
        self.levels()
            .take(max_levels)
            .map(|level| (level.price(), level.volume()))
            .collect()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Cross-check tree, lookup table, levels and aggregates.
    pub fn validate(&self) -> Result<(), String> {
        self.tree.validate()?;

        let live = self.levels.len();
        if self.tree.len() != live || self.prices.len() != live || self.depth != live {
            return Err(format!(
                "{} side: {} levels, {} tree nodes, {} lookup entries, depth {}",
                self.side,
                live,
                self.tree.len(),
                self.prices.len(),
                self.depth
            ));
        }

        let mut volume = Decimal::ZERO;
        let mut len = 0;
        for (price, &key) in &self.prices {
            let level = self
                .levels
                .get(key)
                .ok_or_else(|| format!("lookup entry {} points at a freed level", price))?;
            if self.tree.get(*price) != Some(&key) {
                return Err(format!("level {} missing from the price tree", price));
            }
            if level.is_empty() {
                return Err(format!("empty level {} left in the book", price));
            }

            let sum: Decimal = level.orders().map(|(_, order)| order.volume).sum();
            if sum != level.volume() {
                return Err(format!(
                    "level {} volume {} differs from order sum {}",
                    price,
                    level.volume(),
                    sum
                ));
            }
            if level.orders().any(|(_, order)| order.price != *price || order.side != self.side) {
                return Err(format!("foreign order queued at level {}", price));
            }

            volume += sum;
            len += level.len();
        }

        if volume != self.volume || len != self.len {
            return Err(format!(
                "{} side aggregates {} / {} differ from levels {} / {}",
                self.side, self.volume, self.len, volume, len
            ));
        }
        Ok(())
    }
}

/// Best-to-worst walk over a side's levels via neighbour queries.
pub struct Levels<'a> {
    side: &'a OrderBookSide,
    cursor: Option<&'a PriceLevel>,
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a PriceLevel;

    fn next(&mut self) -> Option<Self::Item> {
        let level = self.cursor?;
        self.cursor = self.side.next_worse(level.price());
        Some(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_add_and_remove_levels() {
        let mut side = OrderBookSide::new(Side::Buy);
        assert!(side.min_price_level().is_none());
        assert!(side.max_price_level().is_none());

        let first = side.add(Order::buy("buy-1", d(10), d(10)));
        assert_eq!(
            side.min_price_level().map(PriceLevel::price),
            side.max_price_level().map(PriceLevel::price)
        );

        let second = side.add(Order::buy("buy-2", d(10), d(20)));
        assert_eq!(side.depth(), 2);
        assert_eq!(side.len(), 2);
        assert_eq!(side.min_price_level().unwrap().head().unwrap().0, first);
        assert_eq!(side.max_price_level().unwrap().head().unwrap().0, second);

        let removed = side.remove(d(10), first).unwrap();
        assert_eq!(removed.id.as_str(), "buy-1");
        assert_eq!(side.depth(), 1);
        assert_eq!(side.min_price_level().unwrap().price(), d(20));
        assert!(side.validate().is_ok());
    }

    #[test]
    fn test_neighbour_levels() {
        let mut side = OrderBookSide::new(Side::Sell);
        for (i, price) in (100..=170).step_by(10).enumerate() {
            side.add(Order::sell(i as u64, d(5), d(price)));
        }

        assert_eq!(side.volume(), d(40));
        assert_eq!(side.less_than(d(101)).unwrap().price(), d(100));
        assert_eq!(side.less_than(d(150)).unwrap().price(), d(140));
        assert!(side.less_than(d(100)).is_none());
        assert_eq!(side.greater_than(d(169)).unwrap().price(), d(170));
        assert_eq!(side.greater_than(d(150)).unwrap().price(), d(160));
        assert!(side.greater_than(d(170)).is_none());
    }

    #[test]
    fn test_best_to_worst_walk() {
        let mut bids = OrderBookSide::new(Side::Buy);
        let mut asks = OrderBookSide::new(Side::Sell);
        for price in [50, 70, 60] {
            bids.add(Order::buy(format!("b{}", price), d(1), d(price)));
            asks.add(Order::sell(format!("a{}", price), d(2), d(price + 100)));
        }

        assert_eq!(bids.best_price(), Some(d(70)));
        assert_eq!(asks.best_price(), Some(d(150)));
        assert_eq!(
            bids.get_depth(10),
            vec![(d(70), d(1)), (d(60), d(1)), (d(50), d(1))]
        );
        assert_eq!(asks.get_depth(2), vec![(d(150), d(2)), (d(160), d(2))]);
    }

    #[test]
    fn test_update_adjusts_aggregates() {
        let mut side = OrderBookSide::new(Side::Sell);
        let handle = side.add(Order::sell("s-1", d(10), d(45)));
        side.add(Order::sell("s-2", d(5), d(45)));

        let reduced = side.get(d(45), handle).unwrap().with_volume(d(3));
        assert_eq!(side.update(d(45), handle, reduced), Some(handle));

        assert_eq!(side.volume(), d(8));
        assert_eq!(side.level(d(45)).unwrap().volume(), d(8));
        assert_eq!(side.level(d(45)).unwrap().head().unwrap().0, handle);
        assert!(side.validate().is_ok());
    }

    #[test]
    fn test_remove_unknown_price_or_handle() {
        let mut side = OrderBookSide::new(Side::Sell);
        let handle = side.add(Order::sell("s-1", d(10), d(45)));

        assert!(side.remove(d(46), handle).is_none());
        side.remove(d(45), handle);
        assert!(side.remove(d(45), handle).is_none());
        assert!(side.is_empty());
        assert_eq!(side.depth(), 0);
        assert_eq!(side.volume(), Decimal::ZERO);
    }
}
