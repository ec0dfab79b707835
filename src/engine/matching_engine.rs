// ============================================================================
// Matching Engine
// Core business logic: intake, matching, cancellation and book queries
// ============================================================================

use super::errors::OrderBookError;
use super::price_time::{self, Crossing};
use crate::domain::{
    Depth, Execution, Order, OrderBookSide, OrderBookSnapshot, OrderId, PriceVolume, QueueHandle,
    Side,
};
use crate::interfaces::{EventHandler, OrderEvent};
use crate::numeric::{self, Price, Volume};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Where a resting order lives in the book.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderLocation {
    side: Side,
    price: Price,
    handle: QueueHandle,
}

/// Single-instrument limit order book with price/time priority matching.
///
/// All mutations take `&mut self`; wrap the engine in a
/// [`SharedMatchingEngine`](super::SharedMatchingEngine) to share it across
/// threads.
pub struct MatchingEngine {
    /// Trading instrument (e.g., "BTC-USD")
    instrument: Arc<String>,

    /// Bid side of the order book
    bids: OrderBookSide,

    /// Ask side of the order book
    asks: OrderBookSide,

    /// Order index for lookups and cancellations
    orders: HashMap<OrderId, OrderLocation>,

    /// Minimum price increment, if enforced
    tick_size: Option<Decimal>,

    /// Minimum volume increment, if enforced
    lot_size: Option<Decimal>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(instrument: impl Into<String>, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            instrument: Arc::new(instrument.into()),
            bids: OrderBookSide::new(Side::Buy),
            asks: OrderBookSide::new(Side::Sell),
            orders: HashMap::new(),
            tick_size: None,
            lot_size: None,
            event_handler,
        }
    }

    pub(crate) fn set_increments(&mut self, tick_size: Option<Decimal>, lot_size: Option<Decimal>) {
        self.tick_size = tick_size;
        self.lot_size = lot_size;
    }

    // ========================================================================
    // Intake
    // ========================================================================

    /// Submit a limit order.
    ///
    /// The order crosses the opposite side while its limit allows. Any
    /// unexecuted remainder rests on its own side under `order_id`.
    ///
    /// When the order is fully executed, `done` ends with an aggregate
    /// record for it carrying the full volume at the volume-weighted
    /// execution price. When a remainder rests, that resting order is
    /// reported as `partial` if anything traded.
    pub fn submit_limit(
        &mut self,
        order_id: impl Into<OrderId>,
        side: Side,
        volume: Volume,
        price: Price,
    ) -> Result<Execution, OrderBookError> {
        let order_id = order_id.into();

        if let Err(err) = self.validate_limit(&order_id, side, volume, price) {
            tracing::warn!(%order_id, %side, %volume, %price, error = %err, "limit order rejected");
            self.event_handler.on_event(OrderEvent::OrderRejected {
                order_id,
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        tracing::debug!(%order_id, %side, %volume, %price, "limit order received");

        let crossing = price_time::cross(self.side_mut(side.opposite()), Some(price), volume);
        let mut events = Vec::new();
        self.settle_crossing(&crossing, &mut events);

        let executed = volume - crossing.remaining;
        let execution = if crossing.remaining > Decimal::ZERO {
            let resting = Order::new(order_id.clone(), side, crossing.remaining, price);
            let handle = self.side_mut(side).add(resting.clone());
            self.orders.insert(
                order_id.clone(),
                OrderLocation {
                    side,
                    price,
                    handle,
                },
            );

            tracing::debug!(%order_id, %side, volume = %resting.volume, %price, "order rested");
            if crossing.executed() {
                events.push(OrderEvent::OrderPartiallyFilled {
                    order_id: order_id.clone(),
                    filled_volume: executed,
                    remaining_volume: resting.volume,
                    timestamp: Utc::now(),
                });
            }
            events.push(OrderEvent::OrderAddedToBook {
                order_id,
                side,
                price,
                volume: resting.volume,
                timestamp: Utc::now(),
            });

            if crossing.executed() {
                Execution {
                    done: crossing.done,
                    volume_left: resting.volume,
                    partial: Some(resting),
                    partial_volume: executed,
                }
            } else {
                Execution::unmatched(resting.volume)
            }
        } else {
            // Bounded by the crossable notional walk in `validate_limit`.
            let average = numeric::weighted_average(crossing.fills()).unwrap_or_else(|err| {
                tracing::error!(%order_id, error = %err, "execution price unavailable, reporting limit");
                price
            });
            let aggregate = Order::new(order_id.clone(), side, volume, average);

            tracing::debug!(%order_id, %side, %volume, price = %average, "order filled");
            events.push(OrderEvent::OrderFilled {
                order_id,
                price: average,
                volume,
                timestamp: Utc::now(),
            });

            let Crossing { mut done, partial, .. } = crossing;
            done.push(aggregate);
            let (partial, partial_volume) = match partial {
                Some((order, taken)) => (Some(order), taken),
                None => (None, Decimal::ZERO),
            };

            Execution {
                done,
                partial,
                partial_volume,
                volume_left: Decimal::ZERO,
            }
        };

        self.emit(events);
        Ok(execution)
    }

    /// Execute `volume` on `side` against the opposite side at whatever
    /// prices are resting. Nothing rests afterwards; `volume_left` reports
    /// what the book could not supply.
    pub fn sweep(&mut self, side: Side, volume: Volume) -> Result<Execution, OrderBookError> {
        let validation = if volume <= Decimal::ZERO {
            Err(OrderBookError::InvalidVolume(volume))
        } else {
            self.check_lot(volume)
        };
        if let Err(err) = validation {
            tracing::warn!(%side, %volume, error = %err, "sweep rejected");
            self.event_handler.on_event(OrderEvent::SweepRejected {
                side,
                volume,
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        tracing::debug!(%side, %volume, "sweep received");

        let crossing = price_time::cross(self.side_mut(side.opposite()), None, volume);
        let mut events = Vec::new();
        self.settle_crossing(&crossing, &mut events);
        self.emit(events);

        if crossing.remaining > Decimal::ZERO {
            tracing::debug!(%side, left = %crossing.remaining, "sweep exhausted the book");
        }

        let (partial, partial_volume) = match crossing.partial {
            Some((order, taken)) => (Some(order), taken),
            None => (None, Decimal::ZERO),
        };

        Ok(Execution {
            done: crossing.done,
            partial,
            partial_volume,
            volume_left: crossing.remaining,
        })
    }

    /// Cancel a resting order. Unknown ids return `None`.
    pub fn cancel(&mut self, order_id: &OrderId) -> Option<Order> {
        let location = self.orders.remove(order_id)?;
        let order = self
            .side_mut(location.side)
            .remove(location.price, location.handle)?;

        tracing::debug!(%order_id, side = %location.side, price = %location.price, "order cancelled");
        self.event_handler.on_event(OrderEvent::OrderCancelled {
            order_id: order.id.clone(),
            remaining_volume: order.volume,
            timestamp: Utc::now(),
        });

        Some(order)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Total cost of executing `volume` on `side` against the current book,
    /// best price first, without touching it.
    ///
    /// Non-positive volumes cost nothing. If the opposite side cannot supply
    /// the volume, the error carries the total over what it can supply.
    pub fn quote(&self, side: Side, volume: Volume) -> Result<Price, OrderBookError> {
        if volume <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let book = self.side(side.opposite());
        let (total, remaining) = price_time::crossable_notional(book, None, volume)?;
        if remaining == Decimal::ZERO {
            return Ok(total);
        }

        Err(OrderBookError::InsufficientLiquidity {
            side,
            requested: volume,
            available: book.volume(),
            partial_total: total,
        })
    }

    /// Aggregate volume per price on both sides, best to worst.
    pub fn depth(&self) -> Depth {
        Depth {
            asks: self.side_depth(&self.asks, usize::MAX),
            bids: self.side_depth(&self.bids, usize::MAX),
        }
    }

    /// Look up a resting order.
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        let location = self.orders.get(order_id)?;
        self.side(location.side).get(location.price, location.handle)
    }

    /// Get order book snapshot
    pub fn snapshot(&self, levels: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            (*self.instrument).clone(),
            self.side_depth(&self.bids, levels),
            self.side_depth(&self.asks, levels),
        )
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.checked_add(ask)?.checked_div(Decimal::TWO),
            _ => None,
        }
    }

    /// Get the instrument name
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    /// Number of resting orders on both sides
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.orders.contains_key(order_id)
    }

    /// Verify every structural invariant of the book.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.bids.validate()?;
        self.asks.validate()?;

        let resting = self.bids.len() + self.asks.len();
        if self.orders.len() != resting {
            return Err(format!(
                "order index holds {} ids but {} orders rest in the book",
                self.orders.len(),
                resting
            ));
        }

        for (order_id, location) in &self.orders {
            let order = self
                .side(location.side)
                .get(location.price, location.handle)
                .ok_or_else(|| format!("order {} points at an empty queue slot", order_id))?;
            if &order.id != order_id || order.side != location.side {
                return Err(format!("order {} indexed at the slot of {}", order_id, order.id));
            }
        }

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return Err(format!("book is crossed: bid {} >= ask {}", bid, ask));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut OrderBookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn side_depth(&self, book: &OrderBookSide, levels: usize) -> Vec<PriceVolume> {
        book.get_depth(levels).into_iter().map(PriceVolume::from).collect()
    }

    /// Drop consumed counterparties from the index and record their events.
    fn settle_crossing(&mut self, crossing: &Crossing, events: &mut Vec<OrderEvent>) {
        for order in &crossing.done {
            self.orders.remove(&order.id);
            events.push(OrderEvent::OrderFilled {
                order_id: order.id.clone(),
                price: order.price,
                volume: order.volume,
                timestamp: Utc::now(),
            });
        }

        if let Some((order, taken)) = &crossing.partial {
            events.push(OrderEvent::OrderPartiallyFilled {
                order_id: order.id.clone(),
                filled_volume: *taken,
                remaining_volume: order.volume,
                timestamp: Utc::now(),
            });
        }
    }

    fn emit(&self, events: Vec<OrderEvent>) {
        if !events.is_empty() {
            self.event_handler.on_events(events);
        }
    }

    fn validate_limit(
        &self,
        order_id: &OrderId,
        side: Side,
        volume: Volume,
        price: Price,
    ) -> Result<(), OrderBookError> {
        if self.orders.contains_key(order_id) {
            return Err(OrderBookError::DuplicateOrderId(order_id.clone()));
        }

        if volume <= Decimal::ZERO {
            return Err(OrderBookError::InvalidVolume(volume));
        }

        if price <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice(price));
        }

        if let Some(tick_size) = self.tick_size {
            if !numeric::is_multiple_of(price, tick_size) {
                return Err(OrderBookError::InvalidTickSize { price, tick_size });
            }
        }
        self.check_lot(volume)?;

        // Resting the whole volume must keep the side aggregate representable,
        // and every fill the crossing can produce must sum without overflow.
        numeric::checked_sum([self.side(side).volume(), volume])?;
        price_time::crossable_notional(self.side(side.opposite()), Some(price), volume)?;

        Ok(())
    }

    fn check_lot(&self, volume: Volume) -> Result<(), OrderBookError> {
        if let Some(lot_size) = self.lot_size {
            if !numeric::is_multiple_of(volume, lot_size) {
                return Err(OrderBookError::InvalidLotSize { volume, lot_size });
            }
        }
        Ok(())
    }
}
