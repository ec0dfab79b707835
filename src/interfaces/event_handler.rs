// ============================================================================
// Event Handler Interface
// Defines the contract for handling order book events
// ============================================================================

use crate::domain::{OrderId, Side};
use crate::numeric::{Price, Volume};
use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, Sender};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order rejected with reason
    OrderRejected {
        order_id: OrderId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Sweep rejected before touching the book
    SweepRejected {
        side: Side,
        volume: Volume,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order (or its unexecuted remainder) added to book
    OrderAddedToBook {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        timestamp: DateTime<Utc>,
    },

    /// Order fully filled. For the incoming order of a limit intake the
    /// price is the volume-weighted execution price.
    OrderFilled {
        order_id: OrderId,
        price: Price,
        volume: Volume,
        timestamp: DateTime<Utc>,
    },

    /// Order partially filled
    OrderPartiallyFilled {
        order_id: OrderId,
        filled_volume: Volume,
        remaining_volume: Volume,
        timestamp: DateTime<Utc>,
    },

    /// Order cancelled
    OrderCancelled {
        order_id: OrderId,
        remaining_volume: Volume,
        timestamp: DateTime<Utc>,
    },
}

impl OrderEvent {
    /// The order the event concerns. Sweeps carry no order id.
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            OrderEvent::OrderRejected { order_id, .. }
            | OrderEvent::OrderAddedToBook { order_id, .. }
            | OrderEvent::OrderFilled { order_id, .. }
            | OrderEvent::OrderPartiallyFilled { order_id, .. }
            | OrderEvent::OrderCancelled { order_id, .. } => Some(order_id),
            OrderEvent::SweepRejected { .. } => None,
        }
    }
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!("Order book event: {:?}", event);
    }
}

/// Forwards events to an unbounded crossbeam channel.
///
/// Sending never blocks the matcher. Events are dropped once the receiver
/// is gone.
#[derive(Clone)]
pub struct ChannelEventHandler {
    sender: Sender<OrderEvent>,
}

impl ChannelEventHandler {
    pub fn new() -> (Self, Receiver<OrderEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventHandler for ChannelEventHandler {
    fn on_event(&self, event: OrderEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}

/// Forwards events to an unbounded tokio channel for async consumers.
#[cfg(feature = "async")]
#[derive(Clone)]
pub struct TokioEventHandler {
    sender: tokio::sync::mpsc::UnboundedSender<OrderEvent>,
}

#[cfg(feature = "async")]
impl TokioEventHandler {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<OrderEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[cfg(feature = "async")]
impl EventHandler for TokioEventHandler {
    fn on_event(&self, event: OrderEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}
