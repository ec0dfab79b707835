// ============================================================================
// Price Level
// ============================================================================

use super::order_queue::{Iter, OrderQueue, QueueHandle};
use super::Order;
use crate::numeric::{Price, Volume};

/// All resting orders at one exact price, in arrival order.
#[derive(Debug)]
pub struct PriceLevel {
    price: Price,
    orders: OrderQueue,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: OrderQueue::new(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Aggregate volume at this level
    pub fn volume(&self) -> Volume {
        self.orders.volume()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn head(&self) -> Option<(QueueHandle, &Order)> {
        let handle = self.orders.head()?;
        self.orders.get(handle).map(|order| (handle, order))
    }

    pub fn tail(&self) -> Option<(QueueHandle, &Order)> {
        let handle = self.orders.tail()?;
        self.orders.get(handle).map(|order| (handle, order))
    }

    pub fn get(&self, handle: QueueHandle) -> Option<&Order> {
        self.orders.get(handle)
    }

    /// Orders in FIFO order.
    pub fn orders(&self) -> Iter<'_> {
        self.orders.iter()
    }

    pub(crate) fn add(&mut self, order: Order) -> QueueHandle {
        debug_assert_eq!(order.price, self.price);
        self.orders.add(order)
    }

    pub(crate) fn update(&mut self, handle: QueueHandle, order: Order) -> Option<QueueHandle> {
        self.orders.update(handle, order)
    }

    pub(crate) fn remove(&mut self, handle: QueueHandle) -> Option<Order> {
        self.orders.remove(handle)
    }
}
