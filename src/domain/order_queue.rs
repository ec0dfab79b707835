// ============================================================================
// Order Queue
// FIFO of resting orders at one price, with O(1) removal by handle
// ============================================================================

use super::Order;
use crate::numeric::Volume;
use rust_decimal::Decimal;
use slab::Slab;

/// Stable position of an order inside its [`OrderQueue`].
///
/// Handles stay valid until the order they point at is removed; updating
/// the order in place keeps the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle(usize);

#[derive(Debug)]
struct QueueNode {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked FIFO stored in a slab arena.
///
/// Keeps the aggregate volume of its members: after every mutating call
/// `volume()` equals the sum of the member volumes.
#[derive(Debug, Default)]
pub struct OrderQueue {
    nodes: Slab<QueueNode>,
    head: Option<usize>,
    tail: Option<usize>,
    volume: Volume,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            head: None,
            tail: None,
            volume: Decimal::ZERO,
        }
    }

    /// Number of orders in the queue
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Aggregate volume of all queued orders
    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn head(&self) -> Option<QueueHandle> {
        self.head.map(QueueHandle)
    }

    pub fn tail(&self) -> Option<QueueHandle> {
        self.tail.map(QueueHandle)
    }

    pub fn get(&self, handle: QueueHandle) -> Option<&Order> {
        self.nodes.get(handle.0).map(|node| &node.order)
    }

    /// Append an order at the back of the queue.
    pub fn add(&mut self, order: Order) -> QueueHandle {
        self.volume += order.volume;

        let key = self.nodes.insert(QueueNode {
            order,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);

        QueueHandle(key)
    }

    /// Replace the order at `handle`, keeping its queue position.
    ///
    /// Returns `None` when the handle does not point into this queue.
    pub fn update(&mut self, handle: QueueHandle, order: Order) -> Option<QueueHandle> {
        let node = self.nodes.get_mut(handle.0)?;
        self.volume = self.volume - node.order.volume + order.volume;
        node.order = order;
        Some(handle)
    }

    /// Unlink and return the order at `handle`.
    pub fn remove(&mut self, handle: QueueHandle) -> Option<Order> {
        if !self.nodes.contains(handle.0) {
            return None;
        }
        let node = self.nodes.remove(handle.0);

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        self.volume -= node.order.volume;
        Some(node.order)
    }

    /// Orders from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }
}

/// FIFO iterator over a queue.
pub struct Iter<'a> {
    queue: &'a OrderQueue,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (QueueHandle, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = &self.queue.nodes[key];
        self.cursor = node.next;
        Some((QueueHandle(key), &node.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn order(id: u64, volume: i64) -> Order {
        Order::sell(id, Decimal::from(volume), Decimal::from(100))
    }

    fn ids(queue: &OrderQueue) -> Vec<String> {
        queue
            .iter()
            .map(|(_, order)| order.id.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_add_keeps_arrival_order() {
        let mut queue = OrderQueue::new();
        let first = queue.add(order(1, 10));
        queue.add(order(2, 5));
        let last = queue.add(order(3, 7));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.volume(), Decimal::from(22));
        assert_eq!(queue.head(), Some(first));
        assert_eq!(queue.tail(), Some(last));
        assert_eq!(ids(&queue), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_remove_from_middle_and_ends() {
        let mut queue = OrderQueue::new();
        let a = queue.add(order(1, 10));
        let b = queue.add(order(2, 5));
        let c = queue.add(order(3, 7));

        assert_eq!(queue.remove(b).unwrap().id.as_str(), "2");
        assert_eq!(ids(&queue), vec!["1", "3"]);
        assert_eq!(queue.volume(), Decimal::from(17));

        queue.remove(a);
        assert_eq!(queue.head(), Some(c));
        assert_eq!(queue.tail(), Some(c));

        queue.remove(c);
        assert!(queue.is_empty());
        assert_eq!(queue.head(), None);
        assert_eq!(queue.tail(), None);
        assert_eq!(queue.volume(), Decimal::ZERO);
    }

    #[test]
    fn test_remove_unknown_handle() {
        let mut queue = OrderQueue::new();
        let a = queue.add(order(1, 10));
        queue.remove(a);
        assert!(queue.remove(a).is_none());
        assert_eq!(queue.volume(), Decimal::ZERO);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut queue = OrderQueue::new();
        let a = queue.add(order(1, 10));
        queue.add(order(2, 5));

        let reduced = queue.get(a).unwrap().with_volume(Decimal::from(4));
        assert_eq!(queue.update(a, reduced), Some(a));

        assert_eq!(queue.head(), Some(a));
        assert_eq!(queue.get(a).unwrap().volume, Decimal::from(4));
        assert_eq!(queue.volume(), Decimal::from(9));
        assert_eq!(ids(&queue), vec!["1", "2"]);
    }

    #[test]
    fn test_new_orders_go_behind_after_removal() {
        let mut queue = OrderQueue::new();
        let a = queue.add(order(1, 1));
        queue.add(order(2, 1));
        queue.remove(a);
        // Slab reuses the freed slot, position must still be at the back
        queue.add(order(3, 1));
        assert_eq!(ids(&queue), vec!["2", "3"]);
    }

    quickcheck! {
        fn prop_volume_is_sum_of_members(ops: Vec<(bool, u8)>) -> bool {
            let mut queue = OrderQueue::new();
            let mut handles = Vec::new();

            for (i, (is_add, value)) in ops.into_iter().enumerate() {
                if is_add || handles.is_empty() {
                    let volume = i64::from(value) + 1;
                    handles.push(queue.add(order(i as u64, volume)));
                } else {
                    let handle = handles.remove(usize::from(value) % handles.len());
                    queue.remove(handle);
                }
            }

            let sum: Decimal = queue.iter().map(|(_, order)| order.volume).sum();
            queue.volume() == sum && queue.len() == handles.len()
        }
    }
}
