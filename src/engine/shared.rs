// ============================================================================
// Shared Matching Engine
// Whole-engine locking for callers that need cross-thread access
// ============================================================================

use super::{MatchingEngine, OrderBookError};
use crate::domain::{Depth, Execution, Order, OrderBookSnapshot, OrderId, Side};
use crate::numeric::{Price, Volume};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to one engine behind a single reader-writer lock.
///
/// Every mutation holds the write lock for the whole call, so each intake
/// is atomic with respect to other callers.
#[derive(Clone)]
pub struct SharedMatchingEngine {
    inner: Arc<RwLock<MatchingEngine>>,
}

impl SharedMatchingEngine {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn submit_limit(
        &self,
        order_id: impl Into<OrderId>,
        side: Side,
        volume: Volume,
        price: Price,
    ) -> Result<Execution, OrderBookError> {
        self.inner.write().submit_limit(order_id, side, volume, price)
    }

    pub fn sweep(&self, side: Side, volume: Volume) -> Result<Execution, OrderBookError> {
        self.inner.write().sweep(side, volume)
    }

    pub fn cancel(&self, order_id: &OrderId) -> Option<Order> {
        self.inner.write().cancel(order_id)
    }

    pub fn quote(&self, side: Side, volume: Volume) -> Result<Price, OrderBookError> {
        self.inner.read().quote(side, volume)
    }

    pub fn depth(&self) -> Depth {
        self.inner.read().depth()
    }

    /// Copy of a resting order
    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.inner.read().order(order_id).cloned()
    }

    pub fn snapshot(&self, levels: usize) -> OrderBookSnapshot {
        self.inner.read().snapshot(levels)
    }

    /// Run `f` under the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` under the write lock, for compound updates.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut MatchingEngine) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::NoOpEventHandler;
    use rust_decimal::Decimal;
    use std::thread;

    #[test]
    fn test_concurrent_submissions() {
        let shared = SharedMatchingEngine::new(MatchingEngine::new("BTC-USD", Arc::new(NoOpEventHandler)));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50u64 {
                        let side = if t % 2 == 0 { Side::Buy } else { Side::Sell };
                        let price = Decimal::from(95 + (i % 10));
                        shared
                            .submit_limit(t * 1000 + i, side, Decimal::ONE, price)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        shared.with_read(|engine| {
            assert_eq!(engine.check_invariants(), Ok(()));
            // Every buy and sell has volume one, so crosses remove pairs.
            assert_eq!(engine.bids().volume() - engine.asks().volume(), Decimal::ZERO);
        });
    }

    #[test]
    fn test_reads_and_cancel() {
        let shared = SharedMatchingEngine::new(MatchingEngine::new("X", Arc::new(NoOpEventHandler)));
        shared.submit_limit("a", Side::Sell, Decimal::from(3), Decimal::from(10)).unwrap();

        assert_eq!(shared.quote(Side::Buy, Decimal::from(2)).unwrap(), Decimal::from(20));
        assert_eq!(shared.depth().best_ask(), Some(Decimal::from(10)));
        assert_eq!(shared.order(&OrderId::from("a")).unwrap().volume, Decimal::from(3));
        assert_eq!(shared.snapshot(1).asks.len(), 1);

        assert!(shared.cancel(&OrderId::from("a")).is_some());
        assert!(shared.with_write(|engine| engine.is_empty()));
    }
}
