// ============================================================================
// Limit Order Book Library
// Continuous double-auction order book with price/time priority matching
// ============================================================================

//! # Limit Order Book
//!
//! An in-memory, single-instrument limit order book with exact decimal
//! arithmetic.
//!
//! ## Features
//!
//! - **Price/time priority** matching: best price first, FIFO within a price
//! - **Red-black tree** price index over slab-allocated levels
//! - **Partial fills** reduce resting orders in place, keeping their priority
//! - **Sweeps and quotes** against the resting liquidity
//! - **Event sinks** for logging, channels and async consumers
//!
//! ## Example
//!
//! ```rust
//! use limit_order_book::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let mut engine = MatchingEngine::new("BTC-USD", Arc::new(NoOpEventHandler));
//!
//! engine.submit_limit("ask-1", Side::Sell, Decimal::from(2), Decimal::from(50000)).unwrap();
//! engine.submit_limit("ask-2", Side::Sell, Decimal::from(2), Decimal::from(50100)).unwrap();
//!
//! // Buy 3: takes all of ask-1 and one unit of ask-2
//! let execution = engine
//!     .submit_limit("bid-1", Side::Buy, Decimal::from(3), Decimal::from(50100))
//!     .unwrap();
//! assert_eq!(execution.partial_volume, Decimal::ONE);
//!
//! // Price another unit without trading
//! let cost = engine.quote(Side::Buy, Decimal::ONE).unwrap();
//! assert_eq!(cost, Decimal::from(50100));
//!
//! let snapshot = engine.snapshot(10);
//! println!("Best ask: {:?}", snapshot.best_ask());
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Depth, Execution, Order, OrderBookConfig, OrderBookSide, OrderBookSnapshot, OrderId,
        PriceLevel, PriceVolume, Side,
    };
    pub use crate::engine::{
        create_from_config, MatchingEngine, MatchingEngineBuilder, OrderBookError,
        SharedMatchingEngine,
    };
    pub use crate::interfaces::{
        ChannelEventHandler, EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent,
    };
    pub use crate::numeric::{Price, Volume};
}
