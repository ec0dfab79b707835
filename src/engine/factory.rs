// ============================================================================
// Order Book Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::OrderBookConfig;
use crate::engine::{MatchingEngine, OrderBookError};
use crate::interfaces::EventHandler;
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Arguments
/// * `config` - Order book configuration
/// * `event_handler` - Event handler for order events
///
/// # Returns
/// * `Result<MatchingEngine, OrderBookError>` - Configured matching engine or error
///
/// # Example
/// ```
/// use limit_order_book::prelude::*;
/// use std::sync::Arc;
///
/// let config = OrderBookConfig::equity("AAPL");
/// let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.instrument(), "AAPL");
/// ```
pub fn create_from_config(
    config: OrderBookConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<MatchingEngine, OrderBookError> {
    // Validate configuration first
    config.validate().map_err(OrderBookError::InvalidConfig)?;

    let mut engine = MatchingEngine::new(config.instrument, event_handler);
    engine.set_increments(config.tick_size, config.lot_size);

    tracing::debug!(
        instrument = engine.instrument(),
        tick_size = ?config.tick_size,
        lot_size = ?config.lot_size,
        "matching engine created"
    );

    Ok(engine)
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use limit_order_book::prelude::*;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new("BTC-USD")
///     .with_tick_size(Decimal::new(1, 2))
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(engine.instrument(), "BTC-USD");
/// ```
pub struct MatchingEngineBuilder {
    config: OrderBookConfig,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::new(instrument),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: OrderBookConfig) -> Self {
        Self { config }
    }

    /// Set price tick size
    pub fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.config.tick_size = Some(tick_size);
        self
    }

    /// Set lot size
    pub fn with_lot_size(mut self, lot_size: Decimal) -> Self {
        self.config.lot_size = Some(lot_size);
        self
    }

    /// Apply equity-style configuration
    pub fn equity(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::equity(instrument),
        }
    }

    /// Build the matching engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> Result<MatchingEngine, OrderBookError> {
        create_from_config(self.config, event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &OrderBookConfig {
        &self.config
    }
}
