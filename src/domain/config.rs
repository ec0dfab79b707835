// ============================================================================
// Order Book Configuration
// ============================================================================

use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one order book instance (one instrument).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// The trading instrument (e.g., "BTC-USD", "AAPL")
    pub instrument: String,

    /// Optional: Price tick size (minimum price increment)
    /// None means no tick size enforcement
    pub tick_size: Option<Decimal>,

    /// Optional: Lot size (minimum volume increment)
    /// None means no lot size enforcement
    pub lot_size: Option<Decimal>,
}

impl OrderBookConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            tick_size: None,
            lot_size: None,
        }
    }

    /// Builder method: Set price tick size
    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = Some(tick);
        self
    }

    /// Builder method: Set lot size
    pub fn with_lot_size(mut self, lot: Decimal) -> Self {
        self.lot_size = Some(lot);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.instrument.trim().is_empty() {
            return Err("Instrument cannot be empty".to_string());
        }

        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err("Tick size must be positive".to_string());
            }
        }

        if let Some(lot) = self.lot_size {
            if lot <= Decimal::ZERO {
                return Err("Lot size must be positive".to_string());
            }
        }

        Ok(())
    }

    /// Parse a configuration from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(json).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl OrderBookConfig {
    /// Equity-style book: cent ticks, whole-share lots.
    pub fn equity(instrument: impl Into<String>) -> Self {
        Self::new(instrument)
            .with_tick_size(Decimal::new(1, 2))
            .with_lot_size(Decimal::ONE)
    }
}
