// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod errors;
mod matching_engine;
mod price_time;
mod shared;

pub mod factory;

pub use errors::OrderBookError;
pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::MatchingEngine;
pub use shared::SharedMatchingEngine;
