// ============================================================================
// Numeric Module
// Exact decimal arithmetic for prices and volumes
// ============================================================================
//
// This module provides:
// - Price/Volume type aliases over rust_decimal::Decimal
// - NumericError: Error types for checked arithmetic
// - Checked helpers for notionals, sums and weighted averages
//
// Design principles:
// - No floating-point operations
// - Arithmetic in library code returns Result (no panics)

mod decimal;
mod errors;

pub use decimal::{
    checked_notional, checked_sum, is_multiple_of, parse_decimal, weighted_average, Price, Volume,
};
pub use errors::{NumericError, NumericResult};
