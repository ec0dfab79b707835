// ============================================================================
// Order Book Errors
// ============================================================================

use crate::domain::{OrderId, Side};
use crate::numeric::{NumericError, Price, Volume};
use rust_decimal::Decimal;
use std::fmt;

/// Errors returned by the order book operations.
///
/// Every validation failure leaves the book untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBookError {
    /// Volume must be strictly positive
    InvalidVolume(Volume),

    /// Limit price must be strictly positive
    InvalidPrice(Price),

    /// An order with this id is already resting in the book
    DuplicateOrderId(OrderId),

    /// Price is not a multiple of the configured tick size
    InvalidTickSize { price: Price, tick_size: Decimal },

    /// Volume is not a multiple of the configured lot size
    InvalidLotSize { volume: Volume, lot_size: Decimal },

    /// Not enough resting liquidity on the opposite side to price the request
    InsufficientLiquidity {
        side: Side,
        requested: Volume,
        available: Volume,
        /// Total accumulated over the liquidity that does exist
        partial_total: Decimal,
    },

    /// Engine configuration was rejected
    InvalidConfig(String),

    /// Exact decimal arithmetic failed
    Arithmetic(NumericError),
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::InvalidVolume(volume) => {
                write!(f, "invalid volume {}: must be positive", volume)
            },
            OrderBookError::InvalidPrice(price) => {
                write!(f, "invalid price {}: must be positive", price)
            },
            OrderBookError::DuplicateOrderId(id) => {
                write!(f, "order {} already exists in the book", id)
            },
            OrderBookError::InvalidTickSize { price, tick_size } => {
                write!(f, "price {} is not a multiple of tick size {}", price, tick_size)
            },
            OrderBookError::InvalidLotSize { volume, lot_size } => {
                write!(f, "volume {} is not a multiple of lot size {}", volume, lot_size)
            },
            OrderBookError::InsufficientLiquidity {
                side,
                requested,
                available,
                partial_total,
            } => write!(
                f,
                "insufficient liquidity for {} {}: {} available, partial total {}",
                side, requested, available, partial_total
            ),
            OrderBookError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            OrderBookError::Arithmetic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for OrderBookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderBookError::Arithmetic(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NumericError> for OrderBookError {
    fn from(err: NumericError) -> Self {
        OrderBookError::Arithmetic(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = OrderBookError::InvalidVolume(Decimal::ZERO);
        assert_eq!(err.to_string(), "invalid volume 0: must be positive");

        let err = OrderBookError::DuplicateOrderId(OrderId::from("buy-70"));
        assert_eq!(err.to_string(), "order buy-70 already exists in the book");

        let err = OrderBookError::InsufficientLiquidity {
            side: Side::Buy,
            requested: Decimal::from(200),
            available: Decimal::from(150),
            partial_total: Decimal::from(18000),
        };
        assert!(err.to_string().contains("partial total 18000"));
    }

    #[test]
    fn test_from_numeric_error() {
        let err: OrderBookError = NumericError::Overflow.into();
        assert_eq!(err, OrderBookError::Arithmetic(NumericError::Overflow));
        assert!(err.source().is_some());
        assert!(OrderBookError::InvalidPrice(Decimal::ZERO).source().is_none());
    }
}
