// ============================================================================
// Execution Report
// ============================================================================

use super::Order;
use crate::numeric::Volume;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a limit order intake or a market sweep.
///
/// At most one partial order exists per call. It is either the resting head
/// order reduced in place (the incoming order was satisfied mid-level), or
/// the incoming order's remainder that now rests in the book.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Execution {
    /// Fully executed orders in consumption order. For a fully filled limit
    /// order the aggregated incoming record comes last.
    pub done: Vec<Order>,
    /// The single partially executed order, if any
    pub partial: Option<Order>,
    /// Volume executed against `partial`
    pub partial_volume: Volume,
    /// Limit intake: remainder now resting in the book.
    /// Sweep: volume the book could not supply.
    pub volume_left: Volume,
}

impl Execution {
    pub(crate) fn unmatched(volume_left: Volume) -> Self {
        Self {
            done: Vec::new(),
            partial: None,
            partial_volume: Decimal::ZERO,
            volume_left,
        }
    }

    /// True when nothing traded.
    pub fn is_unmatched(&self) -> bool {
        self.done.is_empty() && self.partial.is_none()
    }

    pub fn done_volume(&self) -> Volume {
        self.done.iter().map(|order| order.volume).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched() {
        let execution = Execution::unmatched(Decimal::from(5));
        assert!(execution.is_unmatched());
        assert_eq!(execution.volume_left, Decimal::from(5));
        assert_eq!(execution.done_volume(), Decimal::ZERO);
    }

    #[test]
    fn test_done_volume() {
        let execution = Execution {
            done: vec![
                Order::sell("a", Decimal::from(2), Decimal::from(10)),
                Order::sell("b", Decimal::new(15, 1), Decimal::from(11)),
            ],
            partial: None,
            partial_volume: Decimal::ZERO,
            volume_left: Decimal::ZERO,
        };
        assert!(!execution.is_unmatched());
        assert_eq!(execution.done_volume(), Decimal::new(35, 1));
    }
}
