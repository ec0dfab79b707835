// ============================================================================
// Price/Time Priority Matching (FIFO)
// Crosses an incoming volume against one side of the book
// ============================================================================

use crate::domain::{Order, OrderBookSide, PriceLevel, Side};
use crate::numeric::{self, NumericError, NumericResult, Price, Volume};
use rust_decimal::Decimal;

/// Orders consumed while crossing one incoming volume.
///
/// # Example
/// ```text
/// Book:  45 @ 25 (Order 2, t=100)
///        45 @ 25 (Order 3, t=101)
///        50 @ 50 (Order 1, t=102)
///
/// Incoming: Buy 75 @ 55
/// Result: 2 and 3 done, 1 reduced to 25 in place
/// ```
#[derive(Debug)]
pub(crate) struct Crossing {
    /// Resting orders removed in full, in consumption order
    pub done: Vec<Order>,
    /// Resting order reduced in place, with the volume taken from it
    pub partial: Option<(Order, Volume)>,
    /// Incoming volume not executed
    pub remaining: Volume,
}

impl Crossing {
    fn new(volume: Volume) -> Self {
        Self {
            done: Vec::new(),
            partial: None,
            remaining: volume,
        }
    }

    pub fn executed(&self) -> bool {
        !self.done.is_empty() || self.partial.is_some()
    }

    /// (price, volume) of every execution, in consumption order.
    pub fn fills(&self) -> impl Iterator<Item = (Price, Volume)> + '_ {
        self.done
            .iter()
            .map(|order| (order.price, order.volume))
            .chain(self.partial.iter().map(|(order, volume)| (order.price, *volume)))
    }
}

/// Whether an incoming order on `incoming` side with `limit` may trade at
/// the opposite side's `best` price.
#[inline]
pub(crate) fn prices_cross(incoming: Side, limit: Price, best: Price) -> bool {
    match incoming {
        Side::Buy => limit >= best,
        Side::Sell => limit <= best,
    }
}

/// Notional of crossing `volume` against `opposite` without touching it,
/// with the volume the acceptable levels could not supply.
///
/// Walks the same levels as [`cross`], so a walk that succeeds guarantees
/// the fills of the matching crossing sum without overflow.
pub(crate) fn crossable_notional(
    opposite: &OrderBookSide,
    limit: Option<Price>,
    volume: Volume,
) -> NumericResult<(Decimal, Volume)> {
    let incoming = opposite.side().opposite();
    let mut total = Decimal::ZERO;
    let mut remaining = volume;

    for level in opposite.levels() {
        if remaining <= Decimal::ZERO {
            break;
        }
        if let Some(limit) = limit {
            if !prices_cross(incoming, limit, level.price()) {
                break;
            }
        }

        let take = remaining.min(level.volume());
        total = total
            .checked_add(numeric::checked_notional(level.price(), take)?)
            .ok_or(NumericError::Overflow)?;
        remaining -= take;
    }

    Ok((total, remaining))
}

/// Cross `volume` against `opposite`, best price first.
///
/// `limit` bounds the acceptable price; `None` sweeps regardless of price.
pub(crate) fn cross(opposite: &mut OrderBookSide, limit: Option<Price>, volume: Volume) -> Crossing {
    let incoming = opposite.side().opposite();
    let mut crossing = Crossing::new(volume);

    while crossing.remaining > Decimal::ZERO {
        let best = match opposite.best_price() {
            Some(price) => price,
            None => break,
        };

        if let Some(limit) = limit {
            if !prices_cross(incoming, limit, best) {
                break;
            }
        }

        if !drain_level(opposite, best, &mut crossing) {
            break;
        }
    }

    crossing
}

/// Consume orders from the head of the level at `price` until the level or
/// the incoming volume is exhausted. Returns false when nothing could be
/// consumed.
fn drain_level(opposite: &mut OrderBookSide, price: Price, crossing: &mut Crossing) -> bool {
    let mut progressed = false;
    while crossing.remaining > Decimal::ZERO {
        let (handle, head) = match opposite.level(price).and_then(PriceLevel::head) {
            Some((handle, order)) => (handle, order.clone()),
            None => return progressed,
        };

        if head.volume > crossing.remaining {
            let taken = crossing.remaining;
            let reduced = head.with_volume(head.volume - taken);
            if opposite.update(price, handle, reduced.clone()).is_none() {
                return false;
            }

            tracing::trace!(order_id = %head.id, %price, volume = %taken, "resting order partially filled");
            crossing.partial = Some((reduced, taken));
            crossing.remaining = Decimal::ZERO;
        } else {
            let order = match opposite.remove(price, handle) {
                Some(order) => order,
                None => return false,
            };

            tracing::trace!(order_id = %order.id, %price, volume = %order.volume, "resting order filled");
            crossing.remaining -= order.volume;
            crossing.done.push(order);
        }
        progressed = true;
    }

    progressed
}
