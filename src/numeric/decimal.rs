// ============================================================================
// Exact Decimal Helpers
// Checked arithmetic over rust_decimal for prices, volumes and notionals
// ============================================================================

use super::errors::{NumericError, NumericResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Limit or execution price.
pub type Price = Decimal;

/// Order or level volume.
pub type Volume = Decimal;

/// Parse a decimal from its string form without going through floats.
///
/// # Example
/// ```
/// use limit_order_book::numeric::parse_decimal;
///
/// let price = parse_decimal("46.25").unwrap();
/// assert_eq!(price.to_string(), "46.25");
/// ```
pub fn parse_decimal(s: &str) -> NumericResult<Decimal> {
    Decimal::from_str(s.trim()).map_err(|_| NumericError::InvalidInput)
}

/// `price * volume`, failing instead of panicking on overflow.
#[inline]
pub fn checked_notional(price: Price, volume: Volume) -> NumericResult<Decimal> {
    price.checked_mul(volume).ok_or(NumericError::Overflow)
}

/// Checked sum of a sequence of decimals.
pub fn checked_sum<I>(values: I) -> NumericResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or(NumericError::Overflow)
    })
}

/// Volume-weighted average price `Σ(price·volume) / Σ(volume)`.
///
/// Returns `DivisionByZero` when the fills carry no volume.
pub fn weighted_average<I>(fills: I) -> NumericResult<Price>
where
    I: IntoIterator<Item = (Price, Volume)>,
{
    let mut total_notional = Decimal::ZERO;
    let mut total_volume = Decimal::ZERO;

    for (price, volume) in fills {
        total_notional = total_notional
            .checked_add(checked_notional(price, volume)?)
            .ok_or(NumericError::Overflow)?;
        total_volume = total_volume
            .checked_add(volume)
            .ok_or(NumericError::Overflow)?;
    }

    if total_volume.is_zero() {
        return Err(NumericError::DivisionByZero);
    }

    total_notional
        .checked_div(total_volume)
        .ok_or(NumericError::Overflow)
}

/// True when `value` is an exact multiple of `step`.
///
/// A non-positive step never constrains anything.
pub fn is_multiple_of(value: Decimal, step: Decimal) -> bool {
    if step <= Decimal::ZERO {
        return true;
    }
    value
        .checked_rem(step)
        .map(|rem| rem.is_zero())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("123.456").unwrap(), Decimal::new(123456, 3));
        assert_eq!(parse_decimal(" 42 ").unwrap(), Decimal::from(42));
        assert_eq!(parse_decimal("abc"), Err(NumericError::InvalidInput));
    }

    #[test]
    fn test_checked_notional() {
        // 100.5 * 2 = 201
        let notional = checked_notional(Decimal::new(1005, 1), Decimal::from(2)).unwrap();
        assert_eq!(notional, Decimal::from(201));

        assert_eq!(
            checked_notional(Decimal::MAX, Decimal::from(2)),
            Err(NumericError::Overflow)
        );
    }

    #[test]
    fn test_checked_sum() {
        let total = checked_sum(vec![Decimal::from(1), Decimal::new(5, 1)]).unwrap();
        assert_eq!(total, Decimal::new(15, 1));
        assert_eq!(checked_sum(Vec::new()).unwrap(), Decimal::ZERO);
        assert_eq!(
            checked_sum(vec![Decimal::MAX, Decimal::ONE]),
            Err(NumericError::Overflow)
        );
    }

    #[test]
    fn test_weighted_average_is_exact() {
        let fills = vec![
            (Decimal::from(45), Decimal::from(25)),
            (Decimal::from(45), Decimal::from(25)),
            (Decimal::from(50), Decimal::from(25)),
        ];
        let avg = weighted_average(fills).unwrap();
        assert_eq!(avg, Decimal::from(3500) / Decimal::from(75));
    }

    #[test]
    fn test_weighted_average_repeated_tenths() {
        // 0.1 repeated many times is where binary floats drift
        let fills = (0..1000).map(|_| (Decimal::new(1, 1), Decimal::ONE));
        assert_eq!(weighted_average(fills).unwrap(), Decimal::new(1, 1));
    }

    #[test]
    fn test_weighted_average_without_volume() {
        assert_eq!(
            weighted_average(Vec::new()),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn test_is_multiple_of() {
        assert!(is_multiple_of(Decimal::new(1050, 2), Decimal::new(5, 2)));
        assert!(!is_multiple_of(Decimal::new(1051, 2), Decimal::new(5, 2)));
        assert!(is_multiple_of(Decimal::new(1051, 2), Decimal::ZERO));
    }
}
