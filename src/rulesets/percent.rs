use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::PERCENT_SCALE;

/// Parse a percentage cell.
///
/// Empty cells read as 0, a trailing "%" is stripped, and the result is
/// rounded to 2 decimal places half-up (ties away from zero, not to even).
/// The rounding rule matters: it decides whether sums land within the 0.01
/// reconciliation tolerance. Returns `None` for non-numeric input.
pub fn parse_percent(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    let numeric = match trimmed.strip_suffix('%') {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    };
    let value = Decimal::from_str(numeric).ok()?;
    Some(value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
