use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixed header names for the two age-band bound columns.
pub const GT_RETIRE_AGE_HEADER: &str = "gt-retire-age";
pub const LT_RETIRE_AGE_HEADER: &str = "lt-retire-age";

/// Bounds of the "years relative to retirement" axis. Every rule set must
/// partition this closed range exactly.
pub const MIN_RETIRE_AGE_OFFSET: i32 = -100;
pub const MAX_RETIRE_AGE_OFFSET: i32 = 100;

/// Asset classes seeded as reference data by the initial migration.
pub const DEFAULT_ASSET_CLASSES: [&str; 4] = ["Stocks", "Bonds", "Crypto", "Other"];

/// Percentages are stored and compared at 2 decimal places.
pub const PERCENT_SCALE: u32 = 2;

/// Rounding tolerance applied when reconciling percentage sums.
pub const PERCENT_TOLERANCE: Decimal = dec!(0.01);

/// A full allocation.
pub const FULL_ALLOCATION: Decimal = dec!(100);
