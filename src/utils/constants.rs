//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// USSD CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// USSD decimals (ledger accounting unit)
pub const USSD_DECIMALS: u8 = 6;

/// Base unit for USSD (1 USSD = 1,000,000 units)
pub const USSD_BASE_UNIT: u64 = 1_000_000;

/// Maximum supported decimals for a collateral asset
pub const MAX_ASSET_DECIMALS: u8 = 18;

// ═══════════════════════════════════════════════════════════════════════════════
// ADMISSION CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum share of basket value held in stable-role assets before
/// winter-phase minting steers deposits toward volatile assets - 5%
pub const STABLE_RATIO_CAP_BPS: u64 = 500;

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// REDEMPTION CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Multiplier applied on top of the collateral factor during a haircut
/// redemption - 95% (the withheld remainder stays in the pool)
pub const REDEMPTION_PENALTY_BPS: u64 = 9_500;

// ═══════════════════════════════════════════════════════════════════════════════
// REWARD CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Insurance trust reward rate - 4.2% per year
pub const INSURANCE_APY_BPS: u64 = 420;

/// Staking vault reward rate - 1.8% per year
pub const STAKING_APY_BPS: u64 = 180;

/// Seconds in a reward year (365 days)
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Share scale for the staking vault: 18-decimal shares over the
/// 6-decimal ledger unit (10^12)
pub const STAKING_SHARE_SCALE: u128 = 1_000_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// MARKET CYCLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reference epoch for the market cycle (unix seconds)
pub const CYCLE_EPOCH: i64 = 1_703_420_845;

/// Cycle position at the reference epoch, in ticks
pub const CYCLE_BLOCK_OFFSET: i64 = 822_721;

/// Duration of one cycle tick in seconds
pub const CYCLE_TICK_SECS: i64 = 600;

/// Full cycle length in ticks
pub const CYCLE_LENGTH: i64 = 210_000;

/// First tick of the summer phase (inclusive)
pub const SUMMER_START: i64 = 52_500;

/// Last tick of the summer phase (inclusive)
pub const SUMMER_END: i64 = 105_000;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIER CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account identifier in bytes
pub const ACCOUNT_ID_LENGTH: usize = 20;
