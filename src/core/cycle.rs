//! Market cycle phase detection.
//!
//! The admission policy reads a cyclical market signal derived purely from
//! a caller-supplied timestamp: a fixed reference epoch and a fixed cycle
//! length map elapsed time onto a cycle position, and the middle quarter of
//! the cycle is "summer". Exact integer arithmetic throughout; no ambient
//! clock access.

use serde::{Deserialize, Serialize};

use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// MARKET PHASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Phase of the market cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPhase {
    /// The middle quarter of the cycle
    Summer,
    /// The rest of the cycle
    Winter,
}

/// Cycle position in ticks for the given unix timestamp
pub fn cycle_position(timestamp: i64) -> i64 {
    let elapsed_ticks = (timestamp - CYCLE_EPOCH).div_euclid(CYCLE_TICK_SECS);
    (CYCLE_BLOCK_OFFSET + elapsed_ticks).rem_euclid(CYCLE_LENGTH)
}

/// Market phase for the given unix timestamp
pub fn market_phase(timestamp: i64) -> MarketPhase {
    let position = cycle_position(timestamp);
    if (SUMMER_START..=SUMMER_END).contains(&position) {
        MarketPhase::Summer
    } else {
        MarketPhase::Winter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_epoch() {
        // 822_721 mod 210_000
        assert_eq!(cycle_position(CYCLE_EPOCH), 192_721);
        assert_eq!(market_phase(CYCLE_EPOCH), MarketPhase::Winter);
    }

    #[test]
    fn test_position_advances_per_tick() {
        let pos = cycle_position(CYCLE_EPOCH);
        assert_eq!(cycle_position(CYCLE_EPOCH + CYCLE_TICK_SECS), pos + 1);
        // sub-tick remainders do not move the position
        assert_eq!(cycle_position(CYCLE_EPOCH + CYCLE_TICK_SECS - 1), pos);
    }

    #[test]
    fn test_summer_bounds_inclusive() {
        // walk a timestamp onto the exact summer boundaries
        let to_ts = |position: i64| {
            CYCLE_EPOCH + (position - 192_721 + CYCLE_LENGTH) * CYCLE_TICK_SECS
        };

        assert_eq!(market_phase(to_ts(SUMMER_START)), MarketPhase::Summer);
        assert_eq!(market_phase(to_ts(SUMMER_END)), MarketPhase::Summer);
        assert_eq!(market_phase(to_ts(SUMMER_START - 1)), MarketPhase::Winter);
        assert_eq!(market_phase(to_ts(SUMMER_END + 1)), MarketPhase::Winter);
    }

    #[test]
    fn test_full_cycle_has_quarter_summer() {
        // sample a full cycle in 40 equal intervals: 10 must land in summer
        let mut summers = 0;
        for i in 0..40 {
            let ts = CYCLE_EPOCH + i * 5_250 * CYCLE_TICK_SECS;
            if market_phase(ts) == MarketPhase::Summer {
                summers += 1;
            }
        }
        assert_eq!(summers, 10);
    }

    #[test]
    fn test_pre_epoch_timestamps_well_defined() {
        // positions wrap consistently before the reference epoch
        let pos = cycle_position(CYCLE_EPOCH - CYCLE_TICK_SECS);
        assert_eq!(pos, 192_720);
        let pos = cycle_position(CYCLE_EPOCH - CYCLE_LENGTH * CYCLE_TICK_SECS);
        assert_eq!(pos, 192_721);
    }
}
