//! Generic pro-rata, time-weighted reward accrual.
//!
//! A reward stream pays stablecoin yield to holders of a share balance,
//! scaled by the backing supply and collateral factor committed at the
//! last checkpoint. The checkpoint is double-buffered: the values observed
//! at the latest state-mutating call become the accrual basis only once a
//! call from a *later* block promotes them, so a price or supply shock can
//! never influence rewards within its own block.
//!
//! Share balances themselves need no lag: the stream settles every
//! position before any share change, so a deposit or withdrawal can only
//! affect accrual going forward.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::asset::AccountId;
use crate::core::token::TokenAmount;
use crate::error::{Error, Result};
use crate::utils::constants::*;
use crate::utils::math::{mul_div, FixedPoint};

// ═══════════════════════════════════════════════════════════════════════════════
// REWARD CHECKPOINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Backing figures frozen for reward accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCheckpoint {
    /// Block the figures were observed in
    pub block: u64,
    /// Stablecoin total supply at observation
    pub backing_supply: TokenAmount,
    /// Collateral factor at observation
    pub collateral_factor: FixedPoint,
}

impl RewardCheckpoint {
    /// Pre-genesis checkpoint
    fn genesis() -> Self {
        Self {
            block: 0,
            backing_supply: TokenAmount::ZERO,
            collateral_factor: FixedPoint::ONE,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOLDER POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-holder share balance and banked rewards
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct Position {
    /// Share balance
    shares: u128,
    /// Settled, unclaimed reward
    accrued: TokenAmount,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REWARD STREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Pro-rata, time-weighted yield accrual over a share balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardStream {
    /// Annual reward rate in basis points
    apy_bps: u64,
    /// Accrual basis: figures from the last call of a previous block
    committed: RewardCheckpoint,
    /// Figures from the latest state-mutating call
    current: RewardCheckpoint,
    /// Timestamp rewards were last settled to
    last_accrual: i64,
    /// Total shares outstanding
    total_shares: u128,
    /// Positions by holder
    positions: HashMap<AccountId, Position>,
}

impl RewardStream {
    /// Create an empty stream with the given annual rate
    pub fn new(apy_bps: u64) -> Self {
        Self {
            apy_bps,
            committed: RewardCheckpoint::genesis(),
            current: RewardCheckpoint::genesis(),
            last_accrual: 0,
            total_shares: 0,
            positions: HashMap::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CHECKPOINTING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Observe the backing figures at the start of a state-mutating call.
    ///
    /// The first call of a new block settles accrual against the old basis
    /// and promotes the previously observed figures; further calls in the
    /// same block only refresh the observation.
    pub fn checkpoint(
        &mut self,
        block: u64,
        backing_supply: TokenAmount,
        collateral_factor: FixedPoint,
        now: i64,
    ) -> Result<()> {
        if block > self.current.block {
            self.settle_all(now)?;
            self.committed = self.current;
        }
        if block >= self.current.block {
            self.current = RewardCheckpoint {
                block,
                backing_supply,
                collateral_factor,
            };
        }
        Ok(())
    }

    /// The checkpoint rewards currently accrue against
    pub fn committed_checkpoint(&self) -> &RewardCheckpoint {
        &self.committed
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SHARE MECHANICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Mint shares to a holder, settling outstanding accrual first
    pub fn deposit_shares(&mut self, holder: AccountId, shares: u128, now: i64) -> Result<()> {
        if shares == 0 {
            return Err(Error::ZeroAmount);
        }
        self.settle_all(now)?;

        let position = self.positions.entry(holder).or_default();
        position.shares = position.shares.checked_add(shares).ok_or(Error::Overflow {
            operation: "deposit shares".into(),
        })?;
        self.total_shares = self.total_shares.checked_add(shares).ok_or(Error::Overflow {
            operation: "total shares".into(),
        })?;
        Ok(())
    }

    /// Burn shares from a holder, settling outstanding accrual first
    pub fn withdraw_shares(&mut self, holder: &AccountId, shares: u128, now: i64) -> Result<()> {
        if shares == 0 {
            return Err(Error::ZeroAmount);
        }
        self.settle_all(now)?;

        let position = self.positions.get_mut(holder).ok_or(Error::InsufficientShares {
            required: shares,
            available: 0,
        })?;
        if position.shares < shares {
            return Err(Error::InsufficientShares {
                required: shares,
                available: position.shares,
            });
        }

        position.shares -= shares;
        self.total_shares -= shares;
        if position.shares == 0 && position.accrued.is_zero() {
            self.positions.remove(holder);
        }
        Ok(())
    }

    /// Share balance of a holder
    pub fn shares_of(&self, holder: &AccountId) -> u128 {
        self.positions.get(holder).map(|p| p.shares).unwrap_or(0)
    }

    /// Total shares outstanding
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Number of holders with a live position
    pub fn holder_count(&self) -> usize {
        self.positions.len()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCRUAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Newly accrued plus banked, unclaimed reward for a holder.
    ///
    /// Pure query: reads only the committed checkpoint and elapsed time.
    pub fn current_user_rewards(&self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        let position = match self.positions.get(holder) {
            Some(p) => *p,
            None => return Ok(TokenAmount::ZERO),
        };

        let mut owed = position.accrued;
        if self.total_shares > 0 && position.shares > 0 {
            let pool = self.pool_reward(self.elapsed(now))?;
            let cut = mul_div(pool as u128, position.shares, self.total_shares)? as u64;
            owed = owed.saturating_add(TokenAmount::from_units(cut));
        }
        Ok(owed)
    }

    /// Settle and take everything owed to a holder.
    ///
    /// Returns zero (a no-op success) when nothing has accrued.
    pub fn claim(&mut self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        self.settle_all(now)?;

        let Some(position) = self.positions.get_mut(holder) else {
            return Ok(TokenAmount::ZERO);
        };
        let owed = position.accrued;
        position.accrued = TokenAmount::ZERO;
        if position.shares == 0 {
            self.positions.remove(holder);
        }
        Ok(owed)
    }

    /// Total pool reward for an elapsed window, from committed figures:
    /// backing_supply × collateral_factor × apy × elapsed / year
    fn pool_reward(&self, elapsed: u64) -> Result<u64> {
        if elapsed == 0 {
            return Ok(0);
        }
        let base = mul_div(
            self.committed.backing_supply.units() as u128,
            self.committed.collateral_factor.raw(),
            FixedPoint::SCALE,
        )?;
        let reward = mul_div(
            base,
            self.apy_bps as u128 * elapsed as u128,
            BPS_DIVISOR as u128 * SECONDS_PER_YEAR as u128,
        )?;
        if reward > u64::MAX as u128 {
            return Err(Error::Overflow {
                operation: "pool reward".into(),
            });
        }
        Ok(reward as u64)
    }

    fn elapsed(&self, now: i64) -> u64 {
        (now - self.last_accrual).max(0) as u64
    }

    /// Bank the pool reward for the window since the last settlement into
    /// every position, pro-rata by shares
    fn settle_all(&mut self, now: i64) -> Result<()> {
        let elapsed = self.elapsed(now);
        if elapsed == 0 {
            return Ok(());
        }

        if self.total_shares > 0 {
            let pool = self.pool_reward(elapsed)?;
            if pool > 0 {
                for position in self.positions.values_mut() {
                    let cut = mul_div(pool as u128, position.shares, self.total_shares)? as u64;
                    position.accrued =
                        position.accrued.saturating_add(TokenAmount::from_units(cut));
                }
            }
        }
        self.last_accrual = now;
        Ok(())
    }
}
