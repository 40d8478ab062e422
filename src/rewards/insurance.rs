//! Insurance capital trust.
//!
//! Holders lock the designated reserve asset and receive 1:1 shares; the
//! share balance accrues stablecoin yield at the insurance rate. The trust
//! also serves as the circuit-breaker precondition for haircut redemptions.

use serde::{Deserialize, Serialize};

use crate::core::asset::{AccountId, AssetId, CollateralAmount};
use crate::core::token::TokenAmount;
use crate::error::Result;
use crate::rewards::stream::{RewardCheckpoint, RewardStream};
use crate::utils::constants::INSURANCE_APY_BPS;
use crate::utils::math::FixedPoint;

/// Insurance trust: 1:1 shares over the reserve asset, insurance-rate yield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceTrust {
    /// Share token name
    pub name: String,
    /// Share token symbol
    pub symbol: String,
    /// The trust's identity (reserve custody and reward-minter principal)
    account: AccountId,
    /// The only asset the trust accepts
    reserve_asset: AssetId,
    /// Reward accrual over the share balance
    stream: RewardStream,
}

impl InsuranceTrust {
    /// Create a trust over the given reserve asset
    pub fn new(account: AccountId, reserve_asset: AssetId) -> Self {
        Self {
            name: "Insurance Capital Trust".to_string(),
            symbol: "ICT".to_string(),
            account,
            reserve_asset,
            stream: RewardStream::new(INSURANCE_APY_BPS),
        }
    }

    /// The trust's identity
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// The designated reserve asset
    pub fn reserve_asset(&self) -> &AssetId {
        &self.reserve_asset
    }

    /// Observe backing figures (start of any state-mutating call)
    pub fn checkpoint(
        &mut self,
        block: u64,
        backing_supply: TokenAmount,
        collateral_factor: FixedPoint,
        now: i64,
    ) -> Result<()> {
        self.stream.checkpoint(block, backing_supply, collateral_factor, now)
    }

    /// The checkpoint rewards currently accrue against
    pub fn committed_checkpoint(&self) -> &RewardCheckpoint {
        self.stream.committed_checkpoint()
    }

    /// Mint 1:1 shares for a reserve deposit; returns the shares minted
    pub fn deposit(
        &mut self,
        recipient: AccountId,
        amount: CollateralAmount,
        now: i64,
    ) -> Result<u128> {
        self.stream.deposit_shares(recipient, amount.units(), now)?;
        Ok(amount.units())
    }

    /// Burn shares for a reserve withdrawal; returns the shares burned
    pub fn withdraw(
        &mut self,
        owner: &AccountId,
        amount: CollateralAmount,
        now: i64,
    ) -> Result<u128> {
        self.stream.withdraw_shares(owner, amount.units(), now)?;
        Ok(amount.units())
    }

    /// Burn an exact share amount; returns the reserve released (1:1)
    pub fn redeem(
        &mut self,
        owner: &AccountId,
        shares: u128,
        now: i64,
    ) -> Result<CollateralAmount> {
        self.stream.withdraw_shares(owner, shares, now)?;
        Ok(CollateralAmount::from_units(shares))
    }

    /// Settle and take everything owed to a holder
    pub fn claim(&mut self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        self.stream.claim(holder, now)
    }

    /// Accrued, unclaimed reward for a holder (pure query)
    pub fn current_user_rewards(&self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        self.stream.current_user_rewards(holder, now)
    }

    /// Share balance of a holder (1:1 with locked reserve)
    pub fn balance_of(&self, holder: &AccountId) -> u128 {
        self.stream.shares_of(holder)
    }

    /// Total shares outstanding
    pub fn total_supply(&self) -> u128 {
        self.stream.total_shares()
    }

    /// Reserve assets held (1:1 with shares)
    pub fn total_assets(&self) -> CollateralAmount {
        CollateralAmount::from_units(self.stream.total_shares())
    }
}
