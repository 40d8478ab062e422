//! Staked USSD vault.
//!
//! Holders lock the stablecoin itself and receive 18-decimal shares at a
//! fixed 10^12 scale over the 6-decimal ledger unit; the share balance
//! accrues stablecoin yield at the staking rate.

use serde::{Deserialize, Serialize};

use crate::core::asset::AccountId;
use crate::core::token::TokenAmount;
use crate::error::{Error, Result};
use crate::rewards::stream::{RewardCheckpoint, RewardStream};
use crate::utils::constants::{STAKING_APY_BPS, STAKING_SHARE_SCALE};
use crate::utils::math::FixedPoint;

/// Staking vault: scaled shares over staked USSD, staking-rate yield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingVault {
    /// Share token name
    pub name: String,
    /// Share token symbol
    pub symbol: String,
    /// The vault's identity (stake custody and reward-minter principal)
    account: AccountId,
    /// Reward accrual over the share balance
    stream: RewardStream,
}

impl StakingVault {
    /// Create a staking vault
    pub fn new(account: AccountId) -> Self {
        Self {
            name: "Staked USSD".to_string(),
            symbol: "stUSSD".to_string(),
            account,
            stream: RewardStream::new(STAKING_APY_BPS),
        }
    }

    /// The vault's identity
    pub fn account(&self) -> AccountId {
        self.account
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

    /// Mint scaled shares for a stake deposit; returns the shares minted
    pub fn deposit(
        &mut self,
        recipient: AccountId,
        amount: TokenAmount,
        now: i64,
    ) -> Result<u128> {
        let shares = (amount.units() as u128) * STAKING_SHARE_SCALE;
        self.stream.deposit_shares(recipient, shares, now)?;
        Ok(shares)
    }

    /// Burn the shares covering an exact underlying amount; returns the
    /// shares burned
    pub fn withdraw(
        &mut self,
        owner: &AccountId,
        amount: TokenAmount,
        now: i64,
    ) -> Result<u128> {
        let shares = (amount.units() as u128) * STAKING_SHARE_SCALE;
        self.stream.withdraw_shares(owner, shares, now)?;
        Ok(shares)
    }

    /// Burn an exact share amount; returns the underlying released
    /// (rounded down to the ledger unit)
    pub fn redeem(&mut self, owner: &AccountId, shares: u128, now: i64) -> Result<TokenAmount> {
        let underlying = shares / STAKING_SHARE_SCALE;
        if underlying == 0 {
            return Err(Error::ZeroAmount);
        }
        self.stream.withdraw_shares(owner, shares, now)?;
        Ok(TokenAmount::from_units(underlying as u64))
    }

    /// Settle and take everything owed to a holder
    pub fn claim(&mut self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        self.stream.claim(holder, now)
    }

    /// Accrued, unclaimed reward for a holder (pure query)
    pub fn current_user_rewards(&self, holder: &AccountId, now: i64) -> Result<TokenAmount> {
        self.stream.current_user_rewards(holder, now)
    }

    /// Share balance of a holder
    pub fn balance_of(&self, holder: &AccountId) -> u128 {
        self.stream.shares_of(holder)
    }

    /// Total shares outstanding
    pub fn total_supply(&self) -> u128 {
        self.stream.total_shares()
    }

    /// Staked USSD covered by outstanding shares
    pub fn total_assets(&self) -> TokenAmount {
        TokenAmount::from_units((self.stream.total_shares() / STAKING_SHARE_SCALE) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::ACCOUNT_ID_LENGTH;

    fn account(tag: u8) -> AccountId {
        AccountId::new([tag; ACCOUNT_ID_LENGTH])
    }

    fn test_vault() -> StakingVault {
        StakingVault::new(account(0xBB))
    }

    #[test]
    fn test_share_scale() {
        let mut vault = test_vault();

        // 100 USSD -> 100e18 shares
        let shares = vault
            .deposit(account(1), TokenAmount::from_whole(100), 0)
            .unwrap();
        assert_eq!(shares, 100_000_000_000_000_000_000);
        assert_eq!(vault.total_supply(), 100_000_000_000_000_000_000);
        assert_eq!(vault.total_assets(), TokenAmount::from_whole(100));
    }

    #[test]
    fn test_withdraw_and_redeem_are_inverse() {
        let mut vault = test_vault();
        vault
            .deposit(account(1), TokenAmount::from_whole(100), 0)
            .unwrap();

        // redeem half the shares
        let released = vault
            .redeem(&account(1), 50_000_000_000_000_000_000, 0)
            .unwrap();
        assert_eq!(released, TokenAmount::from_whole(50));

        // withdraw the remaining underlying
        let burned = vault
            .withdraw(&account(1), TokenAmount::from_whole(50), 0)
            .unwrap();
        assert_eq!(burned, 50_000_000_000_000_000_000);
        assert_eq!(vault.balance_of(&account(1)), 0);
    }

    #[test]
    fn test_redeem_below_one_unit() {
        let mut vault = test_vault();
        vault
            .deposit(account(1), TokenAmount::from_whole(1), 0)
            .unwrap();

        // fewer shares than one ledger unit releases nothing
        let err = vault
            .redeem(&account(1), STAKING_SHARE_SCALE - 1, 0)
            .unwrap_err();
        assert_eq!(err, Error::ZeroAmount);
    }
}
