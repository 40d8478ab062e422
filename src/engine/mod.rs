//! The USSD engine - central orchestrator.
//!
//! Owns the asset registry, the external-token bank, the collateral pool,
//! the USSD ledger and the wired satellite modules, and executes every
//! state transition atomically: an operation either completes with all of
//! its balance movements or fails with none of them.
//!
//! The engine assumes a single-writer, serialized execution model. The
//! host advances the clock explicitly through [`UssdEngine::advance_block`];
//! nothing reads ambient time.

pub mod admission;
pub mod redemption;

pub use admission::*;
pub use redemption::*;

use sha2::{Digest, Sha256};

use crate::core::asset::{AccountId, AssetBank, AssetId, AssetRegistry, AssetRole, CollateralAmount};
use crate::core::config::ProtocolParams;
use crate::core::cycle::{market_phase, MarketPhase};
use crate::core::pool::{BasketSnapshot, CollateralPool};
use crate::core::token::{Stablecoin, TokenAmount};
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::rewards::{InsuranceTrust, StakingVault};
use crate::utils::constants::*;
use crate::utils::math::{mul_div, usd_value, FixedPoint};

/// Custody account holding pooled collateral in the asset bank
const POOL_CUSTODY: AccountId = AccountId::new([0xCC; ACCOUNT_ID_LENGTH]);

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The USSD stablecoin engine
#[derive(Debug, Clone)]
pub struct UssdEngine<O: PriceOracle> {
    /// Protocol parameters
    params: ProtocolParams,
    /// Privileged principal for admin operations
    owner: AccountId,
    /// Configured collateral universe
    registry: AssetRegistry,
    /// External fungible-token balances
    bank: AssetBank,
    /// The collateral basket
    pool: CollateralPool,
    /// The USSD ledger
    ledger: Stablecoin,
    /// Price source for basket valuation
    oracle: O,
    /// Wired staking vault
    staking: Option<StakingVault>,
    /// Wired insurance trust
    insurance: Option<InsuranceTrust>,
    /// Current block height
    block_height: u64,
    /// Current unix timestamp
    timestamp: i64,
}

impl<O: PriceOracle> UssdEngine<O> {
    /// Create an engine over a configured registry and oracle
    pub fn new(
        owner: AccountId,
        registry: AssetRegistry,
        oracle: O,
        params: ProtocolParams,
        genesis_timestamp: i64,
    ) -> Self {
        Self {
            params,
            owner,
            registry,
            bank: AssetBank::new(),
            pool: CollateralPool::new(),
            ledger: Stablecoin::new(),
            oracle,
            staking: None,
            insurance: None,
            block_height: 1,
            timestamp: genesis_timestamp,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLOCK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance to the next block at the given timestamp.
    ///
    /// Time never runs backwards; an earlier timestamp is clamped.
    pub fn advance_block(&mut self, timestamp: i64) {
        self.block_height += 1;
        self.timestamp = self.timestamp.max(timestamp);
    }

    /// Current block height
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Current timestamp
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Market phase at the current timestamp
    pub fn market_phase(&self) -> MarketPhase {
        market_phase(self.timestamp)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VIEWS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The privileged principal
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Protocol parameters
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// The configured collateral universe
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// The USSD ledger
    pub fn ledger(&self) -> &Stablecoin {
        &self.ledger
    }

    /// The collateral basket
    pub fn pool(&self) -> &CollateralPool {
        &self.pool
    }

    /// The external-token bank
    pub fn bank(&self) -> &AssetBank {
        &self.bank
    }

    /// Mutable bank access for seeding balances (tests and simulation)
    pub fn bank_mut(&mut self) -> &mut AssetBank {
        &mut self.bank
    }

    /// The price oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable oracle access (tests and simulation)
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// The wired staking vault, if any
    pub fn staking(&self) -> Option<&StakingVault> {
        self.staking.as_ref()
    }

    /// The wired insurance trust, if any
    pub fn insurance(&self) -> Option<&InsuranceTrust> {
        self.insurance.as_ref()
    }

    /// The custody account pooled collateral is held under
    pub fn custody_account(&self) -> AccountId {
        POOL_CUSTODY
    }

    /// USSD total supply
    pub fn total_supply(&self) -> TokenAmount {
        self.ledger.total_supply()
    }

    /// USSD balance of an account
    pub fn balance_of(&self, account: &AccountId) -> TokenAmount {
        self.ledger.balance_of(account)
    }

    /// Basket value over outstanding supply; 1.0 exactly at zero supply
    pub fn collateral_factor(&self) -> Result<FixedPoint> {
        self.pool
            .collateral_factor(&self.registry, &self.oracle, self.ledger.total_supply())
    }

    /// Priced basket snapshot (one consistent oracle read set)
    pub fn basket_snapshot(&self) -> Result<BasketSnapshot> {
        self.pool.value_snapshot(&self.registry, &self.oracle)
    }

    /// Deterministic hash over ledger and pool state
    pub fn state_hash(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&self.ledger.state_hash());
        data.extend_from_slice(&self.pool.state_hash());
        Sha256::digest(&data).into()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MINT / REDEEM
    // ═══════════════════════════════════════════════════════════════════════════

    /// Mint USSD against a collateral deposit.
    ///
    /// The admission policy gates which asset is allowed given the basket
    /// composition and market phase; on success the deposit, the pool
    /// credit and the ledger mint happen atomically. Returns the minted
    /// amount.
    pub fn mint_for_asset(
        &mut self,
        caller: AccountId,
        asset: &AssetId,
        amount: CollateralAmount,
        recipient: AccountId,
    ) -> Result<TokenAmount> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let info = self.registry.get(asset)?.clone();

        // one consistent set of oracle reads for this call
        let snapshot = self.pool.value_snapshot(&self.registry, &self.oracle)?;
        let price = self.oracle.price_usd(asset)?;
        let supply = self.ledger.total_supply();
        let factor = Self::factor_from(&snapshot, supply)?;

        check_admission(
            info.role,
            supply,
            &snapshot,
            market_phase(self.timestamp),
            &self.params,
        )?;

        let minted = TokenAmount::from_units(
            usd_value(amount.units(), info.decimals, price)?.to_ledger_units(),
        );
        if minted.is_zero() {
            return Err(Error::ZeroAmount);
        }

        self.checkpoint_streams(supply, factor)?;

        self.bank.transfer(asset, &caller, &POOL_CUSTODY, amount)?;
        self.pool.deposit(asset, amount, self.block_height)?;
        self.ledger.mint(recipient, minted, self.block_height)?;

        // the promoted basis is the block-end state, so streams re-observe
        // the post-mint figures
        self.checkpoint_all()?;

        tracing::info!(
            asset = %asset,
            minted = %minted,
            recipient = %recipient,
            "minted USSD for collateral"
        );
        Ok(minted)
    }

    /// Burn USSD and pay out a proportional slice of the basket.
    ///
    /// Fully collateralized redemptions pay strict pro-rata; an
    /// under-collateralized basket pays a haircut and requires the
    /// insurance trust to be wired. Returns the executed plan.
    pub fn redeem(
        &mut self,
        caller: AccountId,
        amount: TokenAmount,
        recipient: AccountId,
    ) -> Result<RedemptionPlan> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let balance = self.ledger.balance_of(&caller);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.units(),
                available: balance.units(),
            });
        }

        let supply = self.ledger.total_supply();
        let snapshot = self.pool.value_snapshot(&self.registry, &self.oracle)?;
        let factor = Self::factor_from(&snapshot, supply)?;

        self.checkpoint_streams(supply, factor)?;

        let plan = plan_redemption(
            amount,
            supply,
            factor,
            self.insurance.is_some(),
            self.params.redemption_penalty_bps,
            &self.pool,
            &self.registry,
        )?;

        // stage: every leg must be coverable before anything moves
        for (asset, payout) in &plan.payouts {
            let held = self.bank.balance_of(asset, &POOL_CUSTODY);
            if held < *payout {
                return Err(Error::TransferFailed {
                    asset: asset.to_string(),
                    required: payout.units(),
                    available: held.units(),
                });
            }
        }

        self.ledger.burn(caller, amount, self.block_height)?;
        for (asset, payout) in &plan.payouts {
            self.pool.payout(asset, *payout, self.block_height)?;
            self.bank.transfer(asset, &POOL_CUSTODY, &recipient, *payout)?;
        }

        // streams re-observe the post-redemption figures
        self.checkpoint_all()?;

        tracing::info!(
            amount = %amount,
            recipient = %recipient,
            penalized = plan.penalized,
            "redeemed USSD against the basket"
        );
        Ok(plan)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Wire the staking vault. One-time: re-wiring the same identity is a
    /// no-op, a different one is rejected.
    pub fn connect_staking(&mut self, caller: AccountId, vault: StakingVault) -> Result<()> {
        self.ensure_owner(&caller)?;
        if let Some(existing) = &self.staking {
            if existing.account() == vault.account() {
                return Ok(());
            }
            return Err(Error::AlreadyConnected("staking".into()));
        }
        self.ledger.register_reward_minter(vault.account());
        tracing::info!(account = %vault.account(), "staking vault connected");
        self.staking = Some(vault);
        Ok(())
    }

    /// Wire the insurance trust. One-time, same semantics as staking; the
    /// reserve asset must be a registered volatile asset.
    pub fn connect_insurance(&mut self, caller: AccountId, trust: InsuranceTrust) -> Result<()> {
        self.ensure_owner(&caller)?;
        if let Some(existing) = &self.insurance {
            if existing.account() == trust.account() {
                return Ok(());
            }
            return Err(Error::AlreadyConnected("insurance".into()));
        }

        let reserve = self.registry.get(trust.reserve_asset())?;
        if reserve.role != AssetRole::Volatile {
            return Err(Error::RoleMismatch {
                asset: reserve.id.to_string(),
                expected: AssetRole::Volatile.as_str().into(),
            });
        }

        self.ledger.register_reward_minter(trust.account());
        tracing::info!(account = %trust.account(), "insurance trust connected");
        self.insurance = Some(trust);
        Ok(())
    }

    /// Re-target the active stable-role asset
    pub fn switch_active_stable(&mut self, caller: AccountId, asset: &AssetId) -> Result<()> {
        self.ensure_owner(&caller)?;
        self.registry.switch_active(asset, AssetRole::Stable)
    }

    /// Re-target the active volatile-role asset
    pub fn switch_active_volatile(&mut self, caller: AccountId, asset: &AssetId) -> Result<()> {
        self.ensure_owner(&caller)?;
        self.registry.switch_active(asset, AssetRole::Volatile)
    }

    /// Hand the owner role to another principal
    pub fn change_owner(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(&caller)?;
        tracing::info!(from = %self.owner, to = %new_owner, "owner changed");
        self.owner = new_owner;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STAKING SURFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Stake USSD; mints scaled shares to `recipient`
    pub fn stake_deposit(
        &mut self,
        caller: AccountId,
        amount: TokenAmount,
        recipient: AccountId,
    ) -> Result<u128> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let vault_account = self.staking_account()?;
        self.checkpoint_all()?;

        let available = self.ledger.balance_of(&caller);
        if available < amount {
            return Err(Error::TransferFailed {
                asset: self.ledger.symbol.clone(),
                required: amount.units() as u128,
                available: available.units() as u128,
            });
        }
        self.ledger
            .transfer(caller, vault_account, amount, self.block_height)?;

        let now = self.timestamp;
        let vault = self.staking_mut()?;
        vault.deposit(recipient, amount, now)
    }

    /// Unstake an exact USSD amount; burns the covering shares
    pub fn stake_withdraw(
        &mut self,
        caller: AccountId,
        amount: TokenAmount,
        recipient: AccountId,
    ) -> Result<u128> {
        let vault_account = self.staking_account()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let shares = self.staking_mut()?.withdraw(&caller, amount, now)?;
        self.ledger
            .transfer(vault_account, recipient, amount, self.block_height)?;
        Ok(shares)
    }

    /// Burn an exact share amount; releases the underlying USSD
    pub fn stake_redeem(
        &mut self,
        caller: AccountId,
        shares: u128,
        recipient: AccountId,
    ) -> Result<TokenAmount> {
        let vault_account = self.staking_account()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let amount = self.staking_mut()?.redeem(&caller, shares, now)?;
        self.ledger
            .transfer(vault_account, recipient, amount, self.block_height)?;
        Ok(amount)
    }

    /// Settle and mint everything owed to a staker
    pub fn stake_claim(&mut self, holder: AccountId) -> Result<TokenAmount> {
        let vault_account = self.staking_account()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let owed = self.staking_mut()?.claim(&holder, now)?;
        self.ledger
            .mint_rewards(&vault_account, holder, owed, self.block_height)?;
        self.checkpoint_all()?;
        Ok(owed)
    }

    /// Accrued, unclaimed staking reward for a holder (pure query)
    pub fn stake_rewards_of(&self, holder: &AccountId) -> Result<TokenAmount> {
        let vault = self
            .staking
            .as_ref()
            .ok_or_else(|| Error::NotConnected("staking".into()))?;
        vault.current_user_rewards(holder, self.timestamp)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSURANCE SURFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Lock reserve assets in the trust; mints 1:1 shares to `recipient`
    pub fn insurance_deposit(
        &mut self,
        caller: AccountId,
        asset: &AssetId,
        amount: CollateralAmount,
        recipient: AccountId,
    ) -> Result<u128> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let (trust_account, reserve) = self.insurance_identity()?;
        if *asset != reserve {
            return Err(Error::ReserveAssetOnly(asset.to_string()));
        }
        self.checkpoint_all()?;

        self.bank.transfer(asset, &caller, &trust_account, amount)?;
        let now = self.timestamp;
        let trust = self.insurance_mut()?;
        trust.deposit(recipient, amount, now)
    }

    /// Unlock reserve assets from the trust; burns 1:1 shares
    pub fn insurance_withdraw(
        &mut self,
        caller: AccountId,
        amount: CollateralAmount,
        recipient: AccountId,
    ) -> Result<u128> {
        let (trust_account, reserve) = self.insurance_identity()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let shares = self.insurance_mut()?.withdraw(&caller, amount, now)?;
        self.bank
            .transfer(&reserve, &trust_account, &recipient, amount)?;
        Ok(shares)
    }

    /// Burn an exact share amount; unlocks the reserve 1:1
    pub fn insurance_redeem(
        &mut self,
        caller: AccountId,
        shares: u128,
        recipient: AccountId,
    ) -> Result<CollateralAmount> {
        let (trust_account, reserve) = self.insurance_identity()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let released = self.insurance_mut()?.redeem(&caller, shares, now)?;
        self.bank
            .transfer(&reserve, &trust_account, &recipient, released)?;
        Ok(released)
    }

    /// Settle and mint everything owed to an insurance depositor
    pub fn insurance_claim(&mut self, holder: AccountId) -> Result<TokenAmount> {
        let (trust_account, _) = self.insurance_identity()?;
        self.checkpoint_all()?;

        let now = self.timestamp;
        let owed = self.insurance_mut()?.claim(&holder, now)?;
        self.ledger
            .mint_rewards(&trust_account, holder, owed, self.block_height)?;
        self.checkpoint_all()?;
        Ok(owed)
    }

    /// Accrued, unclaimed insurance reward for a holder (pure query)
    pub fn insurance_rewards_of(&self, holder: &AccountId) -> Result<TokenAmount> {
        let trust = self
            .insurance
            .as_ref()
            .ok_or_else(|| Error::NotConnected("insurance".into()))?;
        trust.current_user_rewards(holder, self.timestamp)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.owner {
            return Err(Error::Unauthorized(format!("{} is not the owner", caller)));
        }
        Ok(())
    }

    /// Collateral factor from an already-priced snapshot
    fn factor_from(snapshot: &BasketSnapshot, supply: TokenAmount) -> Result<FixedPoint> {
        if supply.is_zero() {
            return Ok(FixedPoint::ONE);
        }
        let supply_usd =
            (supply.units() as u128) * (FixedPoint::SCALE / USSD_BASE_UNIT as u128);
        mul_div(snapshot.total_value.raw(), FixedPoint::SCALE, supply_usd)
            .map(FixedPoint::from_raw)
    }

    /// Let both streams observe the given backing figures
    fn checkpoint_streams(&mut self, supply: TokenAmount, factor: FixedPoint) -> Result<()> {
        let (block, now) = (self.block_height, self.timestamp);
        if let Some(vault) = self.staking.as_mut() {
            vault.checkpoint(block, supply, factor, now)?;
        }
        if let Some(trust) = self.insurance.as_mut() {
            trust.checkpoint(block, supply, factor, now)?;
        }
        Ok(())
    }

    /// Checkpoint both streams from a fresh valuation
    fn checkpoint_all(&mut self) -> Result<()> {
        let supply = self.ledger.total_supply();
        let snapshot = self.pool.value_snapshot(&self.registry, &self.oracle)?;
        let factor = Self::factor_from(&snapshot, supply)?;
        self.checkpoint_streams(supply, factor)
    }

    fn staking_account(&self) -> Result<AccountId> {
        self.staking
            .as_ref()
            .map(|v| v.account())
            .ok_or_else(|| Error::NotConnected("staking".into()))
    }

    fn staking_mut(&mut self) -> Result<&mut StakingVault> {
        self.staking
            .as_mut()
            .ok_or_else(|| Error::NotConnected("staking".into()))
    }

    fn insurance_identity(&self) -> Result<(AccountId, AssetId)> {
        self.insurance
            .as_ref()
            .map(|t| (t.account(), t.reserve_asset().clone()))
            .ok_or_else(|| Error::NotConnected("insurance".into()))
    }

    fn insurance_mut(&mut self) -> Result<&mut InsuranceTrust> {
        self.insurance
            .as_mut()
            .ok_or_else(|| Error::NotConnected("insurance".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::Asset;
    use crate::oracle::StaticOracle;

    const WAD: u128 = 1_000_000_000_000_000_000;

    fn account(tag: u8) -> AccountId {
        AccountId::new([tag; ACCOUNT_ID_LENGTH])
    }

    fn usdt() -> AssetId {
        AssetId::new("USDT")
    }

    fn weth() -> AssetId {
        AssetId::new("WETH")
    }

    fn wbgl() -> AssetId {
        AssetId::new("WBGL")
    }

    /// Engine at the cycle epoch (winter), fully priced, caller 1 seeded
    fn test_engine() -> UssdEngine<StaticOracle> {
        let registry = AssetRegistry::new(vec![
            Asset::new(AssetId::new("USDT"), 18, AssetRole::Stable),
            Asset::new(AssetId::new("DAI"), 18, AssetRole::Stable),
            Asset::new(AssetId::new("WETH"), 18, AssetRole::Volatile),
            Asset::new(AssetId::new("WBTC"), 18, AssetRole::Volatile),
            Asset::new(AssetId::new("WBGL"), 18, AssetRole::Volatile),
        ]);

        let mut oracle = StaticOracle::new();
        oracle.set_price(AssetId::new("USDT"), FixedPoint::ONE);
        oracle.set_price(AssetId::new("DAI"), FixedPoint::ONE);
        oracle.set_price(AssetId::new("WETH"), FixedPoint::from_integer(2_500));
        oracle.set_price(AssetId::new("WBTC"), FixedPoint::from_integer(40_000));

        let mut engine = UssdEngine::new(
            account(0),
            registry,
            oracle,
            ProtocolParams::default(),
            CYCLE_EPOCH,
        );

        for asset in ["USDT", "DAI", "WETH", "WBTC", "WBGL"] {
            engine
                .bank_mut()
                .credit(
                    &AssetId::new(asset),
                    account(1),
                    CollateralAmount::from_units(1_000 * WAD),
                )
                .unwrap();
        }
        engine
    }

    #[test]
    fn test_bootstrap_mint_requires_stable() {
        let mut engine = test_engine();

        let err = engine
            .mint_for_asset(account(1), &weth(), CollateralAmount::from_units(WAD), account(1))
            .unwrap_err();
        assert_eq!(err, Error::StableOnly);

        let minted = engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(100 * WAD), account(1))
            .unwrap();
        assert_eq!(minted.units(), 100_000_000);
        assert_eq!(engine.total_supply().units(), 100_000_000);
        assert_eq!(engine.collateral_factor().unwrap(), FixedPoint::ONE);
    }

    #[test]
    fn test_stable_cap_steers_to_volatile_in_winter() {
        let mut engine = test_engine();
        assert_eq!(engine.market_phase(), MarketPhase::Winter);

        engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(100 * WAD), account(1))
            .unwrap();

        // stables are 100% of the basket: further stable minting is rejected
        let err = engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(WAD), account(1))
            .unwrap_err();
        assert_eq!(err, Error::VolatileRequired);

        // 0.1 WETH at $2,500 mints 250 USSD
        let minted = engine
            .mint_for_asset(account(1), &weth(), CollateralAmount::from_units(WAD / 10), account(1))
            .unwrap();
        assert_eq!(minted.units(), 250_000_000);
        assert_eq!(engine.total_supply().units(), 350_000_000);
        assert_eq!(engine.collateral_factor().unwrap(), FixedPoint::ONE);
    }

    #[test]
    fn test_mint_without_bank_balance_fails_atomically() {
        let mut engine = test_engine();

        let err = engine
            .mint_for_asset(
                account(2), // unseeded caller
                &usdt(),
                CollateralAmount::from_units(100 * WAD),
                account(2),
            )
            .unwrap_err();
        assert!(matches!(err, Error::TransferFailed { .. }));
        assert_eq!(engine.total_supply(), TokenAmount::ZERO);
        assert!(engine.pool().balance_of(&usdt()).is_zero());
    }

    #[test]
    fn test_redeem_pro_rata() {
        let mut engine = test_engine();
        engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(100 * WAD), account(1))
            .unwrap();
        engine
            .mint_for_asset(account(1), &weth(), CollateralAmount::from_units(WAD / 10), account(1))
            .unwrap();

        // a stranger with no balance cannot redeem
        let err = engine
            .redeem(account(2), TokenAmount::from_whole(75), account(3))
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));

        // 300 of 350: fraction 6/7 of each asset
        let plan = engine
            .redeem(account(1), TokenAmount::from_whole(300), account(3))
            .unwrap();
        assert!(!plan.penalized);
        assert_eq!(engine.total_supply().units(), 50_000_000);

        let fraction = FixedPoint::from_ratio(6, 7).unwrap().raw();
        assert_eq!(
            engine.bank().balance_of(&usdt(), &account(3)).units(),
            100 * WAD * fraction / FixedPoint::SCALE
        );
        assert_eq!(
            engine.bank().balance_of(&weth(), &account(3)).units(),
            (WAD / 10) * fraction / FixedPoint::SCALE
        );
        assert!(engine.ledger().verify_supply_invariant());
    }

    #[test]
    fn test_haircut_redemption() {
        let mut engine = test_engine();
        engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(100 * WAD), account(1))
            .unwrap();
        engine
            .mint_for_asset(account(1), &weth(), CollateralAmount::from_units(WAD / 10), account(1))
            .unwrap();

        // WETH halves: $225 backing 350 USSD
        engine
            .oracle_mut()
            .set_price(weth(), FixedPoint::from_integer(1_250));
        let factor = engine.collateral_factor().unwrap();
        assert!(factor < FixedPoint::ONE);

        // no insurance wired: shortfall exits are refused
        let err = engine
            .redeem(account(1), TokenAmount::from_whole(35), account(4))
            .unwrap_err();
        assert_eq!(err, Error::InsuranceNotConnected);

        engine
            .connect_insurance(account(0), InsuranceTrust::new(account(0xAA), wbgl()))
            .unwrap();

        let plan = engine
            .redeem(account(1), TokenAmount::from_whole(35), account(4))
            .unwrap();
        assert!(plan.penalized);
        assert_eq!(engine.total_supply().units(), 315_000_000);

        // payout = balance × 1/10 × cf × 0.95
        let haircut = factor
            .checked_mul(FixedPoint::from_bps(REDEMPTION_PENALTY_BPS))
            .unwrap();
        let tenth = FixedPoint::from_ratio(1, 10).unwrap();
        let expected = 100 * WAD * tenth.raw() / FixedPoint::SCALE * haircut.raw()
            / FixedPoint::SCALE;
        assert_eq!(
            engine.bank().balance_of(&usdt(), &account(4)).units(),
            expected
        );
    }

    #[test]
    fn test_admin_owner_gating() {
        let mut engine = test_engine();

        let err = engine
            .switch_active_stable(account(1), &AssetId::new("DAI"))
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        engine
            .switch_active_stable(account(0), &AssetId::new("DAI"))
            .unwrap();
        assert_eq!(engine.registry().active_stable().unwrap().as_str(), "DAI");

        engine.change_owner(account(0), account(7)).unwrap();
        assert!(engine.change_owner(account(0), account(8)).is_err());
        engine.change_owner(account(7), account(8)).unwrap();
        assert_eq!(engine.owner(), account(8));
    }

    #[test]
    fn test_connect_wiring_is_one_time() {
        let mut engine = test_engine();
        let vault = StakingVault::new(account(0xBB));

        engine.connect_staking(account(0), vault.clone()).unwrap();
        // same identity: idempotent
        engine.connect_staking(account(0), vault).unwrap();
        // different identity: rejected
        let err = engine
            .connect_staking(account(0), StakingVault::new(account(0xBC)))
            .unwrap_err();
        assert_eq!(err, Error::AlreadyConnected("staking".into()));
    }

    #[test]
    fn test_insurance_reserve_must_be_registered_volatile() {
        let mut engine = test_engine();

        let err = engine
            .connect_insurance(account(0), InsuranceTrust::new(account(0xAA), usdt()))
            .unwrap_err();
        assert!(matches!(err, Error::RoleMismatch { .. }));

        let err = engine
            .connect_insurance(
                account(0),
                InsuranceTrust::new(account(0xAA), AssetId::new("DOGE")),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAsset(_)));
    }

    #[test]
    fn test_surfaces_require_wiring() {
        let mut engine = test_engine();

        let err = engine
            .stake_deposit(account(1), TokenAmount::from_whole(1), account(1))
            .unwrap_err();
        assert_eq!(err, Error::NotConnected("staking".into()));

        let err = engine
            .insurance_deposit(
                account(1),
                &wbgl(),
                CollateralAmount::from_units(WAD),
                account(1),
            )
            .unwrap_err();
        assert_eq!(err, Error::NotConnected("insurance".into()));
    }

    #[test]
    fn test_insurance_deposit_gated_to_reserve() {
        let mut engine = test_engine();
        engine
            .connect_insurance(account(0), InsuranceTrust::new(account(0xAA), wbgl()))
            .unwrap();

        let err = engine
            .insurance_deposit(
                account(1),
                &weth(),
                CollateralAmount::from_units(WAD),
                account(1),
            )
            .unwrap_err();
        assert_eq!(err, Error::ReserveAssetOnly("WETH".into()));

        let shares = engine
            .insurance_deposit(
                account(1),
                &wbgl(),
                CollateralAmount::from_units(10 * WAD),
                account(1),
            )
            .unwrap();
        assert_eq!(shares, 10 * WAD);
        assert_eq!(
            engine
                .bank()
                .balance_of(&wbgl(), &account(0xAA))
                .units(),
            10 * WAD
        );
    }

    #[test]
    fn test_stake_lifecycle() {
        let mut engine = test_engine();
        engine
            .connect_staking(account(0), StakingVault::new(account(0xBB)))
            .unwrap();
        engine
            .mint_for_asset(account(1), &usdt(), CollateralAmount::from_units(100 * WAD), account(1))
            .unwrap();

        let shares = engine
            .stake_deposit(account(1), TokenAmount::from_whole(40), account(1))
            .unwrap();
        assert_eq!(shares, 40 * WAD);
        assert_eq!(engine.balance_of(&account(1)).units(), 60_000_000);
        assert_eq!(
            engine.staking().unwrap().total_assets(),
            TokenAmount::from_whole(40)
        );

        // unstake half by amount, half by shares
        engine
            .stake_withdraw(account(1), TokenAmount::from_whole(20), account(1))
            .unwrap();
        engine
            .stake_redeem(account(1), 20 * WAD, account(1))
            .unwrap();
        assert_eq!(engine.balance_of(&account(1)).units(), 100_000_000);
        assert_eq!(engine.staking().unwrap().total_supply(), 0);
        assert!(engine.ledger().verify_supply_invariant());
    }

    #[test]
    fn test_stake_deposit_without_funds() {
        let mut engine = test_engine();
        engine
            .connect_staking(account(0), StakingVault::new(account(0xBB)))
            .unwrap();

        let err = engine
            .stake_deposit(account(2), TokenAmount::from_whole(1), account(2))
            .unwrap_err();
        assert!(matches!(err, Error::TransferFailed { .. }));
    }
}
