//! USSD token ledger.
//!
//! This module implements the stablecoin's accounting:
//! - Token minting and burning
//! - Balance tracking and transfers
//! - The restricted reward-minting path for wired satellite modules
//! - Supply management

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use crate::core::asset::AccountId;
use crate::error::{Error, Result};
use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed USSD amount in 6-decimal ledger units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from ledger units
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Create from whole USSD (for convenience)
    pub fn from_whole(whole: u64) -> Self {
        Self(whole * USSD_BASE_UNIT)
    }

    /// Get raw ledger units
    pub fn units(&self) -> u64 {
        self.0
    }

    /// Get value in whole USSD (truncated)
    pub fn whole(&self) -> u64 {
        self.0 / USSD_BASE_UNIT
    }

    /// Get formatted string representation
    pub fn to_string_formatted(&self) -> String {
        let whole = self.0 / USSD_BASE_UNIT;
        let frac = self.0 % USSD_BASE_UNIT;
        format!("{}.{:06} USSD", whole, frac)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Saturating addition
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_formatted())
    }
}

impl From<u64> for TokenAmount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl From<TokenAmount> for u64 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Type of token operation for event logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenOperation {
    /// Minting new tokens against deposited collateral
    Mint,
    /// Burning tokens during redemption
    Burn,
    /// Transfer between accounts
    Transfer,
    /// Reward minting by a wired satellite module
    RewardMint,
}

/// Record of a token operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Type of operation
    pub operation: TokenOperation,
    /// Sender (None for mint)
    pub from: Option<AccountId>,
    /// Recipient (None for burn)
    pub to: Option<AccountId>,
    /// Amount in ledger units
    pub amount: TokenAmount,
    /// Block height
    pub block_height: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STABLECOIN LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// The USSD stablecoin ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stablecoin {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Total supply in ledger units
    total_supply: TokenAmount,
    /// Balances by account
    balances: HashMap<AccountId, TokenAmount>,
    /// Accounts permitted to use the reward-minting path
    reward_minters: HashSet<AccountId>,
    /// Recent events (for client-side tracking)
    events: Vec<TokenEvent>,
    /// Maximum events to keep in memory
    max_events: usize,
}

impl Default for Stablecoin {
    fn default() -> Self {
        Self::new()
    }
}

impl Stablecoin {
    /// Create a new USSD ledger
    pub fn new() -> Self {
        Self {
            name: "US Secured Dollar".to_string(),
            symbol: "USSD".to_string(),
            decimals: USSD_DECIMALS,
            total_supply: TokenAmount::ZERO,
            balances: HashMap::new(),
            reward_minters: HashSet::new(),
            events: Vec::new(),
            max_events: 1000,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUPPLY MANAGEMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get total supply
    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Get balance of an account
    pub fn balance_of(&self, owner: &AccountId) -> TokenAmount {
        self.balances.get(owner).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Mint new tokens (engine-only, from the collateral deposit path)
    pub fn mint(&mut self, to: AccountId, amount: TokenAmount, block_height: u64) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let new_supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "mint total supply".into(),
        })?;

        let current_balance = self.balance_of(&to);
        let new_balance = current_balance.checked_add(amount).ok_or(Error::Overflow {
            operation: "mint balance".into(),
        })?;

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;

        self.add_event(TokenEvent {
            operation: TokenOperation::Mint,
            from: None,
            to: Some(to),
            amount,
            block_height,
        });

        Ok(())
    }

    /// Burn tokens (engine-only, from the redemption path)
    pub fn burn(&mut self, from: AccountId, amount: TokenAmount, block_height: u64) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let current_balance = self.balance_of(&from);
        if current_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.units(),
                available: current_balance.units(),
            });
        }

        let new_balance = current_balance.saturating_sub(amount);
        if new_balance.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, new_balance);
        }

        self.total_supply = self.total_supply.saturating_sub(amount);

        self.add_event(TokenEvent {
            operation: TokenOperation::Burn,
            from: Some(from),
            to: None,
            amount,
            block_height,
        });

        Ok(())
    }

    /// Transfer tokens between accounts
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
        block_height: u64,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        if from == to {
            return Ok(()); // No-op for self-transfer
        }

        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.units(),
                available: from_balance.units(),
            });
        }

        let new_from_balance = from_balance.saturating_sub(amount);
        if new_from_balance.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, new_from_balance);
        }

        let to_balance = self.balance_of(&to);
        let new_to_balance = to_balance.checked_add(amount).ok_or(Error::Overflow {
            operation: "transfer balance".into(),
        })?;
        self.balances.insert(to, new_to_balance);

        self.add_event(TokenEvent {
            operation: TokenOperation::Transfer,
            from: Some(from),
            to: Some(to),
            amount,
            block_height,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESTRICTED REWARD MINTING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register an account as a permitted reward minter (wiring time only)
    pub fn register_reward_minter(&mut self, minter: AccountId) {
        self.reward_minters.insert(minter);
    }

    /// Whether an account may use the reward-minting path
    pub fn is_reward_minter(&self, account: &AccountId) -> bool {
        self.reward_minters.contains(account)
    }

    /// Mint accrued yield to a recipient.
    ///
    /// Callable solely by the wired staking/insurance identities; new supply,
    /// not a transfer from a reserve. A zero amount is a no-op success.
    pub fn mint_rewards(
        &mut self,
        caller: &AccountId,
        to: AccountId,
        amount: TokenAmount,
        block_height: u64,
    ) -> Result<()> {
        if !self.reward_minters.contains(caller) {
            return Err(Error::Unauthorized(format!(
                "{} is not a reward minter",
                caller
            )));
        }
        if amount.is_zero() {
            return Ok(());
        }

        let new_supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "reward mint total supply".into(),
        })?;
        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(Error::Overflow {
                operation: "reward mint balance".into(),
            })?;

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;

        self.add_event(TokenEvent {
            operation: TokenOperation::RewardMint,
            from: Some(*caller),
            to: Some(to),
            amount,
            block_height,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get number of token holders
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Get all balances (for auditing)
    pub fn all_balances(&self) -> &HashMap<AccountId, TokenAmount> {
        &self.balances
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u64 = self.balances.values().map(|b| b.units()).sum();
        sum == self.total_supply.units()
    }

    /// Get recent events
    pub fn recent_events(&self) -> &[TokenEvent] {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add an event (with pruning)
    fn add_event(&mut self, event: TokenEvent) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Compute state hash (supply + balances, deterministic)
    pub fn state_hash(&self) -> [u8; 32] {
        let mut data = Vec::new();
        data.extend_from_slice(&self.total_supply.units().to_be_bytes());

        // Sort balances for deterministic hashing
        let mut sorted_balances: Vec<_> = self.balances.iter().collect();
        sorted_balances.sort_by_key(|(k, _)| *k);

        for (account, balance) in sorted_balances {
            data.extend_from_slice(account.as_bytes());
            data.extend_from_slice(&balance.units().to_be_bytes());
        }

        Sha256::digest(&data).into()
    }
}
