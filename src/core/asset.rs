//! Collateral asset model.
//!
//! This module defines the configured collateral universe:
//! - Asset identity, decimal precision and role tagging
//! - The insertion-ordered asset registry with active-asset switching
//! - The asset bank tracking external fungible-token balances

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT ID
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a principal interacting with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId([u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    /// Create from raw bytes
    pub const fn new(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.0
    }

    /// Hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a collateral asset (its symbol)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create from a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Get the symbol
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a collateral asset in admission control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetRole {
    /// Trades near $1 (USDT, DAI); gates bootstrap minting
    Stable,
    /// Live market price (WETH, WBTC); subject to cycle-based admission
    Volatile,
}

impl AssetRole {
    /// Role name for messages
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Stable => "stable",
            AssetRole::Volatile => "volatile",
        }
    }
}

/// A configured collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identity
    pub id: AssetId,
    /// Decimal precision of native amounts
    pub decimals: u8,
    /// Admission-control role
    pub role: AssetRole,
}

impl Asset {
    /// Create a new asset description
    pub fn new(id: AssetId, decimals: u8, role: AssetRole) -> Self {
        Self { id, decimals, role }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed native asset amount (prevents mixing with ledger units)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CollateralAmount(u128);

impl CollateralAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from native units
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Get raw native units
    pub fn units(&self) -> u128 {
        self.0
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

impl From<u128> for CollateralAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<CollateralAmount> for u128 {
    fn from(amount: CollateralAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// The configured collateral universe.
///
/// Assets are fixed at construction; only the *active* asset of each role
/// can be re-targeted afterwards. Iteration follows registration order,
/// which also defines redemption payout order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRegistry {
    /// Asset descriptions by id
    assets: HashMap<AssetId, Asset>,
    /// Registration order
    order: Vec<AssetId>,
    /// Active stable-role asset (target of role-based deposits)
    active_stable: Option<AssetId>,
    /// Active volatile-role asset
    active_volatile: Option<AssetId>,
}

impl AssetRegistry {
    /// Build the registry from the configured asset list.
    ///
    /// The first asset of each role becomes that role's active asset.
    pub fn new(configured: Vec<Asset>) -> Self {
        let mut assets = HashMap::new();
        let mut order = Vec::new();
        let mut active_stable = None;
        let mut active_volatile = None;

        for asset in configured {
            match asset.role {
                AssetRole::Stable if active_stable.is_none() => {
                    active_stable = Some(asset.id.clone());
                }
                AssetRole::Volatile if active_volatile.is_none() => {
                    active_volatile = Some(asset.id.clone());
                }
                _ => {}
            }
            order.push(asset.id.clone());
            assets.insert(asset.id.clone(), asset);
        }

        Self {
            assets,
            order,
            active_stable,
            active_volatile,
        }
    }

    /// Look up an asset
    pub fn get(&self, id: &AssetId) -> Result<&Asset> {
        self.assets
            .get(id)
            .ok_or_else(|| Error::UnknownAsset(id.to_string()))
    }

    /// Asset ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.order.iter()
    }

    /// Number of registered assets
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currently active stable-role asset
    pub fn active_stable(&self) -> Option<&AssetId> {
        self.active_stable.as_ref()
    }

    /// Currently active volatile-role asset
    pub fn active_volatile(&self) -> Option<&AssetId> {
        self.active_volatile.as_ref()
    }

    /// Re-target the active asset of the given asset's role.
    ///
    /// The target must be registered with the matching role and must not
    /// already be the active asset. Previously held balances are unaffected.
    pub fn switch_active(&mut self, id: &AssetId, role: AssetRole) -> Result<()> {
        let asset = self.get(id)?;
        if asset.role != role {
            return Err(Error::RoleMismatch {
                asset: id.to_string(),
                expected: role.as_str().into(),
            });
        }

        let slot = match role {
            AssetRole::Stable => &mut self.active_stable,
            AssetRole::Volatile => &mut self.active_volatile,
        };
        if slot.as_ref() == Some(id) {
            return Err(Error::AlreadyActive(id.to_string()));
        }
        *slot = Some(id.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET BANK
// ═══════════════════════════════════════════════════════════════════════════════

/// Balance book for the external fungible tokens backing the basket.
///
/// Stands in for the on-ledger token contracts: the engine moves amounts
/// between accounts through it, and a short source balance fails the leg
/// with no effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetBank {
    /// Balances by asset, then account
    balances: HashMap<AssetId, HashMap<AccountId, CollateralAmount>>,
}

impl AssetBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the balance of an account in an asset
    pub fn balance_of(&self, asset: &AssetId, account: &AccountId) -> CollateralAmount {
        self.balances
            .get(asset)
            .and_then(|book| book.get(account))
            .copied()
            .unwrap_or(CollateralAmount::ZERO)
    }

    /// Credit an account (faucet path for tests and simulation)
    pub fn credit(
        &mut self,
        asset: &AssetId,
        account: AccountId,
        amount: CollateralAmount,
    ) -> Result<()> {
        let book = self.balances.entry(asset.clone()).or_default();
        let current = book.get(&account).copied().unwrap_or(CollateralAmount::ZERO);
        let updated = current.checked_add(amount).ok_or(Error::Overflow {
            operation: format!("credit {}", asset),
        })?;
        book.insert(account, updated);
        Ok(())
    }

    /// Move an amount between accounts, all-or-nothing
    pub fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: CollateralAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if from == to {
            return Ok(());
        }

        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(Error::TransferFailed {
                asset: asset.to_string(),
                required: amount.units(),
                available: available.units(),
            });
        }

        let book = self.balances.entry(asset.clone()).or_default();
        let new_from = available.saturating_sub(amount);
        if new_from.is_zero() {
            book.remove(from);
        } else {
            book.insert(*from, new_from);
        }

        let to_balance = book.get(to).copied().unwrap_or(CollateralAmount::ZERO);
        let new_to = to_balance.checked_add(amount).ok_or(Error::Overflow {
            operation: format!("transfer {}", asset),
        })?;
        book.insert(*to, new_to);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(tag: u8) -> AccountId {
        AccountId::new([tag; ACCOUNT_ID_LENGTH])
    }

    fn test_registry() -> AssetRegistry {
        AssetRegistry::new(vec![
            Asset::new(AssetId::new("USDT"), 18, AssetRole::Stable),
            Asset::new(AssetId::new("DAI"), 18, AssetRole::Stable),
            Asset::new(AssetId::new("WETH"), 18, AssetRole::Volatile),
            Asset::new(AssetId::new("WBTC"), 18, AssetRole::Volatile),
        ])
    }

    #[test]
    fn test_registry_order_and_actives() {
        let registry = test_registry();
        let ids: Vec<_> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["USDT", "DAI", "WETH", "WBTC"]);
        assert_eq!(registry.active_stable().unwrap().as_str(), "USDT");
        assert_eq!(registry.active_volatile().unwrap().as_str(), "WETH");
    }

    #[test]
    fn test_switch_active() {
        let mut registry = test_registry();

        registry
            .switch_active(&AssetId::new("DAI"), AssetRole::Stable)
            .unwrap();
        assert_eq!(registry.active_stable().unwrap().as_str(), "DAI");

        // re-selecting the active asset is rejected
        let err = registry
            .switch_active(&AssetId::new("DAI"), AssetRole::Stable)
            .unwrap_err();
        assert_eq!(err, Error::AlreadyActive("DAI".into()));
    }

    #[test]
    fn test_switch_role_mismatch() {
        let mut registry = test_registry();
        let err = registry
            .switch_active(&AssetId::new("WETH"), AssetRole::Stable)
            .unwrap_err();
        assert!(matches!(err, Error::RoleMismatch { .. }));
    }

    #[test]
    fn test_switch_unknown_asset() {
        let mut registry = test_registry();
        let err = registry
            .switch_active(&AssetId::new("DOGE"), AssetRole::Volatile)
            .unwrap_err();
        assert_eq!(err, Error::UnknownAsset("DOGE".into()));
    }

    #[test]
    fn test_bank_credit_and_transfer() {
        let mut bank = AssetBank::new();
        let usdt = AssetId::new("USDT");
        let (alice, bob) = (account(1), account(2));

        bank.credit(&usdt, alice, CollateralAmount::from_units(1_000)).unwrap();
        bank.transfer(&usdt, &alice, &bob, CollateralAmount::from_units(400)).unwrap();

        assert_eq!(bank.balance_of(&usdt, &alice).units(), 600);
        assert_eq!(bank.balance_of(&usdt, &bob).units(), 400);
    }

    #[test]
    fn test_bank_transfer_shortfall() {
        let mut bank = AssetBank::new();
        let usdt = AssetId::new("USDT");
        let (alice, bob) = (account(1), account(2));

        bank.credit(&usdt, alice, CollateralAmount::from_units(100)).unwrap();
        let err = bank
            .transfer(&usdt, &alice, &bob, CollateralAmount::from_units(101))
            .unwrap_err();

        assert!(matches!(err, Error::TransferFailed { .. }));
        // no partial effect
        assert_eq!(bank.balance_of(&usdt, &alice).units(), 100);
        assert_eq!(bank.balance_of(&usdt, &bob).units(), 0);
    }

    #[test]
    fn test_bank_zero_transfer_rejected() {
        let mut bank = AssetBank::new();
        let usdt = AssetId::new("USDT");
        let err = bank
            .transfer(&usdt, &account(1), &account(2), CollateralAmount::ZERO)
            .unwrap_err();
        assert_eq!(err, Error::ZeroAmount);
    }
}
