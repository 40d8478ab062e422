//! Collateral pool management.
//!
//! This module tracks the collateral basket backing the stablecoin:
//! - Per-asset held balances (native units)
//! - Basket valuation through the price oracle
//! - The collateral factor derivation

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::core::asset::{AssetId, AssetRegistry, AssetRole, CollateralAmount};
use crate::core::token::TokenAmount;
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::utils::constants::*;
use crate::utils::math::{mul_div, usd_value, FixedPoint};

// ═══════════════════════════════════════════════════════════════════════════════
// POOL OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Type of pool operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolOperation {
    /// Collateral received on the mint path
    Deposit,
    /// Collateral released on the redemption path
    Payout,
}

/// Record of a pool operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEvent {
    /// Type of operation
    pub operation: PoolOperation,
    /// Asset moved
    pub asset: AssetId,
    /// Amount in native units
    pub amount: CollateralAmount,
    /// Block height
    pub block_height: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BASKET SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Basket valuation from a single consistent set of oracle reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketSnapshot {
    /// USD value of everything held
    pub total_value: FixedPoint,
    /// USD value of the stable-role portion
    pub stable_value: FixedPoint,
}

impl BasketSnapshot {
    /// Fraction of basket value held in stable-role assets, in basis points
    pub fn stable_ratio_bps(&self) -> u64 {
        if self.total_value.is_zero() {
            return 0;
        }
        (self.stable_value.raw() * BPS_DIVISOR as u128 / self.total_value.raw()) as u64
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL POOL
// ═══════════════════════════════════════════════════════════════════════════════

/// The collateral basket backing USSD.
///
/// Balances only change through mint-path deposits and redemption-path
/// payouts; both are paired atomically with the corresponding ledger
/// mutation by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralPool {
    /// Held balance per asset
    balances: HashMap<AssetId, CollateralAmount>,
    /// Recent events
    events: Vec<PoolEvent>,
    /// Maximum events to keep
    max_events: usize,
}

impl Default for CollateralPool {
    fn default() -> Self {
        Self::new()
    }
}

impl CollateralPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            events: Vec::new(),
            max_events: 1000,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DEPOSIT/PAYOUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Receive collateral on the mint path
    pub fn deposit(
        &mut self,
        asset: &AssetId,
        amount: CollateralAmount,
        block_height: u64,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let current = self.balance_of(asset);
        let updated = current.checked_add(amount).ok_or(Error::Overflow {
            operation: format!("pool deposit {}", asset),
        })?;
        self.balances.insert(asset.clone(), updated);

        self.add_event(PoolEvent {
            operation: PoolOperation::Deposit,
            asset: asset.clone(),
            amount,
            block_height,
        });

        Ok(())
    }

    /// Release collateral on the redemption path
    pub fn payout(
        &mut self,
        asset: &AssetId,
        amount: CollateralAmount,
        block_height: u64,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let current = self.balance_of(asset);
        if current < amount {
            return Err(Error::TransferFailed {
                asset: asset.to_string(),
                required: amount.units(),
                available: current.units(),
            });
        }

        let updated = current.saturating_sub(amount);
        if updated.is_zero() {
            self.balances.remove(asset);
        } else {
            self.balances.insert(asset.clone(), updated);
        }

        self.add_event(PoolEvent {
            operation: PoolOperation::Payout,
            asset: asset.clone(),
            amount,
            block_height,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get the held balance of an asset
    pub fn balance_of(&self, asset: &AssetId) -> CollateralAmount {
        self.balances.get(asset).copied().unwrap_or(CollateralAmount::ZERO)
    }

    /// Value the basket from one consistent set of oracle reads.
    ///
    /// Assets with no held balance are not priced, so an unwired feed for
    /// an unused asset does not block the computation. Oracle errors for
    /// held assets propagate; a zero price is treated as a valid valuation.
    pub fn value_snapshot<O: PriceOracle>(
        &self,
        registry: &AssetRegistry,
        oracle: &O,
    ) -> Result<BasketSnapshot> {
        let mut total_value = FixedPoint::ZERO;
        let mut stable_value = FixedPoint::ZERO;

        for id in registry.ids() {
            let balance = self.balance_of(id);
            if balance.is_zero() {
                continue;
            }
            let asset = registry.get(id)?;
            let price = oracle.price_usd(id)?;
            let value = usd_value(balance.units(), asset.decimals, price)?;

            total_value = total_value + value;
            if asset.role == AssetRole::Stable {
                stable_value = stable_value + value;
            }
        }

        Ok(BasketSnapshot {
            total_value,
            stable_value,
        })
    }

    /// USD value of everything held
    pub fn basket_value_usd<O: PriceOracle>(
        &self,
        registry: &AssetRegistry,
        oracle: &O,
    ) -> Result<FixedPoint> {
        Ok(self.value_snapshot(registry, oracle)?.total_value)
    }

    /// Basket value over outstanding supply, 18-decimal fixed point.
    ///
    /// Exactly 1.0 when the supply is zero (bootstrap case).
    pub fn collateral_factor<O: PriceOracle>(
        &self,
        registry: &AssetRegistry,
        oracle: &O,
        total_supply: TokenAmount,
    ) -> Result<FixedPoint> {
        if total_supply.is_zero() {
            return Ok(FixedPoint::ONE);
        }

        let basket = self.basket_value_usd(registry, oracle)?;
        // rescale the 6-decimal supply to 18 decimals for the division
        let supply_usd = (total_supply.units() as u128)
            * (FixedPoint::SCALE / USSD_BASE_UNIT as u128);
        mul_div(basket.raw(), FixedPoint::SCALE, supply_usd).map(FixedPoint::from_raw)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Number of assets with a non-zero balance
    pub fn held_asset_count(&self) -> usize {
        self.balances.len()
    }

    /// Get recent events
    pub fn recent_events(&self) -> &[PoolEvent] {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add an event (with pruning)
    fn add_event(&mut self, event: PoolEvent) {
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

    /// Compute state hash (balances, deterministic)
    pub fn state_hash(&self) -> [u8; 32] {
        let mut data = Vec::new();

        let mut sorted: Vec<_> = self.balances.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (asset, amount) in sorted {
            data.extend_from_slice(asset.as_str().as_bytes());
            data.extend_from_slice(&amount.units().to_be_bytes());
        }

        Sha256::digest(&data).into()
    }
}
