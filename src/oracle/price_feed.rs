//! Price feed interface and the settable simulation feed.
//!
//! The engine values the basket through this seam. Sourcing (DEX, TWAP,
//! aggregation) lives behind the trait and is not the engine's concern:
//! a feed either answers with an 18-decimal USD price or errors, and the
//! engine propagates the error rather than substituting a default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::asset::AssetId;
use crate::error::{Error, Result};
use crate::utils::math::FixedPoint;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE ORACLE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// USD price source for collateral assets.
///
/// A returned price of zero is valid (a worthless asset still values the
/// basket); an unknown or unreachable asset must be an error.
pub trait PriceOracle {
    /// Current USD price of the asset, 18-decimal fixed point
    fn price_usd(&self, asset: &AssetId) -> Result<FixedPoint>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC ORACLE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory price feed with settable prices, for tests and simulation runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticOracle {
    /// Prices by asset
    prices: HashMap<AssetId, FixedPoint>,
}

impl StaticOracle {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the price of an asset
    pub fn set_price(&mut self, asset: AssetId, price: FixedPoint) {
        self.prices.insert(asset, price);
    }

    /// Remove an asset's price (simulates an unreachable feed)
    pub fn clear_price(&mut self, asset: &AssetId) {
        self.prices.remove(asset);
    }
}

impl PriceOracle for StaticOracle {
    fn price_usd(&self, asset: &AssetId) -> Result<FixedPoint> {
        self.prices
            .get(asset)
            .copied()
            .ok_or_else(|| Error::OracleUnavailable(asset.to_string()))
    }
}
