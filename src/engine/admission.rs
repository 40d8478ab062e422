//! Mint admission policy.
//!
//! Decides whether a proposed mint using a given asset is allowed, from
//! the current basket composition and the market phase. Pure decision
//! function over a priced basket snapshot; evaluated in order:
//!
//! 1. Zero supply admits only stable-role assets (bootstrap rule).
//! 2. Once supply exists, a stable-role mint is rejected while stables
//!    exceed their basket-value cap during winter.
//! 3. Everything else is accepted.

use crate::core::asset::AssetRole;
use crate::core::config::ProtocolParams;
use crate::core::cycle::MarketPhase;
use crate::core::pool::BasketSnapshot;
use crate::core::token::TokenAmount;
use crate::error::{Error, Result};

/// Evaluate the admission policy for a mint with an asset of `role`
pub fn check_admission(
    role: AssetRole,
    total_supply: TokenAmount,
    basket: &BasketSnapshot,
    phase: MarketPhase,
    params: &ProtocolParams,
) -> Result<()> {
    if total_supply.is_zero() {
        return match role {
            AssetRole::Stable => Ok(()),
            AssetRole::Volatile => Err(Error::StableOnly),
        };
    }

    if role == AssetRole::Stable
        && basket.stable_ratio_bps() > params.stable_ratio_cap_bps
        && phase == MarketPhase::Winter
    {
        return Err(Error::VolatileRequired);
    }

    Ok(())
}
