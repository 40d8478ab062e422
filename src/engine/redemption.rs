//! Redemption planning.
//!
//! Computes the basket-proportional payout for a redemption as pure data;
//! the engine stages the plan and applies every leg atomically. When the
//! basket is under-collateralized the plan is a haircut: each payout is
//! scaled by collateral_factor × penalty and requires the insurance trust
//! to be wired as a backstop. The withheld remainder stays in the pool.

use crate::core::asset::{AssetId, AssetRegistry, CollateralAmount};
use crate::core::pool::CollateralPool;
use crate::core::token::TokenAmount;
use crate::error::{Error, Result};
use crate::utils::math::{scale_amount, FixedPoint};

/// A staged redemption: the burn fraction and per-asset payouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionPlan {
    /// Redeemed fraction of the pre-burn supply
    pub fraction: FixedPoint,
    /// Collateral factor the plan was computed under
    pub collateral_factor: FixedPoint,
    /// Whether the haircut scaling applied
    pub penalized: bool,
    /// Payout per asset, in registration order, zero legs omitted
    pub payouts: Vec<(AssetId, CollateralAmount)>,
}

/// Plan the payouts for redeeming `amount` of `total_supply`.
///
/// `total_supply` is the supply before the burn. Callers must have
/// verified `amount <= total_supply`.
pub fn plan_redemption(
    amount: TokenAmount,
    total_supply: TokenAmount,
    collateral_factor: FixedPoint,
    insurance_connected: bool,
    penalty_bps: u64,
    pool: &CollateralPool,
    registry: &AssetRegistry,
) -> Result<RedemptionPlan> {
    let fraction = FixedPoint::from_ratio(amount.units() as u128, total_supply.units() as u128)?;

    let penalized = collateral_factor < FixedPoint::ONE;
    if penalized && !insurance_connected {
        return Err(Error::InsuranceNotConnected);
    }
    let haircut = if penalized {
        Some(collateral_factor.checked_mul(FixedPoint::from_bps(penalty_bps))?)
    } else {
        None
    };

    let mut payouts = Vec::new();
    for id in registry.ids() {
        let balance = pool.balance_of(id);
        if balance.is_zero() {
            continue;
        }

        let mut payout = scale_amount(balance.units(), fraction)?;
        if let Some(haircut) = haircut {
            payout = scale_amount(payout, haircut)?;
        }
        if payout > 0 {
            payouts.push((id.clone(), CollateralAmount::from_units(payout)));
        }
    }

    Ok(RedemptionPlan {
        fraction,
        collateral_factor,
        penalized,
        payouts,
    })
}
