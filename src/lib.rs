//! # USSD Engine
//!
//! A multi-collateral stablecoin accounting engine: USSD is minted against
//! a basket of stable and volatile assets valued through price oracles,
//! admission rules steer which collateral may back new supply, and
//! redemptions settle proportionally across the basket with a penalty
//! when under-collateralized. Two satellite modules (an insurance trust
//! and a staking vault) stream protocol-native yield to depositors.
//!
//! ## Architecture
//!
//! The engine consists of several core modules:
//!
//! - **Core**: Asset model, market cycle, collateral pool and USSD ledger
//! - **Oracle**: The pricing seam and a settable simulation feed
//! - **Engine**: Orchestration, admission control and redemption planning
//! - **Rewards**: The generic reward stream and its two instantiations
//!
//! ## Design Principles
//!
//! - **Deterministic**: Explicit clock inputs, exact integer arithmetic
//! - **Atomic**: Every operation fully succeeds or leaves no trace
//! - **Robust**: Typed errors, invariant checks, no partial state
//! - **Modular**: Clean separation of concerns
//!
//! ## Example
//!
//! ```rust,ignore
//! use ussd::prelude::*;
//!
//! let mut engine = UssdEngine::new(owner, registry, oracle, params, now);
//!
//! // Mint USSD against stable collateral
//! let minted = engine.mint_for_asset(caller, &usdt, amount, recipient)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod rewards;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        asset::{AccountId, Asset, AssetBank, AssetId, AssetRegistry, AssetRole, CollateralAmount},
        config::ProtocolParams,
        cycle::{cycle_position, market_phase, MarketPhase},
        pool::{BasketSnapshot, CollateralPool},
        token::{Stablecoin, TokenAmount},
    };
    pub use crate::engine::{
        admission::check_admission,
        redemption::{plan_redemption, RedemptionPlan},
        UssdEngine,
    };
    pub use crate::error::{Error, Result};
    pub use crate::oracle::{PriceOracle, StaticOracle};
    pub use crate::rewards::{InsuranceTrust, RewardStream, StakingVault};
    pub use crate::utils::math::FixedPoint;
}

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "USSD";
