//! Reward streaming modules.
//!
//! A generic pro-rata, time-weighted accrual primitive and its two
//! protocol instantiations:
//! - The insurance capital trust (reserve-asset shares, insurance rate)
//! - The staking vault (staked USSD shares, staking rate)

pub mod insurance;
pub mod staking;
pub mod stream;

pub use insurance::*;
pub use staking::*;
pub use stream::*;
