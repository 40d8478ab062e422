//! Engine configuration and parameters.
//!
//! All tunables live in a single params struct so a deployment can be
//! described as data. Defaults map to the protocol constants.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Protocol parameters (set at construction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Stable share of basket value above which winter minting steers
    /// deposits toward volatile assets, in basis points
    pub stable_ratio_cap_bps: u64,

    /// Multiplier applied on top of the collateral factor during a
    /// haircut redemption, in basis points
    pub redemption_penalty_bps: u64,

    /// Insurance trust reward rate, basis points per year
    pub insurance_apy_bps: u64,

    /// Staking vault reward rate, basis points per year
    pub staking_apy_bps: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            stable_ratio_cap_bps: STABLE_RATIO_CAP_BPS,
            redemption_penalty_bps: REDEMPTION_PENALTY_BPS,
            insurance_apy_bps: INSURANCE_APY_BPS,
            staking_apy_bps: STAKING_APY_BPS,
        }
    }
}

impl ProtocolParams {
    /// Create with a custom stable-ratio cap (for testing)
    pub fn with_stable_ratio_cap(mut self, bps: u64) -> Self {
        self.stable_ratio_cap_bps = bps;
        self
    }

    /// Create with a custom redemption penalty (for testing)
    pub fn with_redemption_penalty(mut self, bps: u64) -> Self {
        self.redemption_penalty_bps = bps;
        self
    }

    /// Create with custom reward rates (for testing)
    pub fn with_apys(mut self, insurance_bps: u64, staking_bps: u64) -> Self {
        self.insurance_apy_bps = insurance_bps;
        self.staking_apy_bps = staking_bps;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> bool {
        self.stable_ratio_cap_bps < BPS_DIVISOR
            && self.redemption_penalty_bps <= BPS_DIVISOR
            && self.insurance_apy_bps < BPS_DIVISOR
            && self.staking_apy_bps < BPS_DIVISOR
    }

    /// Render the parameters as JSON (operator tooling and dumps)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse parameters from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
