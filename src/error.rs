//! Error types for the USSD engine.
//!
//! This module defines all error types used throughout the engine,
//! providing clear and actionable error messages. Every error aborts the
//! operation that raised it with no partial state change.

use thiserror::Error;

/// Result type alias for USSD operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the USSD engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Admission Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Minting attempted with a volatile asset before any stable backing exists
    #[error("Minting requires a stable-role asset while supply is zero")]
    StableOnly,

    /// Minting attempted with a stable asset while the stable-ratio cap and
    /// winter phase both hold
    #[error("Minting requires a volatile-role asset: stables over-represented during winter")]
    VolatileRequired,

    // ═══════════════════════════════════════════════════════════════════
    // Balance Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Burn or transfer exceeds the holder's ledger balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Required amount in ledger units
        required: u64,
        /// Available amount in ledger units
        available: u64,
    },

    /// Withdrawal exceeds the holder's share balance
    #[error("Insufficient shares: required {required}, available {available}")]
    InsufficientShares {
        /// Required share amount
        required: u128,
        /// Available share amount
        available: u128,
    },

    /// An underlying asset transfer leg did not complete
    #[error("Transfer of {asset} failed: required {required}, available {available}")]
    TransferFailed {
        /// Asset being transferred
        asset: String,
        /// Required amount in native units
        required: u128,
        /// Available amount in native units
        available: u128,
    },

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    // ═══════════════════════════════════════════════════════════════════
    // Redemption Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Penalized redemption attempted with no insurance module wired
    #[error("Haircut redemption requires a connected insurance trust")]
    InsuranceNotConnected,

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Privileged or restricted-caller operation invoked by an unpermitted caller
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// A satellite module slot already holds a different assignment
    #[error("Module already connected: {0}")]
    AlreadyConnected(String),

    /// A satellite module surface was used before wiring
    #[error("Module not connected: {0}")]
    NotConnected(String),

    // ═══════════════════════════════════════════════════════════════════
    // Asset Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Asset is not registered with the engine
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// Asset role does not match the requested operation
    #[error("Asset {asset} does not have the {expected} role")]
    RoleMismatch {
        /// Offending asset
        asset: String,
        /// Role the operation requires
        expected: String,
    },

    /// Switch target is already the active asset for its role
    #[error("Asset {0} is already active")]
    AlreadyActive(String),

    /// Insurance deposit attempted with an asset other than the designated reserve
    #[error("Insurance deposits accept only the reserve asset, got {0}")]
    ReserveAssetOnly(String),

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// No price source is available for the asset
    #[error("No price available for asset: {0}")]
    OracleUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if this error is recoverable by the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StableOnly
                | Error::VolatileRequired
                | Error::InsufficientBalance { .. }
                | Error::InsufficientShares { .. }
                | Error::TransferFailed { .. }
                | Error::InsuranceNotConnected
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(self, Error::Overflow { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Admission errors: 1xxx
            Error::StableOnly => 1001,
            Error::VolatileRequired => 1002,

            // Balance errors: 2xxx
            Error::InsufficientBalance { .. } => 2001,
            Error::InsufficientShares { .. } => 2002,
            Error::TransferFailed { .. } => 2003,
            Error::ZeroAmount => 2004,

            // Redemption errors: 3xxx
            Error::InsuranceNotConnected => 3001,

            // Authorization errors: 4xxx
            Error::Unauthorized(_) => 4001,
            Error::AlreadyConnected(_) => 4002,
            Error::NotConnected(_) => 4003,

            // Asset errors: 5xxx
            Error::UnknownAsset(_) => 5001,
            Error::RoleMismatch { .. } => 5002,
            Error::AlreadyActive(_) => 5003,
            Error::ReserveAssetOnly(_) => 5004,

            // Oracle errors: 6xxx
            Error::OracleUnavailable(_) => 6001,

            // Arithmetic errors: 7xxx
            Error::Overflow { .. } => 7001,

            // Serialization errors: 8xxx
            Error::Serialization(_) => 8001,
            Error::Deserialization(_) => 8002,
        }
    }
}
