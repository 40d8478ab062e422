//! Utility modules for the USSD engine.
//!
//! - Fixed-point math and safe arithmetic
//! - Protocol constants

pub mod constants;
pub mod math;

pub use constants::*;
pub use math::*;
