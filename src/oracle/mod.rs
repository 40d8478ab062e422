//! Oracle module for price feeds.
//!
//! This module provides the pricing seam for the engine:
//! - The `PriceOracle` trait the engine values the basket through
//! - A settable in-memory feed for tests and simulation runs

pub mod price_feed;

pub use price_feed::*;
