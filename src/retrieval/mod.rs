//! Balance retrieval orchestration.
//!
//! This module handles the network-facing stages of a run:
//! - Token decimals resolution, once per distinct token
//! - Concurrent balance fetching with per-network worker limits

mod decimals;
mod types;
mod workers;

pub use decimals::{resolve_token_decimals, DecimalsCache, DecimalsResolver};
pub use types::{BalanceOutcome, BalanceTask, UNAVAILABLE};
pub use workers::BalanceWorkers;
