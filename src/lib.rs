// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Multi-chain balance aggregation
//!
//! `balancescan` fetches native and token balances for groups of addresses
//! across EVM chains, Solana, Bitcoin and Aptos, scales them by each token's
//! decimals and folds them into per-group, per-ticker and fiat totals.
//!
//! A run has three stages:
//!
//! 1. [`DecimalsResolver`] looks up decimals once per distinct token
//! 2. [`BalanceWorkers`] fetch every address balance with per-network
//!    concurrency caps, retrying across nodes and proxies
//! 3. [`aggregate`] sums the results, evaluates share expressions and applies
//!    prices
//!
//! [`BalanceEngine`] drives all three. Results can be stored as a
//! [`BalancesSnapshot`] and compared with an earlier one through [`diff`].
//!
//! # Example
//!
//! ```rust,ignore
//! use balancescan::{BalanceEngine, Config, EvmClient, NetworkClients, StaticPrices};
//! use std::sync::Arc;
//!
//! let config = Config::read("balances.toml")?;
//! let engine = BalanceEngine::new(NetworkClients::new().with_evm(Arc::new(EvmClient::new())));
//! let prices = StaticPrices::from(config.prices.clone());
//! let result = engine.run(&config, Some(&prices)).await?;
//!
//! for group in &result.groups {
//!     println!("{}: {}", group.group.name(), group.balance_sum);
//! }
//! ```

mod amount;
pub mod bootstrap;
pub mod client;
pub mod config;
mod engine;
pub mod errors;
pub mod price;
pub mod report;
mod result;
pub mod retrieval;
mod share;
pub mod snapshot;
mod spans;
pub mod transport;
pub mod types;

pub use amount::{round_decimal, scale_and_round};
pub use client::{Endpoint, EvmClient, NetworkClient, NetworkClients};
pub use config::{AddressGroup, Config, Settings};
pub use engine::BalanceEngine;
pub use errors::{
    BalancescanError, ConfigError, DecimalsError, RpcError, ShareExpressionError, SnapshotError,
    WorkerError,
};
pub use price::{PriceLookup, StaticPrices};
pub use report::{PrintFormat, RenderOptions};
pub use result::{aggregate, AggregatedGroup, AggregatedResult, TickerTotal};
pub use retrieval::{
    resolve_token_decimals, BalanceOutcome, BalanceTask, BalanceWorkers, DecimalsCache,
    DecimalsResolver, UNAVAILABLE,
};
pub use share::{evaluate_share, ShareExpression};
pub use snapshot::{diff, BalancesSnapshot, DiffEntry, SnapshotKey, SNAPSHOT_VERSION};
pub use types::group::{Group, TokenKey, DEFAULT_SHARE};
pub use types::network::{Network, UnknownNetwork};
pub use types::tokens::{RawAmount, TokenDecimals};
