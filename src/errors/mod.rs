// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the balancescan library.
//!
//! This module provides strongly-typed errors for all public APIs in balancescan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`DecimalsError`,
//!   `ShareExpressionError`, etc.)
//! - **Unified error type** (`BalancescanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! Each stage of a run has its own error type:
//! - [`ConfigError`] - Configuration loading and address expansion
//! - [`DecimalsError`] - Token decimals resolution (always fatal)
//! - [`WorkerError`] - Internal worker pool failures (always fatal)
//! - [`ShareExpressionError`] - Malformed share expressions
//! - [`SnapshotError`] - Reading and writing balance snapshots
//!
//! Additionally, [`RpcError`] describes a single (possibly retried) node call.
//! RPC errors on balance fetches never surface here: they are recorded per
//! address on [`BalanceOutcome`](crate::BalanceOutcome).
//!
//! # Examples
//!
//! ```rust,ignore
//! use balancescan::{BalanceEngine, BalancescanError, DecimalsError};
//!
//! match engine.run(&config).await {
//!     Ok(result) => println!("{} groups", result.groups.len()),
//!     Err(BalancescanError::Decimals(DecimalsError::Rpc { ticker, .. })) => {
//!         eprintln!("decimals lookup failed for {ticker}");
//!     }
//!     Err(e) => eprintln!("fatal: {e}"),
//! }
//! ```

mod config;
mod decimals;
mod rpc;
mod share;
mod snapshot;
mod worker;

pub use config::ConfigError;
pub use decimals::DecimalsError;
pub use rpc::RpcError;
pub use share::ShareExpressionError;
pub use snapshot::SnapshotError;
pub use worker::WorkerError;

/// Unified error type for all balancescan operations.
///
/// All module-specific error types convert into `BalancescanError` via
/// `From` implementations, so `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum BalancescanError {
    /// Error from configuration loading.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from token decimals resolution.
    #[error("Token decimals error: {0}")]
    Decimals(#[from] DecimalsError),

    /// Error from the balance worker pool.
    #[error("Worker pool error: {0}")]
    Worker(#[from] WorkerError),

    /// Error from share expression evaluation.
    #[error("Share expression error: {0}")]
    Share(#[from] ShareExpressionError),

    /// Error from snapshot persistence.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
