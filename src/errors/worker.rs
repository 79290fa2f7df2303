// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the balance worker pool.

use crate::types::network::Network;

/// Internal errors that stop the worker pool before any task is dispatched.
///
/// Per-address fetch failures are not errors at this level; they are recorded
/// on the corresponding [`BalanceOutcome`](crate::BalanceOutcome).
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Decimals were not resolved for a token referenced by a task.
    #[error("Token decimals not resolved for {network} / {token}")]
    MissingDecimals {
        /// Network of the task
        network: Network,
        /// Token reference (or `native`)
        token: String,
    },

    /// No client is registered for the network of a task.
    #[error("No network client registered for {network}")]
    MissingClient {
        /// The network without a client
        network: Network,
    },
}
