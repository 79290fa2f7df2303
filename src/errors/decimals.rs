// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for token decimals resolution.
//!
//! Decimals are a prerequisite for every scaling operation, so every variant
//! here aborts the run.

use super::RpcError;
use crate::types::network::Network;

/// Errors raised while resolving token decimals.
#[derive(Debug, thiserror::Error)]
pub enum DecimalsError {
    /// Decimals cannot be looked up on this network.
    #[error("Unsupported network {network}: can't get token decimals for {token}")]
    UnsupportedNetwork {
        /// The network of the offending group
        network: Network,
        /// The token reference (or `native`)
        token: String,
    },

    /// No client is registered for the network.
    #[error("No network client registered for {network}")]
    MissingClient {
        /// The network without a client
        network: Network,
    },

    /// The lookup failed after all retries.
    #[error("Can't get decimals for token {ticker} / {token}")]
    Rpc {
        /// Ticker of the group that requested the lookup
        ticker: String,
        /// Token reference
        token: String,
        /// Final RPC failure
        #[source]
        source: RpcError,
    },
}
