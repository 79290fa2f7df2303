// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Network client capability.
//!
//! Each network is served by one [`NetworkClient`] implementation that knows
//! its wire protocol. The engine never branches on the network kind: clients
//! are registered once in a [`NetworkClients`] registry and looked up by
//! network when a task is dispatched.
//!
//! # Architecture
//!
//! 1. The retry driver picks a node (and optionally a proxy) per attempt and
//!    hands them to the client as an [`Endpoint`]
//! 2. The client performs a single call against that endpoint
//! 3. The driver applies the timeout and decides whether to retry
//!
//! # Example: Implementing NetworkClient
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use balancescan::{Endpoint, Network, NetworkClient, RawAmount, RpcError, TokenDecimals};
//! use std::time::Duration;
//!
//! struct SolanaClient;
//!
//! #[async_trait]
//! impl NetworkClient for SolanaClient {
//!     async fn fetch_native_balance(
//!         &self,
//!         endpoint: &Endpoint<'_>,
//!         address: &str,
//!         timeout: Duration,
//!     ) -> Result<RawAmount, RpcError> {
//!         // getBalance JSON-RPC call against endpoint.node
//!         # unimplemented!()
//!     }
//!
//!     async fn fetch_token_balance(
//!         &self,
//!         endpoint: &Endpoint<'_>,
//!         token: &str,
//!         address: &str,
//!         timeout: Duration,
//!     ) -> Result<RawAmount, RpcError> {
//!         // getTokenAccountsByOwner, summing the token amounts
//!         # unimplemented!()
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::RpcError;
use crate::types::network::Network;
use crate::types::tokens::{RawAmount, TokenDecimals};

mod evm;

pub use evm::EvmClient;

/// The node and optional proxy chosen for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    /// Node URL
    pub node: &'a str,
    /// Proxy URL, when a proxy pool is configured
    pub proxy: Option<&'a str>,
}

/// Talks to one network's nodes.
///
/// Implementations perform exactly one request per call; retries, rotation and
/// timeouts are applied by [`RetryDriver`](crate::transport::RetryDriver). The
/// `timeout` argument lets clients configure their own transport to match.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Balance of the network's native coin.
    async fn fetch_native_balance(
        &self,
        endpoint: &Endpoint<'_>,
        address: &str,
        timeout: Duration,
    ) -> Result<RawAmount, RpcError>;

    /// Balance of `token` held by `address`.
    async fn fetch_token_balance(
        &self,
        endpoint: &Endpoint<'_>,
        token: &str,
        address: &str,
        timeout: Duration,
    ) -> Result<RawAmount, RpcError>;

    /// Decimal precision of `token`.
    ///
    /// Networks without on-chain token metadata keep the default, which
    /// reports the operation as unsupported.
    async fn fetch_token_decimals(
        &self,
        endpoint: &Endpoint<'_>,
        token: &str,
        timeout: Duration,
    ) -> Result<TokenDecimals, RpcError> {
        let _ = (endpoint, token, timeout);
        Err(RpcError::unsupported("token decimals"))
    }

    /// Native balance when `token` is `None`, token balance otherwise.
    async fn fetch_balance(
        &self,
        endpoint: &Endpoint<'_>,
        address: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<RawAmount, RpcError> {
        match token {
            Some(token) => {
                self.fetch_token_balance(endpoint, token, address, timeout)
                    .await
            }
            None => self.fetch_native_balance(endpoint, address, timeout).await,
        }
    }
}

/// Registry of network clients, one per network.
///
/// Built once before a run and shared read-only by the decimals resolver and
/// the worker pool.
///
/// # Examples
///
/// ```rust
/// use balancescan::{EvmClient, Network, NetworkClients};
/// use std::sync::Arc;
///
/// let clients = NetworkClients::new().with_evm(Arc::new(EvmClient::new()));
/// assert!(clients.get(Network::Base).is_some());
/// assert!(clients.get(Network::Bitcoin).is_none());
/// ```
#[derive(Clone, Default)]
pub struct NetworkClients {
    clients: HashMap<Network, Arc<dyn NetworkClient>>,
}

impl NetworkClients {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for `network`, replacing any previous one.
    #[must_use]
    pub fn with_client(mut self, network: Network, client: Arc<dyn NetworkClient>) -> Self {
        self.insert(network, client);
        self
    }

    /// Register the same client for every EVM network.
    #[must_use]
    pub fn with_evm(mut self, client: Arc<dyn NetworkClient>) -> Self {
        for network in Network::ALL.into_iter().filter(Network::is_evm) {
            self.insert(network, client.clone());
        }
        self
    }

    pub fn insert(&mut self, network: Network, client: Arc<dyn NetworkClient>) {
        self.clients.insert(network, client);
    }

    pub fn get(&self, network: Network) -> Option<&Arc<dyn NetworkClient>> {
        self.clients.get(&network)
    }

    pub fn contains(&self, network: Network) -> bool {
        self.clients.contains_key(&network)
    }
}

impl std::fmt::Debug for NetworkClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut networks: Vec<_> = self.clients.keys().collect();
        networks.sort();
        f.debug_struct("NetworkClients")
            .field("networks", &networks)
            .finish()
    }
}
