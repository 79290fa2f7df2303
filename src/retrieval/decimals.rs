// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token decimals resolution
//!
//! Every scaling operation needs the decimals of its token, so they are
//! resolved up front, in group declaration order:
//!
//! 1. Decimals configured on the group are used as is
//! 2. Native coins use the network's known native decimals
//! 3. Anything else is looked up over RPC, at most once per [`TokenKey`]
//!
//! Any failure is fatal: partial decimals would make every later amount wrong.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, Instrument};

use crate::client::NetworkClients;
use crate::errors::DecimalsError;
use crate::spans;
use crate::transport::{RetryDriver, RetryPolicy};
use crate::types::group::{Group, TokenKey};
use crate::types::network::Network;
use crate::types::tokens::TokenDecimals;

/// Decimals per distinct token, resolved once per run.
///
/// Populated by [`DecimalsResolver::resolve`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimalsCache {
    entries: HashMap<TokenKey, TokenDecimals>,
}

impl DecimalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TokenKey) -> Option<TokenDecimals> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &TokenKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: TokenKey, decimals: TokenDecimals) {
        self.entries.insert(key, decimals);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> Vec<(&TokenKey, TokenDecimals)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Resolves a [`DecimalsCache`] for a set of groups.
#[derive(Debug)]
pub struct DecimalsResolver<'a> {
    clients: &'a NetworkClients,
    nodes: &'a BTreeMap<Network, Vec<String>>,
    proxies: &'a [String],
    policy: RetryPolicy,
}

impl<'a> DecimalsResolver<'a> {
    pub fn new(
        clients: &'a NetworkClients,
        nodes: &'a BTreeMap<Network, Vec<String>>,
        proxies: &'a [String],
    ) -> Self {
        Self {
            clients,
            nodes,
            proxies,
            policy: RetryPolicy::DECIMALS,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve decimals for every group.
    ///
    /// # Errors
    ///
    /// - [`DecimalsError::UnsupportedNetwork`] when a token's decimals cannot be
    ///   looked up on its network
    /// - [`DecimalsError::MissingClient`] when no client serves the network
    /// - [`DecimalsError::Rpc`] when the lookup fails after every retry
    pub async fn resolve(&self, groups: &[Group]) -> Result<DecimalsCache, DecimalsError> {
        self.resolve_groups(groups)
            .instrument(spans::resolve_decimals(groups.len()))
            .await
    }

    async fn resolve_groups(&self, groups: &[Group]) -> Result<DecimalsCache, DecimalsError> {
        let mut cache = DecimalsCache::new();
        let mut lookups = 0usize;

        for group in groups {
            let key = group.token_key();

            if let Some(decimals) = group.decimals {
                cache.insert(key, decimals);
                continue;
            }

            let Some(token) = group.token.as_deref() else {
                cache.insert(key, group.network.native_decimals());
                continue;
            };

            if cache.contains(&key) {
                continue;
            }

            let decimals = self.fetch(&group.ticker, &key, token).await?;
            lookups += 1;
            debug!(%key, %decimals, "Resolved token decimals");
            cache.insert(key, decimals);
        }

        info!(tokens = cache.len(), lookups, "Token decimals resolved");
        Ok(cache)
    }

    async fn fetch(
        &self,
        ticker: &str,
        key: &TokenKey,
        token: &str,
    ) -> Result<TokenDecimals, DecimalsError> {
        let network = key.network;
        if !network.supports_token_decimals() {
            return Err(DecimalsError::UnsupportedNetwork {
                network,
                token: token.to_string(),
            });
        }
        let client = self
            .clients
            .get(network)
            .ok_or(DecimalsError::MissingClient { network })?;
        let nodes = self.nodes.get(&network).map(Vec::as_slice).unwrap_or(&[]);

        RetryDriver::new(network, nodes, self.proxies, self.policy)
            .execute(0, |endpoint, timeout| async move {
                client.fetch_token_decimals(&endpoint, token, timeout).await
            })
            .instrument(spans::fetch_token_decimals(key))
            .await
            .map_err(|source| DecimalsError::Rpc {
                ticker: ticker.to_string(),
                token: token.to_string(),
                source,
            })
    }
}

/// Resolve decimals for `groups` with the default retry policy.
pub async fn resolve_token_decimals(
    groups: &[Group],
    clients: &NetworkClients,
    nodes: &BTreeMap<Network, Vec<String>>,
    proxies: &[String],
) -> Result<DecimalsCache, DecimalsError> {
    DecimalsResolver::new(clients, nodes, proxies)
        .resolve(groups)
        .await
}
