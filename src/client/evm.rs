// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! EVM network client backed by an Alloy HTTP provider.
//!
//! Every call builds a short-lived provider for the endpoint chosen by the
//! retry driver, so node and proxy rotation need no shared state:
//!
//! - Native balances use `eth_getBalance`
//! - Token balances and decimals go through [`LazyToken`] (ERC-20 `balanceOf`
//!   and `decimals`)
//!
//! Proxies are applied on the underlying `reqwest` client.

use std::time::Duration;

use alloy_erc20_full::LazyToken;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_transport_http::{reqwest, Http};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{Endpoint, NetworkClient};
use crate::errors::RpcError;
use crate::types::tokens::{RawAmount, TokenDecimals};

/// [`NetworkClient`] for every EVM network.
///
/// # Example
///
/// ```rust
/// use balancescan::{EvmClient, NetworkClients};
/// use std::sync::Arc;
///
/// let clients = NetworkClients::new().with_evm(Arc::new(EvmClient::new()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmClient;

impl EvmClient {
    pub fn new() -> Self {
        Self
    }
}

fn parse_address(value: &str, what: &str) -> Result<Address, RpcError> {
    value
        .parse::<Address>()
        .map_err(|e| RpcError::request(format!("invalid {what} address {value}: {e}")))
}

fn connect(endpoint: &Endpoint<'_>, timeout: Duration) -> Result<impl Provider, RpcError> {
    let url: Url = endpoint
        .node
        .parse()
        .map_err(|e| RpcError::request(format!("invalid node url {}: {e}", endpoint.node)))?;

    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = endpoint.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| RpcError::request(format!("invalid proxy {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }
    let http = builder
        .build()
        .map_err(|e| RpcError::request(format!("failed to build http client: {e}")))?;

    let client = RpcClient::new(Http::with_client(http, url), false);
    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client))
}

#[async_trait]
impl NetworkClient for EvmClient {
    async fn fetch_native_balance(
        &self,
        endpoint: &Endpoint<'_>,
        address: &str,
        timeout: Duration,
    ) -> Result<RawAmount, RpcError> {
        let address = parse_address(address, "wallet")?;
        let provider = connect(endpoint, timeout)?;

        let balance = provider
            .get_balance(address)
            .await
            .map_err(|e| RpcError::request(e.to_string()))?;
        debug!(node = endpoint.node, ?address, %balance, "Fetched native balance");
        Ok(RawAmount::new(balance))
    }

    async fn fetch_token_balance(
        &self,
        endpoint: &Endpoint<'_>,
        token: &str,
        address: &str,
        timeout: Duration,
    ) -> Result<RawAmount, RpcError> {
        let token_address = parse_address(token, "token")?;
        let holder_address = parse_address(address, "wallet")?;
        let provider = connect(endpoint, timeout)?;

        let token = LazyToken::new(token_address, provider);
        let balance = token
            .balance_of(holder_address)
            .await
            .map_err(|e| RpcError::request(e.to_string()))?;
        debug!(
            node = endpoint.node,
            ?token_address,
            ?holder_address,
            %balance,
            "Fetched token balance"
        );
        Ok(RawAmount::new(balance))
    }

    async fn fetch_token_decimals(
        &self,
        endpoint: &Endpoint<'_>,
        token: &str,
        timeout: Duration,
    ) -> Result<TokenDecimals, RpcError> {
        let token_address = parse_address(token, "token")?;
        let provider = connect(endpoint, timeout)?;

        let token = LazyToken::new(token_address, provider);
        token
            .decimals()
            .await
            .map(|decimals| TokenDecimals::new(decimals.to_owned()))
            .map_err(|e| RpcError::request(e.to_string()))
    }
}
