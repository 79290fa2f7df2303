// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for balancescan integration tests
//!
//! Provides a scripted [`NetworkClient`] so runs can be exercised without
//! real nodes.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use balancescan::{Endpoint, NetworkClient, RawAmount, RpcError, TokenDecimals};

/// Mock NetworkClient with scripted balances and failures
///
/// Unknown addresses report a zero balance. Every balance call is counted,
/// and the number of calls running at the same time is tracked so tests can
/// check concurrency limits.
///
/// # Example
///
/// ```rust,ignore
/// let mock = Arc::new(
///     MockNetworkClient::new()
///         .with_native_balance("0xa", 1_500_000_000_000_000_000)
///         .with_failure("0xb")
///         .with_delay(Duration::from_millis(20)),
/// );
/// let clients = NetworkClients::new().with_client(Network::Ethereum, mock.clone());
/// ```
#[derive(Default)]
pub struct MockNetworkClient {
    native: HashMap<String, u128>,
    tokens: HashMap<(String, String), u128>,
    decimals: HashMap<String, u8>,
    failing: HashSet<String>,
    delay: Duration,
    balance_calls: AtomicUsize,
    decimals_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    nodes_seen: Mutex<Vec<String>>,
}

impl MockNetworkClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native_balance(mut self, address: &str, raw: u128) -> Self {
        self.native.insert(address.to_string(), raw);
        self
    }

    pub fn with_token_balance(mut self, token: &str, address: &str, raw: u128) -> Self {
        self.tokens
            .insert((token.to_string(), address.to_string()), raw);
        self
    }

    pub fn with_token_decimals(mut self, token: &str, decimals: u8) -> Self {
        self.decimals.insert(token.to_string(), decimals);
        self
    }

    /// Every balance call for `address` fails.
    pub fn with_failure(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// Hold every balance call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn decimals_calls(&self) -> usize {
        self.decimals_calls.load(Ordering::SeqCst)
    }

    /// Highest number of balance calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Nodes used by balance calls, in call order.
    pub fn nodes_seen(&self) -> Vec<String> {
        self.nodes_seen.lock().unwrap().clone()
    }

    async fn answer(
        &self,
        endpoint: &Endpoint<'_>,
        address: &str,
        raw: Option<u128>,
    ) -> Result<RawAmount, RpcError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.nodes_seen.lock().unwrap().push(endpoint.node.to_string());

        let _gauge = InFlight::enter(&self.in_flight, &self.max_in_flight);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(address) {
            return Err(RpcError::request(format!("scripted failure for {address}")));
        }
        Ok(RawAmount::new(U256::from(raw.unwrap_or(0))))
    }
}

/// Counts a call as in flight until dropped.
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkClient for MockNetworkClient {
    async fn fetch_native_balance(
        &self,
        endpoint: &Endpoint<'_>,
        address: &str,
        _timeout: Duration,
    ) -> Result<RawAmount, RpcError> {
        let raw = self.native.get(address).copied();
        self.answer(endpoint, address, raw).await
    }

    async fn fetch_token_balance(
        &self,
        endpoint: &Endpoint<'_>,
        token: &str,
        address: &str,
        _timeout: Duration,
    ) -> Result<RawAmount, RpcError> {
        let raw = self
            .tokens
            .get(&(token.to_string(), address.to_string()))
            .copied();
        self.answer(endpoint, address, raw).await
    }

    async fn fetch_token_decimals(
        &self,
        _endpoint: &Endpoint<'_>,
        token: &str,
        _timeout: Duration,
    ) -> Result<TokenDecimals, RpcError> {
        self.decimals_calls.fetch_add(1, Ordering::SeqCst);
        self.decimals
            .get(token)
            .map(|decimals| TokenDecimals::new(*decimals))
            .ok_or_else(|| RpcError::request(format!("unknown token {token}")))
    }
}
