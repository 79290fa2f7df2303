// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Balance worker pool
//!
//! Every address of every group becomes one [`BalanceTask`]. Tasks run
//! concurrently, each under a permit from its network's semaphore, so at most
//! `workers` fetches are in flight per network while different networks
//! proceed independently.
//!
//! Outcomes are returned in task order (group then address), whatever the
//! completion order. A task whose fetch fails after every retry is recorded as
//! a failed outcome; it never aborts the pool.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn, Instrument};

use super::decimals::DecimalsCache;
use super::types::{BalanceOutcome, BalanceTask};
use crate::client::{NetworkClient, NetworkClients};
use crate::config::constants::DEFAULT_WORKERS;
use crate::errors::{RpcError, WorkerError};
use crate::spans;
use crate::transport::{RetryDriver, RetryPolicy};
use crate::types::group::Group;
use crate::types::network::Network;
use crate::types::tokens::TokenDecimals;

/// A task with everything it needs resolved before dispatch.
struct Prepared<'a> {
    task: BalanceTask,
    client: &'a Arc<dyn NetworkClient>,
    decimals: TokenDecimals,
    semaphore: Arc<Semaphore>,
}

/// Concurrent balance fetcher with per-network concurrency caps.
///
/// # Example
///
/// ```rust,ignore
/// let outcomes = BalanceWorkers::new(&clients, &config.nodes, &config.settings.proxies)
///     .with_workers(&config.workers)
///     .with_round_digits(4)
///     .process(&config.groups, &decimals)
///     .await?;
/// ```
#[derive(Debug)]
pub struct BalanceWorkers<'a> {
    clients: &'a NetworkClients,
    nodes: &'a BTreeMap<Network, Vec<String>>,
    proxies: &'a [String],
    workers: BTreeMap<Network, usize>,
    round_digits: u32,
    policy: RetryPolicy,
}

impl<'a> BalanceWorkers<'a> {
    pub fn new(
        clients: &'a NetworkClients,
        nodes: &'a BTreeMap<Network, Vec<String>>,
        proxies: &'a [String],
    ) -> Self {
        Self {
            clients,
            nodes,
            proxies,
            workers: BTreeMap::new(),
            round_digits: crate::config::constants::DEFAULT_ROUND_NDIGITS,
            policy: RetryPolicy::BALANCE,
        }
    }

    /// Per-network worker counts; unlisted networks use the default.
    #[must_use]
    pub fn with_workers(mut self, workers: &BTreeMap<Network, usize>) -> Self {
        self.workers = workers.clone();
        self
    }

    #[must_use]
    pub fn with_round_digits(mut self, round_digits: u32) -> Self {
        self.round_digits = round_digits;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn workers_for(&self, network: Network) -> usize {
        self.workers
            .get(&network)
            .copied()
            .unwrap_or(DEFAULT_WORKERS)
            .max(1)
    }

    /// Fetch every address balance of `groups`.
    ///
    /// # Errors
    ///
    /// Fails before dispatching anything when a task's decimals are missing
    /// from `decimals` or no client serves its network. Fetch failures are not
    /// errors; they are recorded on the returned outcomes.
    pub async fn process(
        &self,
        groups: &[Group],
        decimals: &DecimalsCache,
    ) -> Result<Vec<BalanceOutcome>, WorkerError> {
        let tasks = BalanceTask::expand(groups);
        let prepared = self.prepare(tasks, decimals)?;
        let total = prepared.len();

        let outcomes = join_all(
            prepared
                .into_iter()
                .enumerate()
                .map(|(offset, prepared)| self.run_task(offset, prepared)),
        )
        .instrument(spans::process_balances(total))
        .await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            succeeded = total - failed,
            failed, "Balance worker pool finished"
        );
        Ok(outcomes)
    }

    fn prepare(
        &self,
        tasks: Vec<BalanceTask>,
        decimals: &DecimalsCache,
    ) -> Result<Vec<Prepared<'a>>, WorkerError> {
        let mut semaphores: HashMap<Network, Arc<Semaphore>> = HashMap::new();

        tasks
            .into_iter()
            .map(|task| {
                let network = task.network;
                let key = task.token_key();
                let decimals = decimals
                    .get(&key)
                    .ok_or_else(|| WorkerError::MissingDecimals {
                        network,
                        token: key.token_label().to_string(),
                    })?;
                let client = self
                    .clients
                    .get(network)
                    .ok_or(WorkerError::MissingClient { network })?;
                let semaphore = semaphores
                    .entry(network)
                    .or_insert_with(|| {
                        let workers = self.workers_for(network);
                        debug!(%network, workers, "Network worker limit");
                        Arc::new(Semaphore::new(workers))
                    })
                    .clone();
                Ok(Prepared {
                    task,
                    client,
                    decimals,
                    semaphore,
                })
            })
            .collect()
    }

    async fn run_task(&self, offset: usize, prepared: Prepared<'_>) -> BalanceOutcome {
        let span = spans::fetch_balance(
            prepared.task.network,
            &prepared.task.ticker,
            &prepared.task.address,
        );
        let result = self.fetch(offset, &prepared).instrument(span).await;
        let task = prepared.task;

        if let Err(error) = &result {
            warn!(
                network = %task.network,
                ticker = %task.ticker,
                address = %task.address,
                error = %error,
                "Balance unavailable"
            );
        }

        BalanceOutcome { task, result }
    }

    async fn fetch(&self, offset: usize, prepared: &Prepared<'_>) -> Result<BigDecimal, RpcError> {
        let _permit = prepared
            .semaphore
            .acquire()
            .await
            .map_err(|_| RpcError::request("worker pool closed"))?;

        let task = &prepared.task;
        let client = prepared.client;
        let nodes = self
            .nodes
            .get(&task.network)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let address = task.address.as_str();
        let token = task.token.as_deref();

        let raw = RetryDriver::new(task.network, nodes, self.proxies, self.policy)
            .execute(offset, |endpoint, timeout| async move {
                client.fetch_balance(&endpoint, address, token, timeout).await
            })
            .await?;
        Ok(raw.normalize(prepared.decimals, self.round_digits))
    }
}
