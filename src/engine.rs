// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end balance run
//!
//! A run goes through three stages, each finishing before the next starts:
//!
//! 1. Resolve decimals for every distinct token (fatal on failure)
//! 2. Fetch every address balance through the worker pool
//! 3. Aggregate outcomes into group, ticker and grand totals

use tracing::{info, Instrument};

use crate::client::NetworkClients;
use crate::config::Config;
use crate::errors::{BalancescanError, WorkerError};
use crate::price::PriceLookup;
use crate::result::{aggregate, AggregatedResult};
use crate::retrieval::{BalanceWorkers, DecimalsCache, DecimalsResolver};
use crate::spans;
use crate::transport::RetryPolicy;

/// Runs configurations against a set of network clients.
///
/// # Example
///
/// ```rust,ignore
/// use balancescan::{BalanceEngine, Config, EvmClient, NetworkClients, StaticPrices};
/// use std::sync::Arc;
///
/// let config = Config::read("balances.toml")?;
/// let engine = BalanceEngine::new(NetworkClients::new().with_evm(Arc::new(EvmClient::new())));
/// let prices = StaticPrices::from(config.prices.clone());
/// let result = engine.run(&config, Some(&prices)).await?;
/// println!("{}", result.share_total);
/// ```
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    clients: NetworkClients,
    balance_policy: RetryPolicy,
    decimals_policy: RetryPolicy,
}

impl BalanceEngine {
    pub fn new(clients: NetworkClients) -> Self {
        Self {
            clients,
            balance_policy: RetryPolicy::BALANCE,
            decimals_policy: RetryPolicy::DECIMALS,
        }
    }

    #[must_use]
    pub fn with_balance_policy(mut self, policy: RetryPolicy) -> Self {
        self.balance_policy = policy;
        self
    }

    #[must_use]
    pub fn with_decimals_policy(mut self, policy: RetryPolicy) -> Self {
        self.decimals_policy = policy;
        self
    }

    pub fn clients(&self) -> &NetworkClients {
        &self.clients
    }

    /// Resolve decimals for every group of `config`.
    pub async fn resolve_decimals(&self, config: &Config) -> Result<DecimalsCache, BalancescanError> {
        let decimals = DecimalsResolver::new(&self.clients, &config.nodes, &config.settings.proxies)
            .with_policy(self.decimals_policy)
            .resolve(&config.groups)
            .await?;

        if config.settings.print_debug {
            for (key, value) in decimals.sorted() {
                info!(%key, decimals = %value, "Token decimals");
            }
        }
        Ok(decimals)
    }

    /// Execute a full run.
    ///
    /// Pass `None` for `prices` to skip fiat conversion. Pricing is also
    /// skipped when the configuration disables it.
    ///
    /// # Errors
    ///
    /// Decimals failures, internal worker errors and share expressions that
    /// fail to evaluate abort the run. Individual balance fetch failures do
    /// not; they appear as unavailable addresses in the result.
    pub async fn run(
        &self,
        config: &Config,
        prices: Option<&dyn PriceLookup>,
    ) -> Result<AggregatedResult, BalancescanError> {
        let span = spans::run(config.groups.len(), config.networks().len());
        self.run_stages(config, prices).instrument(span).await
    }

    async fn run_stages(
        &self,
        config: &Config,
        prices: Option<&dyn PriceLookup>,
    ) -> Result<AggregatedResult, BalancescanError> {
        if let Some(network) = config
            .networks()
            .into_iter()
            .find(|network| !self.clients.contains(*network))
        {
            return Err(WorkerError::MissingClient { network }.into());
        }

        if config.settings.print_debug {
            for (network, nodes) in &config.nodes {
                info!(%network, nodes = ?nodes, "Configured nodes");
            }
            info!(proxies = config.settings.proxies.len(), "Configured proxies");
        }

        let decimals = self.resolve_decimals(config).await?;

        let outcomes = BalanceWorkers::new(&self.clients, &config.nodes, &config.settings.proxies)
            .with_workers(&config.workers)
            .with_round_digits(config.settings.round_ndigits)
            .with_policy(self.balance_policy)
            .process(&config.groups, &decimals)
            .await?;

        let prices = if config.settings.price { prices } else { None };
        let result = aggregate(
            &config.groups,
            outcomes,
            &decimals,
            prices,
            config.settings.round_ndigits,
        )?;

        info!(
            groups = result.groups.len(),
            unavailable = result.failed_count(),
            "Balance run finished"
        );
        Ok(result)
    }
}
