//! Span creation helpers for balancescan operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here. Async work
//! attaches the span with [`tracing::Instrument`] so it stays entered across
//! awaits.
//!
//! Usage pattern:
//! ```rust,ignore
//! use tracing::Instrument;
//!
//! pub async fn my_operation(&self, network: Network) -> Result<T> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(network))
//!     .await
//! }
//! ```

use tracing::Span;

use crate::types::group::TokenKey;
use crate::types::network::Network;

/// Create span for one complete engine run.
///
/// Parent: None (root span)
/// Children: resolve_decimals, process_balances
#[inline]
pub(crate) fn run(groups: usize, networks: usize) -> Span {
    tracing::info_span!("balancescan.run", groups = groups, networks = networks)
}

/// Create span for resolving the decimals of every distinct token.
///
/// Parent: run
/// Children: fetch_token_decimals spans (one per RPC lookup)
#[inline]
pub(crate) fn resolve_decimals(groups: usize) -> Span {
    tracing::info_span!("balancescan.resolve_decimals", groups = groups)
}

/// Create span for a single decimals lookup over RPC.
///
/// Parent: resolve_decimals
#[inline]
pub(crate) fn fetch_token_decimals(key: &TokenKey) -> Span {
    tracing::debug_span!(
        "balancescan.fetch_token_decimals",
        network = %key.network,
        chain = ?key.network.named_chain(),
        token = key.token_label(),
    )
}

/// Create span for the worker pool processing every balance task.
///
/// Parent: run
/// Children: fetch_balance spans (one per address)
#[inline]
pub(crate) fn process_balances(tasks: usize) -> Span {
    tracing::info_span!("balancescan.process_balances", tasks = tasks)
}

/// Create span for fetching one address balance.
///
/// Parent: process_balances
#[inline]
pub(crate) fn fetch_balance(network: Network, ticker: &str, address: &str) -> Span {
    tracing::debug_span!(
        "balancescan.fetch_balance",
        network = %network,
        ticker = ticker,
        address = address,
    )
}
