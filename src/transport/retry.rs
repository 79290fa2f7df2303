// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded retries with node and proxy rotation.
//!
//! The driver wraps a single network call. Each attempt runs against the next
//! node of the pool (and the next proxy, when a proxy pool is configured) under
//! a per-attempt timeout. Rotation is derived from the caller's offset plus the
//! attempt index, so concurrent tasks share no mutable rotation state.
//!
//! Total wall time is bounded by `attempts * timeout`; there is no backoff
//! sleep between attempts since every retry already moves to another node.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::Endpoint;
use crate::config::constants::{
    RETRIES_BALANCE, RETRIES_DECIMALS, TIMEOUT_BALANCE, TIMEOUT_DECIMALS,
};
use crate::errors::RpcError;
use crate::types::network::Network;

/// Attempt budget and per-attempt timeout for one kind of operation.
///
/// # Example
///
/// ```rust
/// use balancescan::transport::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(2));
/// assert_eq!(policy.max_wall_time(), Duration::from_secs(6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub attempts: u32,
    /// Timeout applied to each attempt
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Policy for balance fetches.
    pub const BALANCE: Self = Self {
        attempts: RETRIES_BALANCE,
        timeout: TIMEOUT_BALANCE,
    };

    /// Policy for token decimals lookups.
    pub const DECIMALS: Self = Self {
        attempts: RETRIES_DECIMALS,
        timeout: TIMEOUT_DECIMALS,
    };

    /// A zero attempt budget is treated as a single attempt.
    pub const fn new(attempts: u32, timeout: Duration) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            timeout,
        }
    }

    /// Upper bound on the time [`RetryDriver::execute`] can take.
    pub fn max_wall_time(&self) -> Duration {
        self.timeout.saturating_mul(self.attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::BALANCE
    }
}

/// Executes a network call with bounded attempts over rotating endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use balancescan::transport::{RetryDriver, RetryPolicy};
///
/// let driver = RetryDriver::new(Network::Ethereum, &nodes, &proxies, RetryPolicy::BALANCE);
/// let raw = driver
///     .execute(task_index, |endpoint, timeout| async move {
///         client.fetch_native_balance(&endpoint, address, timeout).await
///     })
///     .await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryDriver<'a> {
    network: Network,
    nodes: &'a [String],
    proxies: &'a [String],
    policy: RetryPolicy,
}

impl<'a> RetryDriver<'a> {
    pub fn new(
        network: Network,
        nodes: &'a [String],
        proxies: &'a [String],
        policy: RetryPolicy,
    ) -> Self {
        Self {
            network,
            nodes,
            proxies,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Endpoint for `attempt` of a call whose rotation starts at `offset`.
    ///
    /// Returns `None` when the node pool is empty.
    pub fn endpoint(&self, offset: usize, attempt: u32) -> Option<Endpoint<'a>> {
        if self.nodes.is_empty() {
            return None;
        }
        let index = offset.wrapping_add(attempt as usize);
        let proxy = if self.proxies.is_empty() {
            None
        } else {
            Some(self.proxies[index % self.proxies.len()].as_str())
        };
        Some(Endpoint {
            node: self.nodes[index % self.nodes.len()].as_str(),
            proxy,
        })
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// Each attempt receives its endpoint and the per-attempt timeout. Errors
    /// and timeouts are retried on the next endpoint; after the last attempt
    /// the final cause is returned wrapped in [`RpcError::AttemptsExhausted`].
    /// Errors that are not [retryable](RpcError::is_retryable) are returned
    /// as-is after the attempt that produced them.
    pub async fn execute<T, F, Fut>(&self, offset: usize, mut operation: F) -> Result<T, RpcError>
    where
        F: FnMut(Endpoint<'a>, Duration) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let attempts = self.policy.attempts.max(1);
        let timeout = self.policy.timeout;
        let mut last_error = RpcError::NoNodes {
            network: self.network,
        };

        for attempt in 0..attempts {
            let Some(endpoint) = self.endpoint(offset, attempt) else {
                return Err(RpcError::NoNodes {
                    network: self.network,
                });
            };

            let result = match tokio::time::timeout(timeout, operation(endpoint, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(RpcError::Timeout { timeout }),
            };

            match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            network = %self.network,
                            node = endpoint.node,
                            attempt = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_retryable() => {
                    warn!(
                        network = %self.network,
                        node = endpoint.node,
                        attempt = attempt + 1,
                        error = %error,
                        "Request failed without retry"
                    );
                    return Err(error);
                }
                Err(error) => {
                    warn!(
                        network = %self.network,
                        node = endpoint.node,
                        proxy = endpoint.proxy.unwrap_or("-"),
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        error = %error,
                        "Request attempt failed"
                    );
                    last_error = error;
                }
            }
        }

        Err(RpcError::exhausted(attempts, last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    fn pool(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_policy_zero_attempts_becomes_one() {
        assert_eq!(RetryPolicy::new(0, Duration::from_secs(1)).attempts, 1);
    }

    #[test]
    fn test_default_policies() {
        assert_eq!(RetryPolicy::BALANCE.attempts, RETRIES_BALANCE);
        assert_eq!(RetryPolicy::DECIMALS.timeout, TIMEOUT_DECIMALS);
        assert_eq!(RetryPolicy::default(), RetryPolicy::BALANCE);
    }

    #[test]
    fn test_endpoint_rotation() {
        let nodes = pool(&["a", "b", "c"]);
        let proxies = pool(&["p1", "p2"]);
        let driver = RetryDriver::new(Network::Ethereum, &nodes, &proxies, RetryPolicy::BALANCE);

        let picked: Vec<_> = (0..4)
            .map(|attempt| driver.endpoint(1, attempt).unwrap())
            .map(|e| (e.node, e.proxy.unwrap()))
            .collect();
        assert_eq!(
            picked,
            vec![("b", "p2"), ("c", "p1"), ("a", "p2"), ("b", "p1")]
        );
    }

    #[test]
    fn test_endpoint_without_proxies() {
        let nodes = pool(&["a"]);
        let driver = RetryDriver::new(Network::Ethereum, &nodes, &[], RetryPolicy::BALANCE);
        assert_eq!(driver.endpoint(7, 3).unwrap().proxy, None);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_cause() {
        let nodes = pool(&["a", "b", "c"]);
        let driver = RetryDriver::new(
            Network::Ethereum,
            &nodes,
            &[],
            RetryPolicy::new(4, Duration::from_secs(1)),
        );
        let seen = Mutex::new(Vec::new());

        let result: Result<(), RpcError> = driver
            .execute(0, |endpoint, _| {
                seen.lock().unwrap().push(endpoint.node.to_string());
                let node = endpoint.node.to_string();
                async move { Err(RpcError::request(format!("{node} down"))) }
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c", "a"]);
        match result.unwrap_err() {
            RpcError::AttemptsExhausted { attempts, source } => {
                assert_eq!(attempts, 4);
                assert_eq!(source.to_string(), "RPC request failed: a down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let nodes = pool(&["a", "b", "c"]);
        let driver = RetryDriver::new(Network::Base, &nodes, &[], RetryPolicy::BALANCE);

        let result = driver
            .execute(0, |endpoint, _| {
                let node = endpoint.node.to_string();
                async move {
                    if node == "c" {
                        Ok(42u64)
                    } else {
                        Err(RpcError::request("unavailable"))
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_timeout_bounds_wall_time() {
        let nodes = pool(&["slow"]);
        let policy = RetryPolicy::new(2, Duration::from_millis(20));
        let driver = RetryDriver::new(Network::Ethereum, &nodes, &[], policy);

        let started = Instant::now();
        let result: Result<(), RpcError> = driver
            .execute(0, |_, _| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        let error = result.unwrap_err();
        assert!(matches!(error.root_cause(), RpcError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_operation_is_not_retried() {
        let nodes = pool(&["a", "b"]);
        let driver = RetryDriver::new(Network::Solana, &nodes, &[], RetryPolicy::DECIMALS);
        let calls = Mutex::new(0u32);

        let result: Result<(), RpcError> = driver
            .execute(0, |_, _| {
                *calls.lock().unwrap() += 1;
                async { Err(RpcError::unsupported("token decimals")) }
            })
            .await;

        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(matches!(
            result,
            Err(RpcError::Unsupported {
                operation: "token decimals"
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_node_pool() {
        let driver = RetryDriver::new(Network::Solana, &[], &[], RetryPolicy::BALANCE);
        let result: Result<(), RpcError> = driver.execute(0, |_, _| async { Ok(()) }).await;
        assert!(matches!(
            result,
            Err(RpcError::NoNodes {
                network: Network::Solana
            })
        ));
    }
}
