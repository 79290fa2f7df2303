// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for network client operations.
//!
//! These errors describe a single call against a node (or the final outcome of
//! a retried call). They are produced by [`NetworkClient`](crate::NetworkClient)
//! implementations and by the retry driver in [`crate::transport`].

use std::time::Duration;

use crate::types::network::Network;

/// Errors that can occur while talking to a network node.
///
/// # Examples
///
/// ```rust
/// use balancescan::RpcError;
///
/// let error = RpcError::request("connection refused");
/// assert_eq!(error.to_string(), "RPC request failed: connection refused");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// The node answered with an error, or the request could not be sent.
    #[error("RPC request failed: {message}")]
    Request {
        /// Human readable cause reported by the client
        message: String,
    },

    /// The call did not finish within its timeout.
    #[error("RPC request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// No node endpoints are configured for the network.
    #[error("No nodes configured for network {network}")]
    NoNodes {
        /// The network without nodes
        network: Network,
    },

    /// The client does not implement the requested operation. Never retried.
    #[error("Operation {operation} is not supported by this client")]
    Unsupported {
        /// Name of the unsupported operation
        operation: &'static str,
    },

    /// Every attempt failed; carries the last underlying cause.
    #[error("All {attempts} attempts failed, last error: {source}")]
    AttemptsExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        #[source]
        source: Box<RpcError>,
    },
}

impl RpcError {
    /// Create a `Request` error from any displayable cause.
    pub fn request(message: impl Into<String>) -> Self {
        RpcError::Request {
            message: message.into(),
        }
    }

    /// Create an `Unsupported` error.
    pub fn unsupported(operation: &'static str) -> Self {
        RpcError::Unsupported { operation }
    }

    /// Whether another attempt on a different endpoint could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RpcError::Unsupported { .. } | RpcError::NoNodes { .. })
    }

    /// Wrap the last cause after the retry budget is spent.
    pub fn exhausted(attempts: u32, last: RpcError) -> Self {
        RpcError::AttemptsExhausted {
            attempts,
            source: Box::new(last),
        }
    }

    /// The innermost cause, unwrapping `AttemptsExhausted`.
    pub fn root_cause(&self) -> &RpcError {
        match self {
            RpcError::AttemptsExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
