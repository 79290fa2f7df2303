// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport policy shared by every network client.
//!
//! Clients perform single requests; this layer decides where each attempt
//! goes and how long it may take.
//!
//! # Retries and rotation
//!
//! [`RetryDriver`] runs one call with a bounded number of attempts. Attempt
//! `n` of a call with rotation offset `o` goes to node `(o + n) % nodes` and,
//! when proxies are configured, proxy `(o + n) % proxies`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balancescan::transport::{RetryDriver, RetryPolicy};
//!
//! let driver = RetryDriver::new(Network::Base, &nodes, &proxies, RetryPolicy::DECIMALS);
//! let decimals = driver
//!     .execute(0, |endpoint, timeout| async move {
//!         client.fetch_token_decimals(&endpoint, token, timeout).await
//!     })
//!     .await?;
//! ```

mod retry;

pub use retry::{RetryDriver, RetryPolicy};
