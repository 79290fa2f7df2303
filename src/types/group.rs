// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Balance groups and token keys

use std::fmt;

use serde::{Deserialize, Serialize};

use super::network::Network;
use super::tokens::TokenDecimals;

/// Share expression used when a group does not configure one.
pub const DEFAULT_SHARE: &str = "total";

/// One configured row: a ticker on a network, optionally a token, and the
/// addresses whose balances are summed.
///
/// Addresses are fully expanded (no `file:` / `group:` indirection left) and
/// deduplicated, first occurrence wins.
///
/// # Examples
///
/// ```
/// use balancescan::{Group, Network};
///
/// let group = Group::new("usdt", Network::Ethereum)
///     .with_token("0xDAC17F958D2ee523a2206206994597C13D831ec7")
///     .with_addresses(["0xaaa", "0xbbb", "0xaaa"]);
///
/// assert_eq!(group.ticker, "USDT");
/// assert_eq!(group.token.as_deref(), Some("0xdac17f958d2ee523a2206206994597c13d831ec7"));
/// assert_eq!(group.addresses, vec!["0xaaa", "0xbbb"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Free-form label shown next to the ticker
    pub comment: String,
    /// Upper-case ticker symbol
    pub ticker: String,
    pub network: Network,
    /// Token reference; `None` means the network's native coin
    pub token: Option<String>,
    /// Explicit decimals, skips the RPC lookup when set
    pub decimals: Option<TokenDecimals>,
    /// Share expression over `total`
    pub share: String,
    pub addresses: Vec<String>,
}

impl Group {
    pub fn new(ticker: impl AsRef<str>, network: Network) -> Self {
        Self {
            comment: String::new(),
            ticker: ticker.as_ref().trim().to_uppercase(),
            network,
            token: None,
            decimals: None,
            share: DEFAULT_SHARE.to_string(),
            addresses: Vec::new(),
        }
    }

    /// Set the token reference, normalized for the group's network.
    #[must_use]
    pub fn with_token(mut self, token: impl AsRef<str>) -> Self {
        self.token = Some(self.network.normalize_token(token.as_ref()));
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(TokenDecimals::new(decimals));
        self
    }

    #[must_use]
    pub fn with_share(mut self, share: impl Into<String>) -> Self {
        self.share = share.into();
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the addresses, dropping duplicates while keeping first-seen order.
    #[must_use]
    pub fn with_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addresses = dedup_addresses(addresses.into_iter().map(Into::into));
        self
    }

    /// Display name: `TICKER / comment / network`.
    pub fn name(&self) -> String {
        let mut name = self.ticker.clone();
        if !self.comment.is_empty() {
            name.push_str(" / ");
            name.push_str(&self.comment);
        }
        name.push_str(" / ");
        name.push_str(self.network.as_str());
        name
    }

    pub fn token_key(&self) -> TokenKey {
        TokenKey::new(self.network, self.token.clone())
    }

    /// Whether the share expression differs from the identity.
    pub fn has_share(&self) -> bool {
        self.share.trim() != DEFAULT_SHARE
    }
}

/// Remove duplicate addresses, keeping the first occurrence of each.
pub(crate) fn dedup_addresses(addresses: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    addresses
        .into_iter()
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(address.clone()))
        .collect()
}

/// Identifies one distinct decimals lookup: a network plus a token, or the
/// native coin when `token` is `None`.
///
/// The native slot is an absent token, never an empty string, so it cannot
/// collide with a real token reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenKey {
    pub network: Network,
    pub token: Option<String>,
}

impl TokenKey {
    pub fn new(network: Network, token: Option<String>) -> Self {
        Self { network, token }
    }

    pub fn native(network: Network) -> Self {
        Self::new(network, None)
    }

    pub fn is_native(&self) -> bool {
        self.token.is_none()
    }

    /// Token reference, or `native` for the network coin.
    pub fn token_label(&self) -> &str {
        self.token.as_deref().unwrap_or("native")
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.network, self.token_label())
    }
}
