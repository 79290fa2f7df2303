// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Supported networks

use std::fmt;
use std::str::FromStr;

use alloy_chains::NamedChain;
use serde::{Deserialize, Serialize};

use super::tokens::TokenDecimals;

/// A blockchain network a group can live on.
///
/// The set is closed: configuration referring to any other name is rejected.
///
/// # Examples
///
/// ```
/// use balancescan::Network;
///
/// let network: Network = "arbitrum-one".parse().unwrap();
/// assert!(network.is_evm());
/// assert_eq!(network.native_decimals().as_u8(), 18);
/// assert_eq!(network.to_string(), "arbitrum-one");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Ethereum,
    ArbitrumOne,
    OpMainnet,
    Base,
    Polygon,
    Bsc,
    Bitcoin,
    Solana,
    Aptos,
}

impl Network {
    /// Every supported network, in display order.
    pub const ALL: [Network; 9] = [
        Network::Ethereum,
        Network::ArbitrumOne,
        Network::OpMainnet,
        Network::Base,
        Network::Polygon,
        Network::Bsc,
        Network::Bitcoin,
        Network::Solana,
        Network::Aptos,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::ArbitrumOne => "arbitrum-one",
            Network::OpMainnet => "op-mainnet",
            Network::Base => "base",
            Network::Polygon => "polygon",
            Network::Bsc => "bsc",
            Network::Bitcoin => "bitcoin",
            Network::Solana => "solana",
            Network::Aptos => "aptos",
        }
    }

    /// EVM-style networks share the JSON-RPC client and use lower-case hex token references.
    pub const fn is_evm(&self) -> bool {
        self.named_chain().is_some()
    }

    /// The alloy chain for EVM networks.
    pub const fn named_chain(&self) -> Option<NamedChain> {
        match self {
            Network::Ethereum => Some(NamedChain::Mainnet),
            Network::ArbitrumOne => Some(NamedChain::Arbitrum),
            Network::OpMainnet => Some(NamedChain::Optimism),
            Network::Base => Some(NamedChain::Base),
            Network::Polygon => Some(NamedChain::Polygon),
            Network::Bsc => Some(NamedChain::BinanceSmartChain),
            Network::Bitcoin | Network::Solana | Network::Aptos => None,
        }
    }

    /// Decimals of the network's native coin.
    pub const fn native_decimals(&self) -> TokenDecimals {
        match self {
            Network::Solana => TokenDecimals::SOLANA_NATIVE,
            Network::Bitcoin => TokenDecimals::BITCOIN_NATIVE,
            Network::Aptos => TokenDecimals::APTOS_NATIVE,
            _ => TokenDecimals::EVM_NATIVE,
        }
    }

    /// Whether token decimals can be fetched over RPC on this network.
    pub const fn supports_token_decimals(&self) -> bool {
        self.is_evm() || matches!(self, Network::Solana)
    }

    /// Normalize a token reference so equal tokens produce equal map keys.
    ///
    /// EVM contract addresses are case-insensitive and are lower-cased; other
    /// networks use case-sensitive identifiers and are only trimmed.
    pub fn normalize_token(&self, token: &str) -> String {
        let token = token.trim();
        if self.is_evm() {
            token.to_lowercase()
        } else {
            token.to_string()
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown network name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}
