//! Retry budgets, worker and rounding defaults, the default nodes per network
//! and the stablecoin contracts detected from a group's ticker.

use std::time::Duration;

use crate::types::network::Network;

/// Attempts per balance fetch.
pub const RETRIES_BALANCE: u32 = 5;
/// Per-attempt timeout for balance fetches.
pub const TIMEOUT_BALANCE: Duration = Duration::from_secs(5);
/// Attempts per token decimals lookup.
pub const RETRIES_DECIMALS: u32 = 5;
/// Per-attempt timeout for token decimals lookups.
pub const TIMEOUT_DECIMALS: Duration = Duration::from_secs(10);

/// Concurrent balance fetches per network when `[workers]` does not say otherwise.
pub const DEFAULT_WORKERS: usize = 5;
/// Fractional digits kept after scaling.
pub const DEFAULT_ROUND_NDIGITS: u32 = 4;

/// Public nodes used for networks without a `[nodes]` entry.
pub fn default_nodes(network: Network) -> &'static [&'static str] {
    match network {
        Network::Ethereum => &["https://ethereum.publicnode.com", "https://rpc.ankr.com/eth"],
        Network::ArbitrumOne => &["https://arb1.arbitrum.io/rpc", "https://arbitrum-one.publicnode.com"],
        Network::OpMainnet => &["https://mainnet.optimism.io", "https://optimism.publicnode.com"],
        Network::Base => &["https://mainnet.base.org", "https://base.publicnode.com"],
        Network::Polygon => &["https://polygon-rpc.com", "https://polygon-bor.publicnode.com"],
        Network::Bsc => &["https://bsc-dataseed.bnbchain.org", "https://bsc.publicnode.com"],
        Network::Bitcoin => &["https://blockstream.info/api", "https://mempool.space/api"],
        Network::Solana => &["https://api.mainnet-beta.solana.com"],
        Network::Aptos => &["https://fullnode.mainnet.aptoslabs.com/v1"],
    }
}

/// Well-known stablecoin contracts, used when a group names the ticker but no token.
pub mod stablecoins {
    use super::Network;

    /// USDT on Ethereum Mainnet
    pub const ETH_USDT: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";
    /// Native USDC on Ethereum Mainnet
    pub const ETH_USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    /// USDT on Arbitrum One
    pub const ARB_USDT: &str = "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9";
    /// Native USDC on Arbitrum One
    pub const ARB_USDC: &str = "0xaf88d065e77c8cc2239327c5edb3a432268e5831";
    /// USDT on OP Mainnet
    pub const OP_USDT: &str = "0x94b008aa00579c1307b0ef2c499ad98a8ce58e58";
    /// Native USDC on OP Mainnet
    pub const OP_USDC: &str = "0x0b2c639c533813f4aa9d7837caf62653d097ff85";
    /// Native USDC on Base
    pub const BASE_USDC: &str = "0x833589fcd6edb2e08f4c7c32d4f71b54bda02913";
    /// USDT mint on Solana
    pub const SOL_USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
    /// USDC mint on Solana
    pub const SOL_USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    /// Token reference for `ticker` on `network`, if it is a known stablecoin.
    pub fn detect(network: Network, ticker: &str) -> Option<&'static str> {
        match (network, ticker) {
            (Network::Ethereum, "USDT") => Some(ETH_USDT),
            (Network::Ethereum, "USDC") => Some(ETH_USDC),
            (Network::ArbitrumOne, "USDT") => Some(ARB_USDT),
            (Network::ArbitrumOne, "USDC") => Some(ARB_USDC),
            (Network::OpMainnet, "USDT") => Some(OP_USDT),
            (Network::OpMainnet, "USDC") => Some(OP_USDC),
            (Network::Base, "USDC") => Some(BASE_USDC),
            (Network::Solana, "USDT") => Some(SOL_USDT),
            (Network::Solana, "USDC") => Some(SOL_USDC),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_network_has_default_nodes() {
        for network in Network::ALL {
            assert!(!default_nodes(network).is_empty(), "{network} has no nodes");
        }
    }

    #[test]
    fn test_detect_stablecoins() {
        assert_eq!(
            stablecoins::detect(Network::Ethereum, "USDT"),
            Some(stablecoins::ETH_USDT)
        );
        assert_eq!(
            stablecoins::detect(Network::Solana, "USDC"),
            Some(stablecoins::SOL_USDC)
        );
        assert_eq!(stablecoins::detect(Network::Bitcoin, "USDT"), None);
        assert_eq!(stablecoins::detect(Network::Ethereum, "ETH"), None);
    }

    #[test]
    fn test_evm_stablecoins_are_lower_case() {
        for token in [
            stablecoins::ETH_USDT,
            stablecoins::ETH_USDC,
            stablecoins::ARB_USDT,
            stablecoins::ARB_USDC,
            stablecoins::OP_USDT,
            stablecoins::OP_USDC,
            stablecoins::BASE_USDC,
        ] {
            assert_eq!(token, token.to_lowercase());
        }
    }
}
