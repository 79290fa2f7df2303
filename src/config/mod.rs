// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for balancescan runs
//!
//! Configuration is a TOML document. Loading it resolves everything the engine
//! needs before any network activity: address sources are expanded, tokens
//! normalized, share expressions validated and per-network defaults filled in.
//!
//! # Example
//!
//! ```toml
//! [[coins]]
//! ticker = "ETH"
//! network = "ethereum"
//! addresses = "group:treasury"
//!
//! [[coins]]
//! ticker = "USDT"
//! network = "ethereum"
//! share = "0.5(total - 1000)"
//! addresses = ["0x28c6c06298d514db089934071355e5743bf21d60", "file:~/wallets.txt"]
//!
//! [[addresses]]
//! name = "treasury"
//! addresses = """
//! 0x28c6c06298d514db089934071355e5743bf21d60
//! 0x21a31ee1afc51d94c2efccaa2092ad1028285549
//! """
//!
//! [nodes]
//! ethereum = ["https://ethereum.publicnode.com"]
//!
//! [workers]
//! ethereum = 3
//!
//! [prices]
//! ETH = "3500.25"
//!
//! [settings]
//! round_ndigits = 4
//! ```
//!
//! ```rust
//! use balancescan::{Config, Network};
//!
//! let config = Config::from_toml_str(r#"
//!     [[coins]]
//!     ticker = "eth"
//!     network = "ethereum"
//!     addresses = ["0xaaa", "0xbbb", "0xaaa"]
//! "#).unwrap();
//!
//! assert_eq!(config.groups[0].ticker, "ETH");
//! assert_eq!(config.groups[0].addresses.len(), 2);
//! assert_eq!(config.workers_for(Network::Ethereum), 5);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::report::PrintFormat;
use crate::share::ShareExpression;
use crate::types::group::{dedup_addresses, Group, DEFAULT_SHARE};
use crate::types::network::Network;
use crate::types::tokens::TokenDecimals;

pub mod constants;

use constants::{stablecoins, DEFAULT_ROUND_NDIGITS, DEFAULT_WORKERS};

/// Annotated configuration printed by `balancescan --example`.
pub const EXAMPLE_CONFIG: &str = include_str!("example.toml");

const FILE_PREFIX: &str = "file:";
const GROUP_PREFIX: &str = "group:";

/// Global toggles from the `[settings]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Proxy URLs rotated across attempts
    pub proxies: Vec<String>,
    /// Fractional digits kept after scaling
    pub round_ndigits: u32,
    /// Price groups through the configured price table
    pub price: bool,
    /// Hide addresses with an empty balance when rendering
    pub skip_empty: bool,
    /// Log nodes and resolved decimals
    pub print_debug: bool,
    /// Output format of the command line tool
    pub print_format: PrintFormat,
    /// Thousands separator used when rendering amounts
    pub format_number_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxies: Vec::new(),
            round_ndigits: DEFAULT_ROUND_NDIGITS,
            price: true,
            skip_empty: false,
            print_debug: false,
            print_format: PrintFormat::default(),
            format_number_separator: ",".to_string(),
        }
    }
}

/// A named, reusable address list referenced from groups as `group:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressGroup {
    pub name: String,
    pub addresses: Vec<String>,
}

/// Fully resolved configuration.
///
/// Groups keep declaration order; every network referenced by a group has a
/// node list and a worker count.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub groups: Vec<Group>,
    pub address_groups: Vec<AddressGroup>,
    pub nodes: BTreeMap<Network, Vec<String>>,
    pub workers: BTreeMap<Network, usize>,
    /// Static prices keyed by upper-case ticker
    pub prices: BTreeMap<String, BigDecimal>,
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    coins: Vec<RawGroup>,
    #[serde(default)]
    addresses: Vec<RawAddressGroup>,
    #[serde(default)]
    nodes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    workers: BTreeMap<String, usize>,
    #[serde(default)]
    prices: BTreeMap<String, PriceValue>,
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    #[serde(default)]
    comment: String,
    ticker: String,
    network: Network,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    decimals: Option<u8>,
    #[serde(default)]
    share: Option<String>,
    addresses: AddressList,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAddressGroup {
    name: String,
    addresses: AddressList,
}

/// Addresses written either as a TOML array or as one multi-line string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressList {
    Text(String),
    List(Vec<String>),
}

impl AddressList {
    fn into_lines(self) -> Vec<String> {
        match self {
            AddressList::Text(text) => address_lines(&text),
            AddressList::List(items) => items
                .iter()
                .flat_map(|item| address_lines(item))
                .collect(),
        }
    }
}

/// Prices may be written as strings (exact) or TOML numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl PriceValue {
    fn into_decimal(self, ticker: &str) -> Result<BigDecimal, ConfigError> {
        let text = match self {
            PriceValue::Text(text) => text,
            PriceValue::Integer(value) => value.to_string(),
            PriceValue::Float(value) => value.to_string(),
        };
        BigDecimal::from_str(text.trim()).map_err(|e| ConfigError::InvalidPrice {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Non-empty, non-comment lines of an address source.
fn address_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn read_address_file(source: &str) -> Result<Vec<String>, ConfigError> {
    let path = expand_home(source.trim());
    if !path.is_file() {
        return Err(ConfigError::AddressFileNotFound { path });
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(address_lines(&text))
}

/// Expand `file:` entries; `group:` entries are resolved against `address_groups`
/// when given, and rejected otherwise.
fn expand_addresses(
    lines: Vec<String>,
    address_groups: Option<&[AddressGroup]>,
) -> Result<Vec<String>, ConfigError> {
    let mut result = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(source) = line.strip_prefix(FILE_PREFIX) {
            result.extend(read_address_file(source)?);
        } else if let Some(name) = line.strip_prefix(GROUP_PREFIX) {
            let name = name.trim();
            let group = address_groups
                .and_then(|groups| groups.iter().find(|group| group.name == name))
                .ok_or_else(|| ConfigError::UnknownAddressGroup {
                    name: name.to_string(),
                })?;
            result.extend(group.addresses.iter().cloned());
        } else {
            result.push(line);
        }
    }
    Ok(dedup_addresses(result))
}

fn parse_network_table<T>(
    table: BTreeMap<String, T>,
) -> Result<BTreeMap<Network, T>, ConfigError> {
    table
        .into_iter()
        .map(|(name, value)| Ok((Network::from_str(name.trim())?, value)))
        .collect()
}

impl Config {
    /// Build a configuration from already expanded groups, with default
    /// nodes, workers and settings.
    ///
    /// # Errors
    ///
    /// Fails when a group has no addresses or an invalid share expression.
    pub fn new(groups: Vec<Group>) -> Result<Self, ConfigError> {
        Self::assemble(
            groups,
            Vec::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Settings::default(),
        )
    }

    /// Parse and resolve a TOML configuration.
    ///
    /// Relative `file:` paths are resolved against the current directory.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        let mut names: HashMap<&str, usize> = HashMap::new();
        for group in &raw.addresses {
            *names.entry(group.name.as_str()).or_default() += 1;
        }
        let mut duplicates: Vec<&str> = names
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort_unstable();
            return Err(ConfigError::DuplicateAddressGroups {
                names: duplicates.join(", "),
            });
        }

        let address_groups = raw
            .addresses
            .into_iter()
            .map(|group| {
                Ok(AddressGroup {
                    name: group.name,
                    addresses: expand_addresses(group.addresses.into_lines(), None)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut groups = Vec::with_capacity(raw.coins.len());
        for raw_group in raw.coins {
            let addresses =
                expand_addresses(raw_group.addresses.into_lines(), Some(&address_groups))?;
            let mut group = Group::new(&raw_group.ticker, raw_group.network)
                .with_comment(raw_group.comment)
                .with_share(
                    raw_group
                        .share
                        .unwrap_or_else(|| DEFAULT_SHARE.to_string()),
                )
                .with_addresses(addresses);
            let token = raw_group
                .token
                .or_else(|| stablecoins::detect(group.network, &group.ticker).map(String::from));
            if let Some(token) = token {
                group = group.with_token(token);
            }
            group.decimals = raw_group.decimals.map(TokenDecimals::new);
            groups.push(group);
        }

        let prices = raw
            .prices
            .into_iter()
            .map(|(ticker, value)| {
                let ticker = ticker.trim().to_uppercase();
                let price = value.into_decimal(&ticker)?;
                Ok((ticker, price))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Self::assemble(
            groups,
            address_groups,
            parse_network_table(raw.nodes)?,
            parse_network_table(raw.workers)?,
            prices,
            raw.settings,
        )
    }

    /// Read and resolve a TOML configuration file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn assemble(
        groups: Vec<Group>,
        address_groups: Vec<AddressGroup>,
        mut nodes: BTreeMap<Network, Vec<String>>,
        mut workers: BTreeMap<Network, usize>,
        prices: BTreeMap<String, BigDecimal>,
        settings: Settings,
    ) -> Result<Self, ConfigError> {
        for group in &groups {
            if group.addresses.is_empty() {
                return Err(ConfigError::EmptyAddresses { group: group.name() });
            }
            ShareExpression::parse(&group.share).map_err(|source| ConfigError::InvalidShare {
                group: group.name(),
                source,
            })?;
        }

        if let Some((network, _)) = workers.iter().find(|(_, count)| **count == 0) {
            return Err(ConfigError::InvalidWorkers {
                network: network.to_string(),
            });
        }

        let mut config = Self {
            groups,
            address_groups,
            nodes: BTreeMap::new(),
            workers: BTreeMap::new(),
            prices,
            settings,
        };

        for network in config.networks() {
            let network_nodes = nodes
                .remove(&network)
                .filter(|list| !list.is_empty())
                .unwrap_or_else(|| {
                    debug!(%network, "Using default nodes");
                    constants::default_nodes(network)
                        .iter()
                        .map(|node| node.to_string())
                        .collect()
                });
            config.nodes.insert(network, network_nodes);
            config
                .workers
                .insert(network, workers.remove(&network).unwrap_or(DEFAULT_WORKERS));
        }

        Ok(config)
    }

    /// Replace the node list of a network.
    #[must_use]
    pub fn with_nodes<I, S>(mut self, network: Network, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes
            .insert(network, nodes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the worker count of a network (at least 1).
    #[must_use]
    pub fn with_workers(mut self, network: Network, workers: usize) -> Self {
        self.workers.insert(network, workers.max(1));
        self
    }

    #[must_use]
    pub fn with_price(mut self, ticker: &str, price: BigDecimal) -> Self {
        self.prices.insert(ticker.trim().to_uppercase(), price);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Networks referenced by groups, in first-seen order.
    pub fn networks(&self) -> Vec<Network> {
        let mut networks = Vec::new();
        for group in &self.groups {
            if !networks.contains(&group.network) {
                networks.push(group.network);
            }
        }
        networks
    }

    /// Node list of a network; empty when the network is not configured.
    pub fn nodes_for(&self, network: Network) -> &[String] {
        self.nodes.get(&network).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Worker count of a network, falling back to the default.
    pub fn workers_for(&self, network: Network) -> usize {
        self.workers
            .get(&network)
            .copied()
            .unwrap_or(DEFAULT_WORKERS)
    }

    /// Whether any group uses a share expression other than `total`.
    pub fn has_share(&self) -> bool {
        self.groups.iter().any(Group::has_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_filled_per_network() {
        let config = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]

            [[coins]]
            ticker = "SOL"
            network = "solana"
            addresses = "So1111"

            [workers]
            solana = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.networks(), vec![Network::Ethereum, Network::Solana]);
        assert_eq!(config.workers_for(Network::Ethereum), DEFAULT_WORKERS);
        assert_eq!(config.workers_for(Network::Solana), 2);
        assert_eq!(
            config.nodes_for(Network::Solana),
            &["https://api.mainnet-beta.solana.com".to_string()]
        );
        assert_eq!(config.settings, Settings::default());
        assert!(config.nodes_for(Network::Bitcoin).is_empty());
    }

    #[test]
    fn test_group_and_multiline_expansion() {
        let config = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "eth"
            network = "base"
            addresses = ["0xccc", "group:treasury", "0xaaa"]

            [[addresses]]
            name = "treasury"
            addresses = """
            # cold wallets
            0xaaa
            0xbbb
            """
            "#,
        )
        .unwrap();

        assert_eq!(config.groups[0].addresses, vec!["0xccc", "0xaaa", "0xbbb"]);
        assert_eq!(config.address_groups[0].addresses, vec!["0xaaa", "0xbbb"]);
    }

    #[test]
    fn test_file_expansion() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x111\n\n0x222\n0x111").unwrap();
        let text = format!(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["file: {}", "0x333"]
            "#,
            file.path().display()
        );

        let config = Config::from_toml_str(&text).unwrap();
        assert_eq!(config.groups[0].addresses, vec!["0x111", "0x222", "0x333"]);
    }

    #[test]
    fn test_missing_address_file() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["file:/definitely/not/here.txt"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::AddressFileNotFound { .. }));
    }

    #[test]
    fn test_unknown_address_group() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["group:nope"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAddressGroup { name } if name == "nope"));
    }

    #[test]
    fn test_duplicate_address_group_names() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]

            [[addresses]]
            name = "a"
            addresses = ["0x1"]

            [[addresses]]
            name = "a"
            addresses = ["0x2"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAddressGroups { names } if names == "a"));
    }

    #[test]
    fn test_known_stablecoin_detected_and_tokens_lower_cased() {
        let config = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "usdt"
            network = "ethereum"
            addresses = ["0xaaa"]

            [[coins]]
            ticker = "WETH"
            network = "ethereum"
            token = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
            decimals = 18
            addresses = ["0xaaa"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.groups[0].token.as_deref(),
            Some(stablecoins::ETH_USDT)
        );
        assert_eq!(
            config.groups[1].token.as_deref(),
            Some("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")
        );
        assert_eq!(config.groups[1].decimals, Some(TokenDecimals::EVM_NATIVE));
    }

    #[test]
    fn test_invalid_share_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            share = "total ** 2"
            addresses = ["0xaaa"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShare { .. }));
    }

    #[test]
    fn test_unknown_network_in_nodes_table() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]

            [nodes]
            dogechain = ["http://localhost"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork(_)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]

            [workers]
            ethereum = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkers { .. }));
    }

    #[test]
    fn test_prices_and_settings() {
        let config = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]

            [prices]
            eth = "3500.25"
            BTC = 65000
            SOL = 0.1

            [settings]
            round_ndigits = 2
            price = false
            proxies = ["http://proxy:8080"]
            format_number_separator = "_"
            print_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.prices["ETH"], BigDecimal::from_str("3500.25").unwrap());
        assert_eq!(config.prices["BTC"], BigDecimal::from(65000));
        assert_eq!(config.prices["SOL"], BigDecimal::from_str("0.1").unwrap());
        assert_eq!(config.settings.round_ndigits, 2);
        assert!(!config.settings.price);
        assert_eq!(config.settings.proxies, vec!["http://proxy:8080"]);
        assert_eq!(config.settings.format_number_separator, "_");
        assert_eq!(config.settings.print_format, PrintFormat::Json);
    }

    #[test]
    fn test_print_format_defaults_to_plain_and_accepts_table() {
        let coins = r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]
            "#;
        let config = Config::from_toml_str(coins).unwrap();
        assert_eq!(config.settings.print_format, PrintFormat::Plain);

        let config =
            Config::from_toml_str(&format!("{coins}\n[settings]\nprint_format = \"table\"\n"))
                .unwrap();
        assert_eq!(config.settings.print_format, PrintFormat::Plain);

        let err =
            Config::from_toml_str(&format!("{coins}\n[settings]\nprint_format = \"csv\"\n"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_example_config_loads() {
        let config = Config::from_toml_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(
            config.networks(),
            vec![Network::Ethereum, Network::Base, Network::Solana, Network::Bitcoin]
        );
        assert_eq!(config.groups[0].addresses.len(), 2);
        assert!(config.groups[1].token.is_some());
        assert!(config.has_share());
        assert_eq!(config.workers_for(Network::Ethereum), 3);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[coins]]
            ticker = "ETH"
            network = "ethereum"
            addresses = ["0xaaa"]
            colour = "blue"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_addresses_rejected() {
        let err = Config::new(vec![Group::new("ETH", Network::Ethereum)]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyAddresses { .. }));
    }

    #[test]
    fn test_has_share() {
        let plain = Group::new("ETH", Network::Ethereum).with_addresses(["0xa"]);
        let config = Config::new(vec![plain.clone()]).unwrap();
        assert!(!config.has_share());
        let config = Config::new(vec![plain.with_share("total / 2")]).unwrap();
        assert!(config.has_share());
    }
}
