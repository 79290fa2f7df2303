//! Command line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::client::{EvmClient, NetworkClients};
use crate::config::{Config, EXAMPLE_CONFIG};
use crate::engine::BalanceEngine;
use crate::price::StaticPrices;
use crate::report::{
    render_diff_json, render_diff_plain, render_json, render_plain, PrintFormat, RenderOptions,
};
use crate::snapshot::{diff, BalancesSnapshot};
use crate::types::network::Network;

/// Fetch and aggregate wallet balances described by a TOML configuration.
#[derive(Debug, Parser)]
#[command(name = "balancescan", version, about)]
pub struct Cli {
    /// Path to the TOML configuration
    #[arg(
        env = "BALANCESCAN_CONFIG",
        required_unless_present_any = ["example", "networks"]
    )]
    pub config: Option<PathBuf>,

    /// Output format, overriding `print_format` from the configuration
    #[arg(short, long, value_enum)]
    pub format: Option<PrintFormat>,

    /// Hide addresses with a zero balance
    #[arg(short, long)]
    pub skip_empty: bool,

    /// Apply prices even when the configuration turns them off
    #[arg(long, overrides_with = "no_price")]
    pub price: bool,

    /// Do not apply prices
    #[arg(long, overrides_with = "price")]
    pub no_price: bool,

    /// Log nodes, decimals and per-attempt details
    #[arg(short, long)]
    pub debug: bool,

    /// Print the resolved configuration and exit
    #[arg(short = 'c', long = "config")]
    pub print_config: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    pub example: bool,

    /// Print the supported networks and exit
    #[arg(long)]
    pub networks: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Save the fetched balances as a snapshot
    #[arg(long, value_name = "PATH")]
    pub save_balances: Option<PathBuf>,

    /// Print the difference against a previously saved snapshot
    #[arg(long, value_name = "PATH")]
    pub diff_from_balances: Option<PathBuf>,
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.json_logs);
    execute(cli).await
}

fn init_tracing(debug: bool, json: bool) {
    let default = if debug { "balancescan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the configuration, run it with the EVM client and print the result.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    if cli.example {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }
    if cli.networks {
        println!("{}", network_list());
        return Ok(());
    }

    let Some(path) = &cli.config else {
        anyhow::bail!("no configuration path given");
    };
    let mut config =
        Config::read(path).with_context(|| format!("loading {}", path.display()))?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    apply_flags(&cli, &mut config);

    // A bad snapshot path fails before any RPC traffic
    let previous = match &cli.diff_from_balances {
        Some(path) => Some(BalancesSnapshot::load(path).await?),
        None => None,
    };

    let engine = BalanceEngine::new(NetworkClients::new().with_evm(Arc::new(EvmClient::new())));
    let prices = StaticPrices::from(config.prices.clone());
    let result = engine.run(&config, Some(&prices)).await?;

    let snapshot = BalancesSnapshot::from_result(&result);
    let entries = previous.as_ref().map(|previous| diff(previous, &snapshot));

    let options = RenderOptions {
        skip_empty: config.settings.skip_empty,
        separator: config.settings.format_number_separator.clone(),
    };
    match config.settings.print_format {
        PrintFormat::Plain => {
            println!("{}", render_plain(&result, &options));
            if let Some(entries) = &entries {
                println!();
                println!("{}", render_diff_plain(entries, &options.separator));
            }
        }
        PrintFormat::Json => {
            let mut document = render_json(&result);
            if let Some(entries) = &entries {
                document["diff"] = render_diff_json(entries);
            }
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    if let Some(path) = &cli.save_balances {
        snapshot.save(path).await?;
        info!(path = %path.display(), entries = snapshot.len(), "Balances saved");
    }

    Ok(())
}

/// Supported network names, one per line.
fn network_list() -> String {
    Network::ALL
        .iter()
        .map(Network::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Command line flags override the `[settings]` table when given.
fn apply_flags(cli: &Cli, config: &mut Config) {
    if let Some(format) = cli.format {
        config.settings.print_format = format;
    }
    if cli.skip_empty {
        config.settings.skip_empty = true;
    }
    if cli.price {
        config.settings.price = true;
    }
    if cli.no_price {
        config.settings.price = false;
    }
    if cli.debug {
        config.settings.print_debug = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::group::Group;

    fn config() -> Config {
        Config::new(vec![
            Group::new("ETH", Network::Ethereum).with_addresses(["0xa"])
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["balancescan", "balances.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("balances.toml")));
        assert_eq!(cli.format, None);
        assert!(!cli.skip_empty && !cli.price && !cli.no_price && !cli.debug);
        assert!(!cli.print_config && !cli.example && !cli.networks);
        assert!(cli.save_balances.is_none());
        assert!(cli.diff_from_balances.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "balancescan",
            "balances.toml",
            "--format",
            "json",
            "--skip-empty",
            "--no-price",
            "--debug",
            "--save-balances",
            "out.json",
            "--diff-from-balances",
            "old.json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(PrintFormat::Json));
        assert!(cli.skip_empty && cli.no_price && cli.debug);
        assert_eq!(cli.save_balances, Some(PathBuf::from("out.json")));
        assert_eq!(cli.diff_from_balances, Some(PathBuf::from("old.json")));
    }

    #[test]
    fn test_short_aliases() {
        let cli =
            Cli::try_parse_from(["balancescan", "b.toml", "-f", "table", "-s", "-d", "-c"]).unwrap();
        assert_eq!(cli.format, Some(PrintFormat::Plain));
        assert!(cli.skip_empty && cli.debug && cli.print_config);
        assert_eq!(cli.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["balancescan", "b.toml", "--format", "csv"]).is_err());
    }

    #[test]
    fn test_catalogue_flags_need_no_config() {
        let cli = Cli::try_parse_from(["balancescan", "--networks"]).unwrap();
        assert!(cli.networks);
        assert!(cli.config.is_none());
        assert!(Cli::try_parse_from(["balancescan", "--example"]).is_ok());
    }

    #[test]
    fn test_network_list_covers_every_network() {
        let list = network_list();
        assert_eq!(list.lines().count(), Network::ALL.len());
        assert!(list.lines().any(|line| line == "arbitrum-one"));
    }

    #[test]
    fn test_last_price_flag_wins() {
        let cli = Cli::try_parse_from(["balancescan", "b.toml", "--no-price", "--price"]).unwrap();
        assert!(cli.price && !cli.no_price);
        let cli = Cli::try_parse_from(["balancescan", "b.toml", "--price", "--no-price"]).unwrap();
        assert!(!cli.price && cli.no_price);
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from(["balancescan", "b.toml", "--no-price", "--skip-empty"]).unwrap();
        let mut config = config();
        assert!(config.settings.price);

        apply_flags(&cli, &mut config);

        assert!(!config.settings.price);
        assert!(config.settings.skip_empty);
        assert!(!config.settings.print_debug);
        assert_eq!(config.settings.print_format, PrintFormat::Plain);
    }

    #[test]
    fn test_flags_reenable_price_and_pick_format() {
        let cli = Cli::try_parse_from(["balancescan", "b.toml", "--price", "-f", "json"]).unwrap();
        let mut config = config();
        config.settings.price = false;

        apply_flags(&cli, &mut config);

        assert!(config.settings.price);
        assert_eq!(config.settings.print_format, PrintFormat::Json);
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let cli = Cli::try_parse_from(["balancescan", "b.toml"]).unwrap();
        let mut config = config();
        config.settings.price = false;
        config.settings.print_format = PrintFormat::Json;

        apply_flags(&cli, &mut config);

        assert!(!config.settings.price);
        assert_eq!(config.settings.print_format, PrintFormat::Json);
    }
}
