// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Plain text and JSON rendering of results and diffs
//!
//! Rendering never changes numbers: it only formats what aggregation
//! produced. Unavailable balances always render as
//! [`UNAVAILABLE`](crate::UNAVAILABLE), never as zero.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::result::{AggregatedGroup, AggregatedResult};
use crate::retrieval::UNAVAILABLE;
use crate::snapshot::DiffEntry;

/// Output format of the command line tool.
///
/// `table` is accepted as another name for `plain`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PrintFormat {
    #[default]
    #[serde(alias = "table")]
    #[value(alias = "table")]
    Plain,
    Json,
}

/// Options for plain text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Hide addresses whose balance is exactly zero
    pub skip_empty: bool,
    /// Thousands separator
    pub separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            skip_empty: false,
            separator: ",".to_string(),
        }
    }
}

/// Format a decimal with a thousands separator in the integer part.
///
/// ```
/// use balancescan::report::format_number;
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let value = BigDecimal::from_str("-1234567.25").unwrap();
/// assert_eq!(format_number(&value, ","), "-1,234,567.25");
/// assert_eq!(format_number(&value, "_"), "-1_234_567.25");
/// ```
pub fn format_number(value: &BigDecimal, separator: &str) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 * separator.len());
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

fn render_group(group: &AggregatedGroup, options: &RenderOptions, lines: &mut Vec<String>) {
    let sep = options.separator.as_str();
    lines.push(group.group.name());

    let width = group
        .outcomes
        .iter()
        .map(|outcome| outcome.task.address.len())
        .max()
        .unwrap_or(0);

    for outcome in &group.outcomes {
        let amount = match outcome.amount() {
            Some(amount) if options.skip_empty && amount.is_zero() => continue,
            Some(amount) => format_number(amount, sep),
            None => UNAVAILABLE.to_string(),
        };
        lines.push(format!("  {:<width$}  {amount}", outcome.task.address));
    }

    lines.push(format!("  sum: {}", format_number(&group.balance_sum, sep)));
    if group.group.has_share() {
        lines.push(format!(
            "  share ({}): {}",
            group.group.share.trim(),
            format_number(&group.share_sum, sep)
        ));
    }
    if let Some(usd) = &group.usd_sum {
        lines.push(format!("  usd: ${}", format_number(usd, sep)));
    }
    let failed = group.failed().count();
    if failed > 0 {
        lines.push(format!("  unavailable: {failed}"));
    }
}

/// Render a result as plain text.
pub fn render_plain(result: &AggregatedResult, options: &RenderOptions) -> String {
    let sep = options.separator.as_str();
    let mut lines = Vec::new();

    for group in &result.groups {
        render_group(group, options, &mut lines);
        lines.push(String::new());
    }

    lines.push("Total".to_string());
    for total in &result.tickers {
        let mut line = format!("  {}: {}", total.ticker, format_number(&total.share_sum, sep));
        if let Some(usd) = &total.usd_sum {
            line.push_str(&format!(" (${})", format_number(usd, sep)));
        }
        lines.push(line);
    }
    if let Some(usd) = &result.usd_total {
        lines.push(format!("  usd_total: ${}", format_number(usd, sep)));
    }

    lines.join("\n")
}

fn opt(value: Option<&BigDecimal>) -> Value {
    value.map_or(Value::Null, |value| Value::String(value.to_string()))
}

/// Render a result as a JSON document.
///
/// Amounts are decimal strings; unavailable balances carry `null` plus the
/// error message.
pub fn render_json(result: &AggregatedResult) -> Value {
    let groups: Vec<Value> = result
        .groups
        .iter()
        .map(|group| {
            let balances: Vec<Value> = group
                .outcomes
                .iter()
                .map(|outcome| {
                    json!({
                        "address": outcome.task.address,
                        "balance": opt(outcome.amount()),
                        "error": outcome.error().map(ToString::to_string),
                    })
                })
                .collect();
            json!({
                "ticker": group.group.ticker,
                "network": group.group.network,
                "comment": group.group.comment,
                "token": group.group.token,
                "decimals": group.decimals.map(|d| d.as_u8()),
                "share": group.group.share,
                "balances": balances,
                "balance_sum": group.balance_sum.to_string(),
                "share_sum": group.share_sum.to_string(),
                "price": opt(group.price.as_ref()),
                "usd_sum": opt(group.usd_sum.as_ref()),
            })
        })
        .collect();

    let totals: Vec<Value> = result
        .tickers
        .iter()
        .map(|total| {
            json!({
                "ticker": total.ticker,
                "balance_sum": total.balance_sum.to_string(),
                "share_sum": total.share_sum.to_string(),
                "usd_sum": opt(total.usd_sum.as_ref()),
            })
        })
        .collect();

    json!({
        "groups": groups,
        "totals": totals,
        "share_total": result.share_total.to_string(),
        "usd_total": opt(result.usd_total.as_ref()),
    })
}

/// Render a snapshot diff as plain text, one line per key.
pub fn render_diff_plain(entries: &[DiffEntry], separator: &str) -> String {
    let mut lines = vec!["Diff".to_string()];
    for entry in entries {
        let sign = if entry.delta > BigDecimal::zero() { "+" } else { "" };
        lines.push(format!(
            "  {}: {} -> {} ({sign}{})",
            entry.key,
            format_number(&entry.old_or_zero(), separator),
            format_number(&entry.new_or_zero(), separator),
            format_number(&entry.delta, separator),
        ));
    }
    lines.join("\n")
}

/// Render a snapshot diff as a JSON array.
pub fn render_diff_json(entries: &[DiffEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                json!({
                    "ticker": entry.key.ticker,
                    "network": entry.key.network,
                    "token": entry.key.token,
                    "address": entry.key.address,
                    "old": opt(entry.old.as_ref()),
                    "new": opt(entry.new.as_ref()),
                    "delta": entry.delta.to_string(),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RpcError;
    use crate::price::StaticPrices;
    use crate::result::aggregate;
    use crate::retrieval::{BalanceOutcome, BalanceTask, DecimalsCache};
    use crate::snapshot::SnapshotKey;
    use crate::types::group::Group;
    use crate::types::network::Network;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sample() -> AggregatedResult {
        let groups = vec![Group::new("ETH", Network::Ethereum)
            .with_comment("treasury")
            .with_addresses(["0xaaaa", "0xbb", "0xcc"])];
        let results = vec![Ok(dec("1234.5")), Ok(dec("0")), Err(RpcError::request("down"))];
        let outcomes = BalanceTask::expand(&groups)
            .into_iter()
            .zip(results)
            .map(|(task, result)| BalanceOutcome { task, result })
            .collect();
        let prices = StaticPrices::new().with_price("ETH", dec("2"));
        aggregate(&groups, outcomes, &DecimalsCache::new(), Some(&prices), 4).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(&dec("0"), ","), "0");
        assert_eq!(format_number(&dec("999"), ","), "999");
        assert_eq!(format_number(&dec("1000"), ","), "1,000");
        assert_eq!(format_number(&dec("123456.789"), " "), "123 456.789");
    }

    #[test]
    fn test_plain_marks_unavailable() {
        let text = render_plain(&sample(), &RenderOptions::default());
        assert!(text.starts_with("ETH / treasury / ethereum"));
        assert!(text.contains("  0xaaaa  1,234.5"));
        assert!(text.contains("  0xbb    0"));
        assert!(text.contains("  0xcc    N/A"));
        assert!(text.contains("  usd: $2,469"));
        assert!(text.contains("  unavailable: 1"));
        assert!(text.contains("  usd_total: $2,469"));
    }

    #[test]
    fn test_plain_skip_empty_keeps_unavailable() {
        let options = RenderOptions {
            skip_empty: true,
            ..Default::default()
        };
        let text = render_plain(&sample(), &options);
        assert!(!text.contains("0xbb"));
        assert!(text.contains("0xcc"));
    }

    #[test]
    fn test_json_document() {
        let value = render_json(&sample());
        let group = &value["groups"][0];
        assert_eq!(group["network"], "ethereum");
        assert_eq!(group["balances"][0]["balance"], "1234.5");
        assert!(group["balances"][2]["balance"].is_null());
        assert_eq!(group["balances"][2]["error"], "RPC request failed: down");
        assert_eq!(group["usd_sum"], "2469");
        assert_eq!(value["share_total"], "1234.5");
    }

    #[test]
    fn test_diff_rendering() {
        let entries = vec![DiffEntry {
            key: SnapshotKey::new("ETH", Network::Base, None, "0xa"),
            old: Some(dec("1000")),
            new: None,
            delta: dec("-1000"),
        }];
        assert_eq!(
            render_diff_plain(&entries, ","),
            "Diff\n  ETH / base / native / 0xa: 1,000 -> 0 (-1,000)"
        );
        let json = render_diff_json(&entries);
        assert!(json[0]["new"].is_null());
        assert_eq!(json[0]["delta"], "-1000");
    }
}
