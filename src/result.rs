// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aggregation of per-address outcomes into group, ticker and grand totals
//!
//! Output order always follows group declaration order and, within a group,
//! address order. Failed addresses are kept in place (rendered as
//! [`UNAVAILABLE`](crate::UNAVAILABLE)) but excluded from every sum.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use tracing::debug;

use crate::amount::round_decimal;
use crate::errors::ShareExpressionError;
use crate::price::PriceLookup;
use crate::retrieval::{BalanceOutcome, DecimalsCache};
use crate::share::ShareExpression;
use crate::types::group::Group;
use crate::types::tokens::TokenDecimals;

/// One group with its per-address outcomes and sums.
#[derive(Debug, Clone)]
pub struct AggregatedGroup {
    pub group: Group,
    /// Decimals used for scaling, when resolved
    pub decimals: Option<TokenDecimals>,
    /// Per-address outcomes in address order
    pub outcomes: Vec<BalanceOutcome>,
    /// Sum of the successfully fetched amounts
    pub balance_sum: BigDecimal,
    /// Share expression applied to `balance_sum`, rounded
    pub share_sum: BigDecimal,
    /// Price used for `usd_sum`
    pub price: Option<BigDecimal>,
    /// `share_sum * price`, rounded; `None` when unpriced
    pub usd_sum: Option<BigDecimal>,
}

impl AggregatedGroup {
    pub fn failed(&self) -> impl Iterator<Item = &BalanceOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

/// Sums over every group sharing a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerTotal {
    pub ticker: String,
    pub balance_sum: BigDecimal,
    pub share_sum: BigDecimal,
    /// `None` when no group of this ticker was priced
    pub usd_sum: Option<BigDecimal>,
}

/// Everything a run produces, ready for rendering or snapshotting.
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    /// Groups in declaration order
    pub groups: Vec<AggregatedGroup>,
    /// Per-ticker totals in order of first appearance
    pub tickers: Vec<TickerTotal>,
    /// Sum of every group's share-adjusted amount
    pub share_total: BigDecimal,
    /// Sum of every priced group's fiat amount; `None` when pricing is off
    pub usd_total: Option<BigDecimal>,
    pub round_digits: u32,
}

impl AggregatedResult {
    pub fn has_failures(&self) -> bool {
        self.groups.iter().any(AggregatedGroup::has_failures)
    }

    /// Number of addresses whose balance could not be fetched.
    pub fn failed_count(&self) -> usize {
        self.groups.iter().map(|group| group.failed().count()).sum()
    }
}

/// Combine worker outcomes into an [`AggregatedResult`].
///
/// `prices` is `None` when pricing is disabled; a missing price for a ticker
/// leaves that group unpriced and is not an error.
///
/// # Errors
///
/// A share expression that fails to evaluate (for example dividing by a zero
/// total) aborts aggregation.
pub fn aggregate(
    groups: &[Group],
    outcomes: Vec<BalanceOutcome>,
    decimals: &DecimalsCache,
    prices: Option<&dyn PriceLookup>,
    round_digits: u32,
) -> Result<AggregatedResult, ShareExpressionError> {
    let mut per_group: Vec<Vec<BalanceOutcome>> = vec![Vec::new(); groups.len()];
    for outcome in outcomes {
        if let Some(slot) = per_group.get_mut(outcome.task.group_index) {
            slot.push(outcome);
        }
    }

    let mut aggregated = Vec::with_capacity(groups.len());
    for (group, outcomes) in groups.iter().zip(per_group) {
        let balance_sum: BigDecimal = outcomes
            .iter()
            .filter_map(BalanceOutcome::amount)
            .fold(BigDecimal::zero(), |sum, amount| sum + amount);

        let share = ShareExpression::parse(&group.share)?;
        let share_sum = round_decimal(&share.evaluate(&balance_sum)?, round_digits);

        let price = prices.and_then(|prices| prices.price_of(&group.ticker));
        let usd_sum = price
            .as_ref()
            .map(|price| round_decimal(&(&share_sum * price), round_digits));

        debug!(
            group = %group.name(),
            %balance_sum,
            %share_sum,
            "Aggregated group"
        );

        aggregated.push(AggregatedGroup {
            group: group.clone(),
            decimals: decimals.get(&group.token_key()),
            outcomes,
            balance_sum,
            share_sum,
            price,
            usd_sum,
        });
    }

    let tickers = ticker_totals(&aggregated, round_digits);

    let share_total = round_decimal(
        &aggregated
            .iter()
            .fold(BigDecimal::zero(), |sum, group| sum + &group.share_sum),
        round_digits,
    );
    let usd_total = prices.map(|_| {
        let total = aggregated
            .iter()
            .filter_map(|group| group.usd_sum.as_ref())
            .fold(BigDecimal::zero(), |sum, usd| sum + usd);
        round_decimal(&total, round_digits)
    });

    Ok(AggregatedResult {
        groups: aggregated,
        tickers,
        share_total,
        usd_total,
        round_digits,
    })
}

fn ticker_totals(groups: &[AggregatedGroup], round_digits: u32) -> Vec<TickerTotal> {
    let mut totals: Vec<TickerTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for group in groups {
        let position = *index.entry(group.group.ticker.as_str()).or_insert_with(|| {
            totals.push(TickerTotal {
                ticker: group.group.ticker.clone(),
                balance_sum: BigDecimal::zero(),
                share_sum: BigDecimal::zero(),
                usd_sum: None,
            });
            totals.len() - 1
        });
        let total = &mut totals[position];
        total.balance_sum += &group.balance_sum;
        total.share_sum += &group.share_sum;
        if let Some(usd) = &group.usd_sum {
            let sum = total.usd_sum.take().unwrap_or_else(BigDecimal::zero);
            total.usd_sum = Some(sum + usd);
        }
    }

    for total in &mut totals {
        total.balance_sum = round_decimal(&total.balance_sum, round_digits);
        total.share_sum = round_decimal(&total.share_sum, round_digits);
        total.usd_sum = total
            .usd_sum
            .as_ref()
            .map(|usd| round_decimal(usd, round_digits));
    }
    totals
}
